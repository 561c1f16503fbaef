//! # scan-capture-sim
//!
//! Simulated camera backend for scan-capture-kit.
//!
//! Provides:
//! - `SimCamera` — an in-memory camera implementing `CameraDevice`:
//!   threaded frame generation, flash/torch state, a bounded-wait
//!   configuration lock, and failure injection
//! - `SimRig` — a `CameraEnumerator` over a fixed set of simulated cameras
//!
//! Useful for development on machines without a camera and for exercising
//! the full capture pipeline deterministically in tests. A real platform
//! backend (AVFoundation, V4L2) implements the same traits.
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use scan_capture_core::CaptureSessionManager;
//! use scan_capture_sim::SimRig;
//!
//! let manager = CaptureSessionManager::new(Arc::new(SimRig::front_and_back()));
//! manager.add_video_input_camera()?;
//! manager.setup_outputs()?;
//! let preview = manager.add_video_preview_layer()?;
//! manager.start_running()?;
//! ```

pub mod rig;
pub mod sim_camera;

pub use rig::SimRig;
pub use sim_camera::SimCamera;
