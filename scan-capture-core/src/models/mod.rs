pub mod camera_models;
pub mod config;
pub mod error;
pub mod state;
