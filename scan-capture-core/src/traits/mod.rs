pub mod barcode_detector;
pub mod camera_device;
pub mod camera_enumerator;
pub mod capture_delegate;
pub mod scan_delegate;
