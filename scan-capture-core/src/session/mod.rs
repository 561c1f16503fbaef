pub mod manager;
pub mod outputs;
pub mod preview;
