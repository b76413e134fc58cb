pub mod timer;
pub mod window_manager;
