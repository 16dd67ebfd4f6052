pub mod app;
pub mod frame_clock;
pub mod recorder;
