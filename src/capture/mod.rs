pub mod poll;
pub mod source;

pub use poll::{PollResult, poll_all};
pub use source::{CameraSource, CaptureError, FrameSource};
