use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use image::RgbImage;
use log::info;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

// Driver-side mmap queue depth.
pub const STREAM_BUFFER_COUNT: u32 = 4;

// A dequeue blocked longer than this counts as a failed poll for the tick.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// One camera's contribution to a tick: a decoded frame, or the reason
/// there isn't one.
pub trait FrameSource {
    fn label(&self) -> &str;
    fn poll(&mut self) -> Result<RgbImage, CaptureError>;
}

#[derive(Debug)]
pub enum CaptureError {
    Io(std::io::Error),
    Decode(image::ImageError),
    EmptyFrame,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Io(err) => write!(f, "device read failed: {}", err),
            CaptureError::Decode(err) => {
                write!(f, "frame decode failed: {}", err)
            }
            CaptureError::EmptyFrame => {
                write!(f, "device produced an empty frame")
            }
        }
    }
}

impl Error for CaptureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CaptureError::Io(err) => Some(err),
            CaptureError::Decode(err) => Some(err),
            CaptureError::EmptyFrame => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err)
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Decode(err)
    }
}

/// V4L2 camera streaming motion-JPEG frames through a memory-mapped
/// buffer queue. Frames keep whatever resolution the driver negotiates.
pub struct CameraSource {
    label: String,
    stream: MmapStream<'static>,
}

impl CameraSource {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let device = Device::with_path(path)?;

        let mut format = device.format()?;
        format.fourcc = FourCC::new(b"MJPG");
        let format = device.set_format(&format)?;

        let mut stream = MmapStream::with_buffers(
            &device,
            Type::VideoCapture,
            STREAM_BUFFER_COUNT,
        )?;
        stream.set_timeout(POLL_TIMEOUT);

        info!(
            "opened {} at {}x{} ({})",
            path.display(),
            format.width,
            format.height,
            format.fourcc
        );

        Ok(Self {
            label: path.display().to_string(),
            stream,
        })
    }
}

impl FrameSource for CameraSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn poll(&mut self) -> Result<RgbImage, CaptureError> {
        let (buf, meta) = self.stream.next()?;

        // Only bytesused of the mapped buffer holds this frame.
        let used = (meta.bytesused as usize).min(buf.len());
        if used == 0 {
            return Err(CaptureError::EmptyFrame);
        }

        let decoded = image::load_from_memory_with_format(
            &buf[..used],
            image::ImageFormat::Jpeg,
        )?;

        Ok(decoded.to_rgb8())
    }
}
