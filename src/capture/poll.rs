use image::RgbImage;
use log::debug;

use super::source::FrameSource;

/// Immutable record of one tick's camera sweep. Consumers see either the
/// complete frame set or which sources came up empty; frames are never
/// exposed piecemeal.
#[derive(Debug)]
pub struct PollResult {
    frames: Vec<Option<RgbImage>>,
}

impl PollResult {
    pub fn new(frames: Vec<Option<RgbImage>>) -> Self {
        Self { frames }
    }

    pub fn source_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_complete(&self) -> bool {
        self.frames.iter().all(Option::is_some)
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.frames
            .iter()
            .enumerate()
            .filter_map(|(index, frame)| frame.is_none().then_some(index))
            .collect()
    }

    /// Every frame in source order, or `None` if any source failed.
    pub fn complete_frames(&self) -> Option<Vec<&RgbImage>> {
        self.frames.iter().map(Option::as_ref).collect()
    }
}

/// Polls every source once, in order. Individual failures become gaps in
/// the result; the sweep itself never fails.
pub fn poll_all(sources: &mut [Box<dyn FrameSource>]) -> PollResult {
    let mut frames = Vec::with_capacity(sources.len());

    for source in sources.iter_mut() {
        match source.poll() {
            Ok(frame) => frames.push(Some(frame)),
            Err(err) => {
                debug!("poll failed for {}: {}", source.label(), err);
                frames.push(None);
            }
        }
    }

    PollResult::new(frames)
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::capture::source::CaptureError;

    struct ScriptedSource {
        label: String,
        frames: Vec<Option<RgbImage>>,
    }

    impl ScriptedSource {
        fn boxed(label: &str, frames: Vec<Option<RgbImage>>) -> Box<Self> {
            Box::new(Self {
                label: label.to_string(),
                frames,
            })
        }
    }

    impl FrameSource for ScriptedSource {
        fn label(&self) -> &str {
            &self.label
        }

        fn poll(&mut self) -> Result<RgbImage, CaptureError> {
            match self.frames.remove(0) {
                Some(frame) => Ok(frame),
                None => Err(CaptureError::EmptyFrame),
            }
        }
    }

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([value, value, value]))
    }

    #[test]
    fn complete_sweep_exposes_all_frames() {
        let mut sources: Vec<Box<dyn FrameSource>> = vec![
            ScriptedSource::boxed("a", vec![Some(solid(10))]),
            ScriptedSource::boxed("b", vec![Some(solid(20))]),
        ];

        let result = poll_all(&mut sources);

        assert_eq!(result.source_count(), 2);
        assert!(result.is_complete());
        assert!(result.failed_indices().is_empty());

        let frames = result.complete_frames().unwrap();
        assert_eq!(frames[0].get_pixel(0, 0), &Rgb([10, 10, 10]));
        assert_eq!(frames[1].get_pixel(0, 0), &Rgb([20, 20, 20]));
    }

    #[test]
    fn partial_sweep_withholds_every_frame() {
        let mut sources: Vec<Box<dyn FrameSource>> = vec![
            ScriptedSource::boxed("a", vec![Some(solid(10))]),
            ScriptedSource::boxed("b", vec![None]),
            ScriptedSource::boxed("c", vec![Some(solid(30))]),
        ];

        let result = poll_all(&mut sources);

        assert!(!result.is_complete());
        assert_eq!(result.failed_indices(), vec![1]);
        assert!(result.complete_frames().is_none());
    }

    #[test]
    fn empty_sweep_is_vacuously_complete() {
        let result = PollResult::new(Vec::new());

        assert!(result.is_complete());
        assert_eq!(result.complete_frames(), Some(Vec::new()));
    }
}
