use std::path::PathBuf;

pub const DEFAULT_DATASET_ROOT: &str = "dataset";
pub const DEFAULT_DEVICES: [&str; 4] =
    ["/dev/cam1", "/dev/cam2", "/dev/cam3", "/dev/cam4"];
pub const DEFAULT_TILE_WIDTH: u32 = 320;
pub const DEFAULT_TILE_HEIGHT: u32 = 240;
pub const DEFAULT_POLL_FPS: f32 = 30.0;

/// Runtime configuration. `terracap [dataset-root] [device-path...]`
#[derive(Clone, Debug, PartialEq)]
pub struct RecorderConfig {
    pub dataset_root: PathBuf,
    pub devices: Vec<PathBuf>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub poll_fps: f32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from(DEFAULT_DATASET_ROOT),
            devices: DEFAULT_DEVICES.into_iter().map(PathBuf::from).collect(),
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
            poll_fps: DEFAULT_POLL_FPS,
        }
    }
}

impl RecorderConfig {
    // First positional argument overrides the dataset root; any further
    // arguments replace the default device list.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut config = Self::default();

        if let Some(root) = args.next() {
            config.dataset_root = PathBuf::from(root);
        }

        let devices: Vec<PathBuf> = args.map(PathBuf::from).collect();
        if !devices.is_empty() {
            config.devices = devices;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_four_cameras() {
        let config = RecorderConfig::default();

        assert_eq!(config.dataset_root, PathBuf::from("dataset"));
        assert_eq!(config.devices.len(), 4);
        assert_eq!(config.devices[0], PathBuf::from("/dev/cam1"));
        assert_eq!(config.devices[3], PathBuf::from("/dev/cam4"));
    }

    #[test]
    fn args_override_root_and_devices() {
        let args = ["captures", "/dev/video0", "/dev/video2"]
            .into_iter()
            .map(String::from);

        let config = RecorderConfig::from_args(args);

        assert_eq!(config.dataset_root, PathBuf::from("captures"));
        assert_eq!(
            config.devices,
            vec![PathBuf::from("/dev/video0"), PathBuf::from("/dev/video2")]
        );
    }

    #[test]
    fn root_only_keeps_default_devices() {
        let config =
            RecorderConfig::from_args(std::iter::once("captures".to_string()));

        assert_eq!(config.dataset_root, PathBuf::from("captures"));
        assert_eq!(config.devices.len(), 4);
    }
}
