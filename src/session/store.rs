use std::error::Error;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

use super::counter::SessionId;
use super::metadata::MetadataRecord;

/// Flat-file dataset layout: `<root>/image/<id>/<n>.jpg` holds a
/// session's frames, `<root>/label/<id>.yaml` its metadata.
#[derive(Clone, Debug)]
pub struct DatasetStore {
    image_root: PathBuf,
    label_root: PathBuf,
}

impl DatasetStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            image_root: root.join("image"),
            label_root: root.join("label"),
        }
    }

    pub fn image_root(&self) -> &Path {
        &self.image_root
    }

    pub fn label_root(&self) -> &Path {
        &self.label_root
    }

    pub fn init_roots(&self) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&self.image_root)?;
        fs::create_dir_all(&self.label_root)?;
        Ok(())
    }

    pub fn session_dir(&self, id: SessionId) -> PathBuf {
        self.image_root.join(id.to_string())
    }

    pub fn metadata_path(&self, id: SessionId) -> PathBuf {
        self.label_root.join(format!("{}.yaml", id))
    }

    /// Writes every frame as `<n>.jpg` (1-based, source order) under the
    /// session directory. All-or-nothing: frames land in a staging
    /// directory that is renamed into place only after every encode
    /// succeeded; any failure removes the staging directory and
    /// propagates.
    pub fn save_images(
        &self,
        id: SessionId,
        frames: &[RgbImage],
    ) -> Result<(), Box<dyn Error>> {
        let staging = self.image_root.join(format!(".staging-{}", id));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        if let Err(err) = write_frames(&staging, frames) {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }

        let session_dir = self.session_dir(id);
        if session_dir.exists() {
            fs::remove_dir_all(&session_dir)?;
        }
        fs::rename(&staging, &session_dir)?;

        Ok(())
    }

    /// Serializes the record as YAML under the label root, replacing any
    /// previous file for the same session.
    pub fn save_metadata(
        &self,
        id: SessionId,
        record: &MetadataRecord,
    ) -> Result<(), Box<dyn Error>> {
        let yaml = serde_yml::to_string(record)?;

        let path = self.metadata_path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, yaml)?;

        Ok(())
    }
}

fn write_frames(dir: &Path, frames: &[RgbImage]) -> Result<(), Box<dyn Error>> {
    for (index, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("{}.jpg", index + 1));
        let file = fs::File::create(&path)?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new(&mut writer).encode_image(frame)?;
        writer.flush()?;
    }
    Ok(())
}
