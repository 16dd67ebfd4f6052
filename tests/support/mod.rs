#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SCRATCH: AtomicU32 = AtomicU32::new(0);

/// Unique temp directory for one test, removed again on drop.
pub struct Scratch {
    root: PathBuf,
}

impl Scratch {
    pub fn new(tag: &str) -> Self {
        let index = NEXT_SCRATCH.fetch_add(1, Ordering::Relaxed);
        let root = env::temp_dir().join(format!(
            "terracap-{}-{}-{}",
            tag,
            std::process::id(),
            index
        ));
        fs::create_dir_all(&root).expect("scratch dir should be creatable");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

pub fn gpu_tests_enabled() -> bool {
    matches!(
        env::var("TERRACAP_RUN_GPU_TESTS")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}
