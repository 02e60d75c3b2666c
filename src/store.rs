//! Segment persistence with crash-safe writes
//!
//! The store owns the mapping from segment index to on-disk file and is the
//! authority on whether a segment is already present. Writes go through the
//! write-temp → rename pattern: bytes land in a uniquely-named temp file in
//! the target directory, then an atomic rename publishes the final name.
//! The target file is therefore either absent or complete — a crashed run
//! can never leave a truncated segment that a later resume would mistake
//! for "already retrieved".

use crate::error::Result;
use crate::types::segment_name;
use std::path::{Path, PathBuf};

/// Filesystem store for retrieved segments
#[derive(Clone, Debug)]
pub struct SegmentStore {
    dir: PathBuf,
    prefix: String,
    suffix: String,
}

impl SegmentStore {
    /// Create a store rooted at `dir` using the given naming scheme
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Directory holding segment files and the manifest
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the store directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// File name for a segment index
    pub fn segment_name(&self, index: u64) -> String {
        segment_name(&self.prefix, index, &self.suffix)
    }

    /// Full local path for a segment index
    pub fn segment_path(&self, index: u64) -> PathBuf {
        self.dir.join(self.segment_name(index))
    }

    /// Whether a completed segment file exists for this index
    ///
    /// Only published names count: in-flight temp files are invisible here,
    /// which is what makes resume safe.
    pub fn contains(&self, index: u64) -> bool {
        self.segment_path(index).exists()
    }

    /// Persist segment bytes under their final name, atomically
    ///
    /// The temp file is created inside the store directory so the final
    /// rename never crosses a filesystem boundary.
    pub fn persist(&self, index: u64, data: &[u8]) -> Result<PathBuf> {
        let path = self.segment_path(index);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        std::io::Write::write_all(&mut tmp, data)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!(index, path = %path.display(), bytes = data.len(), "segment persisted");
        Ok(path)
    }
}
