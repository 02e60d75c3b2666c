//! Concat manifest generation for the merge tool
//!
//! The manifest is the handoff between retrieval and merge: one
//! `file 'NAME'` line per segment, ascending from index 1 through the
//! retrieval outcome, in the format ffmpeg's concat demuxer reads. Names
//! are relative to the manifest's own directory, so the file stays valid
//! if the whole output directory is moved.

use crate::error::Result;
use crate::store::SegmentStore;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Write the merge manifest for segments 1 through `last_index`, inclusive
///
/// Overwrites any pre-existing manifest at the same path. The caller
/// guarantees the indices are contiguous on disk; this function only
/// renders them. An empty outcome is expected to be guarded upstream
/// (see [`SegmentDownloader::run`](crate::SegmentDownloader::run)) —
/// passing `last_index == 0` writes a manifest with no entries.
pub fn write_manifest(
    store: &SegmentStore,
    manifest_name: &str,
    last_index: u64,
) -> Result<PathBuf> {
    let path = store.dir().join(manifest_name);

    let mut contents = String::new();
    for index in 1..=last_index {
        // Single quotes delimit names for the concat demuxer; writeln! into
        // a String cannot fail.
        let _ = writeln!(contents, "file '{}'", store.segment_name(index));
    }

    std::fs::write(&path, contents)?;

    tracing::info!(
        path = %path.display(),
        entries = last_index,
        "manifest written"
    );
    Ok(path)
}
