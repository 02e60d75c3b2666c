//! Traits and types for external merge tool invocation

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result of a completed merge invocation
#[must_use]
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Path of the merged artifact
    pub output: PathBuf,
    /// Exit code reported by the tool (0 for a successful run)
    pub exit_code: i32,
}

/// Trait for external media merge tools
///
/// This trait defines the interface for losslessly concatenating the
/// segments listed in a manifest into a single output file. The tool is a
/// black box: implementations report success or surface the tool's exit
/// status and diagnostics, and never inspect the merged artifact.
///
/// # Examples
///
/// ```no_run
/// use segment_dl::merger::{FfmpegMerger, Merger};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let merger = FfmpegMerger::from_path()
///     .expect("ffmpeg binary not found");
///
/// let outcome = merger
///     .merge(Path::new("chunks/file_list.txt"), Path::new("movie.mp4"))
///     .await?;
/// println!("merged into {}", outcome.output.display());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Merger: Send + Sync {
    /// Concatenate the segments listed in `manifest` into `output`
    ///
    /// The manifest must be in the format produced by
    /// [`write_manifest`](crate::manifest::write_manifest). Stream data is
    /// copied, not re-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tool binary cannot be executed
    /// - The tool exits non-zero (diagnostic output is captured in the error)
    /// - The operation is not supported (for stub implementations)
    async fn merge(&self, manifest: &Path, output: &Path) -> crate::Result<MergeOutcome>;

    /// Whether this implementation can actually invoke a merge tool
    ///
    /// Stub implementations return `false`; callers can use this to skip
    /// the merge stage up front instead of hitting a NotSupported error.
    fn is_available(&self) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
