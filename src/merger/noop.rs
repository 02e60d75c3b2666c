//! No-op merger for graceful degradation

use super::traits::{MergeOutcome, Merger};
use async_trait::async_trait;
use std::path::Path;

/// No-op merger used when no merge tool is available
///
/// This merger is used when no ffmpeg binary is available or configured.
/// It provides graceful degradation by returning `Error::NotSupported` from
/// [`merge`](Merger::merge), so retrieval and manifest generation can still
/// run and the user is told exactly why the final concatenation did not.
///
/// # Examples
///
/// ```
/// use segment_dl::merger::{Merger, NoOpMerger};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() {
/// let merger = NoOpMerger;
/// assert!(!merger.is_available());
///
/// let result = merger
///     .merge(Path::new("file_list.txt"), Path::new("out.mp4"))
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct NoOpMerger;

#[async_trait]
impl Merger for NoOpMerger {
    async fn merge(&self, _manifest: &Path, _output: &Path) -> crate::Result<MergeOutcome> {
        Err(crate::Error::NotSupported(
            "merging requires the external ffmpeg binary. \
             Configure tools.ffmpeg_path in config or ensure ffmpeg is in PATH."
                .into(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn merge_returns_not_supported() {
        let merger = NoOpMerger;
        let result = merger
            .merge(Path::new("file_list.txt"), Path::new("out.mp4"))
            .await;

        match result {
            Err(crate::Error::NotSupported(msg)) => {
                assert!(
                    msg.contains("ffmpeg"),
                    "error message should name the missing binary"
                );
                assert!(
                    msg.contains("ffmpeg_path") || msg.contains("PATH"),
                    "error message should mention configuration or PATH"
                );
            }
            other => panic!("expected NotSupported error, got {other:?}"),
        }
    }

    #[test]
    fn noop_reports_unavailable() {
        let merger = NoOpMerger;
        assert!(!merger.is_available());
        assert_eq!(merger.name(), "noop");
    }
}
