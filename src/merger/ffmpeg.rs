//! CLI-based merger using the external ffmpeg binary

use super::traits::{MergeOutcome, Merger};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Merger backed by the external `ffmpeg` binary
///
/// Invokes ffmpeg's concat demuxer with stream copy, so segments are joined
/// without re-encoding: `-f concat -safe 0 -i <manifest> -c copy <output>`.
/// Unsafe-path mode is required because manifest entries are ordinary file
/// names rather than ffmpeg's whitelisted "safe" paths.
///
/// # Examples
///
/// ```no_run
/// use segment_dl::merger::{FfmpegMerger, Merger};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let merger = FfmpegMerger::new(PathBuf::from("/usr/bin/ffmpeg"));
///
/// // Or auto-discover from PATH
/// let merger = FfmpegMerger::from_path()
///     .expect("ffmpeg not found in PATH");
///
/// let outcome = merger
///     .merge(Path::new("chunks/file_list.txt"), Path::new("movie.mp4"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct FfmpegMerger {
    binary_path: PathBuf,
}

impl FfmpegMerger {
    /// Create a new merger with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find ffmpeg in PATH
    ///
    /// Uses the `which` crate to search the system PATH.
    ///
    /// # Returns
    ///
    /// `Some(FfmpegMerger)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }
}

#[async_trait]
impl Merger for FfmpegMerger {
    async fn merge(&self, manifest: &Path, output: &Path) -> crate::Result<MergeOutcome> {
        tracing::info!(
            manifest = %manifest.display(),
            output = %output.display(),
            "invoking ffmpeg concat"
        );

        // -y: non-interactive invocation must not stall on an overwrite prompt
        let cmd_output = Command::new(&self.binary_path)
            .arg("-y")
            .args(["-f", "concat"])
            .args(["-safe", "0"])
            .arg("-i")
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    crate::Error::ToolNotFound {
                        tool: self.binary_path.display().to_string(),
                    }
                } else {
                    crate::Error::MergeTool {
                        message: format!("failed to execute ffmpeg: {e}"),
                        stderr: String::new(),
                    }
                }
            })?;

        if !cmd_output.status.success() {
            let exit_code = cmd_output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&cmd_output.stderr).trim().to_string();
            tracing::error!(exit_code, "ffmpeg exited non-zero");
            return Err(crate::Error::MergeTool {
                message: format!("ffmpeg exited with status {exit_code}"),
                stderr,
            });
        }

        Ok(MergeOutcome {
            output: output.to_path_buf(),
            exit_code: cmd_output.status.code().unwrap_or(0),
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cli-ffmpeg"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_consistency_with_which_crate() {
        let which_result = which::which("ffmpeg");
        let from_path_result = FfmpegMerger::from_path();

        // Both should agree on whether the binary exists
        assert_eq!(
            which_result.is_ok(),
            from_path_result.is_some(),
            "from_path() should return Some if and only if which::which() succeeds"
        );

        if let (Ok(expected_path), Some(merger)) = (which_result, from_path_result) {
            assert_eq!(
                merger.binary_path, expected_path,
                "from_path() should use the path found by which"
            );
            assert!(merger.is_available());
            assert_eq!(merger.name(), "cli-ffmpeg");
        }
    }

    #[tokio::test]
    async fn merge_with_invalid_binary_path_reports_tool_not_found() {
        let merger = FfmpegMerger::new(PathBuf::from("/nonexistent/path/to/ffmpeg"));

        let result = merger
            .merge(Path::new("file_list.txt"), Path::new("out.mp4"))
            .await;

        match result {
            Err(crate::Error::ToolNotFound { tool }) => {
                assert!(tool.contains("ffmpeg"), "tool name was: {tool}");
            }
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }

    // A stand-in script lets the non-zero-exit path run without a real
    // ffmpeg install.
    #[cfg(unix)]
    fn fake_tool(dir: &tempfile::TempDir, script_body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{script_body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_surfaces_captured_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = fake_tool(&dir, "echo 'file_list.txt: Invalid data found' >&2\nexit 1");
        let merger = FfmpegMerger::new(tool);

        let err = merger
            .merge(Path::new("file_list.txt"), Path::new("out.mp4"))
            .await
            .unwrap_err();

        assert!(err.is_merge_failure());
        match err {
            crate::Error::MergeTool { message, stderr } => {
                assert!(
                    message.contains("status 1"),
                    "message must carry the exit status: {message}"
                );
                assert!(
                    stderr.contains("Invalid data found"),
                    "diagnostics must be captured, got: {stderr}"
                );
            }
            other => panic!("expected MergeTool, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_returns_outcome_with_output_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = fake_tool(&dir, "exit 0");
        let merger = FfmpegMerger::new(tool);

        let outcome = merger
            .merge(Path::new("file_list.txt"), Path::new("out.mp4"))
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.output, PathBuf::from("out.mp4"));
    }

    // Integration test that requires an actual ffmpeg binary
    // Run with: cargo test --lib merger::ffmpeg -- --ignored

    #[tokio::test]
    #[ignore] // Requires ffmpeg binary in PATH
    async fn real_ffmpeg_rejects_manifest_with_missing_segments() {
        let merger = match FfmpegMerger::from_path() {
            Some(m) => m,
            None => {
                println!("Skipping test: ffmpeg binary not found in PATH");
                return;
            }
        };

        let dir = tempfile::TempDir::new().unwrap();
        let manifest = dir.path().join("file_list.txt");
        std::fs::write(&manifest, "file 'does-not-exist.ts'\n").unwrap();

        let err = merger
            .merge(&manifest, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();

        assert!(err.is_merge_failure());
        assert!(
            err.merge_diagnostics().is_some_and(|s| !s.is_empty()),
            "real ffmpeg failure must carry diagnostic output"
        );
    }
}
