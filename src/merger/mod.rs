//! External merge tool invocation
//!
//! This module provides a trait-based architecture for the final
//! concatenation step. The merge tool is an external collaborator: it
//! receives a manifest and an output path and either succeeds or fails, and
//! the trait boundary keeps it substitutable with a test double.
//!
//! ## Architecture
//!
//! The core abstraction is the [`Merger`] trait. Two implementations are
//! provided:
//!
//! - [`FfmpegMerger`]: Uses the external `ffmpeg` binary (concat demuxer,
//!   stream copy)
//! - [`NoOpMerger`]: Stub implementation when no merge tool is available
//!
//! ## Usage
//!
//! ```no_run
//! use segment_dl::merger::{FfmpegMerger, Merger};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Try to find ffmpeg in PATH
//!     let merger = FfmpegMerger::from_path()
//!         .expect("ffmpeg binary not found");
//!
//!     let outcome = merger
//!         .merge(Path::new("chunks/file_list.txt"), Path::new("movie.mp4"))
//!         .await?;
//!     println!("wrote {}", outcome.output.display());
//!
//!     Ok(())
//! }
//! ```

mod ffmpeg;
mod noop;
mod traits;

pub use ffmpeg::FfmpegMerger;
pub use noop::NoOpMerger;
pub use traits::{MergeOutcome, Merger};
