//! # segment-dl
//!
//! Library for downloading sequentially-numbered media segments over HTTP
//! and losslessly concatenating them into a single playable file.
//!
//! The segment series has no declared length: the downloader probes
//! increasing indices (`video1.ts`, `video2.ts`, ...) and treats the first
//! non-success response as the end of the series. Retrieved segments are
//! persisted with crash-safe writes, listed in a concat manifest, and
//! handed to an external muxing tool (ffmpeg) for a stream-copy merge.
//!
//! ## Design Philosophy
//!
//! segment-dl is designed to be:
//! - **Resume-safe** - Segments already on disk are skipped, not re-fetched
//! - **Sensible defaults** - Works out of the box with just a base URL
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use segment_dl::{Config, SegmentDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://cdn.example.com/stream/");
//!
//!     let downloader = SegmentDownloader::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader.run("movie.mp4").await?;
//!     println!("retrieved {} segments", summary.outcome);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Sequential segment retrieval (the core loop)
pub mod fetch;
/// Concat manifest generation
pub mod manifest;
/// External merge tool invocation
pub mod merger;
/// Pipeline facade
pub mod pipeline;
/// Retry logic with exponential backoff
pub mod retry;
/// Segment persistence
pub mod store;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, RetryConfig, ToolsConfig};
pub use error::{Error, Result};
pub use fetch::SegmentFetcher;
pub use merger::{FfmpegMerger, MergeOutcome, Merger, NoOpMerger};
pub use pipeline::SegmentDownloader;
pub use store::SegmentStore;
pub use types::{Event, RetrievalOutcome, RunSummary};
