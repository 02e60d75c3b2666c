//! Pipeline facade chaining retrieval, manifest generation, and merge
//!
//! [`SegmentDownloader`] is the main entry point of the crate. It owns the
//! configured collaborators (HTTP fetcher, segment store, merge tool) and
//! exposes the three pipeline stages individually plus a one-call driver,
//! [`run`](SegmentDownloader::run), that chains them:
//!
//! ```text
//! retrieve → last successful index → manifest → merge → final artifact
//! ```
//!
//! The driver owns the zero-segment guard: an empty retrieval outcome
//! returns immediately and the manifest and merge stages never run.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{self, SegmentFetcher};
use crate::manifest;
use crate::merger::{FfmpegMerger, MergeOutcome, Merger, NoOpMerger};
use crate::store::SegmentStore;
use crate::types::{Event, RetrievalOutcome, RunSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Main downloader instance (cloneable - all fields are Arc-wrapped or cheap)
///
/// Construct one per segment series. Two runs must not share an output
/// directory concurrently: nothing locks the directory, so concurrent
/// invocations against the same path have undefined interleaving.
#[derive(Clone)]
pub struct SegmentDownloader {
    config: Arc<Config>,
    store: SegmentStore,
    fetcher: Arc<SegmentFetcher>,
    merger: Arc<dyn Merger>,
    event_tx: broadcast::Sender<Event>,
}

impl std::fmt::Debug for SegmentDownloader {
    // Merger is a trait object, so Debug cannot be derived; its name stands
    // in for the implementation.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentDownloader")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("merger", &self.merger.name())
            .finish_non_exhaustive()
    }
}

impl SegmentDownloader {
    /// Create a downloader from the given configuration
    ///
    /// Validates the configuration, builds the HTTP client, and selects a
    /// merge tool: an explicitly configured `tools.ffmpeg_path` wins,
    /// otherwise PATH is searched (when `tools.search_path` allows), and
    /// when nothing is found a [`NoOpMerger`] stands in so retrieval and
    /// manifest generation still work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) or
    /// [`Error::InvalidBaseUrl`](crate::Error::InvalidBaseUrl) for a
    /// configuration that would misbehave, or
    /// [`Error::Network`](crate::Error::Network) if the HTTP client cannot
    /// be constructed.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let fetcher = SegmentFetcher::new(&config)?;
        let store = SegmentStore::new(
            &config.output_dir,
            &config.segment_prefix,
            &config.segment_suffix,
        );

        let merger: Arc<dyn Merger> = match &config.tools.ffmpeg_path {
            Some(path) => Arc::new(FfmpegMerger::new(path.clone())),
            None if config.tools.search_path => match FfmpegMerger::from_path() {
                Some(m) => Arc::new(m),
                None => {
                    tracing::warn!("ffmpeg not found in PATH, merge stage will be unavailable");
                    Arc::new(NoOpMerger)
                }
            },
            None => Arc::new(NoOpMerger),
        };
        tracing::debug!(merger = merger.name(), "merge tool selected");

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            store,
            fetcher: Arc::new(fetcher),
            merger,
            event_tx,
        })
    }

    /// Replace the merge tool with a custom [`Merger`] implementation
    ///
    /// Intended for consumers bringing their own muxing tool and for tests
    /// substituting a double for the external binary.
    #[must_use]
    pub fn with_merger(mut self, merger: Arc<dyn Merger>) -> Self {
        self.merger = merger;
        self
    }

    /// Subscribe to pipeline events
    ///
    /// Multiple subscribers are supported; a subscriber that falls behind
    /// the channel capacity misses older events rather than blocking the
    /// pipeline.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this downloader was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The segment store rooted at the configured output directory
    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    /// Run the sequential retrieval loop until end-of-series
    ///
    /// See [`fetch::retrieve`] for the loop contract. Safe to call again
    /// after an interrupted run: segments already on disk are skipped.
    ///
    /// # Errors
    ///
    /// Only local failures (directory creation, segment persistence) are
    /// errors; end-of-series is a normal return.
    pub async fn retrieve(&self) -> Result<RetrievalOutcome> {
        fetch::retrieve(&self.config, &self.store, &self.fetcher, &self.event_tx).await
    }

    /// Write the concat manifest for the given retrieval outcome
    ///
    /// Lists segments 1 through the outcome's last index in ascending
    /// order, overwriting any previous manifest. Callers composing their
    /// own flow must apply the zero-segment guard themselves;
    /// [`run`](Self::run) does it for them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the manifest cannot be
    /// written.
    pub fn write_manifest(&self, outcome: RetrievalOutcome) -> Result<PathBuf> {
        let path = manifest::write_manifest(&self.store, &self.config.manifest_name, outcome.get())?;
        let _ = self.event_tx.send(Event::ManifestWritten {
            path: path.clone(),
            entries: outcome.get(),
        });
        Ok(path)
    }

    /// Invoke the merge tool on a manifest
    ///
    /// # Errors
    ///
    /// Returns [`Error::MergeTool`](crate::Error::MergeTool) with captured
    /// diagnostics when the tool exits non-zero,
    /// [`Error::ToolNotFound`](crate::Error::ToolNotFound) when the binary
    /// cannot be executed, or
    /// [`Error::NotSupported`](crate::Error::NotSupported) when no merge
    /// tool is configured.
    pub async fn merge(&self, manifest_path: &Path, output: &Path) -> Result<MergeOutcome> {
        let _ = self.event_tx.send(Event::MergeStarted {
            output: output.to_path_buf(),
        });

        let outcome = self.merger.merge(manifest_path, output).await?;

        let _ = self.event_tx.send(Event::MergeCompleted {
            output: outcome.output.clone(),
        });
        Ok(outcome)
    }

    /// Run the full pipeline: retrieve, write the manifest, merge
    ///
    /// When retrieval finds nothing, the returned summary has
    /// `outcome == 0`, no manifest path, and `merged == false`; neither
    /// the manifest nor the merge tool is touched. This guard is part of
    /// the contract, not an optimization: the merge tool must never be
    /// invoked with an empty manifest.
    ///
    /// # Errors
    ///
    /// Propagates errors from any stage. A merge failure leaves the
    /// retrieved segments and the manifest on disk, so the run can be
    /// repeated without re-fetching.
    pub async fn run(&self, output: impl AsRef<Path>) -> Result<RunSummary> {
        let output = output.as_ref();

        let outcome = self.retrieve().await?;
        if outcome.is_empty() {
            tracing::info!("no segments retrieved, skipping manifest and merge");
            return Ok(RunSummary {
                outcome,
                manifest: None,
                merged: false,
                output: None,
            });
        }

        let manifest_path = self.write_manifest(outcome)?;
        let merge_outcome = self.merge(&manifest_path, output).await?;

        Ok(RunSummary {
            outcome,
            manifest: Some(manifest_path),
            merged: true,
            output: Some(merge_outcome.output),
        })
    }
}
