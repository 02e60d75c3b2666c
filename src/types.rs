//! Core types for segment-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a sequential retrieval run
///
/// Either "no segments retrieved" (zero) or "highest contiguous index
/// successfully available locally" (positive). This is the sole value the
/// retrieval loop surfaces to the manifest and merge stages, so it carries
/// the zero-segment distinction explicitly rather than leaving callers to
/// remember what a bare integer means.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RetrievalOutcome(pub u64);

impl RetrievalOutcome {
    /// Outcome of a run that retrieved nothing
    pub const EMPTY: Self = Self(0);

    /// Create an outcome from the highest successfully retrieved index
    pub fn new(last_index: u64) -> Self {
        Self(last_index)
    }

    /// Returns `true` if no segments were retrieved
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The highest successfully retrieved index, or `None` for an empty run
    pub fn last_index(&self) -> Option<u64> {
        if self.0 == 0 { None } else { Some(self.0) }
    }

    /// Get the inner u64 value (0 means no segments)
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RetrievalOutcome {
    fn from(last_index: u64) -> Self {
        Self(last_index)
    }
}

impl From<RetrievalOutcome> for u64 {
    fn from(outcome: RetrievalOutcome) -> Self {
        outcome.0
    }
}

impl PartialEq<u64> for RetrievalOutcome {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<RetrievalOutcome> for u64 {
    fn eq(&self, other: &RetrievalOutcome) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for RetrievalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the local file name for a segment index
///
/// Pure naming function: `{prefix}{index}{suffix}`. The same name is used
/// for the remote path component, the on-disk file, and the manifest entry,
/// so the three views of a segment can never drift apart.
pub fn segment_name(prefix: &str, index: u64, suffix: &str) -> String {
    format!("{prefix}{index}{suffix}")
}

/// Result of a full retrieve-manifest-merge run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    /// Highest segment index available locally after the run (0 = none)
    pub outcome: RetrievalOutcome,
    /// Path of the written manifest, absent when no segments were retrieved
    pub manifest: Option<PathBuf>,
    /// Whether the merge stage ran to completion
    pub merged: bool,
    /// Path of the merged output file, present only when `merged` is true
    pub output: Option<PathBuf>,
}

/// Event emitted during the retrieval and merge lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Segment fetched from the remote and persisted locally
    SegmentFetched {
        /// Segment index
        index: u64,
        /// Payload size in bytes
        bytes: u64,
    },

    /// Segment found on disk from an earlier run; no fetch was issued
    SegmentSkipped {
        /// Segment index
        index: u64,
    },

    /// First non-success response observed; retrieval stopped
    SeriesEnded {
        /// Highest index available locally (0 = nothing retrieved)
        last_index: u64,
    },

    /// Manifest written for the merge tool
    ManifestWritten {
        /// Manifest file path
        path: PathBuf,
        /// Number of segment entries listed
        entries: u64,
    },

    /// Merge tool invocation started
    MergeStarted {
        /// Target output path
        output: PathBuf,
    },

    /// Merge tool exited successfully
    MergeCompleted {
        /// Final artifact path
        output: PathBuf,
    },
}
