//! Configuration types for segment-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, time::Duration};
use url::Url;

/// Retry configuration for transient transport failures
///
/// Disabled by default: the baseline contract treats every failed fetch as
/// the end-of-series signal. Enabling retry changes only how timeouts and
/// connection errors are handled — they get `max_attempts` tries before the
/// loop concludes the series has ended. A clean HTTP non-success status is
/// never retried; it is the termination condition itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retry transient transport errors before concluding end-of-series (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of attempts per segment, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// External tool paths (ffmpeg)
///
/// Groups settings for external binaries. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for SegmentDownloader
///
/// Every field except `base_url` has a working default; an empty `base_url`
/// fails [`Config::validate`]. Configuration is passed at call time — there
/// is no persisted configuration file format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the segment series (required, must end with '/')
    ///
    /// Segment URLs are formed by appending `{prefix}{index}{suffix}` to
    /// this value, so a missing trailing separator would silently glue the
    /// segment name onto the last path component.
    #[serde(default)]
    pub base_url: String,

    /// Segment file name prefix (default: "video")
    #[serde(default = "default_segment_prefix")]
    pub segment_prefix: String,

    /// Segment file name suffix (default: ".ts")
    #[serde(default = "default_segment_suffix")]
    pub segment_suffix: String,

    /// Directory receiving segment files and the manifest (default: "./chunks")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// HTTP headers sent with every segment request
    ///
    /// Defaults to a generic browser User-Agent; many segment hosts reject
    /// clients that do not present one.
    #[serde(default = "default_headers")]
    pub headers: HashMap<String, String>,

    /// First segment index to probe (default: 1)
    #[serde(default = "default_start_index")]
    pub start_index: u64,

    /// Safety cap on the probed index (default: None = unbounded)
    ///
    /// The series length is discovered empirically, so a misconfigured
    /// server that answers success forever would otherwise never terminate
    /// the loop. When set, reaching an index beyond the cap stops retrieval
    /// exactly as if end-of-series had been observed.
    #[serde(default)]
    pub max_index: Option<u64>,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// File name of the concat manifest inside `output_dir` (default: "file_list.txt")
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Retry behavior for transient transport failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// External tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            segment_prefix: default_segment_prefix(),
            segment_suffix: default_segment_suffix(),
            output_dir: default_output_dir(),
            headers: default_headers(),
            start_index: default_start_index(),
            max_index: None,
            request_timeout: default_request_timeout(),
            manifest_name: default_manifest_name(),
            retry: RetryConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Create a configuration for the given base URL with all other fields
    /// at their defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Check the configuration for values that would make a run misbehave
    ///
    /// Returns [`Error::Config`] or [`Error::InvalidBaseUrl`] describing the
    /// first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config {
                message: "base_url is required".into(),
                key: Some("base_url".into()),
            });
        }

        let parsed = Url::parse(&self.base_url).map_err(|e| Error::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if !self.base_url.ends_with('/') {
            return Err(Error::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "must end with '/' so segment names append as path components".into(),
            });
        }

        if self.start_index == 0 {
            return Err(Error::Config {
                message: "start_index must be at least 1".into(),
                key: Some("start_index".into()),
            });
        }

        if let Some(cap) = self.max_index {
            if cap < self.start_index {
                return Err(Error::Config {
                    message: format!("max_index {cap} is below start_index {}", self.start_index),
                    key: Some("max_index".into()),
                });
            }
        }

        if self.segment_prefix.is_empty() && self.segment_suffix.is_empty() {
            return Err(Error::Config {
                message: "segment_prefix and segment_suffix cannot both be empty".into(),
                key: Some("segment_prefix".into()),
            });
        }

        if self.manifest_name.is_empty() {
            return Err(Error::Config {
                message: "manifest_name cannot be empty".into(),
                key: Some("manifest_name".into()),
            });
        }

        // Anything below 1.0 (or non-finite) would shrink or break the
        // backoff delay computation.
        let multiplier = self.retry.backoff_multiplier;
        if !(multiplier.is_finite() && multiplier >= 1.0) {
            return Err(Error::Config {
                message: format!(
                    "retry.backoff_multiplier must be a finite value of at least 1.0, got {multiplier}"
                ),
                key: Some("retry.backoff_multiplier".into()),
            });
        }

        Ok(())
    }
}

// Default value functions
fn default_segment_prefix() -> String {
    "video".into()
}

fn default_segment_suffix() -> String {
    ".ts".into()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./chunks")
}

fn default_headers() -> HashMap<String, String> {
    HashMap::from([("User-Agent".to_string(), "Mozilla/5.0".to_string())])
}

fn default_start_index() -> u64 {
    1
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_manifest_name() -> String {
    "file_list.txt".into()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
