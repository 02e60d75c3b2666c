//! Sequential segment retrieval
//!
//! This is the core of the crate: the loop that probes increasing segment
//! indices, persists each delivered payload, and decides when the series
//! has ended. Its contract:
//!
//! - Indices are probed contiguously from `start_index`; none is ever
//!   skipped. A gap in the remote series is indistinguishable from the end
//!   of the series and is treated as the end.
//! - A segment already on disk counts as retrieved and costs no network
//!   call, which makes interrupted runs resumable.
//! - The first non-success response (or transport failure) terminates the
//!   loop cleanly. End-of-series is an outcome, not an error.
//! - The returned [`RetrievalOutcome`] is the highest index available
//!   locally, or zero when nothing was retrieved at all.
//!
//! Fetches are strictly sequential: each request completes before the next
//! index is considered.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::retry::fetch_with_retry;
use crate::store::SegmentStore;
use crate::types::{Event, RetrievalOutcome};
use reqwest::StatusCode;
use tokio::sync::broadcast;

/// Classified result of probing one segment
pub(crate) enum FetchOutcome {
    /// Payload delivered with a success status
    Delivered(Vec<u8>),
    /// Non-success status: the end-of-series signal
    Missing(StatusCode),
}

/// HTTP collaborator that retrieves one segment at a time
///
/// Holds a configured client (timeout, default headers) and the validated
/// base URL. Segment URLs are formed by appending the segment name to the
/// base, so the remote layout mirrors the local naming scheme exactly.
#[derive(Debug)]
pub struct SegmentFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl SegmentFetcher {
    /// Build a fetcher from the configuration
    ///
    /// Fails with [`Error::Config`] if a configured header name or value is
    /// malformed, or [`Error::Network`] if the client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config {
                    message: format!("invalid header name '{name}': {e}"),
                    key: Some("headers".into()),
                })?;
            let header_value =
                reqwest::header::HeaderValue::from_str(value).map_err(|e| Error::Config {
                    message: format!("invalid value for header '{name}': {e}"),
                    key: Some("headers".into()),
                })?;
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Issue a single GET for the named segment and classify the response
    ///
    /// A non-success status is a classification, not an error; only
    /// transport-level failures surface as `Err`.
    pub(crate) async fn fetch_segment(
        &self,
        name: &str,
    ) -> std::result::Result<FetchOutcome, reqwest::Error> {
        let url = format!("{}{}", self.base_url, name);
        tracing::debug!(url = %url, "probing segment");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(FetchOutcome::Missing(status));
        }

        let body = response.bytes().await?;
        Ok(FetchOutcome::Delivered(body.to_vec()))
    }
}

/// Drive the retrieval loop until end-of-series
///
/// Probes indices from `config.start_index` upward. For each index: a
/// segment already in the store is skipped (no fetch), a delivered payload
/// is persisted atomically, and the first non-success response or transport
/// failure stops the loop. With retry enabled in the configuration,
/// transient transport errors are retried before the loop concludes
/// end-of-series; response statuses are never retried.
///
/// Returns the highest index available locally, or
/// [`RetrievalOutcome::EMPTY`] when nothing was retrieved in this run or
/// any earlier one.
///
/// # Errors
///
/// Only local failures are errors: creating the output directory or
/// persisting a segment. End-of-series is a normal return.
pub async fn retrieve(
    config: &Config,
    store: &SegmentStore,
    fetcher: &SegmentFetcher,
    event_tx: &broadcast::Sender<Event>,
) -> Result<RetrievalOutcome> {
    store.ensure_dir()?;

    let mut index = config.start_index;
    let mut retrieved_any = false;

    loop {
        if let Some(cap) = config.max_index {
            if index > cap {
                tracing::info!(cap, "maximum index cap reached, stopping retrieval");
                break;
            }
        }

        if store.contains(index) {
            tracing::debug!(index, "segment already on disk, skipping fetch");
            let _ = event_tx.send(Event::SegmentSkipped { index });
            retrieved_any = true;
            index += 1;
            continue;
        }

        let name = store.segment_name(index);
        match fetch_with_retry(&config.retry, || fetcher.fetch_segment(&name)).await {
            Ok(FetchOutcome::Delivered(body)) => {
                store.persist(index, &body)?;
                tracing::info!(index, bytes = body.len(), "segment retrieved");
                let _ = event_tx.send(Event::SegmentFetched {
                    index,
                    bytes: body.len() as u64,
                });
                retrieved_any = true;
                index += 1;
            }
            Ok(FetchOutcome::Missing(status)) => {
                tracing::info!(index, status = %status, "non-success response, series ends here");
                break;
            }
            Err(e) => {
                // The baseline contract folds transport failures into
                // end-of-series rather than distinguishing them.
                tracing::info!(index, error = %e, "transport failure, series ends here");
                break;
            }
        }
    }

    let outcome = if retrieved_any {
        RetrievalOutcome::new(index - 1)
    } else {
        RetrievalOutcome::EMPTY
    };

    tracing::info!(last_index = outcome.get(), "retrieval finished");
    let _ = event_tx.send(Event::SeriesEnded {
        last_index: outcome.get(),
    });
    Ok(outcome)
}
