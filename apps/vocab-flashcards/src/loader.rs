//! Vocabulary dataset loading.
//!
//! The startup load runs on the tokio runtime and hands its result back
//! through a [`LoadHandle`]. Uploads are parsed synchronously.

use crate::error::{VocabError, VocabResult};
use crate::models::{Dataset, DatasetError, VocabItem};
use anyhow::Context;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// Parse raw text into a dataset. The top level must be a JSON array.
pub fn parse_dataset(text: &str) -> Result<Dataset, DatasetError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_array() {
        return Err(DatasetError::NotAnArray);
    }
    let items: Vec<VocabItem> = serde_json::from_value(value)?;
    Dataset::new(items)
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read and parse a dataset from a file path or URL.
pub async fn read_source(source: &str, timeout: Duration) -> VocabResult<Dataset> {
    let text = if is_remote(source) {
        fetch(source, timeout).await
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {source}"))
    }
    .map_err(|e| VocabError::DataLoadFailure(format!("{e:#}")))?;

    parse_dataset(&text).map_err(|e| VocabError::DataLoadFailure(e.to_string()))
}

async fn fetch(url: &str, timeout: Duration) -> anyhow::Result<String> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {} from {}", response.status(), url);
    }

    response.text().await.context("Failed to read response body")
}

/// Parse a locally chosen file. Any failure is an upload format error.
pub fn load_upload(path: &Path) -> VocabResult<Dataset> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| VocabError::InvalidUploadFormat(format!("cannot read {}: {e}", path.display())))?;
    parse_dataset(&text).map_err(|e| VocabError::InvalidUploadFormat(e.to_string()))
}

/// Outcome of polling an in-flight load.
#[derive(Debug)]
pub enum LoadPoll {
    Pending,
    Ready(VocabResult<Dataset>),
    /// The load was cancelled; its result must not be applied.
    Discarded,
}

/// Handle to a background dataset load.
pub struct LoadHandle {
    source: String,
    cancelled: Arc<AtomicBool>,
    receiver: oneshot::Receiver<VocabResult<Dataset>>,
}

impl LoadHandle {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Mark the load stale. A result arriving later is discarded.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!(source = %self.source, "dataset load cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Non-blocking check for a result.
    pub fn poll(&mut self) -> LoadPoll {
        match self.receiver.try_recv() {
            Err(TryRecvError::Empty) => LoadPoll::Pending,
            _ if self.is_cancelled() => LoadPoll::Discarded,
            Ok(result) => LoadPoll::Ready(result),
            Err(TryRecvError::Closed) => LoadPoll::Ready(Err(VocabError::DataLoadFailure(
                "loader stopped without a result".to_string(),
            ))),
        }
    }
}

/// Start loading `source` on the current tokio runtime.
pub fn spawn_load(source: impl Into<String>, timeout: Duration) -> LoadHandle {
    let source = source.into();
    let cancelled = Arc::new(AtomicBool::new(false));
    let (sender, receiver) = oneshot::channel();

    let task_source = source.clone();
    let task_cancelled = Arc::clone(&cancelled);
    tokio::spawn(async move {
        debug!(source = %task_source, "dataset load started");
        let result = read_source(&task_source, timeout).await;
        match &result {
            Ok(dataset) => info!(source = %task_source, words = dataset.len(), "dataset loaded"),
            Err(e) => warn!(source = %task_source, error = %e, "dataset load failed"),
        }
        if task_cancelled.load(Ordering::SeqCst) {
            debug!(source = %task_source, "dropping result of cancelled load");
            return;
        }
        let _ = sender.send(result);
    });

    LoadHandle {
        source,
        cancelled,
        receiver,
    }
}
