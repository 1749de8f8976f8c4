//! Page sources the controller fetches from

use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::pagination::{paginate, Page};

/// Contract for fetching one page of an ordered dataset.
///
/// A network-backed implementation keeps the same signature; the controller
/// never looks past it.
#[async_trait]
pub trait PageSource<T>: Send + Sync + 'static {
    async fn fetch_page(&self, page: usize, page_size: NonZeroUsize) -> Result<Page<T>, SourceError>;
}

/// In-memory dataset with optional artificial latency
#[derive(Clone, Debug)]
pub struct StaticSource<T> {
    data: Vec<T>,
    latency: Duration,
}

impl<T: Clone + Send + Sync + 'static> StaticSource<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            latency: Duration::ZERO,
        }
    }

    /// Delay every fetch by `latency` to simulate a slow backend
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: DeserializeOwned + Clone + Send + Sync + 'static> StaticSource<T> {
    /// Load a dataset from a JSON array
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let data: Vec<T> =
            serde_json::from_str(json).map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(Self::new(data))
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PageSource<T> for StaticSource<T> {
    async fn fetch_page(&self, page: usize, page_size: NonZeroUsize) -> Result<Page<T>, SourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let page = paginate(&self.data, page, page_size);
        tracing::trace!(
            "StaticSource: page {} -> {} items (next={:?})",
            page.meta.current_page,
            page.items.len(),
            page.meta.next_page
        );
        Ok(page)
    }
}
