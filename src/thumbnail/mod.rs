//! Best-effort thumbnail resolution.
//!
//! A three-stage fallback chain: page metadata image, then the page's icon
//! reference, then a favicon-by-domain service. Every stage runs at most
//! one request, bounded by a timeout, and the whole chain can be cancelled
//! at any point. Failure here never blocks saving a record; the thumbnail
//! is display-only and is never persisted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::app::{LinkdropError, Result};
use crate::config::Config;
use crate::metadata::MetadataFetcher;

/// States of one resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Idle,
    FetchingMetadata,
    TryIcon,
    TryFavicon,
    HaveImage,
    NoImage,
    /// Terminal no-op: the caller dismissed or confirmed before the chain
    /// finished. Not an error.
    Cancelled,
}

/// Terminal result of a resolution request.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub image: Option<Vec<u8>>,
    pub state: ResolveState,
    /// Page title seen while fetching metadata; offered to the UI layer as
    /// a backfill for an empty title, never used by aggregation.
    pub page_title: Option<String>,
}

impl ResolveOutcome {
    fn terminal(state: ResolveState, image: Option<Vec<u8>>, page_title: Option<String>) -> Self {
        Self {
            image,
            state,
            page_title,
        }
    }
}

/// Cancellation side of a resolution request.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiver side threaded through every stage.
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. If the handle is dropped
    /// without cancelling, this never resolves.
    async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch raw image bytes with a single GET.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.stage_timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(LinkdropError::Metadata(format!("empty image response: {}", url)));
        }

        Ok(bytes)
    }
}

enum StageOutcome<T> {
    Done(Result<T>),
    TimedOut,
    Cancelled,
}

pub struct ThumbnailResolver<M, I> {
    metadata: Arc<M>,
    images: Arc<I>,
    favicon_endpoint: String,
    stage_timeout: Duration,
}

impl<M: MetadataFetcher, I: ImageFetcher> ThumbnailResolver<M, I> {
    pub fn new(metadata: Arc<M>, images: Arc<I>, config: &Config) -> Self {
        Self {
            metadata,
            images,
            favicon_endpoint: config.favicon_endpoint.clone(),
            stage_timeout: config.stage_timeout(),
        }
    }

    /// Run the fallback chain for `url` until an image is found, the chain
    /// is exhausted, or `cancel` fires. Stages never run concurrently with
    /// each other; once cancelled, the in-flight stage's response is
    /// dropped and nothing downstream runs.
    pub async fn resolve(&self, url: &str, mut cancel: CancelSignal) -> ResolveOutcome {
        let mut page_title = None;

        // FetchingMetadata
        let meta = match self.stage(&mut cancel, self.metadata.fetch(url)).await {
            StageOutcome::Cancelled => {
                return ResolveOutcome::terminal(ResolveState::Cancelled, None, page_title)
            }
            StageOutcome::Done(Ok(meta)) => {
                page_title = meta.title.clone();
                Some(meta)
            }
            StageOutcome::Done(Err(e)) => {
                tracing::debug!("Metadata fetch failed for {}: {}", url, e);
                None
            }
            StageOutcome::TimedOut => {
                tracing::debug!("Metadata fetch timed out for {}", url);
                None
            }
        };

        if let Some(meta) = &meta {
            if let Some(image_url) = &meta.image_url {
                match self.stage(&mut cancel, self.images.fetch_image(image_url)).await {
                    StageOutcome::Cancelled => {
                        return ResolveOutcome::terminal(ResolveState::Cancelled, None, page_title)
                    }
                    StageOutcome::Done(Ok(bytes)) => {
                        return ResolveOutcome::terminal(
                            ResolveState::HaveImage,
                            Some(bytes),
                            page_title,
                        )
                    }
                    // Image failed to materialize; fall through to the icon
                    StageOutcome::Done(Err(_)) | StageOutcome::TimedOut => {}
                }
            }

            // TryIcon
            if let Some(icon_url) = &meta.icon_url {
                match self.stage(&mut cancel, self.images.fetch_image(icon_url)).await {
                    StageOutcome::Cancelled => {
                        return ResolveOutcome::terminal(ResolveState::Cancelled, None, page_title)
                    }
                    StageOutcome::Done(Ok(bytes)) => {
                        return ResolveOutcome::terminal(
                            ResolveState::HaveImage,
                            Some(bytes),
                            page_title,
                        )
                    }
                    StageOutcome::Done(Err(_)) | StageOutcome::TimedOut => {}
                }
            }
        }

        // TryFavicon
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        let Some(host) = host else {
            return ResolveOutcome::terminal(ResolveState::NoImage, None, page_title);
        };

        let favicon_url = format!("{}{}", self.favicon_endpoint, host);
        match self.stage(&mut cancel, self.images.fetch_image(&favicon_url)).await {
            StageOutcome::Cancelled => {
                ResolveOutcome::terminal(ResolveState::Cancelled, None, page_title)
            }
            StageOutcome::Done(Ok(bytes)) => {
                ResolveOutcome::terminal(ResolveState::HaveImage, Some(bytes), page_title)
            }
            StageOutcome::Done(Err(e)) => {
                tracing::debug!("Favicon fetch failed for {}: {}", host, e);
                ResolveOutcome::terminal(ResolveState::NoImage, None, page_title)
            }
            StageOutcome::TimedOut => {
                ResolveOutcome::terminal(ResolveState::NoImage, None, page_title)
            }
        }
    }

    async fn stage<T>(
        &self,
        cancel: &mut CancelSignal,
        fut: impl Future<Output = Result<T>>,
    ) -> StageOutcome<T> {
        tokio::select! {
            // Cancellation is checked first so an already-cancelled request
            // never issues its stage's request.
            biased;
            _ = cancel.cancelled() => StageOutcome::Cancelled,
            res = timeout(self.stage_timeout, fut) => match res {
                Ok(inner) => StageOutcome::Done(inner),
                Err(_) => StageOutcome::TimedOut,
            },
        }
    }
}
