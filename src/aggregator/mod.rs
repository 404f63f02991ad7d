//! Payload aggregation: fan-out provider loads, fan-in over a result
//! channel, precedence merge on a single coordinating task.

pub mod providers;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::app::Result;
use crate::domain::ExtractionResult;
use crate::extract;

/// Content types a provider can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Url,
    PlainText,
}

/// One resolved provider load.
#[derive(Debug, Clone)]
pub enum ProviderPayload {
    Url(String),
    Text(String),
}

/// A source capable of supplying one or more typed payloads from a share
/// action.
#[async_trait]
pub trait PayloadProvider: Send + Sync {
    /// Content types this provider declares.
    fn kinds(&self) -> Vec<PayloadKind>;

    /// Load the payload for one declared kind. A failed load never aborts
    /// sibling loads; it only counts toward the completion barrier.
    async fn load(&self, kind: PayloadKind) -> Result<ProviderPayload>;
}

/// One share-sheet input item: an optional pre-rendered caption plus zero
/// or more typed providers.
pub struct ShareInput {
    pub caption: Option<String>,
    pub providers: Vec<Arc<dyn PayloadProvider>>,
}

impl ShareInput {
    pub fn new(caption: Option<String>, providers: Vec<Arc<dyn PayloadProvider>>) -> Self {
        Self { caption, providers }
    }
}

// Title candidate ranks; a higher rank strictly wins. The host derived
// from a direct URL is only a placeholder, so any real text displaces it
// regardless of arrival order.
const RANK_CAPTION: u8 = 3;
const RANK_PLAIN_TEXT: u8 = 2;
const RANK_HOST_PLACEHOLDER: u8 = 1;

#[derive(Default)]
struct Merge {
    url: Option<String>,
    title: Option<String>,
    title_rank: u8,
}

impl Merge {
    fn set_title(&mut self, rank: u8, candidate: &str) {
        if candidate.is_empty() {
            return;
        }
        if self.title.is_none() || rank > self.title_rank {
            self.title = Some(candidate.to_string());
            self.title_rank = rank;
        }
    }

    fn apply(&mut self, payload: ProviderPayload) {
        match payload {
            ProviderPayload::Url(raw) => {
                // A direct URL provider result always wins, even over a
                // text-derived URL that resolved first.
                if let Ok(parsed) = url::Url::parse(&raw) {
                    if let Some(host) = parsed.host_str() {
                        self.set_title(RANK_HOST_PLACEHOLDER, host);
                    }
                } else {
                    tracing::debug!("URL provider returned unparseable URL: {}", raw);
                    return;
                }
                self.url = Some(raw);
            }
            ProviderPayload::Text(text) => {
                if self.url.is_none() {
                    if let Some(extracted) = extract::extract_url(Some(&text)) {
                        self.url = Some(extracted);
                    }
                }
                self.set_title(RANK_PLAIN_TEXT, &text);
            }
        }
    }

    fn into_result(self) -> ExtractionResult {
        ExtractionResult {
            url: self.url,
            title: self.title,
        }
    }
}

/// Turns a set of share-sheet input items into one [`ExtractionResult`].
#[derive(Clone, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate all inputs. Returns exactly once, after every issued
    /// provider load has resolved (success or failure); callers never see
    /// a partial result. Zero usable providers completes immediately.
    pub async fn aggregate(&self, inputs: Vec<ShareInput>) -> ExtractionResult {
        let mut merge = Merge::default();
        let (tx, mut rx) = mpsc::channel::<Result<ProviderPayload>>(16);
        let mut expected = 0usize;

        for input in inputs {
            // A caption needs no async load; it is a title candidate
            // immediately.
            if let Some(caption) = input.caption.as_deref() {
                merge.set_title(RANK_CAPTION, caption);
            }

            for provider in input.providers {
                for kind in provider.kinds() {
                    expected += 1;
                    let provider = provider.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = provider.load(kind).await;
                        let _ = tx.send(result).await;
                    });
                }
            }
        }
        drop(tx);

        // Counted join barrier: each spawned load reports exactly once.
        // All merging happens here, on this task, so resolutions cannot
        // interleave. A panicked load drops its sender, which also
        // releases the barrier.
        let mut resolved = 0usize;
        while resolved < expected {
            let Some(outcome) = rx.recv().await else {
                break;
            };
            match outcome {
                Ok(payload) => merge.apply(payload),
                Err(e) => tracing::debug!("Provider load failed: {}", e),
            }
            resolved += 1;
        }

        merge.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::providers::{StaticTextProvider, StaticUrlProvider};
    use super::*;
    use crate::app::LinkdropError;
    use std::time::Duration;
    use tokio::time::Instant;

    struct DelayedProvider {
        kind: PayloadKind,
        delay: Duration,
        payload: Option<ProviderPayload>,
    }

    impl DelayedProvider {
        fn url(url: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                kind: PayloadKind::Url,
                delay,
                payload: Some(ProviderPayload::Url(url.into())),
            })
        }

        fn text(text: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                kind: PayloadKind::PlainText,
                delay,
                payload: Some(ProviderPayload::Text(text.into())),
            })
        }

        fn failing(kind: PayloadKind, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                kind,
                delay,
                payload: None,
            })
        }
    }

    #[async_trait]
    impl PayloadProvider for DelayedProvider {
        fn kinds(&self) -> Vec<PayloadKind> {
            vec![self.kind]
        }

        async fn load(&self, _kind: PayloadKind) -> Result<ProviderPayload> {
            tokio::time::sleep(self.delay).await;
            self.payload
                .clone()
                .ok_or_else(|| LinkdropError::Other("load failed".into()))
        }
    }

    fn input_of(providers: Vec<Arc<dyn PayloadProvider>>) -> ShareInput {
        ShareInput::new(None, providers)
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_url_beats_text_derived_both_orderings() {
        // Text resolves first
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::url("https://a.example", Duration::from_millis(50)),
                DelayedProvider::text("see https://b.example", Duration::from_millis(10)),
            ])])
            .await;
        assert_eq!(result.url, Some("https://a.example".into()));

        // Direct URL resolves first
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::url("https://a.example", Duration::from_millis(10)),
                DelayedProvider::text("see https://b.example", Duration::from_millis(50)),
            ])])
            .await;
        assert_eq!(result.url, Some("https://a.example".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_waits_for_slowest_load() {
        let start = Instant::now();
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::text("first", Duration::from_millis(10)),
                DelayedProvider::text("second", Duration::from_millis(30)),
                DelayedProvider::url("https://example.com", Duration::from_millis(80)),
            ])])
            .await;

        assert!(start.elapsed() >= Duration::from_millis(80));
        assert_eq!(result.url, Some("https://example.com".into()));
    }

    #[tokio::test]
    async fn test_zero_providers_completes_immediately() {
        let result = Aggregator::new()
            .aggregate(vec![ShareInput::new(Some("caption".into()), vec![])])
            .await;
        assert_eq!(result.title, Some("caption".into()));
        assert_eq!(result.url, None);

        let result = Aggregator::new().aggregate(vec![]).await;
        assert!(result.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_releases_barrier() {
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::failing(PayloadKind::Url, Duration::from_millis(20)),
                DelayedProvider::text("plain text only", Duration::from_millis(5)),
            ])])
            .await;

        assert_eq!(result.url, None);
        assert_eq!(result.title, Some("plain text only".into()));
    }

    #[tokio::test]
    async fn test_caption_outranks_host_and_text() {
        let result = Aggregator::new()
            .aggregate(vec![ShareInput::new(
                Some("the caption".into()),
                vec![
                    Arc::new(StaticUrlProvider::new("https://example.com/post")),
                    Arc::new(StaticTextProvider::new("full shared text")),
                ],
            )])
            .await;

        assert_eq!(result.title, Some("the caption".into()));
        assert_eq!(result.url, Some("https://example.com/post".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_text_title_displaces_host_placeholder() {
        // Host placeholder arrives first; the later text replaces it.
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::url("https://example.com/post", Duration::from_millis(5)),
                DelayedProvider::text("full shared text", Duration::from_millis(20)),
            ])])
            .await;
        assert_eq!(result.title, Some("full shared text".into()));
        assert_eq!(result.url, Some("https://example.com/post".into()));

        // Text arrives first; the later placeholder never overwrites it.
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::text("full shared text", Duration::from_millis(5)),
                DelayedProvider::url("https://example.com/post", Duration::from_millis(20)),
            ])])
            .await;
        assert_eq!(result.title, Some("full shared text".into()));
    }

    #[tokio::test]
    async fn test_host_placeholder_used_when_no_text_arrives() {
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![Arc::new(StaticUrlProvider::new(
                "https://example.com/post",
            ))])])
            .await;
        assert_eq!(result.title, Some("example.com".into()));
    }

    #[tokio::test]
    async fn test_text_derived_url_used_when_no_direct_provider() {
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![Arc::new(StaticTextProvider::new(
                "read this https://b.example/story now",
            ))])])
            .await;

        assert_eq!(result.url, Some("https://b.example/story".into()));
        assert_eq!(result.title, Some("read this https://b.example/story now".into()));
    }

    #[tokio::test]
    async fn test_unparseable_direct_url_is_ignored() {
        let result = Aggregator::new()
            .aggregate(vec![input_of(vec![
                DelayedProvider::url("not a url", Duration::from_millis(1)),
                Arc::new(StaticTextProvider::new("fallback https://c.example")),
            ])])
            .await;

        assert_eq!(result.url, Some("https://c.example".into()));
    }
}
