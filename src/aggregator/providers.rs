use async_trait::async_trait;

use crate::aggregator::{PayloadKind, PayloadProvider, ProviderPayload};
use crate::app::{LinkdropError, Result};

/// Provider backed by an already-known URL. Loads resolve immediately.
pub struct StaticUrlProvider {
    url: String,
}

impl StaticUrlProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl PayloadProvider for StaticUrlProvider {
    fn kinds(&self) -> Vec<PayloadKind> {
        vec![PayloadKind::Url]
    }

    async fn load(&self, kind: PayloadKind) -> Result<ProviderPayload> {
        match kind {
            PayloadKind::Url => Ok(ProviderPayload::Url(self.url.clone())),
            PayloadKind::PlainText => {
                Err(LinkdropError::Other("kind not declared: PlainText".into()))
            }
        }
    }
}

/// Provider backed by an already-known text snippet.
pub struct StaticTextProvider {
    text: String,
}

impl StaticTextProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl PayloadProvider for StaticTextProvider {
    fn kinds(&self) -> Vec<PayloadKind> {
        vec![PayloadKind::PlainText]
    }

    async fn load(&self, kind: PayloadKind) -> Result<ProviderPayload> {
        match kind {
            PayloadKind::PlainText => Ok(ProviderPayload::Text(self.text.clone())),
            PayloadKind::Url => Err(LinkdropError::Other("kind not declared: Url".into())),
        }
    }
}
