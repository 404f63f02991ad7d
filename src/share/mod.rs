//! Extension-side save flow.
//!
//! Runs inside the short-lived share process: once the user confirms, any
//! in-flight thumbnail work is cancelled (it is cosmetic and never
//! persisted), the record is appended to the shared store, and the
//! redirect preference is read to decide whether the host app should be
//! opened. The process may be terminated right after, so nothing async is
//! left running past this point.

use std::sync::Arc;

use crate::domain::{ExtractionResult, SharedItem};
use crate::store::SharedStore;
use crate::thumbnail::CancelHandle;

/// Terminal result of a confirmed share.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The appended record, or `None` when there was nothing to save (no
    /// usable URL) or the store refused the write.
    pub saved: Option<SharedItem>,
    /// Whether the host app should be opened after handing control back.
    pub redirect: bool,
}

pub struct ShareFlow<S> {
    store: Arc<S>,
}

impl<S: SharedStore> ShareFlow<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Confirm the share. Title preference: non-empty user edit, then the
    /// aggregated title, then empty. Without a parseable URL no record is
    /// created and the flow ends quietly; a failing store degrades to a
    /// logged no-op.
    pub fn confirm(
        &self,
        result: &ExtractionResult,
        edited_title: Option<&str>,
        thumbnail: Option<CancelHandle>,
    ) -> SaveOutcome {
        // Stop the cosmetic work first; it must never outlive the request.
        if let Some(handle) = thumbnail {
            handle.cancel();
        }

        let Some(url) = result.url.as_deref() else {
            tracing::debug!("Nothing to save: no URL extracted");
            return SaveOutcome {
                saved: None,
                redirect: false,
            };
        };

        let title = edited_title
            .filter(|t| !t.is_empty())
            .or(result.title.as_deref())
            .unwrap_or("");

        let item = match SharedItem::url(url, title) {
            Ok(item) => item,
            Err(e) => {
                tracing::debug!("Nothing to save: {}", e);
                return SaveOutcome {
                    saved: None,
                    redirect: false,
                };
            }
        };

        // A record the store never accepted is not acknowledged as saved.
        let saved = match self.store.append(&item) {
            Ok(()) => {
                tracing::info!("Saved shared item for {}", item.path);
                Some(item)
            }
            Err(e) => {
                tracing::warn!("Shared store append failed: {}", e);
                None
            }
        };

        // Read at save-time only; host-owned, last write wins.
        let redirect = self.store.redirect_after_share().unwrap_or_else(|e| {
            tracing::warn!("Failed to read redirect preference: {}", e);
            false
        });

        SaveOutcome { saved, redirect }
    }

    /// User dismissed the share: cancel the thumbnail chain, save nothing.
    pub fn dismiss(&self, thumbnail: Option<CancelHandle>) {
        if let Some(handle) = thumbnail {
            handle.cancel();
        }
    }
}
