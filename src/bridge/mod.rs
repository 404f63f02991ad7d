//! Host-side bridge over the shared queue store.
//!
//! Unifies pull access (one-shot snapshot reads) and push access (a single
//! live subscriber fed at lifecycle triggers). Push is never a guaranteed
//! notification: every trigger is a fresh pull of the full snapshot, so a
//! host that was not running when a record was appended still sees it on
//! its next trigger.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::app::{LinkdropError, Result};
use crate::domain::SharedItem;
use crate::store::SharedStore;

/// Host lifecycle events that cause a fresh read of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    SubscriptionStart,
    Foreground,
    UrlActivation,
}

/// Method-call style request, mirroring the host platform channel.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

pub struct HostBridge<S> {
    store: Arc<S>,
    subscriber: Mutex<Option<mpsc::UnboundedSender<Vec<SharedItem>>>>,
}

impl<S: SharedStore> HostBridge<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            subscriber: Mutex::new(None),
        }
    }

    /// Non-destructive snapshot of the queue. A misconfigured store reads
    /// as empty; there is no recovery path at this layer.
    pub fn get_initial_media(&self) -> Vec<SharedItem> {
        match self.store.read_all() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Shared store read failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Clear every queued record.
    pub fn reset(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Shared store clear failed: {}", e);
        }
    }

    pub fn set_redirect_after_share(&self, enabled: bool) {
        if let Err(e) = self.store.set_redirect_after_share(enabled) {
            tracing::warn!("Failed to set redirect preference: {}", e);
        }
    }

    /// Install the single subscriber and immediately emit the current
    /// snapshot if non-empty. A second subscription silently replaces the
    /// first's delivery target.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<SharedItem>> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut slot = self.subscriber.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(tx);
        }
        self.notify(Trigger::SubscriptionStart);
        rx
    }

    /// Release the subscriber slot.
    pub fn unsubscribe(&self) {
        let mut slot = self.subscriber.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Re-read the store for a lifecycle trigger and push the full current
    /// snapshot (never a diff) to the subscriber, if any. Empty snapshots
    /// are not delivered.
    pub fn notify(&self, trigger: Trigger) {
        let items = self.get_initial_media();
        if items.is_empty() {
            return;
        }

        let mut slot = self.subscriber.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = slot.as_ref() {
            tracing::debug!("Delivering {} items on {:?}", items.len(), trigger);
            if tx.send(items).is_err() {
                // Receiver gone; free the slot for the next subscriber.
                *slot = None;
            }
        }
    }

    /// Request/response surface matching the host platform channel.
    pub fn dispatch(&self, call: &MethodCall) -> Result<Value> {
        match call.method.as_str() {
            "getInitialMedia" => {
                let items = self.get_initial_media();
                serde_json::to_value(items)
                    .map_err(|e| LinkdropError::Other(format!("serialize failed: {}", e)))
            }
            "reset" => {
                self.reset();
                Ok(Value::Null)
            }
            "setRedirectAfterShare" => match call.arguments.as_bool() {
                Some(enabled) => {
                    self.set_redirect_after_share(enabled);
                    Ok(Value::Null)
                }
                None => Err(LinkdropError::InvalidArgument(
                    "Boolean argument expected".into(),
                )),
            },
            other => Err(LinkdropError::MethodNotImplemented(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use serde_json::json;

    fn bridge_with_items(n: usize) -> HostBridge<SqliteStore> {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        for i in 0..n {
            store
                .append(&SharedItem::url(format!("https://example.com/{}", i), "").unwrap())
                .unwrap();
        }
        HostBridge::new(store)
    }

    /// A store whose backing database is gone; every call errors.
    struct BrokenStore;

    impl SharedStore for BrokenStore {
        fn append(&self, _item: &SharedItem) -> Result<()> {
            Err(LinkdropError::Database(rusqlite::Error::InvalidQuery))
        }

        fn read_all(&self) -> Result<Vec<SharedItem>> {
            Err(LinkdropError::Database(rusqlite::Error::InvalidQuery))
        }

        fn clear(&self) -> Result<()> {
            Err(LinkdropError::Database(rusqlite::Error::InvalidQuery))
        }

        fn set_redirect_after_share(&self, _enabled: bool) -> Result<()> {
            Err(LinkdropError::Database(rusqlite::Error::InvalidQuery))
        }

        fn redirect_after_share(&self) -> Result<bool> {
            Err(LinkdropError::Database(rusqlite::Error::InvalidQuery))
        }
    }

    #[tokio::test]
    async fn test_failing_store_reads_as_empty() {
        let bridge = HostBridge::new(Arc::new(BrokenStore));

        assert!(bridge.get_initial_media().is_empty());

        let value = bridge
            .dispatch(&MethodCall::new("getInitialMedia", Value::Null))
            .unwrap();
        assert_eq!(value, json!([]));

        // A subscriber over a broken store gets no delivery, not an error.
        let mut rx = bridge.subscribe();
        bridge.notify(Trigger::Foreground);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_get_initial_media_does_not_drain() {
        let bridge = bridge_with_items(2);
        assert_eq!(bridge.get_initial_media().len(), 2);
        assert_eq!(bridge.get_initial_media().len(), 2);
    }

    #[test]
    fn test_reset_clears_queue() {
        let bridge = bridge_with_items(3);
        bridge.reset();
        assert!(bridge.get_initial_media().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_emits_existing_items_once() {
        let bridge = bridge_with_items(2);
        let mut rx = bridge.subscribe();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 2);

        // No duplicate delivery until a trigger occurs
        assert!(rx.try_recv().is_err());

        bridge.notify(Trigger::Foreground);
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_with_empty_store_emits_nothing() {
        let bridge = bridge_with_items(0);
        let mut rx = bridge.subscribe();
        assert!(rx.try_recv().is_err());

        bridge.notify(Trigger::UrlActivation);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_second_subscription_replaces_first() {
        let bridge = bridge_with_items(1);
        let mut first = bridge.subscribe();
        let _ = first.recv().await.unwrap();

        let mut second = bridge.subscribe();
        let _ = second.recv().await.unwrap();

        bridge.notify(Trigger::Foreground);
        assert!(second.recv().await.is_some());
        assert!(first.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_receiver_frees_slot() {
        let bridge = bridge_with_items(1);
        drop(bridge.subscribe());

        // Send fails, slot is cleared, a fresh subscription works
        bridge.notify(Trigger::Foreground);
        let mut rx = bridge.subscribe();
        assert_eq!(rx.recv().await.unwrap().len(), 1);
    }

    #[test]
    fn test_dispatch_get_initial_media_wire_shape() {
        let bridge = bridge_with_items(1);
        let value = bridge
            .dispatch(&MethodCall::new("getInitialMedia", Value::Null))
            .unwrap();

        assert_eq!(
            value,
            json!([{"path": "https://example.com/0", "message": "", "type": 5}])
        );
    }

    #[test]
    fn test_dispatch_reset_and_redirect() {
        let bridge = bridge_with_items(2);

        bridge
            .dispatch(&MethodCall::new("setRedirectAfterShare", json!(true)))
            .unwrap();
        assert!(bridge.store.redirect_after_share().unwrap());

        bridge.dispatch(&MethodCall::new("reset", Value::Null)).unwrap();
        assert!(bridge.get_initial_media().is_empty());
        // The flag is independent of queue clears
        assert!(bridge.store.redirect_after_share().unwrap());
    }

    #[test]
    fn test_dispatch_rejects_non_boolean_argument() {
        let bridge = bridge_with_items(0);
        let err = bridge
            .dispatch(&MethodCall::new("setRedirectAfterShare", json!("yes")))
            .unwrap_err();
        assert!(matches!(err, LinkdropError::InvalidArgument(_)));

        // The store is untouched
        assert!(!bridge.store.redirect_after_share().unwrap());
    }

    #[test]
    fn test_dispatch_unknown_method() {
        let bridge = bridge_with_items(0);
        let err = bridge
            .dispatch(&MethodCall::new("blast", Value::Null))
            .unwrap_err();
        assert!(matches!(err, LinkdropError::MethodNotImplemented(_)));
    }
}
