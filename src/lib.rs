//! # linkdrop
//!
//! A share-handoff pipeline: content shared from any application is
//! extracted, saved into a durable cross-process queue by a short-lived
//! helper process, and later pulled or pushed into the host application.
//!
//! ## Architecture
//!
//! ```text
//! providers → Aggregator → {url, title} → ShareFlow → SharedStore
//!                              ↓                          ↓
//!                      ThumbnailResolver             HostBridge → host app
//!                      (cosmetic, cancelled
//!                       at confirm)
//! ```
//!
//! The extension side (aggregation, thumbnail, save) and the host side
//! (pull/push bridge) share nothing but the durable store; push delivery
//! is always a fresh snapshot pull at a lifecycle trigger, never a
//! guaranteed notification.

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together store, bridge,
/// aggregator, resolver and save flow.
pub mod app;

/// Payload aggregation.
///
/// - [`PayloadProvider`](aggregator::PayloadProvider): typed content source
/// - [`Aggregator`](aggregator::Aggregator): concurrent fan-out over
///   provider loads with a counted join barrier and precedence merging
pub mod aggregator;

/// Host-side bridge over the shared queue.
///
/// Pull ([`get_initial_media`](bridge::HostBridge::get_initial_media)),
/// push (single-subscriber snapshot stream fed at
/// [`Trigger`](bridge::Trigger)s), clear and preference operations, plus a
/// method-call dispatch surface.
pub mod bridge;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/linkdrop/config.toml`.
pub mod config;

/// Core domain models: [`SharedItem`](domain::SharedItem) and the
/// transient [`ExtractionResult`](domain::ExtractionResult).
pub mod domain;

/// URL extraction from free-form text.
pub mod extract;

/// Page metadata fetching (one GET, Open Graph sniffing).
pub mod metadata;

/// Extension-side save flow: confirm, dismiss, redirect decision.
pub mod share;

/// Durable cross-process persistence.
///
/// - [`SharedStore`](store::SharedStore): storage contract
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation with an
///   atomic per-record append
pub mod store;

/// Thumbnail resolution: metadata image → icon → favicon fallback chain
/// with cancellation.
pub mod thumbnail;
