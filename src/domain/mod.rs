pub mod item;

pub use item::{ExtractionResult, SharedItem, SharedMediaType, URL_KIND_CODE};
