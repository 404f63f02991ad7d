pub mod sqlite;

use crate::app::Result;
use crate::domain::SharedItem;

pub use sqlite::SqliteStore;

/// Durable, cross-process shared queue plus the redirect preference.
///
/// The queue is written by the extension process and read or drained by the
/// host process; the only channel between the two is this store. `append`
/// is atomic (one insert per record), so a concurrent writer in the other
/// process can never drop an already-acknowledged record.
pub trait SharedStore {
    /// Append one record to the end of the queue.
    fn append(&self, item: &SharedItem) -> Result<()>;

    /// Snapshot of the whole queue in insertion order. An empty store is an
    /// empty sequence, not an error.
    fn read_all(&self) -> Result<Vec<SharedItem>>;

    /// Remove every queued record. Idempotent; the redirect preference is
    /// unaffected.
    fn clear(&self) -> Result<()>;

    /// Set the redirect-after-share preference. Last write wins.
    fn set_redirect_after_share(&self, enabled: bool) -> Result<()>;

    /// Read the redirect-after-share preference; `false` when never set.
    fn redirect_after_share(&self) -> Result<bool>;
}
