use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{LinkdropError, Result};
use crate::domain::{SharedItem, SharedMediaType};
use crate::store::SharedStore;

const REDIRECT_KEY: &str = "RedirectAfterShare";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| LinkdropError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            LinkdropError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

impl SharedStore for SqliteStore {
    fn append(&self, item: &SharedItem) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO shared_items (path, message, kind, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                item.path,
                item.message,
                item.kind.code(),
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(())
    }

    fn read_all(&self) -> Result<Vec<SharedItem>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT path, message, kind FROM shared_items ORDER BY id ASC")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Unknown kind codes are rejected here exactly as the wire
        // deserializer rejects them.
        let mut items = Vec::with_capacity(rows.len());
        for (path, message, code) in rows {
            let kind = SharedMediaType::from_code(code)
                .ok_or_else(|| LinkdropError::Other(format!("unknown media kind code {}", code)))?;
            items.push(SharedItem {
                path,
                message,
                kind,
            });
        }

        Ok(items)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM shared_items", [])?;
        Ok(())
    }

    fn set_redirect_after_share(&self, enabled: bool) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO prefs (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![REDIRECT_KEY, enabled as i64],
        )?;

        Ok(())
    }

    fn redirect_after_share(&self) -> Result<bool> {
        let conn = self.lock()?;

        let value: Option<i64> = conn
            .query_row(
                "SELECT value FROM prefs WHERE key = ?1",
                params![REDIRECT_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.is_some_and(|v| v != 0))
    }
}
