//! Local SQLite record store
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Writes run inside a transaction.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use shelf_common::{Record, RecordFields, WriteMode};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::RecordStore;
use crate::error::{StoreError, StoreResult};

/// Record store kept in a single SQLite table
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and initialise the schema
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                log::info!("Created directory: {}", parent.display());
            }
        }
        let conn = Connection::open(path)?;
        log::info!("Opened record database: {}", path.display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_sync(&self, collection: &str, key: &str) -> StoreResult<Option<Record>> {
        let conn = self.conn.lock()?;
        Ok(get_record(&conn, collection, key)?)
    }

    fn list_sync(&self, collection: &str) -> StoreResult<Vec<(String, Record)>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT key, quantity, image_url FROM records WHERE collection = ?1",
        )?;
        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    Record {
                        quantity: row.get(1)?,
                        image_url: row.get(2)?,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn put_sync(
        &self,
        collection: &str,
        key: &str,
        fields: RecordFields,
        mode: WriteMode,
    ) -> StoreResult<()> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction()?;
        put_record_tx(&tx, collection, key, fields, mode)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_sync(&self, collection: &str, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        let removed = conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND key = ?2",
            params![collection, key],
        )?;
        log::debug!("Deleted {} record(s) for {}/{}", removed, collection, key);
        Ok(())
    }
}

/// Creates the `records` table if it does not already exist
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS records (
            collection TEXT NOT NULL,
            key TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            image_url TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (collection, key)
        );
        ",
    )?;
    log::debug!("Record schema initialized");
    Ok(())
}

fn get_record(conn: &Connection, collection: &str, key: &str) -> rusqlite::Result<Option<Record>> {
    conn.query_row(
        "SELECT quantity, image_url FROM records WHERE collection = ?1 AND key = ?2",
        params![collection, key],
        |row| {
            Ok(Record {
                quantity: row.get(0)?,
                image_url: row.get(1)?,
            })
        },
    )
    .optional()
}

fn put_record_tx(
    tx: &Transaction<'_>,
    collection: &str,
    key: &str,
    fields: RecordFields,
    mode: WriteMode,
) -> StoreResult<()> {
    let existing = get_record(tx, collection, key)?;

    let record = match (existing, mode) {
        (Some(mut record), WriteMode::Merge) => {
            record.apply(&fields, mode);
            record
        }
        _ => fields
            .into_record()
            .ok_or_else(|| StoreError::IncompleteWrite(key.to_string()))?,
    };

    tx.execute(
        "INSERT INTO records (collection, key, quantity, image_url, updated_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(collection, key) DO UPDATE SET
             quantity = excluded.quantity,
             image_url = excluded.image_url,
             updated_at = excluded.updated_at",
        params![collection, key, record.quantity, record.image_url],
    )?;
    Ok(())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Record>> {
        self.get_sync(collection, key)
    }

    async fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Record)>> {
        self.list_sync(collection)
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: RecordFields,
        mode: WriteMode,
    ) -> StoreResult<()> {
        self.put_sync(collection, key, fields, mode)
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        self.delete_sync(collection, key)
    }
}
