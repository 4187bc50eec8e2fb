// SQLite store implementation
use crate::application::rate_store::{RateStore, StoreError, StoreResult};
use crate::domain::pair::Pair;
use crate::domain::rate::{format_timestamp, Observation, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const SCHEMA_SQL: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS "Pairs" (
    "pair_id"     INTEGER,
    "name"        TEXT UNIQUE,
    "description" TEXT,
    PRIMARY KEY("pair_id")
);

CREATE TABLE IF NOT EXISTS "Values" (
    "timestamp" DATETIME NOT NULL,
    "value"     REAL NOT NULL,
    "pair_id"   INTEGER,
    FOREIGN KEY("pair_id") REFERENCES "Pairs"("pair_id")
        ON DELETE CASCADE ON UPDATE NO ACTION,
    UNIQUE("pair_id", "timestamp")
);
"#;

/// One connection per process, serialised behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        tracing::info!("Opening rate database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half-applied; SQLite rolls back.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pair_id(conn: &Connection, name: &str) -> StoreResult<Option<i64>> {
        Ok(conn
            .query_row(
                r#"SELECT pair_id FROM "Pairs" WHERE name = ?1"#,
                params![name],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn require_pair_id(conn: &Connection, name: &str) -> StoreResult<i64> {
        Self::pair_id(conn, name)
            .inspect_err(|e| tracing::error!("Error resolving pair {}: {}", name, e))?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn select_pairs(conn: &Connection) -> rusqlite::Result<Vec<Pair>> {
        let mut stmt =
            conn.prepare_cached(r#"SELECT pair_id, name, description FROM "Pairs" ORDER BY pair_id"#)?;
        let rows = stmt.query_map([], |row| {
            Ok(Pair::new(
                row.get(0)?,
                row.get(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ))
        })?;
        rows.collect()
    }

    fn select_range(
        conn: &Connection,
        pair_id: i64,
        begin: &NaiveDateTime,
        end: &NaiveDateTime,
    ) -> rusqlite::Result<Vec<Observation>> {
        let mut stmt = conn.prepare_cached(
            r#"SELECT timestamp, value FROM "Values"
               WHERE pair_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3
               ORDER BY timestamp ASC"#,
        )?;
        let rows = stmt.query_map(
            params![pair_id, format_timestamp(begin), format_timestamp(end)],
            |row| {
                let raw: String = row.get(0)?;
                let timestamp = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
                Ok(Observation::new(timestamp, row.get(1)?))
            },
        )?;
        rows.collect()
    }

    fn insert_pair(conn: &Connection, name: &str, description: &str) -> StoreResult<i64> {
        match conn.execute(
            r#"INSERT INTO "Pairs" (name, description) VALUES (?1, ?2)"#,
            params![name, description],
        ) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict(format!("pair {} already exists", name)))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn insert_values(tx: &Transaction<'_>, pair_id: i64, series: &[Observation]) -> StoreResult<usize> {
        let mut stmt = tx.prepare_cached(
            r#"INSERT INTO "Values" (timestamp, value, pair_id) VALUES (?1, ?2, ?3)"#,
        )?;

        for observation in series {
            let timestamp = format_timestamp(&observation.timestamp);
            match stmt.execute(params![timestamp, observation.value, pair_id]) {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    return Err(StoreError::Conflict(format!(
                        "duplicate value at {} for pair_id {}",
                        timestamp, pair_id
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(series.len())
    }
}

impl RateStore for SqliteStore {
    fn add_pair(&self, name: &str, description: &str) -> StoreResult<i64> {
        let conn = self.conn();
        let id = Self::insert_pair(&conn, name, description)
            .inspect_err(|e| tracing::warn!("Error adding pair {}: {}", name, e))?;
        tracing::info!("Added pair {} (id {})", name, id);
        Ok(id)
    }

    fn get_pairs(&self) -> StoreResult<Vec<Pair>> {
        let conn = self.conn();
        Ok(Self::select_pairs(&conn).inspect_err(|e| tracing::error!("Error listing pairs: {}", e))?)
    }

    fn update_pair(&self, name: &str, description: &str) -> StoreResult<()> {
        let conn = self.conn();
        let changed = conn
            .execute(
                r#"UPDATE "Pairs" SET description = ?1 WHERE name = ?2"#,
                params![description, name],
            )
            .inspect_err(|e| tracing::error!("Error updating pair {}: {}", name, e))?;

        if changed == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        tracing::info!("Updated description of pair {}", name);
        Ok(())
    }

    fn delete_pair(&self, name: &str) -> StoreResult<()> {
        let conn = self.conn();
        let deleted = conn
            .execute(r#"DELETE FROM "Pairs" WHERE name = ?1"#, params![name])
            .inspect_err(|e| tracing::error!("Error deleting pair {}: {}", name, e))?;

        if deleted == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        tracing::info!("Deleted pair {}", name);
        Ok(())
    }

    fn add_values(&self, pair_name: &str, series: &[Observation]) -> StoreResult<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let pair_id = Self::require_pair_id(&tx, pair_name)?;
        let inserted = Self::insert_values(&tx, pair_id, series)
            .inspect_err(|e| tracing::warn!("Error adding values to {}: {}", pair_name, e))?;
        tx.commit()?;

        tracing::info!("Added {} values to pair {}", inserted, pair_name);
        Ok(inserted)
    }

    fn add_pair_with_values(
        &self,
        name: &str,
        description: &str,
        series: &[Observation],
    ) -> StoreResult<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let pair_id = Self::insert_pair(&tx, name, description)?;
        let inserted = Self::insert_values(&tx, pair_id, series)
            .inspect_err(|e| tracing::warn!("Rolling back import of {}: {}", name, e))?;
        tx.commit()?;

        tracing::info!("Added pair {} with {} values", name, inserted);
        Ok(inserted)
    }

    fn delete_values(
        &self,
        pair_name: &str,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> StoreResult<usize> {
        let conn = self.conn();
        let pair_id = Self::pair_id(&conn, pair_name)
            .inspect_err(|e| tracing::error!("Error resolving pair {}: {}", pair_name, e))?;
        let Some(pair_id) = pair_id else {
            tracing::warn!("Not deleting values: pair {} not found", pair_name);
            return Ok(0);
        };

        let deleted = conn
            .execute(
                r#"DELETE FROM "Values" WHERE pair_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3"#,
                params![pair_id, format_timestamp(&begin), format_timestamp(&end)],
            )
            .inspect_err(|e| tracing::error!("Error deleting values of {}: {}", pair_name, e))?;

        tracing::info!("Deleted {} values from pair {}", deleted, pair_name);
        Ok(deleted)
    }

    fn get_values(
        &self,
        pair_name: &str,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> StoreResult<Vec<Observation>> {
        let conn = self.conn();
        let pair_id = Self::require_pair_id(&conn, pair_name)?;
        let values = Self::select_range(&conn, pair_id, &begin, &end)
            .inspect_err(|e| tracing::error!("Error loading values of {}: {}", pair_name, e))?;

        tracing::debug!("Loaded {} values for pair {}", values.len(), pair_name);
        Ok(values)
    }
}

/// Only UNIQUE failures are conflicts; NOT NULL and foreign key failures stay storage errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
