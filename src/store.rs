//! SQLite-backed location store: a single `Locations` table mapping an
//! address to the raw geodata body fetched for it.
//!
//! Records are append-only. The table carries no uniqueness constraint;
//! the loader's cache-first check is what keeps addresses unique.

use crate::types::GeoloadError;
use rusqlite::{params, Connection};
use std::path::Path;

/// The persistent cache of fetched geodata.
pub struct LocationStore {
    conn: Connection,
}

impl LocationStore {
    /// Open (or create) the store file and ensure the `Locations` table
    /// exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GeoloadError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<(), GeoloadError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS Locations (address TEXT, geodata TEXT)",
        )?;
        Ok(())
    }

    /// Look up the stored geodata for an address. Absence is a value, not
    /// an error path.
    pub fn lookup(&self, address: &str) -> Result<Option<String>, GeoloadError> {
        let result = self.conn.query_row(
            "SELECT geodata FROM Locations WHERE address = ?1",
            params![address],
            |row| row.get(0),
        );

        match result {
            Ok(geodata) => Ok(Some(geodata)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a record for an address.
    pub fn insert(&self, address: &str, geodata: &str) -> Result<(), GeoloadError> {
        self.conn.execute(
            "INSERT INTO Locations (address, geodata) VALUES (?1, ?2)",
            params![address, geodata],
        )?;
        Ok(())
    }

    /// Total number of records.
    pub fn record_count(&self) -> Result<i64, GeoloadError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM Locations", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of records stored for one address.
    pub fn count_for(&self, address: &str) -> Result<i64, GeoloadError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM Locations WHERE address = ?1",
            params![address],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
