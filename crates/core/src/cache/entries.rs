//! Cache entry operations.
//!
//! Provides the cache store surface the proxy consumes: put, exact
//! (method, URL) lookup, generation listing, and generation-wide deletion.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response snapshot.
///
/// Captures everything needed to replay a response without touching the
/// network: status, headers, and the fully buffered body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl StoredResponse {
    /// Build a snapshot stamped with the current time.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }

    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl CacheDb {
    /// Insert or replace an entry in a generation.
    ///
    /// Uses UPSERT semantics; racing writers on the same key resolve
    /// last-writer-wins, which is acceptable because entries are idempotent
    /// re-derivations of network content.
    pub async fn put(
        &self, generation: &str, method: &str, url: &str, response: &StoredResponse,
    ) -> Result<(), Error> {
        let generation = generation.to_string();
        let method = method.to_uppercase();
        let url = url.to_string();
        let response = response.clone();
        let headers_json = serde_json::to_string(&response.headers)?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (generation, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(generation, method, url) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &generation,
                        &method,
                        &url,
                        response.status,
                        &headers_json,
                        &response.body,
                        &response.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by exact (method, URL) match within a generation.
    ///
    /// Returns None on a cache miss.
    pub async fn lookup(&self, generation: &str, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let generation = generation.to_string();
        let method = method.to_uppercase();
        let url = url.to_string();

        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND method = ?2 AND url = ?3",
                    params![generation, method, url],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                );

                match result {
                    Ok((status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)?;
                        Ok(Some(StoredResponse { status, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List the names of all generations present in the store.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT generation FROM entries ORDER BY generation")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry belonging to a generation.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_generation(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE generation = ?1", params![generation])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a generation.
    pub async fn generation_len(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
