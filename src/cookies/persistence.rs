//! Cookie persistence - save and load cookies to/from SQLite.
//!
//! Two tables are kept: `cookie_store` holds one row per persistent cookie and
//! `pub_sufix` holds the last fetched public suffix list as JSON together with
//! its fetch time. All timestamps are unix milliseconds.

use crate::base::clock::{from_unix_millis, to_unix_millis};
use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::cookies::psl::{CachedSuffixes, PublicSuffixList};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Backend a client session loads from at bootup and saves to at teardown.
pub trait PersistentCookieStore: Send {
    /// Every stored cookie. All of them are persistent.
    fn load_all_cookies(&mut self) -> Result<Vec<CanonicalCookie>, NetError>;

    /// Replace the stored cookies with the persistent subset of `cookies`.
    fn replace_all(&mut self, cookies: &[CanonicalCookie]) -> Result<(), NetError>;

    fn load_suffix_cache(&mut self) -> Result<Option<CachedSuffixes>, NetError>;

    fn store_suffix_cache(&mut self, cache: &CachedSuffixes) -> Result<(), NetError>;
}

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS cookie_store (
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        creation_time INTEGER NOT NULL,
        last_access_time INTEGER NOT NULL,
        expiry_time INTEGER,
        domain TEXT NOT NULL,
        path TEXT NOT NULL,
        host_only_flag INTEGER NOT NULL,
        secure_only_flag INTEGER NOT NULL,
        http_only_flag INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS pub_sufix (
        timestamp INTEGER NOT NULL,
        data TEXT NOT NULL
    );
";

struct CookieRow {
    name: String,
    value: String,
    creation_time: i64,
    last_access_time: i64,
    expiry_time: Option<i64>,
    domain: String,
    path: String,
    host_only: bool,
    secure: bool,
    http_only: bool,
}

impl CookieRow {
    fn into_cookie(self) -> Option<CanonicalCookie> {
        let creation_time = from_unix_millis(self.creation_time)?;
        let mut cookie = CanonicalCookie::new(self.name, self.value, self.domain, self.path, creation_time);
        cookie.last_access_time = from_unix_millis(self.last_access_time)?;
        cookie.expiry_time = match self.expiry_time {
            Some(ms) => Some(from_unix_millis(ms)?),
            None => None,
        };
        cookie.persistent = true;
        cookie.host_only = self.host_only;
        cookie.secure = self.secure;
        cookie.http_only = self.http_only;
        Some(cookie)
    }
}

/// [`PersistentCookieStore`] backed by a SQLite database.
pub struct SqlitePersistentStore {
    conn: Connection,
}

impl SqlitePersistentStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NetError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, NetError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, NetError> {
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self { conn })
    }
}

impl PersistentCookieStore for SqlitePersistentStore {
    fn load_all_cookies(&mut self) -> Result<Vec<CanonicalCookie>, NetError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, value, creation_time, last_access_time, expiry_time, domain, path,
                    host_only_flag, secure_only_flag, http_only_flag
             FROM cookie_store",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CookieRow {
                name: row.get(0)?,
                value: row.get(1)?,
                creation_time: row.get(2)?,
                last_access_time: row.get(3)?,
                expiry_time: row.get(4)?,
                domain: row.get(5)?,
                path: row.get(6)?,
                host_only: row.get(7)?,
                secure: row.get(8)?,
                http_only: row.get(9)?,
            })
        })?;

        let mut cookies = Vec::new();
        for row in rows {
            match row?.into_cookie() {
                Some(cookie) => cookies.push(cookie),
                None => tracing::warn!("skipping stored cookie with out-of-range timestamp"),
            }
        }

        tracing::debug!(count = cookies.len(), "loaded persisted cookies");
        Ok(cookies)
    }

    fn replace_all(&mut self, cookies: &[CanonicalCookie]) -> Result<(), NetError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cookie_store", [])?;

        let mut written = 0usize;
        {
            let mut insert = tx.prepare(
                "INSERT INTO cookie_store VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for cookie in cookies.iter().filter(|c| c.persistent) {
                insert.execute(params![
                    cookie.name,
                    cookie.value,
                    to_unix_millis(cookie.creation_time),
                    to_unix_millis(cookie.last_access_time),
                    cookie.expiry_time.map(to_unix_millis),
                    cookie.domain,
                    cookie.path,
                    cookie.host_only,
                    cookie.secure,
                    cookie.http_only,
                ])?;
                written += 1;
            }
        }

        tx.commit()?;
        tracing::debug!(written, "persisted cookies");
        Ok(())
    }

    fn load_suffix_cache(&mut self) -> Result<Option<CachedSuffixes>, NetError> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT timestamp, data FROM pub_sufix ORDER BY timestamp DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((timestamp, data)) = row else {
            return Ok(None);
        };

        let Some(fetched_at) = from_unix_millis(timestamp) else {
            tracing::warn!(timestamp, "ignoring suffix cache with invalid timestamp");
            return Ok(None);
        };

        match serde_json::from_str::<PublicSuffixList>(&data) {
            Ok(list) => Ok(Some(CachedSuffixes { fetched_at, list })),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable suffix cache");
                Ok(None)
            }
        }
    }

    fn store_suffix_cache(&mut self, cache: &CachedSuffixes) -> Result<(), NetError> {
        let data = serde_json::to_string(&cache.list).map_err(|e| NetError::cookie_database(e.to_string()))?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pub_sufix", [])?;
        tx.execute(
            "INSERT INTO pub_sufix (timestamp, data) VALUES (?1, ?2)",
            params![to_unix_millis(cache.fetched_at), data],
        )?;
        tx.commit()?;
        Ok(())
    }
}
