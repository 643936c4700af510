// SPDX-License-Identifier: Apache-2.0

use crate::{format_timestamp, parse_timestamp, SqliteStore, StoreError};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// One server-side session row, keyed by an opaque unguessable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub sid: String,
    pub sess: Value,
    pub expire: DateTime<Utc>,
}

impl SqliteStore {
    pub fn create_session(
        &self,
        sid: &str,
        sess: &Value,
        expire: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let sess_json = serde_json::to_string(sess)
            .map_err(|e| StoreError(format!("cannot encode session: {e}")))?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO sessions (sid, sess, expire) VALUES (?1, ?2, ?3)",
                rusqlite::params![sid, sess_json, format_timestamp(expire)],
            )?;
            Ok(())
        })
    }

    /// Returns `None` for unknown or expired sessions alike; the caller
    /// cannot distinguish the two, matching an opaque 401 upstream.
    pub fn get_session(
        &self,
        sid: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let raw = self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT sess, expire FROM sessions WHERE sid = ?1")?;
            let mut rows = stmt.query_map([sid], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })?;
        let Some((sess_json, expire_raw)) = raw else {
            return Ok(None);
        };
        let expire = parse_timestamp(&expire_raw)?;
        if expire <= now {
            return Ok(None);
        }
        let sess: Value = serde_json::from_str(&sess_json)
            .map_err(|e| StoreError(format!("malformed session column: {e}")))?;
        Ok(Some(SessionRecord {
            sid: sid.to_string(),
            sess,
            expire,
        }))
    }

    pub fn delete_session(&self, sid: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE sid = ?1", [sid])?;
            Ok(())
        })
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let purged = conn.execute(
                "DELETE FROM sessions WHERE expire <= ?1",
                [format_timestamp(now)],
            )?;
            Ok(purged)
        })
    }
}
