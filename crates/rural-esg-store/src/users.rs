// SPDX-License-Identifier: Apache-2.0

use crate::{format_timestamp, parse_timestamp, SqliteStore, StoreError};
use chrono::{DateTime, Utc};
use rural_esg_model::{UpsertUser, User};

fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<(User, String, String)> {
    // Timestamps come back as raw text; parsed after the rusqlite closure.
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok((
        User {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            profile_image_url: row.get(4)?,
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
        },
        created_at,
        updated_at,
    ))
}

fn finish_user((mut user, created, updated): (User, String, String)) -> Result<User, StoreError> {
    user.created_at = parse_timestamp(&created)?;
    user.updated_at = parse_timestamp(&updated)?;
    Ok(user)
}

impl SqliteStore {
    pub fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, first_name, last_name, profile_image_url,
                        created_at, updated_at
                 FROM users WHERE id = ?1",
            )?;
            let mut rows = stmt.query_map([id], read_user)?;
            match rows.next() {
                Some(row) => Ok(Some(finish_user(row?)?)),
                None => Ok(None),
            }
        })
    }

    /// Insert-or-update keyed by id; `updated_at` is bumped on every
    /// successful login, `created_at` only set on first insert.
    pub fn upsert_user(&self, claims: &UpsertUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        let stamp = format_timestamp(now);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, first_name, last_name, profile_image_url,
                                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                   email = excluded.email,
                   first_name = excluded.first_name,
                   last_name = excluded.last_name,
                   profile_image_url = excluded.profile_image_url,
                   updated_at = excluded.updated_at",
                rusqlite::params![
                    claims.id,
                    claims.email,
                    claims.first_name,
                    claims.last_name,
                    claims.profile_image_url,
                    stamp,
                ],
            )?;
            Ok(())
        })?;
        self.get_user(&claims.id)?
            .ok_or_else(|| StoreError("upserted user not readable".to_string()))
    }
}
