// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single `user_info` row.

use mnema_core::profile::parse_interests;
use mnema_core::{MnemaError, Profile, ProfileUpdate};
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::database::{map_tr_err, Database};

/// Primary key of the canonical profile row.
const PROFILE_ROW_ID: i64 = 1;

fn read_profile(conn: &rusqlite::Connection) -> Result<Profile, rusqlite::Error> {
    let profile = conn
        .query_row(
            "SELECT name, last_name, age, gender, location, occupation, interests
             FROM user_info WHERE id = ?1",
            params![PROFILE_ROW_ID],
            |row| {
                let interests: Option<String> = row.get(6)?;
                Ok(Profile {
                    name: non_empty(row.get(0)?),
                    last_name: non_empty(row.get(1)?),
                    age: non_empty(row.get(2)?),
                    gender: non_empty(row.get(3)?),
                    location: non_empty(row.get(4)?),
                    occupation: non_empty(row.get(5)?),
                    interests: parse_interests(interests.as_deref().unwrap_or_default()),
                })
            },
        )
        .optional()?;
    Ok(profile.unwrap_or_default())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reads the profile. A missing row is an empty profile.
pub async fn get_profile(db: &Database) -> Result<Profile, MnemaError> {
    db.connection()
        .call(|conn| read_profile(conn))
        .await
        .map_err(map_tr_err)
}

/// Merges `update` into the profile inside one IMMEDIATE transaction.
///
/// The read, the union of interests and the write happen under the same
/// write lock, so concurrent merges cannot lose interests.
pub async fn merge_profile(db: &Database, update: &ProfileUpdate) -> Result<Profile, MnemaError> {
    let update = update.clone();
    db.connection()
        .call(move |conn| -> Result<Profile, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut profile = read_profile(&tx)?;
            profile.apply(&update);
            tx.execute(
                "INSERT INTO user_info
                     (id, name, last_name, age, gender, location, occupation, interests)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     last_name = excluded.last_name,
                     age = excluded.age,
                     gender = excluded.gender,
                     location = excluded.location,
                     occupation = excluded.occupation,
                     interests = excluded.interests,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    PROFILE_ROW_ID,
                    profile.name,
                    profile.last_name,
                    profile.age,
                    profile.gender,
                    profile.location,
                    profile.occupation,
                    profile.interests_column(),
                ],
            )?;
            tx.commit()?;
            Ok(profile)
        })
        .await
        .map_err(map_tr_err)
}
