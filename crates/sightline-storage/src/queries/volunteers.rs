// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volunteer directory queries.

use rusqlite::{params, OptionalExtension, Row};
use sightline_core::{SightlineError, UserId, VolunteerRecord};

use crate::database::{map_tr_err, Database};

const COLUMNS: &str = "user_id, is_available, consent_given, languages";

fn row_to_record(row: &Row<'_>) -> Result<VolunteerRecord, rusqlite::Error> {
    let user_id: String = row.get(0)?;
    let languages: String = row.get(3)?;
    Ok(VolunteerRecord {
        user_id: UserId::parse(&user_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        is_available: row.get(1)?,
        consent_given: row.get(2)?,
        languages: serde_json::from_str(&languages).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
    })
}

/// Atomically reserve one eligible volunteer.
///
/// A single `UPDATE ... RETURNING` picks the volunteer who has been available
/// the longest and clears the flag. The `is_available = 1` guard on the outer
/// statement is the compare half of the compare-and-swap.
pub async fn reserve_available(db: &Database) -> Result<Option<VolunteerRecord>, SightlineError> {
    db.connection()
        .call(|conn| -> Result<Option<VolunteerRecord>, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "UPDATE volunteers
                     SET is_available = 0,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE user_id = (
                         SELECT user_id FROM volunteers
                         WHERE is_available = 1 AND consent_given = 1
                         ORDER BY updated_at, user_id
                         LIMIT 1
                     )
                     AND is_available = 1
                     AND consent_given = 1
                     RETURNING {COLUMNS}"
                ),
                [],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Clear one volunteer's availability if it is currently set.
///
/// Returns `true` only when this call flipped the flag. Consent is not
/// checked: a volunteer taking part in any call is busy.
pub async fn claim_volunteer(db: &Database, user_id: &UserId) -> Result<bool, SightlineError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE volunteers
                 SET is_available = 0,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE user_id = ?1 AND is_available = 1",
                params![user_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Set the availability flag. Returns `false` if the volunteer is unknown.
pub async fn set_available(
    db: &Database,
    user_id: &UserId,
    available: bool,
) -> Result<bool, SightlineError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE volunteers
                 SET is_available = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE user_id = ?2",
                params![available, user_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Get one volunteer record.
pub async fn get_volunteer(
    db: &Database,
    user_id: &UserId,
) -> Result<Option<VolunteerRecord>, SightlineError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<VolunteerRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM volunteers WHERE user_id = ?1"),
                params![user_id],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a volunteer or replace their flags and languages.
pub async fn upsert_volunteer(
    db: &Database,
    record: &VolunteerRecord,
) -> Result<(), SightlineError> {
    let user_id = record.user_id.to_string();
    let is_available = record.is_available;
    let consent_given = record.consent_given;
    let languages = serde_json::to_string(&record.languages)
        .map_err(|e| SightlineError::Internal(e.to_string()))?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO volunteers (user_id, is_available, consent_given, languages)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     is_available = excluded.is_available,
                     consent_given = excluded.consent_given,
                     languages = excluded.languages,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user_id, is_available, consent_given, languages],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List all volunteers ordered by user id.
pub async fn list_volunteers(db: &Database) -> Result<Vec<VolunteerRecord>, SightlineError> {
    db.connection()
        .call(|conn| -> Result<Vec<VolunteerRecord>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM volunteers ORDER BY user_id"))?;
            let rows = stmt.query_map([], row_to_record)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
