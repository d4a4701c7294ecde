// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocklist entries, unique on `(phone, company_id)`.

use rusqlite::params;
use wacast_core::WacastError;
use wacast_core::types::BlocklistEntry;

use crate::database::{Database, map_tr_err};

/// Insert an entry. Returns false if the phone is already blocked for the company.
pub async fn add_entry(db: &Database, entry: &BlocklistEntry) -> Result<bool, WacastError> {
    let e = entry.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO blocklist (id, company_id, phone, reason)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (phone, company_id) DO NOTHING",
                params![e.id, e.company_id, e.phone, e.reason],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_entry(db: &Database, id: &str) -> Result<bool, WacastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM blocklist WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Entries newest first, optionally restricted to one company.
pub async fn list_entries(
    db: &Database,
    company_id: Option<&str>,
) -> Result<Vec<BlocklistEntry>, WacastError> {
    let company_id = company_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, company_id, phone, reason, created_at FROM blocklist
                 WHERE ?1 IS NULL OR company_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![company_id], |row| {
                Ok(BlocklistEntry {
                    id: row.get(0)?,
                    company_id: row.get(1)?,
                    phone: row.get(2)?,
                    reason: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
