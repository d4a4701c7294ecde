// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact operations. Contacts are returned in insertion order.

use rusqlite::{params, params_from_iter};
use wacast_core::WacastError;
use wacast_core::types::Contact;

use crate::database::{Database, map_tr_err};

const CONTACT_COLUMNS: &str = "c.id, c.company_id, c.name, c.phone, c.email, c.city, c.notes,
     c.created_at,
     (SELECT group_concat(segment_id, ',') FROM contact_segments WHERE contact_id = c.id)";

fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    let segments: Option<String> = row.get(8)?;
    Ok(Contact {
        id: row.get(0)?,
        company_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        city: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        segments: segments
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    })
}

fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Insert a contact and its segment memberships in one transaction.
pub async fn create_contact(db: &Database, contact: &Contact) -> Result<(), WacastError> {
    let c = contact.clone();
    let digits = phone_digits(&c.phone);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO contacts
                     (id, company_id, name, phone, phone_digits, email, city, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![c.id, c.company_id, c.name, c.phone, digits, c.email, c.city, c.notes],
            )?;
            for segment_id in &c.segments {
                tx.execute(
                    "INSERT OR IGNORE INTO contact_segments (contact_id, segment_id)
                     VALUES (?1, ?2)",
                    params![c.id, segment_id],
                )?;
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Contacts of a company tagged with `segment_id`.
pub async fn list_segment_contacts(
    db: &Database,
    company_id: &str,
    segment_id: &str,
) -> Result<Vec<Contact>, WacastError> {
    let company_id = company_id.to_string();
    let segment_id = segment_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS}
                 FROM contacts c
                 JOIN contact_segments cs ON cs.contact_id = c.id
                 WHERE c.company_id = ?1 AND cs.segment_id = ?2
                 ORDER BY c.rowid ASC"
            ))?;
            let rows = stmt.query_map(params![company_id, segment_id], row_to_contact)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Contacts of a company whose phone, stripped to digits, is one of `digits`.
pub async fn find_contacts_by_phone_digits(
    db: &Database,
    company_id: &str,
    digits: &[String],
) -> Result<Vec<Contact>, WacastError> {
    if digits.is_empty() {
        return Ok(Vec::new());
    }
    let mut bind = Vec::with_capacity(digits.len() + 1);
    bind.push(company_id.to_string());
    bind.extend(digits.iter().cloned());
    let placeholders = vec!["?"; digits.len()].join(", ");
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS}
                 FROM contacts c
                 WHERE c.company_id = ? AND c.phone_digits IN ({placeholders})
                 ORDER BY c.rowid ASC"
            ))?;
            let rows = stmt.query_map(params_from_iter(bind.iter()), row_to_contact)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
