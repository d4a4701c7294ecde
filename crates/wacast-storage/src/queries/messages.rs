// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message records and the counter updates tied to them.
//!
//! Outbound messages are unique per `(campaign, contact)` and inbound
//! messages per provider id. Counter increments run in the same transaction
//! as the message write and only when that write took effect.

use std::collections::HashSet;

use rusqlite::{OptionalExtension, Transaction, params};
use wacast_core::WacastError;
use wacast_core::traits::{CounterField, OutboundRecord};
use wacast_core::types::{Direction, Message, MessageStatus};

use crate::database::{Database, map_tr_err, now_timestamp};
use crate::queries::parse_column;

const MESSAGE_COLUMNS: &str = "id, company_id, contact_id, campaign_id, wa_message_id, body,
     direction, status, is_read, error, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        company_id: row.get(1)?,
        contact_id: row.get(2)?,
        campaign_id: row.get(3)?,
        wa_message_id: row.get(4)?,
        body: row.get(5)?,
        direction: parse_column(row, 6)?,
        status: parse_column(row, 7)?,
        is_read: row.get(8)?,
        error: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn increment(
    tx: &Transaction<'_>,
    campaign_id: &str,
    field: CounterField,
    now: &str,
) -> rusqlite::Result<()> {
    let column = field.column();
    tx.execute(
        &format!("UPDATE campaigns SET {column} = {column} + 1, updated_at = ?2 WHERE id = ?1"),
        params![campaign_id, now],
    )?;
    Ok(())
}

/// Contact ids with a non-failed outbound message for the campaign.
pub async fn contacts_with_active_messages(
    db: &Database,
    campaign_id: &str,
) -> Result<HashSet<String>, WacastError> {
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT contact_id FROM messages
                 WHERE campaign_id = ?1 AND direction = 'outbound'
                   AND status != 'failed' AND contact_id IS NOT NULL",
            )?;
            let rows = stmt.query_map(params![campaign_id], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<HashSet<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn find_outbound(
    db: &Database,
    campaign_id: &str,
    contact_id: &str,
) -> Result<Option<Message>, WacastError> {
    let campaign_id = campaign_id.to_string();
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE campaign_id = ?1 AND contact_id = ?2 AND direction = 'outbound'"
                ),
                params![campaign_id, contact_id],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_by_wa_id(
    db: &Database,
    wa_message_id: &str,
) -> Result<Option<Message>, WacastError> {
    let wa_message_id = wa_message_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE wa_message_id = ?1"),
                params![wa_message_id],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Record one send result and bump its counter.
///
/// Returns false, leaving counters untouched, when the campaign already has
/// an outbound message for the contact.
pub async fn insert_outbound(db: &Database, record: &OutboundRecord) -> Result<bool, WacastError> {
    let r = record.clone();
    let id = uuid::Uuid::new_v4().to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT INTO messages
                     (id, company_id, contact_id, campaign_id, wa_message_id, body,
                      direction, status, error, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'outbound', ?7, ?8, ?9, ?9)
                 ON CONFLICT DO NOTHING",
                params![
                    id,
                    r.company_id,
                    r.contact_id,
                    r.campaign_id,
                    r.wa_message_id,
                    r.body,
                    r.status.to_string(),
                    r.error,
                    now,
                ],
            )?;
            if inserted == 0 {
                return Ok(false);
            }
            increment(&tx, &r.campaign_id, r.counter(), &now)?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Compare-and-set a message status by provider id, bumping `increments` on
/// the owning campaign when the swap happens.
pub async fn transition(
    db: &Database,
    wa_message_id: &str,
    from: MessageStatus,
    to: MessageStatus,
    increments: &[CounterField],
) -> Result<bool, WacastError> {
    let wa_message_id = wa_message_id.to_string();
    let increments = increments.to_vec();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let campaign_id: Option<Option<String>> = tx
                .query_row(
                    "UPDATE messages SET status = ?3, updated_at = ?4
                     WHERE wa_message_id = ?1 AND status = ?2
                     RETURNING campaign_id",
                    params![wa_message_id, from.to_string(), to.to_string(), now],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(campaign_id) = campaign_id else {
                return Ok(false);
            };
            if let Some(campaign_id) = campaign_id {
                for field in &increments {
                    increment(&tx, &campaign_id, *field, &now)?;
                }
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert an inbound message. Returns false if its provider id is already stored.
pub async fn insert_inbound(db: &Database, message: &Message) -> Result<bool, WacastError> {
    let m = message.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO messages
                     (id, company_id, contact_id, campaign_id, wa_message_id, body,
                      direction, status, is_read, error)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT DO NOTHING",
                params![
                    m.id,
                    m.company_id,
                    m.contact_id,
                    m.campaign_id,
                    m.wa_message_id,
                    m.body,
                    Direction::Inbound.to_string(),
                    m.status.to_string(),
                    m.is_read,
                    m.error,
                ],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Inbound messages, newest first.
pub async fn list_inbound(db: &Database, limit: Option<i64>) -> Result<Vec<Message>, WacastError> {
    let limit = limit.unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE direction = 'inbound'
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_message)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn mark_read(db: &Database, id: &str) -> Result<bool, WacastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE messages SET is_read = 1 WHERE id = ?1 AND direction = 'inbound'",
                params![id],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn mark_all_read(db: &Database) -> Result<u64, WacastError> {
    db.connection()
        .call(|conn| {
            let updated = conn.execute(
                "UPDATE messages SET is_read = 1 WHERE direction = 'inbound' AND is_read = 0",
                [],
            )?;
            Ok(updated as u64)
        })
        .await
        .map_err(map_tr_err)
}
