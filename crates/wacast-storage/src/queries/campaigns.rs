// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign records and their lifecycle.
//!
//! Counters are never written here directly; they move only through
//! [`crate::queries::messages`] together with the message write that
//! justifies them.

use rusqlite::{OptionalExtension, params};
use wacast_core::WacastError;
use wacast_core::types::{Campaign, CampaignStatus, NewCampaign};

use crate::database::{Database, map_tr_err, now_timestamp};
use crate::queries::parse_column;

const CAMPAIGN_COLUMNS: &str = "id, name, company_id, segment_id, template_name, status,
     total_sent, sent_count, delivered_count, read_count, failed_count, created_at, updated_at";

fn row_to_campaign(row: &rusqlite::Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        name: row.get(1)?,
        company_id: row.get(2)?,
        segment_id: row.get(3)?,
        template_name: row.get(4)?,
        status: parse_column(row, 5)?,
        total_sent: row.get(6)?,
        sent_count: row.get(7)?,
        delivered_count: row.get(8)?,
        read_count: row.get(9)?,
        failed_count: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Create a campaign in `Sending` with all counters at zero.
pub async fn create_campaign(db: &Database, new: &NewCampaign) -> Result<Campaign, WacastError> {
    let now = now_timestamp();
    let campaign = Campaign {
        id: uuid::Uuid::new_v4().to_string(),
        name: new.name.clone(),
        company_id: new.company_id.clone(),
        segment_id: new.segment_id.clone(),
        template_name: new.template_name.clone(),
        status: CampaignStatus::Sending,
        total_sent: new.total_sent,
        sent_count: 0,
        delivered_count: 0,
        read_count: 0,
        failed_count: 0,
        created_at: now.clone(),
        updated_at: now,
    };
    let c = campaign.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaigns
                     (id, name, company_id, segment_id, template_name, status, total_sent,
                      created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    c.id,
                    c.name,
                    c.company_id,
                    c.segment_id,
                    c.template_name,
                    c.status.to_string(),
                    c.total_sent,
                    c.created_at,
                    c.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(campaign)
}

pub async fn get_campaign(db: &Database, id: &str) -> Result<Option<Campaign>, WacastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"),
                params![id],
                row_to_campaign,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Campaigns, newest first.
pub async fn list_campaigns(db: &Database) -> Result<Vec<Campaign>, WacastError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], row_to_campaign)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a campaign; its messages go with it via `ON DELETE CASCADE`.
pub async fn delete_campaign(db: &Database, id: &str) -> Result<bool, WacastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM campaigns WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Settle a fully accounted `Sending` campaign.
///
/// Returns the new status if this call made the transition.
pub async fn settle_campaign(
    db: &Database,
    id: &str,
) -> Result<Option<CampaignStatus>, WacastError> {
    let id = id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "UPDATE campaigns
                 SET status = CASE WHEN sent_count > 0 THEN 'Completed' ELSE 'Failed' END,
                     updated_at = ?2
                 WHERE id = ?1
                   AND status = 'Sending'
                   AND sent_count + failed_count >= total_sent
                 RETURNING status",
                params![id, now],
                |row| parse_column::<CampaignStatus>(row, 0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::companies::create_company;
    use crate::queries::test_support::{company, setup_db};

    fn new_campaign(total: i64) -> NewCampaign {
        NewCampaign {
            name: "Diwali blast".into(),
            company_id: "co-1".into(),
            segment_id: "seg-1".into(),
            template_name: "diwali_offer".into(),
            total_sent: total,
        }
    }

    async fn set_counts(db: &Database, id: &str, sent: i64, failed: i64) {
        let id = id.to_string();
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE campaigns SET sent_count = ?2, failed_count = ?3 WHERE id = ?1",
                    params![id, sent, failed],
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_starts_sending_with_zero_counters() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "111")).await.unwrap();

        let created = create_campaign(&db, &new_campaign(3)).await.unwrap();
        let stored = get_campaign(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
        assert_eq!(stored.status, CampaignStatus::Sending);
        assert_eq!(stored.total_sent, 3);
        assert_eq!(stored.sent_count + stored.failed_count, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn settle_waits_until_fully_accounted() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "111")).await.unwrap();
        let c = create_campaign(&db, &new_campaign(3)).await.unwrap();

        set_counts(&db, &c.id, 1, 1).await;
        assert_eq!(settle_campaign(&db, &c.id).await.unwrap(), None);

        set_counts(&db, &c.id, 2, 1).await;
        assert_eq!(
            settle_campaign(&db, &c.id).await.unwrap(),
            Some(CampaignStatus::Completed)
        );
        // Idempotent once settled.
        assert_eq!(settle_campaign(&db, &c.id).await.unwrap(), None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn settle_all_failed_marks_failed() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "111")).await.unwrap();
        let c = create_campaign(&db, &new_campaign(2)).await.unwrap();

        set_counts(&db, &c.id, 0, 2).await;
        assert_eq!(
            settle_campaign(&db, &c.id).await.unwrap(),
            Some(CampaignStatus::Failed)
        );
        let stored = get_campaign(&db, &c.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Failed);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_is_newest_first_and_delete_removes() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "111")).await.unwrap();
        let first = create_campaign(&db, &new_campaign(1)).await.unwrap();
        let second = create_campaign(&db, &new_campaign(1)).await.unwrap();

        let listed = list_campaigns(&db).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        assert!(delete_campaign(&db, &first.id).await.unwrap());
        assert!(!delete_campaign(&db, &first.id).await.unwrap());
        assert_eq!(list_campaigns(&db).await.unwrap().len(), 1);
        db.close().await.unwrap();
    }
}
