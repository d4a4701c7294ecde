// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Companies, segments, and templates.

use rusqlite::{OptionalExtension, params};
use wacast_core::WacastError;
use wacast_core::types::{Company, Segment, Template};

use crate::database::{Database, map_tr_err};

fn row_to_company(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        whatsapp_token: row.get(2)?,
        number_id: row.get(3)?,
    })
}

fn row_to_template(row: &rusqlite::Row<'_>) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        company_id: row.get(1)?,
        name: row.get(2)?,
        template_name: row.get(3)?,
        code_name: row.get(4)?,
        variable_name: row.get(5)?,
        language_code: row.get(6)?,
    })
}

pub async fn create_company(db: &Database, company: &Company) -> Result<(), WacastError> {
    let company = company.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO companies (id, name, whatsapp_token, number_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    company.id,
                    company.name,
                    company.whatsapp_token,
                    company.number_id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_company(db: &Database, id: &str) -> Result<Option<Company>, WacastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, whatsapp_token, number_id FROM companies WHERE id = ?1",
                params![id],
                row_to_company,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Look up the company owning a provider phone-number id.
pub async fn find_company_by_number_id(
    db: &Database,
    number_id: &str,
) -> Result<Option<Company>, WacastError> {
    let number_id = number_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, whatsapp_token, number_id FROM companies WHERE number_id = ?1",
                params![number_id],
                row_to_company,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_segment(db: &Database, segment: &Segment) -> Result<(), WacastError> {
    let segment = segment.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO segments (id, company_id, name) VALUES (?1, ?2, ?3)",
                params![segment.id, segment.company_id, segment.name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_template(db: &Database, template: &Template) -> Result<(), WacastError> {
    let t = template.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO templates
                     (id, company_id, name, template_name, code_name, variable_name, language_code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    t.id,
                    t.company_id,
                    t.name,
                    t.template_name,
                    t.code_name,
                    t.variable_name,
                    t.language_code
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_template(db: &Database, id: &str) -> Result<Option<Template>, WacastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, company_id, name, template_name, code_name, variable_name, language_code
                 FROM templates WHERE id = ?1",
                params![id],
                row_to_template,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{company, segment, setup_db};

    #[tokio::test]
    async fn company_lookup_by_id_and_number() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "1098765")).await.unwrap();

        let by_id = get_company(&db, "co-1").await.unwrap().unwrap();
        assert_eq!(by_id.number_id, "1098765");

        let by_number = find_company_by_number_id(&db, "1098765").await.unwrap();
        assert_eq!(by_number.map(|c| c.id), Some("co-1".to_string()));

        assert!(find_company_by_number_id(&db, "0000").await.unwrap().is_none());
        assert!(get_company(&db, "missing").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_number_id_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "1098765")).await.unwrap();
        let result = create_company(&db, &company("co-2", "1098765")).await;
        assert!(result.is_err());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn template_round_trip_keeps_optional_fields() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &company("co-1", "1098765")).await.unwrap();
        create_segment(&db, &segment("seg-1", "co-1")).await.unwrap();

        let template = Template {
            id: "tpl-1".into(),
            company_id: "co-1".into(),
            name: "Diwali".into(),
            template_name: "diwali_offer".into(),
            code_name: Some("diwali_offer_v2".into()),
            variable_name: None,
            language_code: "en_US".into(),
        };
        create_template(&db, &template).await.unwrap();
        assert_eq!(get_template(&db, "tpl-1").await.unwrap(), Some(template));
        db.close().await.unwrap();
    }
}
