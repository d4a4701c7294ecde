// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per stored entity. Each function takes `&Database`
//! and runs on the single writer thread.

pub mod blocklist;
pub mod campaigns;
pub mod companies;
pub mod contacts;
pub mod messages;

use std::str::FromStr;

/// Read a strum-backed enum stored as TEXT.
pub(crate) fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
