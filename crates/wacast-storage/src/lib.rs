// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the wacast campaign service.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer concurrency
//! model via `tokio-rusqlite`. Every counter-changing write runs in one
//! transaction with the message write that justifies it.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
