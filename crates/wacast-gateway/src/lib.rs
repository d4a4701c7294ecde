// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for wacast.
//!
//! Three audiences reach the service over HTTP: Meta delivers webhooks to
//! `/api/webhook`, QStash delivers queued jobs to the worker path, and
//! operators drive campaigns through the bearer-protected admin API.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod webhook;
pub mod worker;

pub use server::{GatewayState, router, start_server};
