// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API integration.
//!
//! [`CloudApiClient`] sends template messages and implements
//! [`ChannelAdapter`](wacast_core::ChannelAdapter). The [`webhook`] module
//! parses Meta's delivery-status and inbound-message envelopes and verifies
//! subscription handshakes and payload signatures.

pub mod client;
pub mod types;
pub mod webhook;

pub use client::CloudApiClient;
pub use webhook::{WebhookEvents, WebhookPayload, parse_events, verify_signature, verify_subscription};
