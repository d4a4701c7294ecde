// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QStash integration: publishing dispatch jobs and verifying the signed
//! deliveries QStash makes back to the worker endpoint.

pub mod publisher;
pub mod signature;

pub use publisher::QStashPublisher;
pub use signature::SignatureVerifier;
