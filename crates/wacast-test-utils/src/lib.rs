// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for wacast integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockQueue`] - Dispatch queue that captures published jobs
//! - [`MockChannel`] - Messaging provider with scripted per-phone outcomes
//! - [`TestHarness`] - Temp SQLite storage seeded with one company

pub mod harness;
pub mod mock_channel;
pub mod mock_queue;

pub use harness::TestHarness;
pub use mock_channel::{MockChannel, MockOutcome};
pub use mock_queue::MockQueue;
