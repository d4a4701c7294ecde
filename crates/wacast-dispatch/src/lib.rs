// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch pipeline.
//!
//! Selection ([`selector`]) turns a company segment into a deduplicated,
//! blocklist-filtered target set. [`campaign::Dispatcher`] creates the
//! campaign record and fans one job per target out to the queue
//! ([`enqueue`]). The queue later delivers each job to the [`worker`], which
//! performs the provider send. Every send result and webhook event goes
//! through the [`reconciler`], the only code that moves campaign counters.

pub mod campaign;
pub mod enqueue;
pub mod phone;
pub mod reconciler;
pub mod selector;
pub mod worker;

pub use campaign::{Dispatcher, StartCampaign, StartReport};
pub use enqueue::{DispatchSettings, EnqueueFailure, EnqueueReport, Fanout};
pub use phone::{CountryCodeNormalizer, PhoneNormalizer};
pub use reconciler::Reconciler;
pub use selector::{Selection, Target};
pub use worker::{DeliveryAttempt, Worker};
