// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring and command implementations behind the `wacast` binary.

pub mod app;
pub mod commands;
pub mod serve;
pub mod shutdown;

pub use app::App;
