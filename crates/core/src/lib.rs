// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The Porteiro validation engine.
//!
//! Sits between the scan surface and a [`porteiro_store::TicketStore`],
//! augmenting the authoritative at-most-once state machine with a
//! persisted local cache: duplicate scans short-circuit locally, and a
//! speculative cache write keeps a device honest even when the store
//! round-trip fails mid-validation.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod engine;
mod error;
mod scan;

pub use engine::ValidationEngine;
pub use error::EngineError;
pub use scan::{ScanError, ScanOutcome};

#[cfg(test)]
mod tests;
