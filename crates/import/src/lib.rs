// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV normalization for ticket imports.
//!
//! Real-world ticket exports disagree about column names, column order,
//! and language. This crate turns heterogeneous CSV input into the fixed
//! canonical row set consumed by the store, using a prioritized synonym
//! table per logical field plus deterministic fallbacks.

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

mod error;
mod normalize;
mod sample;

pub use error::ImportError;
pub use normalize::{normalize_rows, parse_and_normalize};
pub use sample::sample_csv;
