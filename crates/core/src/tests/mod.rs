// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use porteiro_cache::LocalValidationCache;
use porteiro_domain::CanonicalTicketRow;
use porteiro_store::{MemoryRemote, RemoteTicketStore};

use crate::ValidationEngine;

static CACHE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_cache_path() -> PathBuf {
    let id: u64 = CACHE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "porteiro_engine_test_{}_{id}.json",
        std::process::id()
    ))
}

/// Engine over a fault-injectable remote store with a fresh cache file.
pub fn remote_engine() -> ValidationEngine<RemoteTicketStore<MemoryRemote>> {
    let cache = LocalValidationCache::open(&unique_cache_path());
    ValidationEngine::new(RemoteTicketStore::new(MemoryRemote::new()), cache)
}

/// Canonical rows with the given QR codes and otherwise default fields.
pub fn rows(qr_codes: &[&str]) -> Vec<CanonicalTicketRow> {
    qr_codes
        .iter()
        .map(|qr_code| CanonicalTicketRow {
            qr_code: (*qr_code).to_string(),
            ..CanonicalTicketRow::default()
        })
        .collect()
}
