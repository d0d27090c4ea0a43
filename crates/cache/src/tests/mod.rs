// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static CACHE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a unique cache path so concurrent tests do not collide.
pub fn unique_cache_path() -> PathBuf {
    let id: u64 = CACHE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "porteiro_cache_test_{}_{id}.json",
        std::process::id()
    ))
}
