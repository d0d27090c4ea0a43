// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use porteiro_cache::CacheError;
use porteiro_store::StoreError;

use crate::scan::ScanError;

/// Errors from the validation engine.
///
/// Unknown codes and duplicate scans are classified validation
/// outcomes, not errors; only infrastructure failures and unusable
/// input land here.
#[derive(Debug)]
pub enum EngineError {
    /// The submitted code was empty after trimming.
    EmptyCode,
    /// The backing ticket store failed.
    Store(StoreError),
    /// The local validation cache could not be persisted.
    Cache(CacheError),
    /// The scanner produced no usable content.
    Scan(ScanError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "QR code is empty"),
            Self::Store(err) => write!(f, "Store error: {err}"),
            Self::Cache(err) => write!(f, "Cache error: {err}"),
            Self::Scan(err) => write!(f, "Scan error: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyCode => None,
            Self::Store(err) => Some(err),
            Self::Cache(err) => Some(err),
            Self::Scan(err) => Some(err),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<CacheError> for EngineError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err)
    }
}

impl From<ScanError> for EngineError {
    fn from(err: ScanError) -> Self {
        Self::Scan(err)
    }
}
