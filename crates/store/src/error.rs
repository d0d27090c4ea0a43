// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during store operations.
///
/// `NotFound` and `AlreadyUsed` are deliberately absent: those are
/// classified validation outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The remote backend could not be reached or failed mid-operation.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
