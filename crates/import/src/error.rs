// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that abort a CSV import before any store mutation.
///
/// All variants are fatal to the import call: the store's prior ticket
/// set is left untouched when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The CSV input was malformed.
    Parse(String),
    /// No column could be identified for a required logical field.
    MissingRequiredColumn {
        /// The logical field that could not be bound.
        field: &'static str,
    },
    /// The input contained no data rows.
    EmptyInput,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "CSV parse error: {msg}"),
            Self::MissingRequiredColumn { field } => {
                write!(f, "Could not identify a CSV column for '{field}'")
            }
            Self::EmptyInput => write!(f, "CSV input contains no data rows"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
