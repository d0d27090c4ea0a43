// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// What a scan attempt produced, as reported by the scanning surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scanner decoded a payload.
    Content(String),
    /// The scan completed but decoded nothing.
    NoContent,
    /// The user denied camera access.
    PermissionDenied,
    /// The device has no scanning capability.
    Unsupported,
}

impl ScanOutcome {
    /// Extracts the decoded payload, classifying capability failures.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when there is no payload to validate.
    pub fn into_content(self) -> Result<String, ScanError> {
        match self {
            Self::Content(content) => Ok(content),
            Self::NoContent => Err(ScanError::NoContent),
            Self::PermissionDenied => Err(ScanError::PermissionDenied),
            Self::Unsupported => Err(ScanError::Unsupported),
        }
    }
}

/// Device-capability failures from the scanning surface.
///
/// These never reach the ticket store; a failed scan leaves the
/// validation loop ready for the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// The scan decoded nothing.
    NoContent,
    /// Camera permission was denied.
    PermissionDenied,
    /// Scanning is not available on this device.
    Unsupported,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoContent => write!(f, "Scan produced no content"),
            Self::PermissionDenied => write!(f, "Camera permission denied"),
            Self::Unsupported => write!(f, "Scanning is not supported on this device"),
        }
    }
}

impl std::error::Error for ScanError {}
