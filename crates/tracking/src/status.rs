//! Status tokens understood by the tracking service.

use std::fmt;

/// Terminal status of a tracked execution.
///
/// `SUCCESSFUL` is the canonical terminal-success token; integrations that
/// historically sent `COMPLETED` should migrate to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    Successful,
    Failed,
}

impl TrackingStatus {
    /// Wire token sent in the update payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
        }
    }

    /// Message severity the update carries: `FAILED` maps to error level,
    /// every other status to info level.
    pub fn level(self) -> &'static str {
        match self {
            Self::Failed => "ERROR",
            Self::Successful => "INFO",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
