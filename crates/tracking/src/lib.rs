//! Client for the external process-tracking service.
//!
//! Each execution is correlated with an external lifecycle record through a
//! create-then-update protocol: one POST to the base URL creates the record
//! and returns a numeric `processId`; later POSTs to `<base>/<processId>`
//! update its status. Tracking is best-effort -- update failures are logged
//! and never surfaced to the caller, and a failed creation is never
//! followed by an update attempt.

mod client;
mod status;

pub use client::{Tracker, TrackingClient, TrackingError};
pub use status::TrackingStatus;
