use std::sync::Arc;

use runbook_kube::{RemoteExecutor, TargetResolver};
use runbook_tracking::Tracker;

use crate::config::ServiceConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (everything is behind `Arc`). The cluster and
/// tracking collaborators sit behind trait objects so tests can swap in
/// fakes.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<ServiceConfig>,
    /// Resolves the pod a script executes in.
    pub resolver: Arc<dyn TargetResolver>,
    /// Runs the remote command inside the resolved pod.
    pub executor: Arc<dyn RemoteExecutor>,
    /// Reports execution lifecycle to the tracking service.
    pub tracker: Arc<dyn Tracker>,
}
