//! Shared fixtures for API integration tests: fake cluster and tracking
//! collaborators plus a router builder mirroring production.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use runbook_api::config::ServiceConfig;
use runbook_api::router::build_app_router;
use runbook_api::state::AppState;
use runbook_kube::{ExecutionResult, KubeError, RemoteExecutor, TargetResolver};
use runbook_tracking::{Tracker, TrackingError, TrackingStatus};

/// Build a test `ServiceConfig` pointing at the given catalog document.
pub fn test_config(scripts_path: &str) -> ServiceConfig {
    ServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        scripts_path: scripts_path.to_string(),
        namespace: "testing".to_string(),
        pod_label_selector: "app=query-server".to_string(),
        tracking_url: None,
        tracking_stage: "EXECUTION".to_string(),
        tracking_group: "ScriptExecution".to_string(),
        request_timeout_secs: 30,
        exec_timeout_secs: 5,
    }
}

/// Write a catalog document to a temp file kept alive by the caller.
pub fn write_catalog(document: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(file, "{document}").expect("write catalog");
    file
}

/// Resolver answering with a fixed pod name, or failing.
pub struct FakeResolver {
    pub target: Result<String, String>,
}

impl FakeResolver {
    pub fn pod(name: &str) -> Arc<Self> {
        Arc::new(Self {
            target: Ok(name.to_string()),
        })
    }

    pub fn unavailable(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            target: Err(reason.to_string()),
        })
    }
}

#[async_trait]
impl TargetResolver for FakeResolver {
    async fn resolve(&self, _namespace: &str, _selector: &str) -> Result<String, KubeError> {
        self.target
            .clone()
            .map_err(KubeError::TargetUnavailable)
    }
}

/// One recorded executor invocation.
#[derive(Debug, Clone)]
pub struct ExecCall {
    pub namespace: String,
    pub target: String,
    pub command: String,
}

/// Executor returning a canned result and recording every call.
pub struct FakeExecutor {
    pub result: ExecutionResult,
    pub calls: Mutex<Vec<ExecCall>>,
}

impl FakeExecutor {
    pub fn succeeding(output: &str) -> Arc<Self> {
        Arc::new(Self {
            result: ExecutionResult::success(output.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(output: &str, detail: &str) -> Arc<Self> {
        Arc::new(Self {
            result: ExecutionResult::failure(output.to_string(), detail),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RemoteExecutor for FakeExecutor {
    async fn execute(&self, namespace: &str, target: &str, command: &str) -> ExecutionResult {
        self.calls.lock().expect("lock").push(ExecCall {
            namespace: namespace.to_string(),
            target: target.to_string(),
            command: command.to_string(),
        });
        self.result.clone()
    }
}

/// How the fake tracker answers record creation.
#[derive(Debug, Clone)]
pub enum CreateBehavior {
    /// Tracking configured; creation yields this id.
    Id(i64),
    /// Tracking unconfigured; creation no-ops.
    Unconfigured,
    /// Creation attempted but failed.
    Fail,
}

/// One recorded tracking record creation.
#[derive(Debug, Clone)]
pub struct CreateCall {
    pub name: String,
    pub stage: String,
}

/// One recorded tracking update.
#[derive(Debug, Clone)]
pub struct UpdateCall {
    pub process_id: i64,
    pub status: String,
    pub message: Option<String>,
}

/// Tracker recording creations and updates.
///
/// Mirrors the real client's no-op contract: an update without a record id
/// never reaches the service, so it is not recorded.
pub struct RecordingTracker {
    pub behavior: CreateBehavior,
    pub creates: Mutex<Vec<CreateCall>>,
    pub updates: Mutex<Vec<UpdateCall>>,
}

impl RecordingTracker {
    pub fn with(behavior: CreateBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        })
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.creates.lock().expect("lock").clone()
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Tracker for RecordingTracker {
    async fn create(
        &self,
        name: &str,
        _correlation_id: &str,
        stage: &str,
        _group: &str,
    ) -> Result<Option<i64>, TrackingError> {
        let call = CreateCall {
            name: name.to_string(),
            stage: stage.to_string(),
        };
        match self.behavior {
            CreateBehavior::Unconfigured => Ok(None),
            CreateBehavior::Id(id) => {
                self.creates.lock().expect("lock").push(call);
                Ok(Some(id))
            }
            CreateBehavior::Fail => {
                self.creates.lock().expect("lock").push(call);
                Err(TrackingError::MissingProcessId)
            }
        }
    }

    async fn update(
        &self,
        process_id: Option<i64>,
        status: TrackingStatus,
        message: Option<&str>,
    ) {
        let Some(process_id) = process_id else {
            return;
        };
        self.updates.lock().expect("lock").push(UpdateCall {
            process_id,
            status: status.as_str().to_string(),
            message: message.map(str::to_string),
        });
    }
}

/// Build the full production router over fake collaborators.
pub fn build_test_app(
    scripts_path: &str,
    resolver: Arc<dyn TargetResolver>,
    executor: Arc<dyn RemoteExecutor>,
    tracker: Arc<dyn Tracker>,
) -> Router {
    let config = test_config(scripts_path);
    let state = AppState {
        config: Arc::new(config.clone()),
        resolver,
        executor,
        tracker,
    };
    build_app_router(state, &config)
}

/// POST a JSON body and return (status, parsed body).
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (axum::http::StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(app, request).await
}

/// GET a URI and return (status, parsed body).
pub async fn get(app: Router, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    send(app, request).await
}

async fn send(
    app: Router,
    request: Request<Body>,
) -> (axum::http::StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}
