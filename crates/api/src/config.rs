/// Service configuration loaded from environment variables.
///
/// All fields except the tracking URL have defaults suitable for local
/// development; leaving `TRACKING_SERVICE_URL` unset disables tracking.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Path of the script catalog document, re-read on every request.
    pub scripts_path: String,
    /// Namespace holding the execution target pods.
    pub namespace: String,
    /// Label selector identifying the execution target pods.
    pub pod_label_selector: String,
    /// Tracking service base URL; `None` disables tracking entirely.
    pub tracking_url: Option<String>,
    /// Default stage label for tracking records.
    pub tracking_stage: String,
    /// Group label for tracking records.
    pub tracking_group: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on remote command runtime in seconds (default: `300`).
    pub exec_timeout_secs: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                |
    /// |-------------------------|------------------------|
    /// | `HOST`                  | `0.0.0.0`              |
    /// | `PORT`                  | `8080`                 |
    /// | `SCRIPTS_PATH`          | `/config/scripts.json` |
    /// | `NAMESPACE`             | `default`              |
    /// | `POD_LABEL_SELECTOR`    | `app=query-server`     |
    /// | `TRACKING_SERVICE_URL`  | unset (disabled)       |
    /// | `TRACKING_STAGE`        | `EXECUTION`            |
    /// | `TRACKING_GROUP`        | `ScriptExecution`      |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                   |
    /// | `EXEC_TIMEOUT_SECS`     | `300`                  |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "8080")
            .parse()
            .expect("PORT must be a valid u16");

        let tracking_url = std::env::var("TRACKING_SERVICE_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let exec_timeout_secs: u64 = env_or("EXEC_TIMEOUT_SECS", "300")
            .parse()
            .expect("EXEC_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            scripts_path: env_or("SCRIPTS_PATH", "/config/scripts.json"),
            namespace: env_or("NAMESPACE", "default"),
            pod_label_selector: env_or("POD_LABEL_SELECTOR", "app=query-server"),
            tracking_url,
            tracking_stage: env_or("TRACKING_STAGE", "EXECUTION"),
            tracking_group: env_or("TRACKING_GROUP", "ScriptExecution"),
            request_timeout_secs,
            exec_timeout_secs,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
