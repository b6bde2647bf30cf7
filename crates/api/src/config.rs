use std::time::Duration;

use atlasprint_engine::WorkerConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long a terminal job and its log are kept before eviction
    /// (default: `300`, i.e. five minutes).
    pub retention_secs: u64,
    /// How the external rendering worker is invoked.
    pub worker: WorkerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                              |
    /// |------------------------|--------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                            |
    /// | `PORT`                 | `3000`                               |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                 |
    /// | `JOB_RETENTION_SECS`   | `300`                                |
    /// | `WORKER_PYTHON`        | `python3`                            |
    /// | `WORKER_SCRIPT`        | `python_logic/create_map_poster.py`  |
    /// | `WORKER_DIR`           | unset (inherit current directory)    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let retention_secs: u64 = std::env::var("JOB_RETENTION_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("JOB_RETENTION_SECS must be a valid u64");

        let worker = WorkerConfig {
            python_bin: std::env::var("WORKER_PYTHON").unwrap_or_else(|_| "python3".into()),
            script_path: std::env::var("WORKER_SCRIPT")
                .unwrap_or_else(|_| "python_logic/create_map_poster.py".into()),
            working_dir: std::env::var("WORKER_DIR").ok().filter(|s| !s.is_empty()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            retention_secs,
            worker,
        }
    }

    /// The job retention window as a [`Duration`].
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}
