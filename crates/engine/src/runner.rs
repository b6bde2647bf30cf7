//! Worker process runner.
//!
//! Translates a job's [`PosterConfig`] into the rendering script's
//! argument vector, spawns the worker, and drives the job to a
//! terminal state: every chunk the worker writes to stdout or stderr
//! becomes one log entry (appended and fanned out in the same step),
//! and the exit code decides `completed` vs `failed`. A worker that
//! cannot be spawned sends the job straight to `error` with no output
//! capture.
//!
//! There is no timeout, no retry, and no way to cancel a running
//! worker; disconnecting subscribers does not signal the process.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use atlasprint_core::job::LogChannel;
use atlasprint_core::poster::PosterConfig;

use crate::registry::JobRegistry;

/// Size of one output read; each successful read becomes one log entry.
const READ_CHUNK_BYTES: usize = 8192;

/// Where and how the external rendering worker is invoked.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Python interpreter, typically the worker venv's binary.
    pub python_bin: String,
    /// The rendering script handed to the interpreter.
    pub script_path: String,
    /// Working directory for the worker, if any.
    pub working_dir: Option<String>,
}

/// Build the worker argument vector for a configuration.
///
/// Deterministic mapping: fields with defaults are always emitted,
/// optional fields only when present, and `--full-borders` is a bare
/// flag emitted only when set. Absent optionals are omitted entirely
/// rather than passed as empty strings.
pub fn build_args(script_path: &str, config: &PosterConfig) -> Vec<String> {
    let mut args = vec![script_path.to_string()];

    if let Some(city) = &config.city {
        args.push("--city".to_string());
        args.push(city.clone());
    }
    if let Some(country) = &config.country {
        args.push("--country".to_string());
        args.push(country.clone());
    }

    args.push("--theme".to_string());
    args.push(config.theme.clone());
    args.push("--distance".to_string());
    args.push(config.distance.to_string());
    args.push("-o".to_string());
    args.push(config.orientation.clone());

    if let Some(coords) = &config.coords {
        args.push("--coords".to_string());
        args.push(coords.clone());
    }
    if let Some(title) = &config.title {
        args.push("--title".to_string());
        args.push(title.clone());
    }

    args.push("--title-pos".to_string());
    args.push(config.title_pos.clone());

    if config.full_borders {
        args.push("--full-borders".to_string());
    }

    args
}

/// Launch the worker for `job_id` and detach.
///
/// Returns immediately; the spawned driver task owns the process for
/// its whole lifetime and reports everything through the registry.
pub fn spawn(registry: JobRegistry, worker: WorkerConfig, job_id: String) {
    tokio::spawn(run(registry, worker, job_id));
}

/// Drive one worker process from spawn to terminal state.
async fn run(registry: JobRegistry, worker: WorkerConfig, job_id: String) {
    let Some(config) = registry.config(&job_id).await else {
        return;
    };

    let args = build_args(&worker.script_path, &config);

    let mut cmd = Command::new(&worker.python_bin);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = &worker.working_dir {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Failed to spawn worker");
            registry
                .fail(&job_id, format!("Failed to start worker: {e}"))
                .await;
            return;
        }
    };

    tracing::info!(
        job_id = %job_id,
        worker = %worker.python_bin,
        args = args.len(),
        "Worker spawned",
    );

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_pump = tokio::spawn(pump(
        registry.clone(),
        job_id.clone(),
        LogChannel::Stdout,
        stdout,
    ));
    let stderr_pump = tokio::spawn(pump(
        registry.clone(),
        job_id.clone(),
        LogChannel::Stderr,
        stderr,
    ));

    let status = child.wait().await;

    // Drain both streams to EOF before finalizing, so the terminal
    // event is the last event any subscriber receives.
    let _ = stdout_pump.await;
    let _ = stderr_pump.await;

    match status {
        Ok(status) => {
            let exit_code = status.code().unwrap_or(-1);
            registry.finish(&job_id, exit_code).await;
        }
        Err(e) => {
            registry
                .fail(&job_id, format!("Failed to wait for worker: {e}"))
                .await;
        }
    }
}

/// Forward one output stream into the job log, chunk by chunk.
async fn pump<R>(registry: JobRegistry, job_id: String, channel: LogChannel, stream: Option<R>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return;
    };

    let mut buf = [0u8; READ_CHUNK_BYTES];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let message = String::from_utf8_lossy(&buf[..n]).into_owned();
                registry.append_log(&job_id, channel, message).await;
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, channel = ?channel, error = %e, "Output capture ended");
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
