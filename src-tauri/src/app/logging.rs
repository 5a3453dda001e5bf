//! Usage: Tracing bootstrap (stderr + daily rolling file in the app log dir).
//!
//! Best-effort by contract: any failure degrades to fewer sinks and never aborts startup.

use std::sync::OnceLock;
use tauri::Manager;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "cuepaste.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,tauri=warn,wry=off"
    } else {
        "info,tauri=warn,wry=off"
    }
}

fn build_file_writer(app: &tauri::AppHandle) -> Result<NonBlocking, String> {
    let dir = app
        .path()
        .app_log_dir()
        .map_err(|e| format!("failed to resolve app log dir: {e}"))?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("failed to create log dir {}: {e}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    if LOG_GUARD.set(guard).is_err() {
        return Err("log writer already initialized".to_string());
    }
    Ok(writer)
}

/// Routes `log` records from plugins into the tracing sinks. Returns whether it was installed.
fn install_log_bridge() -> bool {
    match tracing_log::LogTracer::init() {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!("log 桥接未启用: {}", err);
            false
        }
    }
}

pub(crate) fn init(app: &tauri::AppHandle) {
    if LOG_GUARD.get().is_some() {
        return;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()));

    let file_layer = match build_file_writer(app) {
        Ok(writer) => Some(fmt::layer().with_ansi(false).with_writer(writer)),
        Err(err) => {
            eprintln!("文件日志初始化失败，仅输出到 stderr: {err}");
            None
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return;
    }
    install_log_bridge();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "日志系统已初始化");
}
