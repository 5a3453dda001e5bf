//! Usage: Launch configuration resolved once from the environment (dev server, asset root, poll period).

use crate::clipboard_poller::DEFAULT_POLL_INTERVAL;
use std::path::PathBuf;
use std::time::Duration;

pub const DEV_SERVER_URL_ENV: &str = "VITE_DEV_SERVER_URL";
pub const APP_ROOT_ENV: &str = "CUEPASTE_APP_ROOT";
pub const POLL_INTERVAL_ENV: &str = "CUEPASTE_POLL_INTERVAL_MS";
pub const DEV_DIAGNOSTICS_ENV: &str = "CUEPASTE_DEV_DIAGNOSTICS";
const MIN_POLL_INTERVAL_MS: u64 = 100;
const MAX_POLL_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub dev_server_url: Option<String>,
    /// Root holding `public/` during development runs.
    pub app_root: PathBuf,
    pub poll_interval: Duration,
}

impl LaunchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dev_server_url = non_blank(lookup(DEV_SERVER_URL_ENV));
        let app_root = non_blank(lookup(APP_ROOT_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(default_app_root);
        let poll_interval = parse_poll_interval(lookup(POLL_INTERVAL_ENV).as_deref());

        Self {
            dev_server_url,
            app_root,
            poll_interval,
        }
    }

    pub fn is_dev_server(&self) -> bool {
        self.dev_server_url.is_some()
    }

    pub fn dev_public_dir(&self) -> PathBuf {
        self.app_root.join("public")
    }
}

pub fn dev_diagnostics_enabled() -> bool {
    std::env::var(DEV_DIAGNOSTICS_ENV)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| v == "1" || v == "true" || v == "yes")
}

/// Repository root, one level above the Tauri crate.
fn default_app_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_poll_interval(raw: Option<&str>) -> Duration {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_POLL_INTERVAL;
    };

    match raw.parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS)),
        Err(err) => {
            tracing::warn!(
                env = POLL_INTERVAL_ENV,
                value = %raw,
                "轮询间隔无法解析，使用默认值: {}",
                err
            );
            DEFAULT_POLL_INTERVAL
        }
    }
}
