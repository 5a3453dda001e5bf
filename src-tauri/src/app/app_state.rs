//! Usage: Tauri-managed shell state and the helpers every callback uses to reach it.

use super::resident::TauriHost;
use crate::shared::mutex_ext::MutexExt;
use crate::shell::Shell;
use std::sync::Mutex;
use tauri::Manager;

pub(crate) type AppShell = Shell<TauriHost>;

pub(crate) struct ShellState(pub(crate) Mutex<AppShell>);

impl ShellState {
    pub(crate) fn new(shell: AppShell) -> Self {
        Self(Mutex::new(shell))
    }
}

/// Runs `f` against the shell right away. Returns `None` before setup has managed the state.
pub(crate) fn with_shell<T>(
    app: &tauri::AppHandle,
    f: impl FnOnce(&mut AppShell) -> T,
) -> Option<T> {
    let state = app.try_state::<ShellState>()?;
    let mut shell = state.0.lock_or_recover();
    Some(f(&mut shell))
}

/// Queues `f` onto the main thread so it is serialized with every other shell handler.
pub(crate) fn schedule(app: &tauri::AppHandle, f: impl FnOnce(&mut AppShell) + Send + 'static) {
    let app_for_task = app.clone();
    let dispatched = app.run_on_main_thread(move || {
        if with_shell(&app_for_task, f).is_none() {
            tracing::debug!("shell 尚未初始化，忽略事件");
        }
    });
    if let Err(err) = dispatched {
        tracing::warn!("主线程调度失败: {}", err);
    }
}
