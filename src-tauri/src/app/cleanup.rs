//! Usage: Best-effort cleanup hook for the app exit event.

use super::app_state;
use crate::shell::HostEvent;
use std::sync::atomic::{AtomicBool, Ordering};

static CLEANUP_STARTED: AtomicBool = AtomicBool::new(false);

pub(crate) fn cleanup_before_exit(app: &tauri::AppHandle) {
    if CLEANUP_STARTED.swap(true, Ordering::SeqCst) {
        return;
    }

    tracing::info!("收到退出事件，开始清理...");
    let handled = app_state::with_shell(app, |shell| shell.handle(HostEvent::WillQuit));
    if handled.is_none() {
        tracing::warn!("退出清理：shell 未初始化，跳过");
    }
}
