//! Usage: App lifecycle command for the frameless window's quit button.

use std::time::Duration;

/// Delay before exiting so the IPC reply still reaches the webview.
const EXIT_REPLY_GRACE: Duration = Duration::from_millis(200);

/// `invoke("app_exit")`: quits through the normal exit path, so shutdown cleanup still runs.
#[tauri::command]
pub(crate) fn app_exit(app: tauri::AppHandle) -> Result<bool, String> {
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(EXIT_REPLY_GRACE).await;
        tracing::info!("收到窗口退出请求");
        app.exit(0);
    });
    Ok(true)
}
