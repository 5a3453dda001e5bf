//! Usage: Window control commands (pin, show/hide) invoked from the frameless surface.

use crate::app_state::with_shell;

/// `invoke("toggle_pin", { shouldPin })`: keep the window above all others or release it.
#[tauri::command]
pub(crate) fn toggle_pin(app: tauri::AppHandle, should_pin: bool) -> Result<bool, String> {
    with_shell(&app, |shell| shell.set_always_on_top(should_pin))
        .ok_or_else(|| "SHELL_NOT_READY: shell state is not initialized".to_string())?;
    Ok(should_pin)
}

#[tauri::command]
pub(crate) fn window_toggle(app: tauri::AppHandle) -> Result<bool, String> {
    with_shell(&app, |shell| shell.toggle_window())
        .ok_or_else(|| "SHELL_NOT_READY: shell state is not initialized".to_string())?;
    Ok(true)
}
