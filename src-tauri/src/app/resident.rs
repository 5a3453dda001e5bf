//! Usage: Tauri-backed `DesktopHost` (window, tray, shortcut, clipboard polling) and window hooks.

use super::app_state;
use crate::clipboard_poller::{self, PollOutcome, CLIPBOARD_CHANGE_EVENT};
use crate::permission_gate;
use crate::shared::fs::dir_size_bytes;
use crate::shell::{
    ContentSource, DesktopHost, HostTray, HostWindow, TrayAction, TraySpec, WindowInstance,
    WindowSpec, MAIN_WINDOW_LABEL,
};
use crate::{app_paths, icon::IconImage};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tauri::image::Image;
use tauri::ipc::CapabilityBuilder;
use tauri::{Emitter, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

const CLIPBOARD_CAPABILITY_ID: &str = "clipboard-surface";

pub(crate) struct TauriHost {
    app: tauri::AppHandle,
    gate_installed: bool,
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    open_devtools: bool,
}

impl TauriHost {
    pub(crate) fn new(app: tauri::AppHandle, dev_server: bool) -> Self {
        Self {
            app,
            gate_installed: false,
            open_devtools: dev_server && cfg!(debug_assertions),
        }
    }

    fn webview_url(&self, content: &ContentSource) -> Result<WebviewUrl, String> {
        match content {
            ContentSource::DevServer(raw) => {
                let url = raw
                    .parse::<tauri::Url>()
                    .map_err(|e| format!("DEV_SERVER_URL: invalid url={raw}: {e}"))?;
                Ok(WebviewUrl::External(url))
            }
            ContentSource::Packaged(entry) => {
                if self.app.asset_resolver().get((*entry).to_string()).is_none() {
                    return Err(format!("ENTRY_MISSING: packaged entry not found: {entry}"));
                }
                Ok(WebviewUrl::App(PathBuf::from(entry)))
            }
        }
    }
}

fn to_tauri_image(icon: &IconImage) -> Image<'static> {
    Image::new_owned(icon.rgba.clone(), icon.width, icon.height)
}

impl DesktopHost for TauriHost {
    type Window = TauriWindow;
    type Tray = TauriTray;

    fn install_permission_gate(&mut self, window_label: &str) -> Result<(), String> {
        if self.gate_installed {
            return Ok(());
        }

        let capability = permission_gate::granted_ipc_permissions().into_iter().fold(
            CapabilityBuilder::new(CLIPBOARD_CAPABILITY_ID).window(window_label),
            |builder, permission| builder.permission(permission),
        );
        self.app
            .add_capability(capability)
            .map_err(|e| format!("PERMISSION_GATE: failed to add capability: {e}"))?;

        self.gate_installed = true;
        Ok(())
    }

    fn open_window(&mut self, spec: &WindowSpec) -> Result<TauriWindow, String> {
        let url = self.webview_url(&spec.content)?;

        let data_dir = app_paths::partition_dir(&self.app, spec.storage_partition)?;
        tracing::debug!(
            partition = spec.storage_partition,
            dir = %data_dir.display(),
            bytes = dir_size_bytes(&data_dir),
            "webview 数据分区"
        );

        let mut builder = WebviewWindowBuilder::new(&self.app, spec.label, url)
            .title(spec.title)
            .decorations(spec.decorations)
            .data_directory(data_dir);

        if let Some(icon) = spec.icon.as_ref() {
            builder = builder
                .icon(to_tauri_image(icon))
                .map_err(|e| format!("WINDOW_BUILD: failed to set window icon: {e}"))?;
        }

        let window = builder
            .build()
            .map_err(|e| format!("WINDOW_BUILD: {e}"))?;
        install_engine_permission_handler(&window);

        #[cfg(debug_assertions)]
        if self.open_devtools {
            window.open_devtools();
        }

        Ok(TauriWindow(window))
    }

    fn start_clipboard_poller(&mut self, instance: WindowInstance, period: Duration) {
        let app = self.app.clone();
        tauri::async_runtime::spawn(async move {
            let surface_gone = Arc::new(AtomicBool::new(false));

            clipboard_poller::run_poll_loop(period, || {
                if surface_gone.load(Ordering::Relaxed) {
                    return ControlFlow::Break(());
                }

                let app_for_tick = app.clone();
                let gone = Arc::clone(&surface_gone);
                let dispatched = app.run_on_main_thread(move || {
                    let outcome = app_state::with_shell(&app_for_tick, |shell| {
                        shell.poll_clipboard(instance)
                    });
                    if matches!(outcome, None | Some(PollOutcome::SurfaceGone)) {
                        gone.store(true, Ordering::Relaxed);
                    }
                });

                match dispatched {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(err) => {
                        tracing::debug!("剪贴板轮询调度失败，停止轮询: {}", err);
                        ControlFlow::Break(())
                    }
                }
            })
            .await;

            tracing::debug!(instance = instance.id(), "剪贴板轮询已停止");
        });
    }

    fn read_clipboard_text(&self) -> String {
        use tauri_plugin_clipboard_manager::ClipboardExt;

        self.app.clipboard().read_text().unwrap_or_default()
    }

    #[cfg(desktop)]
    fn build_tray(&mut self, spec: &TraySpec) -> Result<TauriTray, String> {
        use crate::shell::TrayMenuEntry;
        use tauri::menu::MenuBuilder;
        use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};

        let menu = spec
            .menu
            .iter()
            .fold(MenuBuilder::new(&self.app), |builder, entry| match entry {
                TrayMenuEntry::Item { id, label, .. } => builder.text(*id, *label),
                TrayMenuEntry::Separator => builder.separator(),
            })
            .build()
            .map_err(|e| format!("failed to create tray menu: {e}"))?;

        let tray_builder = TrayIconBuilder::with_id(spec.id)
            .icon(to_tauri_image(&spec.icon))
            .tooltip(spec.tooltip)
            .menu(&menu);

        #[cfg(target_os = "macos")]
        let tray_builder = tray_builder.icon_as_template(true);

        let click_action = spec.click_action;
        let menu_actions = spec.menu_actions();
        let tray = tray_builder
            .show_menu_on_left_click(false)
            .on_menu_event(move |app, event| {
                let clicked = menu_actions
                    .iter()
                    .find(|(id, _)| event.id.0 == *id)
                    .map(|(_, action)| *action);
                if let Some(action) = clicked {
                    dispatch_tray_action(app, action);
                }
            })
            .on_tray_icon_event(move |tray, event| {
                if let TrayIconEvent::Click {
                    button,
                    button_state,
                    ..
                } = event
                {
                    if button == MouseButton::Left && button_state == MouseButtonState::Up {
                        dispatch_tray_action(tray.app_handle(), click_action);
                    }
                }
            })
            .build(&self.app)
            .map_err(|e| format!("failed to build tray icon: {e}"))?;

        Ok(TauriTray(tray))
    }

    #[cfg(not(desktop))]
    fn build_tray(&mut self, _spec: &TraySpec) -> Result<TauriTray, String> {
        Err("TRAY_UNSUPPORTED: system tray is not available on this platform".to_string())
    }

    #[cfg(desktop)]
    fn register_shortcut(&mut self, accelerator: &str) -> Result<(), String> {
        use std::str::FromStr;
        use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

        let shortcut = Shortcut::from_str(accelerator)
            .map_err(|e| format!("SHORTCUT_REGISTER: invalid accelerator {accelerator}: {e}"))?;

        self.app
            .global_shortcut()
            .on_shortcut(shortcut, |app, _shortcut, event| {
                if event.state != ShortcutState::Pressed {
                    return;
                }
                app_state::schedule(app, |shell| shell.toggle_window());
            })
            .map_err(|e| format!("SHORTCUT_REGISTER: {accelerator}: {e}"))
    }

    #[cfg(not(desktop))]
    fn register_shortcut(&mut self, accelerator: &str) -> Result<(), String> {
        Err(format!(
            "SHORTCUT_REGISTER: global shortcuts unsupported on this platform: {accelerator}"
        ))
    }

    #[cfg(desktop)]
    fn unregister_all_shortcuts(&mut self) -> Result<(), String> {
        use tauri_plugin_global_shortcut::GlobalShortcutExt;

        self.app
            .global_shortcut()
            .unregister_all()
            .map_err(|e| format!("SHORTCUT_UNREGISTER: {e}"))
    }

    #[cfg(not(desktop))]
    fn unregister_all_shortcuts(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Routes every engine-level permission request (geolocation, media, ...) through the gate.
#[cfg(target_os = "linux")]
fn install_engine_permission_handler(window: &WebviewWindow) {
    use glib::prelude::ObjectExt;
    use permission_gate::PermissionDecision;
    use webkit2gtk::{PermissionRequestExt, WebViewExt};

    let installed = window.with_webview(|webview| {
        webview.inner().connect_permission_request(|_, request| {
            let permission = permission_gate::webkit_request_permission(request.type_().name());
            match permission_gate::decide(permission) {
                PermissionDecision::Grant => request.allow(),
                PermissionDecision::Deny => request.deny(),
            }
            true
        });
    });
    if let Err(err) = installed {
        tracing::warn!("webview 权限拦截安装失败: {}", err);
    }
}

// WebView2 and WKWebView keep their own prompt policy; only IPC access is gated there.
#[cfg(not(target_os = "linux"))]
fn install_engine_permission_handler(_window: &WebviewWindow) {
    tracing::debug!("当前平台的 webview 权限请求沿用引擎默认策略");
}

#[cfg(desktop)]
fn dispatch_tray_action(app: &tauri::AppHandle, action: TrayAction) {
    match action {
        TrayAction::ToggleWindow => app_state::schedule(app, |shell| shell.toggle_window()),
        TrayAction::Quit => app.exit(0),
    }
}

pub(crate) struct TauriWindow(WebviewWindow);

impl HostWindow for TauriWindow {
    fn is_visible(&self) -> bool {
        self.0.is_visible().unwrap_or(false)
    }

    fn show(&self) -> Result<(), String> {
        self.0.show().map_err(|e| format!("failed to show window: {e}"))
    }

    fn hide(&self) -> Result<(), String> {
        self.0.hide().map_err(|e| format!("failed to hide window: {e}"))
    }

    fn set_focus(&self) -> Result<(), String> {
        self.0
            .set_focus()
            .map_err(|e| format!("failed to focus window: {e}"))
    }

    fn set_always_on_top(&self, pinned: bool) -> Result<(), String> {
        self.0
            .set_always_on_top(pinned)
            .map_err(|e| format!("failed to set always-on-top: {e}"))
    }

    fn emit_clipboard_change(&self, text: &str) -> Result<(), String> {
        self.0
            .emit_to(self.0.label(), CLIPBOARD_CHANGE_EVENT, text)
            .map_err(|e| format!("CLIPBOARD_EMIT: {e}"))
    }
}

#[cfg(desktop)]
pub(crate) struct TauriTray(tauri::tray::TrayIcon);

#[cfg(desktop)]
impl HostTray for TauriTray {
    fn destroy(self) {
        // The manager keeps its own clone; the icon disappears once both are dropped.
        let id = self.0.id().0.clone();
        let removed = self.0.app_handle().remove_tray_by_id(id.as_str());
        drop(removed);
    }
}

#[cfg(not(desktop))]
pub(crate) struct TauriTray;

#[cfg(not(desktop))]
impl HostTray for TauriTray {
    fn destroy(self) {}
}

pub fn on_window_event(window: &tauri::Window, event: &tauri::WindowEvent) {
    if window.label() != MAIN_WINDOW_LABEL {
        return;
    }

    if let tauri::WindowEvent::Destroyed = event {
        // Runs on the event thread outside any shell call, so locking here cannot re-enter.
        app_state::with_shell(window.app_handle(), |shell| shell.on_window_destroyed());
    }
}
