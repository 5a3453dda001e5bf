//! Usage: Window/tray/shortcut lifecycle state machine driven by host application events.
//!
//! `Shell` owns the nullable window and tray slots plus the shortcut binding. The host
//! (Tauri at runtime, an in-memory fake in tests) only executes side effects; every
//! decision about when a window, tray or shortcut exists is made here.

mod shortcut;
mod tray;
mod window;

#[cfg(test)]
mod tests;

pub(crate) use shortcut::{ShortcutRegistrar, TOGGLE_SHORTCUT};
pub(crate) use tray::{TrayAction, TrayController, TrayMenuEntry, TraySpec};
pub(crate) use window::{ContentSource, WindowController, WindowInstance, WindowSpec};

use crate::clipboard_poller::PollOutcome;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const ICON_FILE_NAME: &str = "favicon.ico";

/// Side effects the shell asks the desktop host to perform.
pub(crate) trait DesktopHost {
    type Window: HostWindow;
    type Tray: HostTray;

    /// Restricts the surface of `window_label` to the permission allow-list.
    fn install_permission_gate(&mut self, window_label: &str) -> Result<(), String>;
    fn open_window(&mut self, spec: &WindowSpec) -> Result<Self::Window, String>;
    /// Schedules `Shell::poll_clipboard(instance)` every `period` on the event thread.
    fn start_clipboard_poller(&mut self, instance: WindowInstance, period: Duration);
    /// Current clipboard text; empty or non-text content reads as `""`.
    fn read_clipboard_text(&self) -> String;
    fn build_tray(&mut self, spec: &TraySpec) -> Result<Self::Tray, String>;
    fn register_shortcut(&mut self, accelerator: &str) -> Result<(), String>;
    fn unregister_all_shortcuts(&mut self) -> Result<(), String>;
}

pub(crate) trait HostWindow {
    fn is_visible(&self) -> bool;
    fn show(&self) -> Result<(), String>;
    fn hide(&self) -> Result<(), String>;
    fn set_focus(&self) -> Result<(), String>;
    fn set_always_on_top(&self, pinned: bool) -> Result<(), String>;
    fn emit_clipboard_change(&self, text: &str) -> Result<(), String>;
}

pub(crate) trait HostTray {
    /// Removes the icon from the system tray. Consumes the handle so it cannot run twice.
    fn destroy(self);
}

#[derive(Debug, Clone)]
pub(crate) struct ShellConfig {
    pub dev_server_url: Option<String>,
    pub public_dir: PathBuf,
    pub poll_interval: Duration,
    /// Platform convention of staying alive with no open windows (macOS).
    pub stay_resident: bool,
}

impl ShellConfig {
    pub(crate) fn icon_path(&self) -> PathBuf {
        self.public_dir.join(ICON_FILE_NAME)
    }

    pub(crate) fn content_source(&self) -> ContentSource {
        match self.dev_server_url.as_deref() {
            Some(url) => ContentSource::DevServer(url.to_string()),
            None => ContentSource::Packaged(window::PACKAGED_ENTRY),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostEvent {
    Ready,
    AllWindowsClosed,
    Activate,
    WillQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecyclePhase {
    Starting,
    Running,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitDecision {
    /// Let the host continue its normal flow (including quitting).
    Proceed,
    /// Keep the process alive; the tray or dock remains the entry point.
    StayResident,
}

pub(crate) struct Shell<H: DesktopHost> {
    host: H,
    config: ShellConfig,
    window: WindowController<H::Window>,
    tray: TrayController<H::Tray>,
    shortcut: ShortcutRegistrar,
    phase: LifecyclePhase,
}

impl<H: DesktopHost> Shell<H> {
    pub(crate) fn new(host: H, config: ShellConfig) -> Self {
        Self {
            host,
            config,
            window: WindowController::default(),
            tray: TrayController::default(),
            shortcut: ShortcutRegistrar::new(TOGGLE_SHORTCUT),
            phase: LifecyclePhase::Starting,
        }
    }

    pub(crate) fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub(crate) fn has_window(&self) -> bool {
        self.window.exists()
    }

    pub(crate) fn has_tray(&self) -> bool {
        self.tray.exists()
    }

    pub(crate) fn shortcut_registered(&self) -> bool {
        self.shortcut.is_registered()
    }

    /// Feeds one host lifecycle event through the state machine.
    ///
    /// Only `Ready` can fail: a window that cannot present content is fatal at startup.
    pub(crate) fn handle(&mut self, event: HostEvent) -> Result<ExitDecision, String> {
        match event {
            HostEvent::Ready => self.on_ready().map(|_| ExitDecision::Proceed),
            HostEvent::AllWindowsClosed => Ok(self.on_all_windows_closed()),
            HostEvent::Activate => {
                self.on_activate();
                Ok(ExitDecision::Proceed)
            }
            HostEvent::WillQuit => {
                self.on_will_quit();
                Ok(ExitDecision::Proceed)
            }
        }
    }

    fn on_ready(&mut self) -> Result<(), String> {
        if self.phase != LifecyclePhase::Starting {
            tracing::warn!(phase = ?self.phase, "重复的 ready 事件，已忽略");
            return Ok(());
        }

        self.window.create(&mut self.host, &self.config)?;

        if let Err(err) = self.tray.create(&mut self.host, &self.config) {
            tracing::error!("系统托盘初始化失败: {}", err);
        }

        if !self.shortcut.register(&mut self.host) {
            tracing::info!("全局快捷键不可用，仍可通过托盘或窗口按钮切换");
        }

        self.phase = LifecyclePhase::Running;
        Ok(())
    }

    fn on_all_windows_closed(&mut self) -> ExitDecision {
        if self.config.stay_resident {
            tracing::debug!("所有窗口已关闭，保持常驻");
            return ExitDecision::StayResident;
        }

        tracing::info!("所有窗口已关闭，退出应用");
        self.window.clear();
        ExitDecision::Proceed
    }

    fn on_activate(&mut self) {
        if self.phase != LifecyclePhase::Running || self.window.exists() {
            return;
        }
        if let Err(err) = self.window.create(&mut self.host, &self.config) {
            tracing::error!("重新创建窗口失败: {}", err);
        }
    }

    fn on_will_quit(&mut self) {
        if self.phase == LifecyclePhase::Exited {
            return;
        }
        self.phase = LifecyclePhase::Exited;

        self.shortcut.unregister_all(&mut self.host);
        self.tray.destroy();
        self.window.clear();
        tracing::info!("退出清理完成");
    }

    /// The single action behind the tray click, the tray menu and the global shortcut.
    pub(crate) fn toggle_window(&mut self) {
        if self.phase == LifecyclePhase::Exited {
            return;
        }
        if let Err(err) = self.window.toggle(&mut self.host, &self.config) {
            tracing::error!("切换窗口失败: {}", err);
        }
    }

    /// Shows and focuses the window, creating it when absent. Never hides.
    pub(crate) fn reveal_window(&mut self) {
        if self.phase == LifecyclePhase::Exited {
            return;
        }
        if let Err(err) = self.window.reveal(&mut self.host, &self.config) {
            tracing::error!("显示窗口失败: {}", err);
        }
    }

    pub(crate) fn set_always_on_top(&mut self, pinned: bool) {
        self.window.set_always_on_top(pinned);
    }

    pub(crate) fn on_window_destroyed(&mut self) {
        self.window.clear();
    }

    pub(crate) fn poll_clipboard(&mut self, instance: WindowInstance) -> PollOutcome {
        self.window.poll_clipboard(&self.host, instance)
    }
}
