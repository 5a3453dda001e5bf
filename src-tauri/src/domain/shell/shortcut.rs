//! Usage: Global toggle shortcut (register at startup, unregister-all at shutdown).

use super::DesktopHost;

pub(crate) const TOGGLE_SHORTCUT: &str = "CommandOrControl+Alt+Q";

pub(crate) struct ShortcutRegistrar {
    accelerator: String,
    registered: bool,
}

impl ShortcutRegistrar {
    pub(crate) fn new(accelerator: &str) -> Self {
        Self {
            accelerator: accelerator.to_string(),
            registered: false,
        }
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.registered
    }

    /// Binds the accelerator to the toggle action. Failure is reported, never retried.
    pub(crate) fn register<H: DesktopHost>(&mut self, host: &mut H) -> bool {
        match host.register_shortcut(&self.accelerator) {
            Ok(()) => {
                tracing::info!(accelerator = %self.accelerator, "全局快捷键已注册");
                self.registered = true;
            }
            Err(err) => {
                tracing::error!(accelerator = %self.accelerator, "快捷键注册失败: {}", err);
                self.registered = false;
            }
        }
        self.registered
    }

    /// Always asks the host, whether or not `register` succeeded.
    pub(crate) fn unregister_all<H: DesktopHost>(&mut self, host: &mut H) {
        if let Err(err) = host.unregister_all_shortcuts() {
            tracing::warn!("注销全局快捷键失败: {}", err);
        }
        self.registered = false;
    }
}
