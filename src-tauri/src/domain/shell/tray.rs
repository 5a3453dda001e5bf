//! Usage: Tray icon slot (created once at startup, destroyed once at shutdown).

use super::{DesktopHost, HostTray, ShellConfig};
use crate::icon::{self, IconImage, TRAY_ICON_SIZE};

pub(crate) const TRAY_ID: &str = "main-tray";
pub(crate) const TRAY_MENU_TOGGLE_ID: &str = "tray.toggle";
pub(crate) const TRAY_MENU_QUIT_ID: &str = "tray.quit";
const TRAY_TOOLTIP: &str = "CuePaste 剪贴板工具";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrayAction {
    ToggleWindow,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TrayMenuEntry {
    Item {
        id: &'static str,
        label: &'static str,
        action: TrayAction,
    },
    Separator,
}

#[derive(Debug, Clone)]
pub(crate) struct TraySpec {
    pub id: &'static str,
    pub icon: IconImage,
    pub tooltip: &'static str,
    pub menu: Vec<TrayMenuEntry>,
    /// Action bound to a left click on the icon itself.
    pub click_action: TrayAction,
}

impl TraySpec {
    pub(crate) fn new(icon: IconImage) -> Self {
        Self {
            id: TRAY_ID,
            icon,
            tooltip: TRAY_TOOLTIP,
            menu: vec![
                TrayMenuEntry::Item {
                    id: TRAY_MENU_TOGGLE_ID,
                    label: "显示/隐藏窗口",
                    action: TrayAction::ToggleWindow,
                },
                TrayMenuEntry::Separator,
                TrayMenuEntry::Item {
                    id: TRAY_MENU_QUIT_ID,
                    label: "退出",
                    action: TrayAction::Quit,
                },
            ],
            click_action: TrayAction::ToggleWindow,
        }
    }

    /// `(menu id, action)` pairs for routing menu clicks back to the shell.
    pub(crate) fn menu_actions(&self) -> Vec<(&'static str, TrayAction)> {
        self.menu
            .iter()
            .filter_map(|entry| match entry {
                TrayMenuEntry::Item { id, action, .. } => Some((*id, *action)),
                TrayMenuEntry::Separator => None,
            })
            .collect()
    }
}

enum TraySlot<T> {
    Unset,
    Live(T),
    Destroyed,
}

pub(crate) struct TrayController<T> {
    slot: TraySlot<T>,
}

impl<T> Default for TrayController<T> {
    fn default() -> Self {
        Self {
            slot: TraySlot::Unset,
        }
    }
}

impl<T: HostTray> TrayController<T> {
    pub(crate) fn exists(&self) -> bool {
        matches!(self.slot, TraySlot::Live(_))
    }

    pub(crate) fn create<H>(&mut self, host: &mut H, config: &ShellConfig) -> Result<(), String>
    where
        H: DesktopHost<Tray = T>,
    {
        if !matches!(self.slot, TraySlot::Unset) {
            return Err("TRAY_ALREADY_CREATED: tray is only created once per session".to_string());
        }

        let icon_path = config.icon_path();
        if !icon_path.is_file() {
            return Err(format!(
                "TRAY_ICON_MISSING: icon file not found: {}",
                icon_path.display()
            ));
        }

        let icon = icon::load_icon(&icon_path, Some(TRAY_ICON_SIZE))?;
        tracing::info!(icon = %icon_path.display(), "正在创建系统托盘");

        let tray = host.build_tray(&TraySpec::new(icon))?;
        self.slot = TraySlot::Live(tray);
        tracing::info!("系统托盘创建成功");
        Ok(())
    }

    /// Releases the tray when present. Later calls do nothing.
    pub(crate) fn destroy(&mut self) {
        match std::mem::replace(&mut self.slot, TraySlot::Destroyed) {
            TraySlot::Live(tray) => {
                tray.destroy();
                tracing::info!("系统托盘已销毁");
            }
            TraySlot::Unset | TraySlot::Destroyed => {}
        }
    }
}
