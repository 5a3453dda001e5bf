//! Usage: Single application window slot (create / toggle / pin / clipboard polling).

use super::{DesktopHost, HostWindow, ShellConfig, MAIN_WINDOW_LABEL};
use crate::clipboard_poller::{ClipboardPoller, PollOutcome};
use crate::icon::{self, IconImage};

pub(crate) const PACKAGED_ENTRY: &str = "index.html";
pub(crate) const STORAGE_PARTITION: &str = "clipboard-history";
const WINDOW_TITLE: &str = "CuePaste";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ContentSource {
    DevServer(String),
    Packaged(&'static str),
}

#[derive(Debug, Clone)]
pub(crate) struct WindowSpec {
    pub label: &'static str,
    pub title: &'static str,
    pub content: ContentSource,
    pub icon: Option<IconImage>,
    /// Name of the persistent storage partition isolated to this surface.
    pub storage_partition: &'static str,
    pub decorations: bool,
}

/// Identifies one window instance so a poller never outlives the window it was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WindowInstance(pub(super) u64);

impl WindowInstance {
    pub(crate) fn id(self) -> u64 {
        self.0
    }
}

struct LiveWindow<W> {
    handle: W,
    instance: WindowInstance,
    poller: ClipboardPoller,
}

pub(crate) struct WindowController<W> {
    slot: Option<LiveWindow<W>>,
    next_instance: u64,
}

impl<W> Default for WindowController<W> {
    fn default() -> Self {
        Self {
            slot: None,
            next_instance: 1,
        }
    }
}

impl<W: HostWindow> WindowController<W> {
    pub(crate) fn exists(&self) -> bool {
        self.slot.is_some()
    }

    /// Builds the window and starts its clipboard poller. Keeps the live window if one exists.
    pub(crate) fn create<H>(
        &mut self,
        host: &mut H,
        config: &ShellConfig,
    ) -> Result<WindowInstance, String>
    where
        H: DesktopHost<Window = W>,
    {
        if let Some(live) = self.slot.as_ref() {
            tracing::debug!(instance = live.instance.id(), "窗口已存在，跳过创建");
            return Ok(live.instance);
        }

        // Gate goes in before any content can load.
        host.install_permission_gate(MAIN_WINDOW_LABEL)?;

        let spec = WindowSpec {
            label: MAIN_WINDOW_LABEL,
            title: WINDOW_TITLE,
            content: config.content_source(),
            icon: load_window_icon(config),
            storage_partition: STORAGE_PARTITION,
            decorations: false,
        };
        let handle = host.open_window(&spec)?;

        let instance = WindowInstance(self.next_instance);
        self.next_instance += 1;

        let poller = ClipboardPoller::start(host.read_clipboard_text());
        self.slot = Some(LiveWindow {
            handle,
            instance,
            poller,
        });
        host.start_clipboard_poller(instance, config.poll_interval);

        tracing::info!(instance = instance.id(), "窗口已创建");
        Ok(instance)
    }

    pub(crate) fn toggle<H>(&mut self, host: &mut H, config: &ShellConfig) -> Result<(), String>
    where
        H: DesktopHost<Window = W>,
    {
        match self.slot.as_ref() {
            None => self.create(host, config).map(|_| ()),
            Some(live) if live.handle.is_visible() => live.handle.hide(),
            Some(live) => {
                live.handle.show()?;
                live.handle.set_focus()
            }
        }
    }

    pub(crate) fn reveal<H>(&mut self, host: &mut H, config: &ShellConfig) -> Result<(), String>
    where
        H: DesktopHost<Window = W>,
    {
        match self.slot.as_ref() {
            None => self.create(host, config).map(|_| ()),
            Some(live) => {
                live.handle.show()?;
                live.handle.set_focus()
            }
        }
    }

    pub(crate) fn set_always_on_top(&self, pinned: bool) {
        let Some(live) = self.slot.as_ref() else {
            return;
        };
        if let Err(err) = live.handle.set_always_on_top(pinned) {
            tracing::warn!(pinned, "窗口置顶失败: {}", err);
        }
    }

    pub(crate) fn clear(&mut self) {
        if let Some(live) = self.slot.take() {
            tracing::debug!(instance = live.instance.id(), "窗口引用已清除");
        }
    }

    /// One poll tick for `instance`: at most one clipboard read and one emission.
    pub(crate) fn poll_clipboard<H>(&mut self, host: &H, instance: WindowInstance) -> PollOutcome
    where
        H: DesktopHost<Window = W>,
    {
        let Some(live) = self.slot.as_mut().filter(|live| live.instance == instance) else {
            return PollOutcome::SurfaceGone;
        };

        let Some(text) = live.poller.observe(host.read_clipboard_text()) else {
            return PollOutcome::Unchanged;
        };

        if let Err(err) = live.handle.emit_clipboard_change(text) {
            tracing::warn!(instance = instance.id(), "剪贴板变更通知发送失败: {}", err);
        }
        PollOutcome::Changed
    }
}

fn load_window_icon(config: &ShellConfig) -> Option<IconImage> {
    match icon::load_icon(&config.icon_path(), None) {
        Ok(image) => Some(image),
        Err(err) => {
            tracing::warn!("窗口图标加载失败，使用平台默认图标: {}", err);
            None
        }
    }
}
