use super::*;
use crate::clipboard_poller::PollOutcome;
use crate::shared::fs::unique_tmp_dir;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    InstallGate(String),
    OpenWindow(String),
    StartPoller(u64),
    BuildTray,
    DestroyTray,
    RegisterShortcut(String),
    UnregisterAll,
    Show,
    Hide,
    Focus,
    Pin(bool),
    Emit(String),
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    clipboard: String,
    visible: bool,
    live_windows: usize,
    max_live_windows: usize,
    opened_specs: Vec<WindowSpec>,
    fail_window: bool,
    fail_shortcut: bool,
}

#[derive(Clone, Default)]
struct FakeHost(Rc<RefCell<FakeState>>);

impl FakeHost {
    fn record(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    fn count(&self, call: &Call) -> usize {
        self.0.borrow().calls.iter().filter(|c| *c == call).count()
    }

    fn emitted(&self) -> Vec<String> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Emit(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn set_clipboard(&self, text: &str) {
        self.0.borrow_mut().clipboard = text.to_string();
    }

    fn visible(&self) -> bool {
        self.0.borrow().visible
    }

    fn live_windows(&self) -> usize {
        self.0.borrow().live_windows
    }

    fn max_live_windows(&self) -> usize {
        self.0.borrow().max_live_windows
    }
}

struct FakeWindow(FakeHost);

impl Drop for FakeWindow {
    fn drop(&mut self) {
        self.0 .0.borrow_mut().live_windows -= 1;
    }
}

impl HostWindow for FakeWindow {
    fn is_visible(&self) -> bool {
        self.0.visible()
    }

    fn show(&self) -> Result<(), String> {
        self.0.record(Call::Show);
        self.0 .0.borrow_mut().visible = true;
        Ok(())
    }

    fn hide(&self) -> Result<(), String> {
        self.0.record(Call::Hide);
        self.0 .0.borrow_mut().visible = false;
        Ok(())
    }

    fn set_focus(&self) -> Result<(), String> {
        self.0.record(Call::Focus);
        Ok(())
    }

    fn set_always_on_top(&self, pinned: bool) -> Result<(), String> {
        self.0.record(Call::Pin(pinned));
        Ok(())
    }

    fn emit_clipboard_change(&self, text: &str) -> Result<(), String> {
        self.0.record(Call::Emit(text.to_string()));
        Ok(())
    }
}

struct FakeTray(FakeHost);

impl HostTray for FakeTray {
    fn destroy(self) {
        self.0.record(Call::DestroyTray);
    }
}

impl DesktopHost for FakeHost {
    type Window = FakeWindow;
    type Tray = FakeTray;

    fn install_permission_gate(&mut self, window_label: &str) -> Result<(), String> {
        self.record(Call::InstallGate(window_label.to_string()));
        Ok(())
    }

    fn open_window(&mut self, spec: &WindowSpec) -> Result<Self::Window, String> {
        if self.0.borrow().fail_window {
            return Err("ENTRY_MISSING: index.html".to_string());
        }
        self.record(Call::OpenWindow(spec.label.to_string()));
        let mut state = self.0.borrow_mut();
        state.opened_specs.push(spec.clone());
        state.visible = true;
        state.live_windows += 1;
        state.max_live_windows = state.max_live_windows.max(state.live_windows);
        drop(state);
        Ok(FakeWindow(self.clone()))
    }

    fn start_clipboard_poller(&mut self, instance: WindowInstance, _period: Duration) {
        self.record(Call::StartPoller(instance.id()));
    }

    fn read_clipboard_text(&self) -> String {
        self.0.borrow().clipboard.clone()
    }

    fn build_tray(&mut self, _spec: &TraySpec) -> Result<Self::Tray, String> {
        self.record(Call::BuildTray);
        Ok(FakeTray(self.clone()))
    }

    fn register_shortcut(&mut self, accelerator: &str) -> Result<(), String> {
        self.record(Call::RegisterShortcut(accelerator.to_string()));
        if self.0.borrow().fail_shortcut {
            return Err("SHORTCUT_REGISTER: already registered by another process".to_string());
        }
        Ok(())
    }

    fn unregister_all_shortcuts(&mut self) -> Result<(), String> {
        self.record(Call::UnregisterAll);
        Ok(())
    }
}

fn write_icon(dir: &Path) {
    image::RgbaImage::from_pixel(32, 32, image::Rgba([0, 128, 255, 255]))
        .save_with_format(dir.join(ICON_FILE_NAME), image::ImageFormat::Png)
        .expect("write icon");
}

struct Fixture {
    host: FakeHost,
    shell: Shell<FakeHost>,
    dir: PathBuf,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn fixture_with(
    with_icon: bool,
    stay_resident: bool,
    configure: impl FnOnce(&mut FakeState),
) -> Fixture {
    let dir = unique_tmp_dir("shell");
    if with_icon {
        write_icon(&dir);
    }
    let host = FakeHost::default();
    configure(&mut host.0.borrow_mut());
    let config = ShellConfig {
        dev_server_url: None,
        public_dir: dir.clone(),
        poll_interval: Duration::from_millis(1000),
        stay_resident,
    };
    Fixture {
        shell: Shell::new(host.clone(), config),
        host,
        dir,
    }
}

fn fixture() -> Fixture {
    fixture_with(true, false, |_| {})
}

fn ready(fx: &mut Fixture) {
    fx.shell.handle(HostEvent::Ready).expect("ready");
}

fn first_instance() -> WindowInstance {
    WindowInstance(1)
}

#[test]
fn ready_creates_window_tray_and_shortcut() {
    let mut fx = fixture();
    ready(&mut fx);

    assert_eq!(fx.shell.phase(), LifecyclePhase::Running);
    assert!(fx.shell.has_window());
    assert!(fx.shell.has_tray());
    assert!(fx.shell.shortcut_registered());
    assert_eq!(
        fx.host.calls(),
        vec![
            Call::InstallGate(MAIN_WINDOW_LABEL.to_string()),
            Call::OpenWindow(MAIN_WINDOW_LABEL.to_string()),
            Call::StartPoller(1),
            Call::BuildTray,
            Call::RegisterShortcut(TOGGLE_SHORTCUT.to_string()),
        ]
    );
}

#[test]
fn window_spec_is_frameless_with_isolated_partition() {
    let mut fx = fixture();
    ready(&mut fx);

    let specs = fx.host.0.borrow().opened_specs.clone();
    assert_eq!(specs.len(), 1);
    let spec = &specs[0];
    assert!(!spec.decorations);
    assert_eq!(spec.storage_partition, "clipboard-history");
    assert_eq!(spec.content, ContentSource::Packaged("index.html"));
    let icon = spec.icon.as_ref().expect("window icon loaded");
    assert_eq!((icon.width, icon.height), (32, 32));
}

#[test]
fn dev_server_url_takes_precedence_over_packaged_entry() {
    let mut fx = fixture();
    fx.shell.config.dev_server_url = Some("http://localhost:5173/".to_string());
    ready(&mut fx);

    let specs = fx.host.0.borrow().opened_specs.clone();
    assert_eq!(
        specs[0].content,
        ContentSource::DevServer("http://localhost:5173/".to_string())
    );
}

#[test]
fn missing_icon_leaves_tray_unset_and_window_usable() {
    let mut fx = fixture_with(false, false, |_| {});
    ready(&mut fx);

    assert!(fx.shell.has_window());
    assert!(!fx.shell.has_tray());
    assert_eq!(fx.host.count(&Call::BuildTray), 0);
    let specs = fx.host.0.borrow().opened_specs.clone();
    assert!(specs[0].icon.is_none());

    fx.shell.handle(HostEvent::WillQuit).expect("will quit");
    assert_eq!(fx.host.count(&Call::DestroyTray), 0);
    assert_eq!(fx.host.count(&Call::UnregisterAll), 1);
}

#[test]
fn undecodable_icon_omits_tray_but_window_keeps_working() {
    let mut fx = fixture_with(false, false, |_| {});
    std::fs::write(fx.dir.join(ICON_FILE_NAME), b"definitely not an icon").expect("write");
    ready(&mut fx);

    assert_eq!(fx.shell.phase(), LifecyclePhase::Running);
    assert!(fx.shell.has_window());
    assert!(!fx.shell.has_tray());
    assert_eq!(fx.host.count(&Call::BuildTray), 0);
    let specs = fx.host.0.borrow().opened_specs.clone();
    assert!(specs[0].icon.is_none());

    fx.shell.toggle_window();
    assert!(!fx.host.visible());
    fx.shell.toggle_window();
    assert!(fx.host.visible());

    fx.shell.handle(HostEvent::WillQuit).expect("will quit");
    assert_eq!(fx.host.count(&Call::DestroyTray), 0);
    assert_eq!(fx.host.count(&Call::UnregisterAll), 1);
}

#[test]
fn shortcut_conflict_keeps_toggle_working() {
    let mut fx = fixture_with(true, false, |state| state.fail_shortcut = true);
    ready(&mut fx);

    assert!(!fx.shell.shortcut_registered());
    assert_eq!(fx.shell.phase(), LifecyclePhase::Running);

    fx.shell.toggle_window();
    assert!(!fx.host.visible());
    fx.shell.toggle_window();
    assert!(fx.host.visible());
}

#[test]
fn toggle_twice_restores_visibility() {
    let mut fx = fixture();
    ready(&mut fx);

    assert!(fx.host.visible());
    fx.shell.toggle_window();
    fx.shell.toggle_window();
    assert!(fx.host.visible());

    fx.shell.toggle_window();
    assert!(!fx.host.visible());
    fx.shell.toggle_window();
    fx.shell.toggle_window();
    assert!(!fx.host.visible());
}

#[test]
fn toggle_shows_and_focuses_hidden_window() {
    let mut fx = fixture();
    ready(&mut fx);
    fx.shell.toggle_window();

    let before = fx.host.calls().len();
    fx.shell.toggle_window();
    assert_eq!(&fx.host.calls()[before..], &[Call::Show, Call::Focus]);
}

#[test]
fn toggle_without_window_creates_one() {
    let mut fx = fixture();
    ready(&mut fx);
    fx.shell.on_window_destroyed();
    assert!(!fx.shell.has_window());

    fx.shell.toggle_window();
    assert!(fx.shell.has_window());
    assert_eq!(fx.host.live_windows(), 1);
    assert_eq!(fx.host.count(&Call::StartPoller(2)), 1);
}

#[test]
fn at_most_one_window_is_ever_live() {
    let mut fx = fixture();
    ready(&mut fx);

    for round in 0..5 {
        fx.shell.toggle_window();
        fx.shell.handle(HostEvent::Activate).expect("activate");
        fx.shell.reveal_window();
        if round % 2 == 0 {
            fx.shell.on_window_destroyed();
        }
        fx.shell.handle(HostEvent::Activate).expect("activate");
        fx.shell.toggle_window();
    }

    assert_eq!(fx.host.max_live_windows(), 1);
    assert!(fx.host.live_windows() <= 1);
}

#[test]
fn activate_with_no_window_creates_exactly_one() {
    let mut fx = fixture_with(true, true, |_| {});
    ready(&mut fx);
    fx.shell.on_window_destroyed();
    assert_eq!(fx.host.live_windows(), 0);

    fx.shell.handle(HostEvent::Activate).expect("activate");
    assert_eq!(fx.host.live_windows(), 1);
    fx.shell.handle(HostEvent::Activate).expect("activate");
    assert_eq!(fx.host.live_windows(), 1);
    assert_eq!(
        fx.host.count(&Call::OpenWindow(MAIN_WINDOW_LABEL.to_string())),
        2
    );
}

#[test]
fn all_windows_closed_quits_and_clears_on_non_resident_platform() {
    let mut fx = fixture_with(true, false, |_| {});
    ready(&mut fx);

    let decision = fx.shell.handle(HostEvent::AllWindowsClosed).expect("closed");
    assert_eq!(decision, ExitDecision::Proceed);
    assert!(!fx.shell.has_window());
}

#[test]
fn all_windows_closed_stays_resident_on_resident_platform() {
    let mut fx = fixture_with(true, true, |_| {});
    ready(&mut fx);
    fx.shell.on_window_destroyed();

    let decision = fx.shell.handle(HostEvent::AllWindowsClosed).expect("closed");
    assert_eq!(decision, ExitDecision::StayResident);
    assert!(fx.shell.has_tray());
}

#[test]
fn will_quit_unregisters_and_destroys_tray_once() {
    let mut fx = fixture();
    ready(&mut fx);

    fx.shell.handle(HostEvent::WillQuit).expect("will quit");
    fx.shell.handle(HostEvent::WillQuit).expect("will quit again");

    assert_eq!(fx.shell.phase(), LifecyclePhase::Exited);
    assert!(!fx.shell.has_tray());
    assert!(!fx.shell.has_window());
    assert_eq!(fx.host.count(&Call::DestroyTray), 1);
    assert_eq!(fx.host.count(&Call::UnregisterAll), 1);

    let calls = fx.host.calls();
    let unregister_at = calls
        .iter()
        .position(|c| *c == Call::UnregisterAll)
        .expect("unregister call");
    let destroy_at = calls
        .iter()
        .position(|c| *c == Call::DestroyTray)
        .expect("destroy call");
    assert!(unregister_at < destroy_at);
}

#[test]
fn will_quit_unregisters_even_when_registration_failed() {
    let mut fx = fixture_with(true, false, |state| state.fail_shortcut = true);
    ready(&mut fx);

    fx.shell.handle(HostEvent::WillQuit).expect("will quit");
    assert_eq!(fx.host.count(&Call::UnregisterAll), 1);
    assert_eq!(fx.host.count(&Call::DestroyTray), 1);
}

#[test]
fn ready_fails_when_window_cannot_load_content() {
    let mut fx = fixture_with(true, false, |state| state.fail_window = true);

    let err = fx.shell.handle(HostEvent::Ready).unwrap_err();
    assert!(err.starts_with("ENTRY_MISSING"), "{err}");
    assert_eq!(fx.shell.phase(), LifecyclePhase::Starting);
    assert_eq!(fx.host.count(&Call::BuildTray), 0);

    fx.shell.handle(HostEvent::WillQuit).expect("will quit");
    assert_eq!(fx.host.count(&Call::UnregisterAll), 1);
    assert_eq!(fx.host.count(&Call::DestroyTray), 0);
}

#[test]
fn nothing_reopens_after_will_quit() {
    let mut fx = fixture();
    ready(&mut fx);
    fx.shell.handle(HostEvent::WillQuit).expect("will quit");

    fx.shell.toggle_window();
    fx.shell.reveal_window();
    fx.shell.handle(HostEvent::Activate).expect("activate");
    assert!(!fx.shell.has_window());
    assert_eq!(
        fx.host.count(&Call::OpenWindow(MAIN_WINDOW_LABEL.to_string())),
        1
    );
}

#[test]
fn poll_scenario_a_b_a() {
    let mut fx = fixture();
    fx.host.set_clipboard("A");
    ready(&mut fx);
    let instance = first_instance();

    assert_eq!(fx.shell.poll_clipboard(instance), PollOutcome::Unchanged);
    fx.host.set_clipboard("B");
    assert_eq!(fx.shell.poll_clipboard(instance), PollOutcome::Changed);
    fx.host.set_clipboard("A");
    assert_eq!(fx.shell.poll_clipboard(instance), PollOutcome::Changed);
    assert_eq!(fx.shell.poll_clipboard(instance), PollOutcome::Unchanged);

    assert_eq!(fx.host.emitted(), vec!["B", "A"]);
}

#[test]
fn poll_keeps_running_while_hidden() {
    let mut fx = fixture();
    ready(&mut fx);
    fx.shell.toggle_window();
    assert!(!fx.host.visible());

    fx.host.set_clipboard("copied while hidden");
    assert_eq!(fx.shell.poll_clipboard(first_instance()), PollOutcome::Changed);
    assert_eq!(fx.host.emitted(), vec!["copied while hidden"]);
}

#[test]
fn stale_poller_never_emits_to_a_recreated_window() {
    let mut fx = fixture();
    ready(&mut fx);
    let old = first_instance();

    fx.shell.on_window_destroyed();
    fx.host.set_clipboard("after destroy");
    assert_eq!(fx.shell.poll_clipboard(old), PollOutcome::SurfaceGone);

    fx.shell.toggle_window();
    assert_eq!(fx.shell.poll_clipboard(old), PollOutcome::SurfaceGone);
    assert!(fx.host.emitted().is_empty());

    fx.host.set_clipboard("fresh");
    assert_eq!(
        fx.shell.poll_clipboard(WindowInstance(2)),
        PollOutcome::Changed
    );
    assert_eq!(fx.host.emitted(), vec!["fresh"]);
}

#[test]
fn pin_without_window_is_a_no_op() {
    let mut fx = fixture_with(true, false, |state| state.fail_window = true);
    fx.shell.set_always_on_top(true);
    assert!(fx.host.calls().is_empty());

    fx.host.0.borrow_mut().fail_window = false;
    ready(&mut fx);
    fx.shell.set_always_on_top(true);
    fx.shell.set_always_on_top(false);
    assert_eq!(fx.host.count(&Call::Pin(true)), 1);
    assert_eq!(fx.host.count(&Call::Pin(false)), 1);
}

#[test]
fn reveal_never_hides_a_visible_window() {
    let mut fx = fixture();
    ready(&mut fx);

    fx.shell.reveal_window();
    fx.shell.reveal_window();
    assert!(fx.host.visible());
    assert_eq!(fx.host.count(&Call::Hide), 0);
}

#[test]
fn duplicate_ready_is_ignored() {
    let mut fx = fixture();
    ready(&mut fx);
    ready(&mut fx);

    assert_eq!(fx.host.count(&Call::BuildTray), 1);
    assert_eq!(
        fx.host
            .count(&Call::RegisterShortcut(TOGGLE_SHORTCUT.to_string())),
        1
    );
}
