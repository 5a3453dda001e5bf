mod app;
mod commands;
mod domain;
mod infra;
mod shared;

pub(crate) use app::{app_state, resident};
pub(crate) use domain::{clipboard_poller, permission_gate, shell};
pub(crate) use infra::{app_paths, icon, launch_config};

use app_state::{with_shell, ShellState};
use commands::*;
use launch_config::LaunchConfig;
use shell::{ExitDecision, HostEvent, Shell, ShellConfig};
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = tauri::Builder::default().plugin(tauri_plugin_clipboard_manager::init());

    #[cfg(desktop)]
    let builder = builder
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            app_state::schedule(app, |shell| shell.reveal_window());
        }))
        .plugin(tauri_plugin_global_shortcut::Builder::new().build());

    let app = builder
        .on_window_event(resident::on_window_event)
        .setup(|app| {
            crate::app::logging::init(app.handle());

            let launch = LaunchConfig::from_env();
            let shell_config = ShellConfig {
                dev_server_url: launch.dev_server_url.clone(),
                public_dir: app_paths::public_dir(app.handle(), &launch),
                poll_interval: launch.poll_interval,
                stay_resident: cfg!(target_os = "macos"),
            };
            tracing::info!(
                dev_server = launch.is_dev_server(),
                public_dir = %shell_config.public_dir.display(),
                poll_ms = shell_config.poll_interval.as_millis() as u64,
                "启动配置已解析"
            );

            #[cfg(debug_assertions)]
            {
                if launch_config::dev_diagnostics_enabled() {
                    let identifier = &app.config().identifier;
                    let product_name = app.config().product_name.as_deref().unwrap_or("<missing>");
                    tracing::info!(identifier = %identifier, "[dev] tauri identifier");
                    tracing::info!(product_name = %product_name, "[dev] productName");
                    tracing::info!(app_root = %launch.app_root.display(), "[dev] app root");
                    if let Ok(dir) = app.path().app_local_data_dir() {
                        tracing::info!(dir = %dir.display(), "[dev] app local data dir");
                    }
                }
            }

            let host = resident::TauriHost::new(app.handle().clone(), launch.is_dev_server());
            app.manage(ShellState::new(Shell::new(host, shell_config)));

            // A window that cannot present content is fatal; tray and shortcut failures are not.
            with_shell(app.handle(), |shell| {
                shell.handle(HostEvent::Ready)?;
                tracing::info!(
                    phase = ?shell.phase(),
                    window = shell.has_window(),
                    tray = shell.has_tray(),
                    shortcut = shell.shortcut_registered(),
                    "shell 已就绪"
                );
                Ok::<(), String>(())
            })
            .unwrap_or_else(|| Err("SHELL_NOT_READY: shell state is not managed".to_string()))
            .map_err(|err| {
                tracing::error!("主窗口创建失败: {}", err);
                err
            })?;

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            toggle_pin,
            window_toggle,
            app_exit
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| match event {
        // `code == None` means the last window closed rather than an explicit `exit()`.
        tauri::RunEvent::ExitRequested {
            api, code: None, ..
        } => {
            let decision = with_shell(app_handle, |shell| {
                shell.handle(HostEvent::AllWindowsClosed)
            });
            if let Some(Ok(ExitDecision::StayResident)) = decision {
                api.prevent_exit();
            }
        }
        tauri::RunEvent::Exit => crate::app::cleanup::cleanup_before_exit(app_handle),
        #[cfg(target_os = "macos")]
        tauri::RunEvent::Reopen { .. } => {
            with_shell(app_handle, |shell| shell.handle(HostEvent::Activate));
        }
        _ => {}
    });
}
