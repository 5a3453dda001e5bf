//! Usage: Tauri command surface exposed to the clipboard window.

mod app;
mod window;

pub(crate) use app::*;
pub(crate) use window::*;
