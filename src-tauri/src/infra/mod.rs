//! Usage: Infrastructure adapters (filesystem paths, icon decoding, launch environment).

pub(crate) mod app_paths;
pub(crate) mod icon;
pub(crate) mod launch_config;
