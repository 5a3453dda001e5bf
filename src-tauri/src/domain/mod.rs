//! Usage: Domain logic (window lifecycle state machine, clipboard change detection, permission policy).

pub(crate) mod clipboard_poller;
pub(crate) mod permission_gate;
pub(crate) mod shell;
