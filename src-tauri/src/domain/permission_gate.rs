//! Usage: Runtime permission allow-list for the clipboard surface (single source of truth).

pub(crate) const ALLOWED_PERMISSIONS: [&str; 2] = ["clipboard-read", "clipboard-write"];

pub(crate) fn is_allowed(permission: &str) -> bool {
    ALLOWED_PERMISSIONS.contains(&permission)
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PermissionDecision {
    Grant,
    Deny,
}

/// Decision for one permission request raised by the window's content.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn decide(permission: &str) -> PermissionDecision {
    if is_allowed(permission) {
        return PermissionDecision::Grant;
    }
    tracing::info!(permission, "已拒绝 webview 权限请求");
    PermissionDecision::Deny
}

/// Permission identifier for a WebKitGTK permission request, keyed by its GObject type name.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn webkit_request_permission(type_name: &str) -> &'static str {
    match type_name {
        "WebKitClipboardPermissionRequest" => "clipboard-read",
        "WebKitGeolocationPermissionRequest" => "geolocation",
        "WebKitNotificationPermissionRequest" => "notifications",
        "WebKitUserMediaPermissionRequest" | "WebKitDeviceInfoPermissionRequest" => "media",
        "WebKitPointerLockPermissionRequest" => "pointerLock",
        "WebKitMediaKeySystemPermissionRequest" => "mediaKeySystem",
        "WebKitWebsiteDataAccessPermissionRequest" => "storage-access",
        _ => "unknown",
    }
}

/// Maps an allowed permission to the IPC permission that backs it on the host.
/// Returns `None` for anything outside the allow-list.
pub(crate) fn ipc_permission(permission: &str) -> Option<&'static str> {
    match permission {
        "clipboard-read" => Some("clipboard-manager:allow-read-text"),
        "clipboard-write" => Some("clipboard-manager:allow-write-text"),
        _ => None,
    }
}

pub(crate) fn granted_ipc_permissions() -> Vec<&'static str> {
    ALLOWED_PERMISSIONS
        .iter()
        .filter_map(|permission| ipc_permission(permission))
        .collect()
}
