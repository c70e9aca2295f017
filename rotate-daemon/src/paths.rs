use std::path::{Path, PathBuf};

/// Compositor name used when none is configured.
pub const DEFAULT_SOCKET_PREFIX: &str = "sway";

/// Derive the control socket path from the compositor session socket.
///
/// `/run/user/1000/sway-ipc.1000.1234.sock` becomes
/// `/run/user/1000/sway-rotate.1000.1234.sock`, so each window-manager
/// session gets its own daemon.
pub fn socket_path(session_socket: &Path, prefix: &str) -> PathBuf {
    let file_name = session_socket
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ipc_prefix = format!("{prefix}-ipc");
    let suffix = file_name
        .strip_prefix(ipc_prefix.as_str())
        .unwrap_or(file_name.as_str());
    let dir = session_socket.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{prefix}-rotate{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_ipc_marker() {
        let path = socket_path(
            Path::new("/run/user/1000/sway-ipc.1000.4321.sock"),
            DEFAULT_SOCKET_PREFIX,
        );
        assert_eq!(path, PathBuf::from("/run/user/1000/sway-rotate.1000.4321.sock"));
    }

    #[test]
    fn distinct_sessions_never_collide() {
        let a = socket_path(Path::new("/tmp/sway-ipc.1.sock"), "sway");
        let b = socket_path(Path::new("/tmp/sway-ipc.2.sock"), "sway");
        assert_ne!(a, b);
    }

    #[test]
    fn unexpected_name_is_kept_as_suffix() {
        let path = socket_path(Path::new("/tmp/custom.sock"), "sway");
        assert_eq!(path, PathBuf::from("/tmp/sway-rotatecustom.sock"));
    }

    #[test]
    fn custom_prefix() {
        let path = socket_path(Path::new("/tmp/hypr-ipc-7"), "hypr");
        assert_eq!(path, PathBuf::from("/tmp/hypr-rotate-7"));
    }
}
