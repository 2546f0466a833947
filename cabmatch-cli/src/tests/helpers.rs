//! Test helpers for writing instance files into temporary workspaces.

use cabmatch_core::DispatchRequest;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Write `contents` to `path`, creating parent directories as needed.
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write file");
}

/// Temporary directory plus its UTF-8 root.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Serialise `request` as pretty JSON at `path`.
pub(super) fn write_instance(path: &Utf8Path, request: &DispatchRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialize instance");
    write_utf8(path, payload.as_bytes());
}
