//! Resource probe backed by the local file system.

use std::path::Path;

use crate::application::validation::ResourceProbe;

const FILE_URI_PREFIX: &str = "file://";

/// Checks that absolute local paths exist.
///
/// Relative paths, other URI schemes and fonts cannot be verified and are
/// reported as unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemProbe;

impl ResourceProbe for FilesystemProbe {
    fn path_readable(&self, path: &str) -> Option<bool> {
        let path = path.strip_prefix(FILE_URI_PREFIX).unwrap_or(path);
        let path = Path::new(path);
        if !path.is_absolute() {
            return None;
        }
        Some(path.is_file())
    }

    fn font_installed(&self, _face: &str) -> Option<bool> {
        None
    }
}
