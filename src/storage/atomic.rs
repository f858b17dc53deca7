//! Crash-safe file replacement.

use std::io;
use std::path::Path;

/// Replaces `path` with `contents`, creating parent directories.
///
/// The body goes to a sibling `.tmp` file first and is renamed over the
/// target, so readers see either the old or the new file, never a
/// truncated one.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, contents)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
