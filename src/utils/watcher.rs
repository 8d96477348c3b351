//! File modification watcher.
//!
//! Polled from an event-loop timer, so checking never blocks on anything other than a `stat`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Interval at which the config file is polled.
pub const POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

#[derive(Debug)]
pub struct Watcher {
    path: PathBuf,
    last: Option<FileStamp>,
}

impl Watcher {
    pub fn new(path: PathBuf) -> Self {
        let last = stamp(&path);
        Self { path, last }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the file changed since the previous check.
    ///
    /// A file that disappears is not a change; its reappearance is.
    pub fn check(&mut self) -> bool {
        let Some(new) = stamp(&self.path) else {
            self.last = None;
            return false;
        };

        if self.last == Some(new) {
            return false;
        }

        self.last = Some(new);
        true
    }
}

fn stamp(path: &Path) -> Option<FileStamp> {
    let metadata = fs::metadata(path).ok()?;
    Some(FileStamp {
        modified: metadata.modified().ok()?,
        len: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn detects_content_change() {
        let dir = std::env::temp_dir().join(format!("cairn-watcher-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.kdl");
        fs::write(&path, "layout {}").unwrap();

        let mut watcher = Watcher::new(path.clone());
        assert!(!watcher.check());

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\nlayout { gaps 4; }").unwrap();
        drop(file);
        assert!(watcher.check());
        assert!(!watcher.check());

        fs::remove_file(&path).unwrap();
        assert!(!watcher.check());

        fs::write(&path, "layout {}").unwrap();
        assert!(watcher.check());

        fs::remove_dir_all(&dir).unwrap();
    }
}
