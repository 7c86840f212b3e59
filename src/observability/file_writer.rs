//! Append-only line writer that rotates by size.
//!
//! When the active file grows past [`RotationPolicy::max_bytes`] it is renamed to
//! `<stem>.<YYYYmmdd-HHMMSS.fff>.<ext>` and a fresh file is started. Only the newest
//! [`RotationPolicy::max_backups`] rotated files are kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub max_backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_backups: 3,
        }
    }
}

pub struct FileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    file: Mutex<Option<File>>,
}

impl FileWriter {
    pub const fn new(path: PathBuf, policy: RotationPolicy) -> Self {
        Self {
            path,
            policy,
            file: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if the file is over the limit.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from rotating, opening or writing the file.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("trace writer lock poisoned: {e}")))?;

        if self.needs_rotation() {
            *guard = None;
            self.rotate()?;
        }

        if guard.is_none() {
            *guard = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        let Some(file) = guard.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::Other, "trace file unavailable"));
        };
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn needs_rotation(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|m| m.len() > self.policy.max_bytes)
    }

    fn backup_prefix(&self) -> Option<String> {
        let stem = self.path.file_stem()?.to_str()?;
        Some(format!("{stem}."))
    }

    fn rotate(&self) -> io::Result<()> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        let backup = match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.path.with_extension(format!("{stamp}.{ext}")),
            None => self.path.with_extension(stamp.to_string()),
        };
        fs::rename(&self.path, &backup)?;
        self.prune_backups()
    }

    /// Deletes rotated files beyond the retention limit, oldest first.
    fn prune_backups(&self) -> io::Result<()> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        let Some(prefix) = self.backup_prefix() else {
            return Ok(());
        };

        let mut backups: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path != &self.path && is_backup_of(path, &prefix))
            .collect();
        // timestamps sort lexically, newest last
        backups.sort();

        let excess = backups.len().saturating_sub(self.policy.max_backups);
        for old in backups.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&old) {
                tracing::debug!(path = ?old, error = %e, "failed to remove old trace file");
            }
        }
        Ok(())
    }
}

fn is_backup_of(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(prefix) && name[prefix.len()..].starts_with(|c: char| c.is_ascii_digit()))
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let writer = FileWriter::new(path.clone(), RotationPolicy::default());
        writer.write_line("{\"a\":1}").unwrap();
        writer.write_line("{\"b\":2}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn rotates_and_keeps_limited_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let writer = FileWriter::new(
            path.clone(),
            RotationPolicy {
                max_bytes: 4,
                max_backups: 1,
            },
        );

        for line in ["first", "second", "third"] {
            writer.write_line(line).unwrap();
            // keep rotated names distinct at millisecond resolution
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let names = files_in(dir.path());
        assert_eq!(names.len(), 2, "{names:?}");
        assert!(names.contains(&"trace.json".to_string()));
        assert_eq!(fs::read_to_string(path).unwrap(), "third\n");
        let backup = names.iter().find(|n| n.as_str() != "trace.json").unwrap();
        assert!(backup.starts_with("trace.2") && backup.ends_with(".json"), "{backup}");
        assert_eq!(fs::read_to_string(dir.path().join(backup)).unwrap(), "second\n");
    }
}
