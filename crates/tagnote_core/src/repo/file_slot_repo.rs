//! File-backed slot storage.
//!
//! Each slot lives in `<dir>/<key>.json`. Writes go to a hidden temp file in
//! the same directory and are renamed over the target, so a crash mid-write
//! leaves the previous value intact.

use crate::repo::slot_repo::{RepoError, RepoResult, SlotRepository};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

const SLOT_FILE_EXTENSION: &str = "json";

/// Slot repository storing one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileSlotRepository {
    dir: PathBuf,
}

impl FileSlotRepository {
    /// Uses `dir` as the slot directory. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    pub fn slot_path(&self, key: &str) -> RepoResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{SLOT_FILE_EXTENSION}")))
    }
}

impl SlotRepository for FileSlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RepoError::Io { path, source }),
        }
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| RepoError::Io {
            path: self.dir.clone(),
            source,
        })?;
        write_atomic(&path, value.as_bytes())?;
        debug!(
            "event=slot_write module=repo status=ok backend=file bytes={}",
            value.len()
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

fn validate_key(key: &str) -> RepoResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(RepoError::InvalidKey(key.to_string()))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> RepoResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", process::id()));

    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(source) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(RepoError::Io {
            path: temp_path,
            source,
        });
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(RepoError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_key, FileSlotRepository};
    use crate::repo::slot_repo::{RepoError, SlotRepository};

    #[test]
    fn validate_key_rejects_path_like_values() {
        assert!(validate_key("notes").is_ok());
        assert!(validate_key("notes-v2.backup").is_ok());
        assert!(matches!(validate_key(""), Err(RepoError::InvalidKey(_))));
        assert!(matches!(validate_key("../x"), Err(RepoError::InvalidKey(_))));
        assert!(matches!(validate_key(".hidden"), Err(RepoError::InvalidKey(_))));
    }

    #[test]
    fn write_creates_directory_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let slot_dir = dir.path().join("nested").join("slots");
        let mut repo = FileSlotRepository::new(&slot_dir);

        repo.write_slot("notes", "[1]").unwrap();
        repo.write_slot("notes", "[2]").unwrap();

        assert_eq!(repo.read_slot("notes").unwrap().as_deref(), Some("[2]"));
        let entries: Vec<_> = std::fs::read_dir(&slot_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "notes.json");
    }
}
