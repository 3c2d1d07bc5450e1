//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope with per-field fallback (`save`)
//! - Atomic writes (tmp → save, old save → backup)
//! - Backup fallback when the main save cannot be read

pub mod save;

use std::fs;
use std::path::{Path, PathBuf};

pub use save::{PlayerRecord, SAVE_VERSION, SaveRecord};

use crate::error::{Result, SimError};

fn sibling(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Write a save, keeping the previous one as `.bak`
pub fn save_to_file(path: &Path, record: &SaveRecord) -> Result<()> {
    let json = record.to_json()?;
    let tmp = sibling(path, "tmp");
    fs::write(&tmp, json)?;
    if path.exists() {
        fs::rename(path, sibling(path, "bak"))?;
    }
    fs::rename(&tmp, path)?;
    log::info!("Game saved to {}", path.display());
    Ok(())
}

/// Read a save, falling back to the backup if the main file is unreadable
pub fn load_from_file(path: &Path) -> Result<SaveRecord> {
    let primary = fs::read_to_string(path)
        .map_err(SimError::from)
        .and_then(|json| SaveRecord::from_json(&json));
    match primary {
        Ok(record) => {
            log::info!("Loaded save from {}", path.display());
            Ok(record)
        }
        Err(e) => {
            let backup = sibling(path, "bak");
            if !backup.exists() {
                return Err(e);
            }
            log::warn!("Save {} unreadable ({e}), trying backup", path.display());
            SaveRecord::from_json(&fs::read_to_string(&backup)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("meadow-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("save.json")
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch("roundtrip");
        let record = SaveRecord {
            seed: Some(9),
            time_of_day: Some(0.25),
            ..SaveRecord::default()
        };
        save_to_file(&path, &record).unwrap();
        assert_eq!(load_from_file(&path).unwrap(), record);
        assert!(!sibling(&path, "tmp").exists());
    }

    #[test]
    fn test_corrupt_save_falls_back_to_backup() {
        let path = scratch("backup");
        let first = SaveRecord {
            seed: Some(1),
            ..SaveRecord::default()
        };
        save_to_file(&path, &first).unwrap();
        save_to_file(&path, &SaveRecord::default()).unwrap();
        fs::write(&path, "{ truncated").unwrap();

        assert_eq!(load_from_file(&path).unwrap(), first);
    }

    #[test]
    fn test_missing_save_is_an_error() {
        let path = scratch("missing");
        assert!(matches!(load_from_file(&path), Err(SimError::Io(_))));
    }
}
