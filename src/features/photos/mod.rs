//! # Photos Feature
//!
//! Stores document photos on disk under random UUID filenames. Files are
//! written as uploaded; no re-encoding happens here.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

use anyhow::{anyhow, bail, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an upload and return the generated filename
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let extension = allowed_extension(original_name)
            .ok_or_else(|| anyhow!("Only JPG and PNG files are allowed"))?;
        if bytes.len() > MAX_PHOTO_BYTES {
            bail!("File size must be less than 5MB");
        }

        fs::create_dir_all(&self.dir)?;
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.dir.join(&filename), bytes)?;

        info!("Saved photo {} ({} bytes)", filename, bytes.len());
        Ok(filename)
    }

    /// Full path for a stored filename; `None` for names that could escape
    /// the photo directory
    pub fn path(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            return None;
        }
        Some(self.dir.join(filename))
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Returns whether a file was removed
    pub fn delete(&self, filename: &str) -> Result<bool> {
        match self.path(filename) {
            Some(path) if path.is_file() => {
                fs::remove_file(&path)?;
                debug!("Deleted photo {}", filename);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Remove several files, e.g. after a person was deleted
    pub fn delete_all(&self, filenames: &[String]) -> Result<usize> {
        let mut removed = 0;
        for name in filenames {
            if self.delete(name)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn allowed_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> PhotoStore {
        let dir = std::env::temp_dir().join(format!("tracker-photos-{}", Uuid::new_v4()));
        PhotoStore::new(dir)
    }

    #[test]
    fn test_save_and_delete() {
        let store = temp_store();
        let name = store.save("passport.JPG", b"fake image").unwrap();
        assert!(name.ends_with(".jpg"));
        assert!(store.exists(&name));
        assert_eq!(fs::read(store.path(&name).unwrap()).unwrap(), b"fake image");

        assert!(store.delete(&name).unwrap());
        assert!(!store.exists(&name));
        assert!(!store.delete(&name).unwrap());

        fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_rejects_bad_extension_and_size() {
        let store = temp_store();
        assert!(store.save("scan.gif", b"x").is_err());
        assert!(store.save("noextension", b"x").is_err());
        let too_big = vec![0u8; MAX_PHOTO_BYTES + 1];
        assert!(store.save("big.png", &too_big).is_err());
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_path_rejects_traversal() {
        let store = temp_store();
        assert!(store.path("../secret.db").is_none());
        assert!(store.path("a/b.jpg").is_none());
        assert!(store.path("").is_none());
        assert!(!store.exists(""));
        assert!(store.path("abc.png").is_some());
    }

    #[test]
    fn test_delete_all_counts_removed() {
        let store = temp_store();
        let a = store.save("a.png", b"a").unwrap();
        let b = store.save("b.jpeg", b"b").unwrap();
        let removed = store
            .delete_all(&[a, b, "missing.jpg".to_string()])
            .unwrap();
        assert_eq!(removed, 2);
        fs::remove_dir_all(store.dir()).ok();
    }
}
