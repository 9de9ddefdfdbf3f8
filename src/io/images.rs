use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::io::document_io::atomic_write;

/// Where an uploaded image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub storage_key: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not store image at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("not a usable storage key part: {0:?}")]
    InvalidKey(String),
}

/// Image storage collaborator. `sequence` is the task's image count plus one.
pub trait ImageUploader {
    fn upload(
        &self,
        task_id: &str,
        bytes: &[u8],
        extension: &str,
        sequence: usize,
    ) -> Result<UploadedImage, ImageError>;
}

/// Stores images under `<dir>/<task_id>/<sequence>.<ext>`
#[derive(Debug, Clone)]
pub struct DirectoryImageStore {
    dir: PathBuf,
}

impl DirectoryImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryImageStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageUploader for DirectoryImageStore {
    fn upload(
        &self,
        task_id: &str,
        bytes: &[u8],
        extension: &str,
        sequence: usize,
    ) -> Result<UploadedImage, ImageError> {
        check_key_part(task_id)?;
        check_key_part(extension)?;
        let storage_key = format!("{}/{}.{}", task_id, sequence, extension);
        let path = self.dir.join(&storage_key);
        let write_err = |e| ImageError::WriteError {
            path: path.clone(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        atomic_write(&path, bytes).map_err(write_err)?;

        let absolute = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        Ok(UploadedImage {
            storage_key,
            url: format!("file://{}", absolute.display()),
        })
    }
}

/// A key part must be one plain path component so the image stays inside
/// the store's directory
fn check_key_part(part: &str) -> Result<(), ImageError> {
    let mut components = Path::new(part).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();
    if single_normal && !part.contains(['/', '\\']) {
        Ok(())
    } else {
        Err(ImageError::InvalidKey(part.to_string()))
    }
}

/// Lowercased extension of `path`, `png` when there is none
pub fn image_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "png".to_string())
}

/// Read an image file for attaching
pub fn read_image(path: &Path) -> Result<Vec<u8>, ImageError> {
    fs::read(path).map_err(|e| ImageError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_stores_under_task_and_sequence() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryImageStore::new(tmp.path());
        let uploaded = store.upload("abc", b"\x89PNG", "png", 3).unwrap();
        assert_eq!(uploaded.storage_key, "abc/3.png");
        assert!(uploaded.url.starts_with("file://"));
        assert!(uploaded.url.ends_with("abc/3.png"));
        assert_eq!(fs::read(tmp.path().join("abc/3.png")).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_task_ids_cannot_leave_the_directory() {
        let tmp = TempDir::new().unwrap();
        let images = tmp.path().join("images");
        let store = DirectoryImageStore::new(&images);
        for id in ["../escaped", "..", "a/b", "/abs", "a\\b", ""] {
            let err = store.upload(id, b"x", "png", 1).unwrap_err();
            assert!(matches!(err, ImageError::InvalidKey(_)), "{:?}", id);
        }
        assert!(!tmp.path().join("escaped").exists());
        assert!(!images.exists());
    }

    #[test]
    fn test_extension_cannot_carry_a_path() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryImageStore::new(tmp.path());
        assert!(matches!(
            store.upload("abc", b"x", "../png", 1),
            Err(ImageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_extension_defaults_to_png() {
        assert_eq!(image_extension(Path::new("shot.JPG")), "jpg");
        assert_eq!(image_extension(Path::new("noext")), "png");
    }

    #[test]
    fn test_missing_source_file_is_read_error() {
        let err = read_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageError::ReadError { .. }));
    }
}
