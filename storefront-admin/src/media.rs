//! Storage of uploaded media files.

use crate::config::MediaConfig;
use crate::UploadedFile;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use storefront_core::{MediaItem, StorageError, StoreResult, ValidationError};

/// Stores uploads for media items and removes them again.
pub trait MediaController: Send + Sync {
    /// Store `file` and point the URL, preview and MIME type of `item` to it.
    fn add(&self, item: &mut MediaItem, file: &UploadedFile) -> StoreResult<()>;

    /// Remove the files referenced by `item`.
    fn delete(&self, item: &MediaItem) -> StoreResult<()>;
}

struct StoredFile {
    content: Vec<u8>,
    refs: usize,
}

/// In-memory file store addressing files by content hash.
///
/// Files land at `<upload_dir>/<aa>/<bb>/<sha256>.<ext>`; uploading the
/// same content twice shares one file, which is removed when the last
/// media item referencing it is deleted.
#[derive(Clone)]
pub struct MemoryMediaStore {
    config: MediaConfig,
    files: Arc<RwLock<BTreeMap<String, StoredFile>>>,
}

impl MemoryMediaStore {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config,
            files: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Stored content at `path`.
    pub fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let files = self.files.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(files.get(path).map(|f| f.content.clone()))
    }

    /// Number of stored files.
    pub fn len(&self) -> StoreResult<usize> {
        let files = self.files.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(files.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn path(&self, file: &UploadedFile) -> String {
        let hash = hex::encode(Sha256::digest(&file.content));
        let ext = extension(&file.name);
        let dir = self.config.upload_dir.trim_end_matches('/');

        match ext {
            Some(ext) => format!("{}/{}/{}/{}.{}", dir, &hash[0..2], &hash[2..4], hash, ext),
            None => format!("{}/{}/{}/{}", dir, &hash[0..2], &hash[2..4], hash),
        }
    }
}

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

impl MediaController for MemoryMediaStore {
    fn add(&self, item: &mut MediaItem, file: &UploadedFile) -> StoreResult<()> {
        if !self.config.mime_types.iter().any(|t| t == &file.mime_type) {
            return Err(ValidationError::InvalidValue {
                field: "media.mimetype".to_string(),
                reason: format!("uploads of type \"{}\" are not accepted", file.mime_type),
            }
            .into());
        }

        let path = self.path(file);
        {
            let mut files = self.files.write().map_err(|_| StorageError::LockPoisoned)?;
            files
                .entry(path.clone())
                .or_insert_with(|| StoredFile {
                    content: file.content.clone(),
                    refs: 0,
                })
                .refs += 1;
        }

        item.set_url(&path)
            .set_preview(&path)
            .set_mime_type(&file.mime_type);
        if item.label().is_empty() {
            item.set_label(&file.name);
        }

        tracing::debug!(path = %path, size = file.content.len(), "Stored media file");
        Ok(())
    }

    fn delete(&self, item: &MediaItem) -> StoreResult<()> {
        let mut paths = vec![item.url(), item.preview()];
        paths.dedup();

        let mut files = self.files.write().map_err(|_| StorageError::LockPoisoned)?;
        for path in paths.into_iter().filter(|p| !p.is_empty()) {
            let Some(stored) = files.get_mut(&path) else {
                continue;
            };
            stored.refs = stored.refs.saturating_sub(1);
            if stored.refs == 0 {
                files.remove(&path);
                tracing::debug!(path = %path, "Removed media file");
            }
        }
        Ok(())
    }
}

impl fmt::Debug for MemoryMediaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMediaStore")
            .field("upload_dir", &self.config.upload_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::StoreError;

    fn store() -> MemoryMediaStore {
        MemoryMediaStore::new(MediaConfig::default())
    }

    fn png(content: &[u8]) -> UploadedFile {
        UploadedFile::new("Front.PNG", "image/png", content.to_vec())
    }

    #[test]
    fn test_add_sets_paths() {
        let store = store();
        let mut item = MediaItem::new();
        store.add(&mut item, &png(b"abc")).unwrap();

        let hash = hex::encode(Sha256::digest(b"abc"));
        let expected = format!("files/{}/{}/{}.png", &hash[0..2], &hash[2..4], hash);
        assert_eq!(item.url(), expected);
        assert_eq!(item.preview(), expected);
        assert_eq!(item.mime_type(), "image/png");
        assert_eq!(item.label(), "Front.PNG");
        assert_eq!(store.read(&expected).unwrap(), Some(b"abc".to_vec()));
    }

    #[test]
    fn test_rejected_mime_type() {
        let store = store();
        let mut item = MediaItem::new();
        let file = UploadedFile::new("x.exe", "application/octet-stream", vec![0]);

        let err = store.add(&mut item, &file).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(item.url().is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_shared_content_removed_with_last_reference() {
        let store = store();
        let mut first = MediaItem::new();
        let mut second = MediaItem::new();
        store.add(&mut first, &png(b"same")).unwrap();
        store.add(&mut second, &png(b"same")).unwrap();
        assert_eq!(store.len().unwrap(), 1);

        store.delete(&first).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        store.delete(&second).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("bad.p/g"), None);
    }
}
