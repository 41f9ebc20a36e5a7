//! Capped, most-recent-first cache of past analyses.
//!
//! The whole sequence lives under one storage key and is rewritten on every
//! insert. Loading is best effort: an absent or corrupt value yields an
//! empty history, never an error.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use vibe_core::{defaults, Error, HistoryEntry, MediaReference, Report, Result};

// =============================================================================
// STORAGE
// =============================================================================

/// Durable key-value storage for serialized history.
pub trait HistoryStorage: Send + Sync {
    /// Raw value under `key`, or `None` if never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`. Returns once the write is durable.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/vibe-os`, or `./.vibe-os` when the platform has none.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join(defaults::APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", defaults::APP_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl HistoryStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::HistoryLoad(format!("Failed to read {}: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a raw value.
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let storage = Self::default();
        if let Ok(mut values) = storage.values.lock() {
            values.insert(key.to_string(), value.into());
        }
        storage
    }
}

impl HistoryStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Internal("history storage lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Internal("history storage lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// HISTORY STORE
// =============================================================================

/// Ordered history, newest first, capped at [`defaults::HISTORY_CAPACITY`].
pub struct HistoryStore {
    storage: Arc<dyn HistoryStorage>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Load history from storage, degrading to empty on any failure.
    pub fn load(storage: Arc<dyn HistoryStorage>) -> Self {
        let entries = match storage.get(defaults::HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(defaults::HISTORY_CAPACITY);
                    debug!(entry_count = entries.len(), "Loaded analysis history");
                    entries
                }
                Err(e) => {
                    warn!(
                        subsystem = "history",
                        error = %e,
                        "Failed to parse stored history, starting empty"
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No stored history found");
                Vec::new()
            }
            Err(e) => {
                warn!(
                    subsystem = "history",
                    error = %e,
                    "Failed to read stored history, starting empty"
                );
                Vec::new()
            }
        };

        Self { storage, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Snapshot a report, prepend it, cap the sequence, and persist it.
    ///
    /// A failed write is logged; the in-memory sequence is still updated.
    pub fn record(&mut self, report: &Report, media: &MediaReference) -> &[HistoryEntry] {
        let now = chrono::Utc::now().timestamp_millis();
        // Keep ids unique and ordered when two records land in the same millisecond.
        let timestamp = match self.entries.first() {
            Some(head) if head.timestamp >= now => head.timestamp + 1,
            _ => now,
        };

        let entry = HistoryEntry {
            id: timestamp.to_string(),
            timestamp,
            report: report.clone(),
            thumbnail: thumbnail_for(media),
        };

        self.entries.insert(0, entry);
        self.entries.truncate(defaults::HISTORY_CAPACITY);

        match self.persist() {
            Ok(()) => info!(
                subsystem = "history",
                op = "record",
                entry_count = self.entries.len(),
                "History recorded"
            ),
            Err(e) => error!(
                subsystem = "history",
                op = "record",
                error = %e,
                "Failed to persist history"
            ),
        }

        &self.entries
    }

    /// Rebuild a displayable media reference and the stored report.
    pub fn restore(entry: &HistoryEntry) -> (Report, MediaReference) {
        let media = MediaReference::from_data_url("history_item", &entry.thumbnail);
        (entry.report.clone(), media)
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        self.storage.set(defaults::HISTORY_KEY, &serialized)
    }
}

/// `data:` URL of the media, dropped entirely when over the size bound.
fn thumbnail_for(media: &MediaReference) -> String {
    match media.data_url() {
        Some(url) if url.len() <= defaults::THUMBNAIL_MAX_CHARS => url,
        Some(url) => {
            debug!(
                thumbnail_len = url.len(),
                "Thumbnail exceeds storage bound, storing empty"
            );
            String::new()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_core::{MediaIngest, SelectedFile};

    fn report(vibe: &str) -> Report {
        Report {
            location_vibe: vibe.to_string(),
            ..Default::default()
        }
    }

    fn encoded_media(len: usize) -> MediaReference {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 7);
        let media = MediaIngest::new()
            .select(SelectedFile::new("a.jpg", None, bytes))
            .unwrap();
        media.base64();
        media
    }

    fn memory_store() -> (Arc<MemoryStorage>, HistoryStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = HistoryStore::load(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_load_absent_is_empty() {
        let (_, store) = memory_store();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let storage = Arc::new(MemoryStorage::with_value(defaults::HISTORY_KEY, "{not json"));
        assert!(HistoryStore::load(storage).is_empty());
    }

    #[test]
    fn test_load_tolerates_missing_fields() {
        let raw = r#"[{"id":"1700000000000","timestamp":1700000000000,
                       "report":{"locationVibe":"Old Contract","viabilityScore":50}}]"#;
        let storage = Arc::new(MemoryStorage::with_value(defaults::HISTORY_KEY, raw));
        let store = HistoryStore::load(storage);
        assert_eq!(store.len(), 1);
        let entry = store.latest().unwrap();
        assert_eq!(entry.report.location_vibe, "Old Contract");
        assert!(entry.report.dog_index.dominant_breed.is_empty());
        assert!(entry.thumbnail().is_none());
    }

    #[test]
    fn test_record_prepends_and_caps() {
        let (storage, mut store) = memory_store();
        let media = encoded_media(16);
        for i in 0..8 {
            store.record(&report(&format!("scan {}", i)), &media);
            assert!(store.len() <= defaults::HISTORY_CAPACITY);
            assert_eq!(store.latest().unwrap().report.location_vibe, format!("scan {}", i));
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.entries()[4].report.location_vibe, "scan 3");

        let persisted: Vec<HistoryEntry> =
            serde_json::from_str(&storage.get(defaults::HISTORY_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 5);
        assert_eq!(persisted[0].report.location_vibe, "scan 7");
    }

    #[test]
    fn test_ids_unique_and_descending() {
        let (_, mut store) = memory_store();
        let media = encoded_media(16);
        for _ in 0..5 {
            store.record(&report("same place"), &media);
        }
        let stamps: Vec<i64> = store.entries().iter().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] > w[1]));
        for entry in store.entries() {
            assert_eq!(entry.id, entry.timestamp.to_string());
        }
    }

    #[test]
    fn test_thumbnail_is_data_url() {
        let (_, mut store) = memory_store();
        let media = encoded_media(16);
        store.record(&report("x"), &media);
        let thumb = store.latest().unwrap().thumbnail().unwrap();
        assert!(thumb.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_oversized_thumbnail_dropped() {
        let (_, mut store) = memory_store();
        // 1.6M bytes encode to ~2.13M base64 chars.
        let media = encoded_media(1_600_000);
        store.record(&report("big"), &media);
        assert_eq!(store.latest().unwrap().thumbnail, "");
    }

    #[test]
    fn test_unencoded_media_gives_empty_thumbnail() {
        let (_, mut store) = memory_store();
        let media = MediaIngest::new()
            .select(SelectedFile::new("a.jpg", None, vec![0xFF, 0xD8, 0xFF, 0xE0]))
            .unwrap();
        store.record(&report("x"), &media);
        assert_eq!(store.latest().unwrap().thumbnail, "");
    }

    #[test]
    fn test_restore_round_trip() {
        let (_, mut store) = memory_store();
        let media = encoded_media(32);
        store.record(&report("Shoreditch"), &media);

        let (restored, restored_media) = HistoryStore::restore(store.latest().unwrap());
        assert_eq!(restored.location_vibe, "Shoreditch");
        assert_eq!(restored_media.mime_type(), defaults::RESTORED_MIME_TYPE);
        assert_eq!(restored_media.base64(), media.base64());
        assert_eq!(restored_media.preview_url(), media.data_url().unwrap());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(JsonFileStorage::new(dir.path().join("nested")));
        let mut store = HistoryStore::load(storage.clone());
        store.record(&report("persisted"), &encoded_media(16));

        assert!(storage.path_for(defaults::HISTORY_KEY).ends_with("vibe_history.json"));
        let reloaded = HistoryStore::load(storage);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.latest().unwrap().report.location_vibe, "persisted");
    }

    #[test]
    fn test_file_storage_set_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        storage.set(defaults::HISTORY_KEY, "[1]").unwrap();
        storage.set(defaults::HISTORY_KEY, "[2]").unwrap();

        assert_eq!(
            storage.get(defaults::HISTORY_KEY).unwrap().as_deref(),
            Some("[2]")
        );
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["vibe_history.json".to_string()]);
    }

    #[test]
    fn test_file_storage_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.get(defaults::HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn test_get_by_id() {
        let (_, mut store) = memory_store();
        store.record(&report("a"), &encoded_media(16));
        let id = store.latest().unwrap().id.clone();
        assert!(store.get(&id).is_some());
        assert!(store.get("0").is_none());
    }
}
