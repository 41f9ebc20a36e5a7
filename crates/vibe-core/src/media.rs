//! Media ingest: size validation, preview locators, and lazy base64 encoding.
//!
//! A [`MediaReference`] is only ever constructed for media within the size
//! limit. Its base64 form is computed at most once, on first request, so
//! selecting and then replacing a file never pays for encoding.
//!
//! Preview locators handed out by [`MediaIngest`] are scoped: each
//! [`PreviewHandle`] releases its registry slot when dropped, so replacing or
//! resetting media never leaks previews across repeated selections.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use base64::Engine;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// PREVIEW LOCATORS
// =============================================================================

#[derive(Debug, Default)]
struct PreviewSlots {
    next: AtomicU64,
    live: Mutex<HashSet<u64>>,
}

impl PreviewSlots {
    fn acquire(self: &Arc<Self>) -> PreviewHandle {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        PreviewHandle {
            id,
            slots: Arc::clone(self),
        }
    }

    fn live_count(&self) -> usize {
        self.live.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Locally resolvable preview slot; released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    slots: Arc<PreviewSlots>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.slots.live.lock() {
            live.remove(&self.id);
        }
        debug!(preview_id = self.id, "Released media preview");
    }
}

/// Where a preview of the media can be displayed from.
#[derive(Debug)]
pub enum PreviewLocator {
    /// Slot allocated at selection time.
    Local(PreviewHandle),
    /// Already-encoded image data (history thumbnails).
    DataUrl(String),
    /// Remote image (demo media).
    Remote(String),
    None,
}

impl PreviewLocator {
    /// Displayable locator string. Empty when there is no preview.
    pub fn url(&self) -> String {
        match self {
            PreviewLocator::Local(handle) => format!("preview://{}", handle.id),
            PreviewLocator::DataUrl(url) | PreviewLocator::Remote(url) => url.clone(),
            PreviewLocator::None => String::new(),
        }
    }
}

// =============================================================================
// MEDIA REFERENCE
// =============================================================================

/// User-selected media, exclusively owning its bytes.
#[derive(Debug)]
pub struct MediaReference {
    name: String,
    mime_type: String,
    size: u64,
    bytes: Vec<u8>,
    preview: PreviewLocator,
    encoded: OnceCell<String>,
}

impl MediaReference {
    /// Media reconstructed from a stored `data:` URL.
    ///
    /// The payload after the first comma is taken as the base64 form; the
    /// MIME type is the fixed restore default, no sniffing.
    pub fn from_data_url(name: impl Into<String>, data_url: &str) -> Self {
        let payload = data_url
            .split_once(',')
            .map(|(_, data)| data.to_string())
            .unwrap_or_default();
        let preview = if data_url.is_empty() {
            PreviewLocator::None
        } else {
            PreviewLocator::DataUrl(data_url.to_string())
        };
        Self {
            name: name.into(),
            mime_type: defaults::RESTORED_MIME_TYPE.to_string(),
            size: 0,
            bytes: Vec::new(),
            preview,
            encoded: OnceCell::with_value(payload),
        }
    }

    /// Placeholder media whose preview lives at a remote URL.
    pub fn remote(
        name: impl Into<String>,
        url: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: 0,
            bytes: Vec::new(),
            preview: PreviewLocator::Remote(url.into()),
            encoded: OnceCell::with_value(String::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the source bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preview(&self) -> &PreviewLocator {
        &self.preview
    }

    pub fn preview_url(&self) -> String {
        self.preview.url()
    }

    /// Base64 form of the bytes, encoding on first call only.
    pub fn base64(&self) -> &str {
        self.encoded.get_or_init(|| {
            debug!(
                media_bytes = self.size,
                mime_type = %self.mime_type,
                "Encoding media payload"
            );
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        })
    }

    /// Base64 form if it has already been computed.
    pub fn base64_if_ready(&self) -> Option<&str> {
        self.encoded.get().map(|s| s.as_str())
    }

    /// `data:` URL of the encoded payload, when one exists.
    pub fn data_url(&self) -> Option<String> {
        match self.base64_if_ready() {
            Some(b64) if !b64.is_empty() => {
                Some(format!("data:{};base64,{}", self.mime_type, b64))
            }
            _ => None,
        }
    }
}

// =============================================================================
// INGEST
// =============================================================================

/// A file as chosen by the user, before validation.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// MIME type claimed by the picker, if any.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes,
        }
    }
}

/// Validates selections and hands out scoped preview locators.
#[derive(Debug, Clone)]
pub struct MediaIngest {
    max_bytes: u64,
    slots: Arc<PreviewSlots>,
}

impl Default for MediaIngest {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaIngest {
    pub fn new() -> Self {
        Self::with_limit(defaults::MAX_MEDIA_BYTES)
    }

    pub fn with_limit(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            slots: Arc::new(PreviewSlots::default()),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Number of preview slots currently held by live media.
    pub fn live_previews(&self) -> usize {
        self.slots.live_count()
    }

    /// Validate an in-memory selection and build its reference.
    pub fn select(&self, file: SelectedFile) -> Result<MediaReference> {
        let size = file.bytes.len() as u64;
        self.check_size(size)?;

        let mime_type = detect_media_type(&file.bytes, file.mime_type.as_deref());
        if !is_supported_media(&mime_type) {
            return Err(Error::InvalidInput(format!(
                "Unsupported media type {} for {}",
                mime_type, file.name
            )));
        }

        info!(
            subsystem = "ingest",
            op = "select",
            media_bytes = size,
            mime_type = %mime_type,
            "Media selected"
        );

        Ok(MediaReference {
            name: file.name,
            mime_type,
            size,
            bytes: file.bytes,
            preview: PreviewLocator::Local(self.slots.acquire()),
            encoded: OnceCell::new(),
        })
    }

    /// Validate a file on disk. Size is checked from metadata before reading.
    pub async fn select_path(&self, path: &Path) -> Result<MediaReference> {
        let metadata = tokio::fs::metadata(path).await?;
        self.check_size(metadata.len())?;

        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        self.select(SelectedFile {
            name,
            mime_type: None,
            bytes,
        })
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(Error::FileTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Resolve the MIME type of media bytes.
///
/// A non-blank claimed type is trusted as given. Without one the type is
/// sniffed from magic bytes, falling back to `application/octet-stream`.
pub fn detect_media_type(data: &[u8], claimed: Option<&str>) -> String {
    if let Some(c) = claimed.map(str::trim).filter(|c| !c.is_empty()) {
        return c.to_string();
    }
    infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| defaults::FALLBACK_MIME_TYPE.to_string())
}

/// Only still images and video are analyzable.
pub fn is_supported_media(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type.starts_with("video/")
}
