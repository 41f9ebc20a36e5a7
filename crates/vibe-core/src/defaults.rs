//! Centralized default constants for vibe-os.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// MEDIA INGEST
// =============================================================================

/// Maximum accepted media size in bytes (50 MiB).
pub const MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024;

/// MIME type assumed for media reconstructed from history thumbnails.
pub const RESTORED_MIME_TYPE: &str = "image/jpeg";

/// MIME type used when neither the caller nor magic bytes identify the media.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

// =============================================================================
// HISTORY
// =============================================================================

/// Maximum number of history entries kept, most recent first.
pub const HISTORY_CAPACITY: usize = 5;

/// Thumbnails longer than this many characters are stored empty.
pub const THUMBNAIL_MAX_CHARS: usize = 2_000_000;

/// Storage key under which the history sequence is persisted.
pub const HISTORY_KEY: &str = "vibe_history";

/// Default history file name inside the data directory.
pub const HISTORY_FILE_NAME: &str = "vibe_history.json";

/// Application directory name under the platform config/data dirs.
pub const APP_DIR_NAME: &str = "vibe-os";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini REST base URL.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Primary (high-capability, quota-limited) analysis model.
pub const PRIMARY_MODEL: &str = "gemini-3-pro-preview";

/// Secondary (fallback) analysis model.
pub const SECONDARY_MODEL: &str = "gemini-2.5-flash";

/// Image generation model used for brand logos.
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Reasoning budget sent to the primary tier only.
pub const THINKING_BUDGET: u32 = 1024;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 300;

/// Default target language for report text values.
pub const DEFAULT_LANGUAGE: &str = "English";

// =============================================================================
// SESSION
// =============================================================================

/// Simulated processing delay for the demo path in milliseconds.
pub const DEMO_DELAY_MS: u64 = 2500;

/// Preview image shown for the demo report.
pub const DEMO_IMAGE_URL: &str = "https://images.unsplash.com/photo-1496568816309-51d7c20e3b21?q=80&w=2531&auto=format&fit=crop";

/// File name attached to the demo media reference.
pub const DEMO_FILE_NAME: &str = "demo_shoreditch.jpg";

/// User-facing message for oversized media.
pub const FILE_TOO_LARGE_MESSAGE: &str = "File too large. Please upload media under 50MB.";

/// User-facing message for any analysis failure. Root causes go to the log.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Analysis failed. The ethnography engine encountered an anomaly.";

/// User-facing message for export failures.
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to generate dossier export.";

// =============================================================================
// EXPORT
// =============================================================================

/// Fixed page canvas width in pixels.
pub const EXPORT_PAGE_WIDTH: u32 = 1000;

/// Fixed page canvas height in pixels.
pub const EXPORT_PAGE_HEIGHT: u32 = 1414;

/// File name prefix for exported dossiers; the unix-millis timestamp follows.
pub const EXPORT_FILE_PREFIX: &str = "VibeOS_Dossier_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_limit_is_fifty_mebibytes() {
        assert_eq!(MAX_MEDIA_BYTES, 52_428_800);
    }

    #[test]
    fn test_file_too_large_message_matches_limit() {
        assert!(FILE_TOO_LARGE_MESSAGE.contains("50MB"));
    }

    #[test]
    fn test_export_page_is_portrait() {
        assert!(EXPORT_PAGE_HEIGHT > EXPORT_PAGE_WIDTH);
    }
}
