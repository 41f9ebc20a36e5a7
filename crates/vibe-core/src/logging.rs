//! Structured logging schema and field name constants for vibe-os.
//!
//! All crates use these constants for consistent structured logging fields
//! so log tooling can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Primary action failed for good (both analysis tiers exhausted) |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | High-volume data (schema walk, page bytes) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "ingest", "inference", "session", "history", "export", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gemini", "analysis_client", "logo", "json_file"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "analyze", "generate_logo", "record", "load_demo"
pub const OPERATION: &str = "op";

/// Session epoch an async completion was issued for.
pub const EPOCH: &str = "epoch";

// ─── Media fields ──────────────────────────────────────────────────────────

/// Size of selected media in bytes.
pub const MEDIA_BYTES: &str = "media_bytes";

/// MIME type of selected media.
pub const MIME_TYPE: &str = "mime_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Number of history entries after an operation.
pub const ENTRY_COUNT: &str = "entry_count";

/// Number of pages written to a dossier.
pub const PAGE_COUNT: &str = "page_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Fallback tier ("primary" or "secondary").
pub const TIER: &str = "tier";

/// Target language for report values.
pub const LANGUAGE: &str = "language";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
