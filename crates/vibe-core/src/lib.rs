//! # vibe-core
//!
//! Core types, traits, and abstractions for vibe-os.
//!
//! This crate holds the report data model and its schema contract, media
//! ingest, the language catalog, and the backend traits the inference and
//! session crates build on.

#![recursion_limit = "256"]

pub mod defaults;
pub mod error;
pub mod languages;
pub mod logging;
pub mod media;
pub mod models;
pub mod schema;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use languages::Language;
pub use media::{
    detect_media_type, is_supported_media, MediaIngest, MediaReference, PreviewLocator,
    SelectedFile,
};
pub use models::*;
pub use schema::{ObjectSchema, ReportSchema, SchemaNode, SCHEMA_VERSION};
pub use traits::*;
