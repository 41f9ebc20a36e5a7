//! # vibe-session
//!
//! The stateful half of vibe-os:
//! - [`SessionController`]: the Idle/Processing/Complete/Error machine with
//!   an epoch guard against stale completions
//! - [`HistoryStore`]: the five most recent analyses, persisted as JSON
//! - the canned demo report
//! - dossier export

pub mod demo;
pub mod export;
pub mod history;
pub mod session;

pub use demo::{demo_media, demo_report};
pub use export::{
    CaptureTarget, CapturedPage, DossierBuilder, DossierExporter, ExportArtifact, Section,
    SectionCapture, TarDossierBuilder,
};
pub use history::{HistoryStorage, HistoryStore, JsonFileStorage, MemoryStorage};
pub use session::{
    AnalysisOutcome, AnalysisTicket, DemoTicket, SessionConfig, SessionController, SessionState,
};
