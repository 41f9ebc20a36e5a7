//! Session state machine.
//!
//! One session holds at most one media reference and one report. Long
//! operations are split into a synchronous `begin_*` that moves the machine
//! into `Processing` and hands out a ticket stamped with the current epoch,
//! and a `finish_*` that applies the ticket's result only if the epoch still
//! matches. `reset` bumps the epoch, so late completions are dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use vibe_core::{defaults, Error, MediaIngest, MediaReference, Report, Result, SelectedFile};
use vibe_inference::AnalysisClient;

use crate::demo;
use crate::export::{DossierBuilder, DossierExporter, ExportArtifact};
use crate::history::{HistoryStore, JsonFileStorage};

/// Session tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Simulated processing time for the demo path.
    pub demo_delay: Duration,
    /// Target language for report text values.
    pub language: String,
    /// Directory holding the history file.
    pub history_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            demo_delay: Duration::from_millis(defaults::DEMO_DELAY_MS),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            history_dir: JsonFileStorage::default_dir(),
        }
    }
}

impl SessionConfig {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_demo_delay(mut self, delay: Duration) -> Self {
        self.demo_delay = delay;
        self
    }

    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    /// Durable history storage rooted at [`SessionConfig::history_dir`].
    pub fn history_storage(&self) -> Arc<JsonFileStorage> {
        Arc::new(JsonFileStorage::new(self.history_dir.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Processing,
    Complete,
    Error,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Processing => "processing",
            SessionState::Complete => "complete",
            SessionState::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An analysis issued from `Idle`. Run it, then hand the outcome back.
pub struct AnalysisTicket {
    epoch: u64,
    media: Arc<MediaReference>,
    language: String,
    client: Option<Arc<AnalysisClient>>,
}

impl AnalysisTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Perform the remote analysis. Holds no session borrow.
    pub async fn run(self) -> AnalysisOutcome {
        let result = match &self.client {
            Some(client) => client.analyze(&self.media, &self.language).await,
            None => Err(Error::Config(
                "No analysis backend configured (set GEMINI_API_KEY)".to_string(),
            )),
        };
        AnalysisOutcome {
            epoch: self.epoch,
            media: self.media,
            result,
        }
    }
}

/// Completed analysis waiting to be applied.
pub struct AnalysisOutcome {
    epoch: u64,
    media: Arc<MediaReference>,
    result: Result<Report>,
}

impl AnalysisOutcome {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn result(&self) -> &Result<Report> {
        &self.result
    }
}

/// A demo load in progress.
#[derive(Debug, Clone, Copy)]
pub struct DemoTicket {
    epoch: u64,
    delay: Duration,
}

impl DemoTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Wait out the simulated processing time.
    pub async fn wait(self) -> Self {
        tokio::time::sleep(self.delay).await;
        self
    }
}

/// Drives one user session.
///
/// History and the analysis client are injected; the controller owns only the
/// current media, report and error message.
pub struct SessionController {
    config: SessionConfig,
    ingest: MediaIngest,
    history: HistoryStore,
    client: Option<Arc<AnalysisClient>>,
    exporter: DossierExporter,
    state: SessionState,
    media: Option<Arc<MediaReference>>,
    report: Option<Report>,
    error: Option<String>,
    epoch: u64,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        history: HistoryStore,
        client: Option<Arc<AnalysisClient>>,
    ) -> Self {
        Self {
            config,
            ingest: MediaIngest::new(),
            history,
            client,
            exporter: DossierExporter::default(),
            state: SessionState::Idle,
            media: None,
            report: None,
            error: None,
            epoch: 0,
        }
    }

    pub fn with_ingest(mut self, ingest: MediaIngest) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn with_exporter(mut self, exporter: DossierExporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn media(&self) -> Option<&MediaReference> {
        self.media.as_deref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// User-facing error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn language(&self) -> &str {
        &self.config.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.config.language = language.into();
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -------------------------------------------------------------------------
    // select-media
    // -------------------------------------------------------------------------

    /// Replace the current media. Leaves the session in `Idle`.
    ///
    /// Rejected media sets the error message and leaves everything else,
    /// including any prior media, untouched.
    pub fn select(&mut self, file: SelectedFile) -> Result<()> {
        self.ensure_not_processing("select media")?;
        let result = self.ingest.select(file);
        self.apply_selection(result)
    }

    /// Like [`SessionController::select`], reading the file from disk.
    pub async fn select_path(&mut self, path: &Path) -> Result<()> {
        self.ensure_not_processing("select media")?;
        let result = self.ingest.select_path(path).await;
        self.apply_selection(result)
    }

    fn apply_selection(&mut self, result: Result<MediaReference>) -> Result<()> {
        match result {
            Ok(media) => {
                debug!(
                    subsystem = "session",
                    op = "select",
                    media_bytes = media.size(),
                    mime_type = %media.mime_type(),
                    "Media selected"
                );
                self.media = Some(Arc::new(media));
                self.state = SessionState::Idle;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    Error::FileTooLarge { .. } => defaults::FILE_TOO_LARGE_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                debug!(subsystem = "session", op = "select", error = %e, "Media rejected");
                self.error = Some(message);
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // analysis
    // -------------------------------------------------------------------------

    /// Move `Idle` with media into `Processing`.
    ///
    /// Returns `None` (and changes nothing) from any other state or without
    /// media.
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if self.state != SessionState::Idle {
            debug!(subsystem = "session", state = %self.state, "Analysis not started");
            return None;
        }
        let media = self.media.clone()?;

        self.state = SessionState::Processing;
        self.error = None;
        debug!(subsystem = "session", op = "analyze", epoch = self.epoch, "Analysis issued");

        Some(AnalysisTicket {
            epoch: self.epoch,
            media,
            language: self.config.language.clone(),
            client: self.client.clone(),
        })
    }

    /// Apply a finished analysis. Returns false if it was stale.
    pub fn finish_analysis(&mut self, outcome: AnalysisOutcome) -> bool {
        if !self.is_current(outcome.epoch) {
            warn!(
                subsystem = "session",
                op = "analyze",
                epoch = outcome.epoch,
                current_epoch = self.epoch,
                "Discarding stale analysis completion"
            );
            return false;
        }

        match outcome.result {
            Ok(report) => {
                let count = self.history.record(&report, &outcome.media).len();
                info!(
                    subsystem = "session",
                    op = "analyze",
                    epoch = outcome.epoch,
                    entry_count = count,
                    "Analysis complete"
                );
                self.report = Some(report);
                self.state = SessionState::Complete;
            }
            Err(e) => {
                error!(
                    subsystem = "session",
                    op = "analyze",
                    epoch = outcome.epoch,
                    error = %e,
                    "Analysis failed"
                );
                self.error = Some(defaults::ANALYSIS_FAILED_MESSAGE.to_string());
                self.state = SessionState::Error;
            }
        }
        true
    }

    /// Run a whole analysis in place. Returns the resulting state.
    pub async fn analyze(&mut self) -> SessionState {
        if let Some(ticket) = self.begin_analysis() {
            let outcome = ticket.run().await;
            self.finish_analysis(outcome);
        }
        self.state
    }

    // -------------------------------------------------------------------------
    // demo
    // -------------------------------------------------------------------------

    /// Enter `Processing` for the demo path from any state.
    ///
    /// Any analysis still in flight goes stale.
    pub fn begin_demo(&mut self) -> DemoTicket {
        self.epoch += 1;
        self.state = SessionState::Processing;
        self.error = None;
        DemoTicket {
            epoch: self.epoch,
            delay: self.config.demo_delay,
        }
    }

    /// Install the canned report and demo media. Returns false if stale.
    ///
    /// Demo results are never recorded in history.
    pub fn finish_demo(&mut self, ticket: DemoTicket) -> bool {
        if !self.is_current(ticket.epoch) {
            warn!(
                subsystem = "session",
                op = "demo",
                epoch = ticket.epoch,
                "Discarding stale demo completion"
            );
            return false;
        }
        self.media = Some(Arc::new(demo::demo_media()));
        self.report = Some(demo::demo_report().clone());
        self.state = SessionState::Complete;
        info!(subsystem = "session", op = "demo", "Demo report loaded");
        true
    }

    /// Run the demo path in place.
    pub async fn load_demo(&mut self) -> SessionState {
        let ticket = self.begin_demo().wait().await;
        self.finish_demo(ticket);
        self.state
    }

    // -------------------------------------------------------------------------
    // history, reset, export
    // -------------------------------------------------------------------------

    /// Jump straight to `Complete` with a stored entry.
    pub fn load_from_history(&mut self, id: &str) -> Result<()> {
        let entry = self
            .history
            .get(id)
            .ok_or_else(|| Error::InvalidInput(format!("No history entry with id {}", id)))?;
        let (report, media) = HistoryStore::restore(entry);

        self.epoch += 1;
        self.media = Some(Arc::new(media));
        self.report = Some(report);
        self.error = None;
        self.state = SessionState::Complete;
        debug!(subsystem = "session", op = "load_from_history", id = %id, "Restored entry");
        Ok(())
    }

    /// Back to `Idle` with nothing selected. Outstanding tickets go stale.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.media = None;
        self.report = None;
        self.error = None;
        self.state = SessionState::Idle;
        debug!(subsystem = "session", op = "reset", epoch = self.epoch, "Session reset");
    }

    /// Export the current report. Only valid in `Complete`.
    ///
    /// Failure sets the export message; state and report stay as they were.
    pub async fn export(
        &mut self,
        builder: Box<dyn DossierBuilder>,
        out_dir: &Path,
    ) -> Result<ExportArtifact> {
        let report = match (self.state, self.report.as_ref()) {
            (SessionState::Complete, Some(report)) => report,
            _ => {
                return Err(Error::InvalidTransition(format!(
                    "cannot export from {}",
                    self.state
                )))
            }
        };

        let start = Instant::now();
        match self.exporter.export(report, builder, out_dir).await {
            Ok(artifact) => {
                debug!(
                    subsystem = "session",
                    op = "export",
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Export finished"
                );
                Ok(artifact)
            }
            Err(e) => {
                error!(subsystem = "session", op = "export", error = %e, "Export failed");
                self.error = Some(defaults::EXPORT_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.state == SessionState::Processing
    }

    fn ensure_not_processing(&self, action: &str) -> Result<()> {
        if self.state == SessionState::Processing {
            return Err(Error::InvalidTransition(format!(
                "cannot {} while processing",
                action
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{CaptureTarget, CapturedPage, TarDossierBuilder};
    use crate::history::MemoryStorage;
    use async_trait::async_trait;
    use vibe_core::GenerationBackend;
    use vibe_inference::mock::MockGenerationBackend;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn report_json(vibe: &str) -> String {
        let mut value = serde_json::to_value(demo::demo_report()).unwrap();
        value["locationVibe"] = serde_json::Value::String(vibe.to_string());
        value.to_string()
    }

    fn client(
        primary: &MockGenerationBackend,
        secondary: &MockGenerationBackend,
    ) -> Arc<AnalysisClient> {
        Arc::new(AnalysisClient::new(
            Arc::new(primary.clone()) as Arc<dyn GenerationBackend>,
            Some(Arc::new(secondary.clone()) as Arc<dyn GenerationBackend>),
            1024,
        ))
    }

    fn session(client: Option<Arc<AnalysisClient>>) -> SessionController {
        let history = HistoryStore::load(Arc::new(MemoryStorage::new()));
        let config = SessionConfig::default().with_history_dir(std::env::temp_dir());
        SessionController::new(config, history, client)
    }

    fn png(size: usize) -> SelectedFile {
        let mut bytes = PNG.to_vec();
        bytes.resize(size.max(PNG.len()), 0);
        SelectedFile::new("street.png", None, bytes)
    }

    fn jpeg(size: usize) -> SelectedFile {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(size, 0);
        SelectedFile::new("street.jpg", Some("image/jpeg"), bytes)
    }

    #[tokio::test]
    async fn test_select_then_analyze_records_history() {
        let primary = MockGenerationBackend::new("pro").then_text(report_json("Night Market"));
        let secondary = MockGenerationBackend::new("flash");
        let mut s = session(Some(client(&primary, &secondary)));

        s.select(jpeg(10 * 1024 * 1024)).unwrap();
        assert_eq!(s.state(), SessionState::Idle);

        assert_eq!(s.analyze().await, SessionState::Complete);
        assert_eq!(s.report().unwrap().location_vibe, "Night Market");
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().entries()[0].report.location_vibe, "Night Market");
        assert_eq!(secondary.call_count(), 0);
        assert!(s.error().is_none());
    }

    #[test]
    fn test_oversized_selection_rejected() {
        let mut s = session(None);
        let mut bytes = vec![0x1A, 0x45, 0xDF, 0xA3];
        bytes.resize(60 * 1024 * 1024, 0);

        let err = s
            .select(SelectedFile::new("clip.webm", Some("video/webm"), bytes))
            .unwrap_err();

        assert!(matches!(err, Error::FileTooLarge { .. }));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.media().is_none());
        assert_eq!(s.error(), Some(defaults::FILE_TOO_LARGE_MESSAGE));
    }

    #[test]
    fn test_rejected_selection_keeps_prior_media() {
        let mut s = session(None).with_ingest(MediaIngest::with_limit(1024));
        s.select(png(100)).unwrap();

        assert!(s.select(png(4096)).is_err());
        assert_eq!(s.media().unwrap().size(), 100);

        s.select(png(200)).unwrap();
        assert!(s.error().is_none());
        assert_eq!(s.media().unwrap().size(), 200);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_silently() {
        let primary = MockGenerationBackend::new("pro").then_fail("quota");
        let secondary = MockGenerationBackend::new("flash").then_text(report_json("Harbour"));
        let mut s = session(Some(client(&primary, &secondary)));

        s.select(png(64)).unwrap();
        assert_eq!(s.analyze().await, SessionState::Complete);
        assert_eq!(s.report().unwrap().location_vibe, "Harbour");
        assert!(s.error().is_none());
    }

    #[tokio::test]
    async fn test_both_tiers_failing_sets_generic_error() {
        let primary = MockGenerationBackend::new("pro").always_fail("quota");
        let secondary = MockGenerationBackend::new("flash").always_fail("down");
        let mut s = session(Some(client(&primary, &secondary)));

        s.select(png(64)).unwrap();
        let before = s.history().len();
        assert_eq!(s.analyze().await, SessionState::Error);
        assert_eq!(s.error(), Some(defaults::ANALYSIS_FAILED_MESSAGE));
        assert_eq!(s.history().len(), before);
        assert!(s.report().is_none());
    }

    #[tokio::test]
    async fn test_missing_client_ends_in_error() {
        let mut s = session(None);
        s.select(png(64)).unwrap();
        assert_eq!(s.analyze().await, SessionState::Error);
        assert_eq!(s.error(), Some(defaults::ANALYSIS_FAILED_MESSAGE));
    }

    #[test]
    fn test_begin_requires_idle_with_media() {
        let mut s = session(None);
        assert!(s.begin_analysis().is_none());
        assert_eq!(s.state(), SessionState::Idle);

        s.select(png(64)).unwrap();
        let ticket = s.begin_analysis();
        assert!(ticket.is_some());
        assert_eq!(s.state(), SessionState::Processing);

        // a second trigger while in flight is refused
        assert!(s.begin_analysis().is_none());
        assert!(s.select(png(64)).is_err());
    }

    #[tokio::test]
    async fn test_reset_during_processing_discards_late_result() {
        let primary = MockGenerationBackend::new("pro").then_text(report_json("Late"));
        let secondary = MockGenerationBackend::new("flash");
        let mut s = session(Some(client(&primary, &secondary)));

        s.select(png(64)).unwrap();
        let ticket = s.begin_analysis().unwrap();
        s.reset();

        let outcome = ticket.run().await;
        assert!(outcome.result().is_ok());
        assert!(!s.finish_analysis(outcome));

        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.report().is_none());
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn test_late_result_does_not_overwrite_newer_session() {
        let primary = MockGenerationBackend::new("pro")
            .then_text(report_json("Old"))
            .then_text(report_json("New"));
        let secondary = MockGenerationBackend::new("flash");
        let mut s = session(Some(client(&primary, &secondary)));

        s.select(png(64)).unwrap();
        let stale = s.begin_analysis().unwrap();
        s.reset();
        s.select(png(128)).unwrap();
        let fresh = s.begin_analysis().unwrap();

        let stale_outcome = stale.run().await;
        let fresh_outcome = fresh.run().await;

        assert!(!s.finish_analysis(stale_outcome));
        assert_eq!(s.state(), SessionState::Processing);
        assert!(s.finish_analysis(fresh_outcome));
        assert_eq!(s.report().unwrap().location_vibe, "New");
        assert_eq!(s.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_waits_then_completes_without_remote_call() {
        let primary = MockGenerationBackend::new("pro");
        let secondary = MockGenerationBackend::new("flash");
        let mut s = session(Some(client(&primary, &secondary)));
        s.select(png(64)).unwrap();

        let ticket = s.begin_demo();
        assert_eq!(s.state(), SessionState::Processing);

        let started = tokio::time::Instant::now();
        let ticket = ticket.wait().await;
        assert_eq!(started.elapsed(), Duration::from_millis(2500));

        assert!(s.finish_demo(ticket));
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.report(), Some(demo::demo_report()));
        assert_eq!(s.media().unwrap().name(), defaults::DEMO_FILE_NAME);
        assert_eq!(primary.call_count(), 0);
        assert!(s.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_supersedes_in_flight_analysis() {
        let primary = MockGenerationBackend::new("pro").then_text(report_json("Stale Scan"));
        let secondary = MockGenerationBackend::new("flash");
        let mut s = session(Some(client(&primary, &secondary)));
        s.select(png(64)).unwrap();

        let analysis = s.begin_analysis().unwrap();
        let demo = s.begin_demo();
        assert_ne!(analysis.epoch(), demo.epoch());

        let outcome = analysis.run().await;
        assert!(outcome.result().is_ok());
        assert!(!s.finish_analysis(outcome));
        assert_eq!(s.state(), SessionState::Processing);

        assert!(s.finish_demo(demo.wait().await));
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.report(), Some(demo::demo_report()));
        assert!(s.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_analysis_does_not_block_demo() {
        let primary = MockGenerationBackend::new("pro").always_fail("quota");
        let secondary = MockGenerationBackend::new("flash").always_fail("down");
        let mut s = session(Some(client(&primary, &secondary)));
        s.select(png(64)).unwrap();

        let analysis = s.begin_analysis().unwrap();
        let demo = s.begin_demo();

        assert!(!s.finish_analysis(analysis.run().await));
        assert!(s.error().is_none());

        assert!(s.finish_demo(demo.wait().await));
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.report(), Some(demo::demo_report()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_from_error_state() {
        let mut s = session(None);
        s.select(png(64)).unwrap();
        s.analyze().await;
        assert_eq!(s.state(), SessionState::Error);

        assert_eq!(s.load_demo().await, SessionState::Complete);
        assert!(s.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_demo() {
        let mut s = session(None);
        let ticket = s.begin_demo();
        s.reset();
        let ticket = ticket.wait().await;
        assert!(!s.finish_demo(ticket));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.report().is_none());
    }

    #[tokio::test]
    async fn test_load_from_history() {
        let primary = MockGenerationBackend::new("pro").then_text(report_json("Stored"));
        let secondary = MockGenerationBackend::new("flash");
        let mut s = session(Some(client(&primary, &secondary)));
        s.select(png(64)).unwrap();
        s.analyze().await;
        let id = s.history().latest().unwrap().id.clone();

        s.reset();
        s.load_from_history(&id).unwrap();

        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.report().unwrap().location_vibe, "Stored");
        assert_eq!(s.media().unwrap().mime_type(), defaults::RESTORED_MIME_TYPE);

        assert!(s.load_from_history("missing").is_err());
        assert_eq!(s.state(), SessionState::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_everything() {
        let mut s = session(None);
        s.load_demo().await;
        s.reset();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.media().is_none());
        assert!(s.report().is_none());
        assert!(s.error().is_none());
    }

    #[tokio::test]
    async fn test_export_requires_complete() {
        let mut s = session(None);
        let dir = tempfile::tempdir().unwrap();
        let err = s
            .export(Box::new(TarDossierBuilder::new()), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    struct BrokenTarget;

    #[async_trait]
    impl CaptureTarget for BrokenTarget {
        fn name(&self) -> &str {
            "broken"
        }

        async fn capture(&self, _report: &Report) -> Result<CapturedPage> {
            Err(Error::Internal("canvas unavailable".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_failure_keeps_report() {
        let targets: Vec<Box<dyn CaptureTarget>> = vec![Box::new(BrokenTarget)];
        let mut s = session(None).with_exporter(DossierExporter::new(targets));
        s.load_demo().await;
        let dir = tempfile::tempdir().unwrap();

        assert!(s
            .export(Box::new(TarDossierBuilder::new()), dir.path())
            .await
            .is_err());
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.error(), Some(defaults::EXPORT_FAILED_MESSAGE));
        assert!(s.report().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_demo_report() {
        let mut s = session(None);
        s.load_demo().await;
        let dir = tempfile::tempdir().unwrap();
        let artifact = s
            .export(Box::new(TarDossierBuilder::new()), dir.path())
            .await
            .unwrap();
        assert_eq!(artifact.page_count, 3);
        assert!(artifact.path.exists());
    }
}
