//! Canned demo report and media.

use once_cell::sync::Lazy;

use vibe_core::{defaults, MediaReference, Report, ReportSchema};

const DEMO_REPORT_JSON: &str = include_str!("../data/demo_report.json");

static DEMO_REPORT: Lazy<Report> = Lazy::new(|| {
    ReportSchema::canonical()
        .parse_report(DEMO_REPORT_JSON)
        .expect("bundled demo report satisfies the report schema")
});

/// The fixed demo report (Shoreditch, London).
pub fn demo_report() -> &'static Report {
    &DEMO_REPORT
}

/// Placeholder media shown alongside the demo report.
pub fn demo_media() -> MediaReference {
    MediaReference::remote(
        defaults::DEMO_FILE_NAME,
        defaults::DEMO_IMAGE_URL,
        defaults::RESTORED_MIME_TYPE,
    )
}
