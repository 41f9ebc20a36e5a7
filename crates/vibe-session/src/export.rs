//! Dossier export.
//!
//! A dossier is one page per capture target, in target order, all at the
//! fixed export canvas size. Targets are captured strictly one after another
//! because they feed a single builder.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use vibe_core::{defaults, Error, Report, Result, SCHEMA_VERSION};

// =============================================================================
// PAGES AND TARGETS
// =============================================================================

/// One rendered page.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// File extension for the page payload, without the dot.
    pub extension: String,
    pub data: Vec<u8>,
}

/// A region of the report that renders to exactly one page.
#[async_trait]
pub trait CaptureTarget: Send + Sync {
    fn name(&self) -> &str;

    async fn capture(&self, report: &Report) -> Result<CapturedPage>;
}

/// Accumulates pages into a single output document.
pub trait DossierBuilder: Send {
    /// Extension of the finished document, without the dot.
    fn extension(&self) -> &'static str;

    fn add_page(&mut self, page: CapturedPage) -> Result<()>;

    /// Finalize and return the document bytes.
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

// =============================================================================
// TAR.GZ BUILDER
// =============================================================================

#[derive(Debug, Serialize)]
struct DossierManifest {
    format: &'static str,
    version: &'static str,
    schema_version: u32,
    created_at: chrono::DateTime<chrono::Utc>,
    pages: Vec<ManifestPage>,
}

#[derive(Debug, Serialize)]
struct ManifestPage {
    index: usize,
    file: String,
    title: String,
    width: u32,
    height: u32,
    sha256: String,
}

/// Gzip'd tar with one file per page and a trailing `manifest.json`.
pub struct TarDossierBuilder {
    tar: tar::Builder<GzEncoder<Vec<u8>>>,
    pages: Vec<ManifestPage>,
    mtime: u64,
}

impl Default for TarDossierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TarDossierBuilder {
    pub fn new() -> Self {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        Self {
            tar: tar::Builder::new(encoder),
            pages: Vec::new(),
            mtime: chrono::Utc::now().timestamp().max(0) as u64,
        }
    }

    fn append(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(self.mtime);
        header.set_cksum();
        self.tar
            .append_data(&mut header, name, data)
            .map_err(|e| Error::Export(format!("Failed to add {}: {}", name, e)))
    }
}

impl DossierBuilder for TarDossierBuilder {
    fn extension(&self) -> &'static str {
        "tar.gz"
    }

    fn add_page(&mut self, page: CapturedPage) -> Result<()> {
        let index = self.pages.len() + 1;
        let file = format!("page-{:02}-{}.{}", index, slug(&page.title), page.extension);

        let mut hasher = Sha256::new();
        hasher.update(&page.data);
        let sha256 = hex::encode(hasher.finalize());

        self.append(&file, &page.data)?;
        self.pages.push(ManifestPage {
            index,
            file,
            title: page.title,
            width: page.width,
            height: page.height,
            sha256,
        });
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let mut this = *self;
        let manifest = DossierManifest {
            format: "vibe-dossier",
            version: env!("CARGO_PKG_VERSION"),
            schema_version: SCHEMA_VERSION,
            created_at: chrono::Utc::now(),
            pages: std::mem::take(&mut this.pages),
        };
        let manifest_data = serde_json::to_vec_pretty(&manifest)?;
        this.append("manifest.json", &manifest_data)?;

        let mut encoder = this
            .tar
            .into_inner()
            .map_err(|e| Error::Export(format!("Failed to finalize dossier: {}", e)))?;
        encoder
            .flush()
            .map_err(|e| Error::Export(format!("Compression failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| Error::Export(format!("Compression failed: {}", e)))
    }
}

fn slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}

// =============================================================================
// MARKDOWN SECTIONS
// =============================================================================

/// Dashboard sections that each render as one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Business,
    Culture,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Overview, Section::Business, Section::Culture];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Business => "Business",
            Section::Culture => "Culture",
        }
    }
}

/// Renders one [`Section`] of a report as a Markdown page.
#[derive(Debug, Clone)]
pub struct SectionCapture {
    section: Section,
}

impl SectionCapture {
    pub fn new(section: Section) -> Self {
        Self { section }
    }

    /// One capture per dashboard section, in dashboard order.
    pub fn all() -> Vec<Box<dyn CaptureTarget>> {
        Section::ALL
            .iter()
            .map(|s| Box::new(SectionCapture::new(*s)) as Box<dyn CaptureTarget>)
            .collect()
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        self.write_markdown(report).map_err(|e| {
            Error::Export(format!("Failed to render {}: {}", self.section.title(), e))
        })
    }

    fn write_markdown(&self, report: &Report) -> std::result::Result<String, std::fmt::Error> {
        let mut md = String::new();
        writeln!(md, "# {}: {}", self.section.title(), report.location_vibe)?;
        writeln!(md)?;
        match self.section {
            Section::Overview => render_overview(&mut md, report)?,
            Section::Business => render_business(&mut md, report)?,
            Section::Culture => render_culture(&mut md, report)?,
        }
        Ok(md)
    }
}

#[async_trait]
impl CaptureTarget for SectionCapture {
    fn name(&self) -> &str {
        self.section.title()
    }

    async fn capture(&self, report: &Report) -> Result<CapturedPage> {
        Ok(CapturedPage {
            title: self.section.title().to_string(),
            width: defaults::EXPORT_PAGE_WIDTH,
            height: defaults::EXPORT_PAGE_HEIGHT,
            extension: "md".to_string(),
            data: self.render(report)?.into_bytes(),
        })
    }
}

fn bullet_list(md: &mut String, items: &[String]) -> std::fmt::Result {
    for item in items {
        writeln!(md, "- {}", item)?;
    }
    Ok(())
}

fn render_overview(md: &mut String, r: &Report) -> std::fmt::Result {
    let c = &r.coordinates;
    writeln!(md, "**Location:** {} ({:.4}, {:.4})", c.location_name, c.lat, c.lng)?;
    writeln!(md, "**Architecture:** {}", r.architectural_style)?;
    writeln!(md, "**Atmosphere:** {}", r.atmosphere)?;
    writeln!(md, "**Commercial density:** {}", r.commercial_density)?;
    writeln!(md, "**Gentrification index:** {}/100", r.gentrification_index)?;
    writeln!(md)?;

    let m = &r.radar_metrics;
    writeln!(md, "## Radar")?;
    writeln!(
        md,
        "innovation {} | walkability {} | safety {} | community {} | affluence {}",
        m.innovation, m.walkability, m.safety, m.community, m.affluence
    )?;
    writeln!(md)?;

    writeln!(md, "## Time")?;
    writeln!(md, "- Past: {}", r.temporal_projection.past)?;
    writeln!(md, "- Future: {}", r.temporal_projection.future)?;
    writeln!(md, "- Golden hour: {} ({})", r.golden_hour.time, r.golden_hour.quality)?;
    writeln!(md)?;

    writeln!(md, "## Economics")?;
    writeln!(md, "- Latte index: {} ({})", r.latte_index.price, r.latte_index.insight)?;
    writeln!(
        md,
        "- Panopticon: {}/100 ({})",
        r.panopticon_score.score, r.panopticon_score.details
    )?;
    writeln!(md)?;

    writeln!(md, "## Vibe matches")?;
    for m in &r.vibe_matches {
        writeln!(
            md,
            "- {}, {}: {}% ({})",
            m.location, m.city, m.match_score, m.reason
        )?;
    }
    Ok(())
}

fn render_business(md: &mut String, r: &Report) -> std::fmt::Result {
    let b = &r.business_recommendation;
    writeln!(md, "## {}", b.title)?;
    writeln!(md, "{}", b.description)?;
    writeln!(md)?;
    writeln!(md, "**Viability:** {}/100", r.viability_score)?;
    writeln!(md, "**Reasoning:** {}", b.reasoning)?;
    writeln!(md, "**Slogan:** {}", b.marketing_copy.slogan)?;
    writeln!(md)?;
    writeln!(md, "### Risks")?;
    bullet_list(md, &b.risk_factors)?;
    writeln!(md)?;
    writeln!(md, "### Menu")?;
    for item in &b.menu_items {
        writeln!(md, "- {} {}", item.name, item.price)?;
    }
    writeln!(md)?;

    let rent = &r.rental_opportunity;
    writeln!(md, "### Real estate")?;
    writeln!(md, "- Rent: {} per sq ft", rent.estimated_rent_per_sq_ft)?;
    writeln!(md, "- Vacancy risk: {}", rent.vacancy_risk.as_str())?;
    writeln!(md, "- Permits: {}", rent.permit_difficulty.as_str())?;
    writeln!(md, "- Lease: {}", rent.best_lease_term)?;
    writeln!(md)?;

    writeln!(md, "### Market signals")?;
    let cr = &r.competitor_radar;
    writeln!(
        md,
        "- Indie {}% / chain {}% (dominant: {})",
        cr.indie_percentage, cr.chain_percentage, cr.dominant_chain
    )?;
    writeln!(
        md,
        "- Caffeine: {} shops per block, {}",
        r.caffeine_saturation.shops_per_block, r.caffeine_saturation.dominant_brew_method
    )?;
    writeln!(
        md,
        "- Nomad score: {}/100 ({}, {})",
        r.digital_nomad_score.score,
        r.digital_nomad_score.wifi_reliability,
        r.digital_nomad_score.laptop_density
    )?;
    writeln!(
        md,
        "- Liminal: {}/100 ({})",
        r.liminal_space_score.score, r.liminal_space_score.description
    )?;
    writeln!(
        md,
        "- Influencer trap: {}/100 ({})",
        r.influencer_trap.score,
        r.influencer_trap.photo_spots.join(", ")
    )?;
    writeln!(md)?;

    writeln!(md, "### Investor pitch")?;
    writeln!(md, "**{}**", r.investor_pitch.subject_line)?;
    writeln!(md)?;
    writeln!(md, "{}", r.investor_pitch.email_body)?;
    Ok(())
}

fn render_culture(md: &mut String, r: &Report) -> std::fmt::Result {
    writeln!(md, "## Demographics")?;
    for d in &r.observed_demographics {
        writeln!(md, "- {} ({}%): {}", d.label, d.percentage, d.description)?;
    }
    writeln!(md)?;

    let p = &r.target_persona;
    writeln!(md, "## Persona")?;
    writeln!(md, "**{}**: \"{}\"", p.archetype, p.quote)?;
    writeln!(md, "Carries: {}", p.accessories.join(", "))?;
    writeln!(md, "Anti-persona: {}", r.anti_persona)?;
    writeln!(md)?;

    let u = &r.local_uniform;
    writeln!(md, "## Uniform")?;
    writeln!(md, "{} / {} / {}", u.top, u.bottom, u.shoes)?;
    writeln!(md)?;

    writeln!(md, "## Dating")?;
    for d in &r.dating_profiles {
        writeln!(
            md,
            "- {}, {} ({}): {} Looking for: {}",
            d.name, d.age, d.app, d.bio, d.looking_for
        )?;
    }
    writeln!(md)?;

    writeln!(md, "## Playlist")?;
    for t in &r.playlist {
        writeln!(md, "- {} by {} ({})", t.song, t.artist, t.vibe)?;
    }
    writeln!(md)?;

    let t = &r.vibe_tarot;
    writeln!(md, "## Tarot")?;
    writeln!(md, "{} {}: {}", t.visual_symbol, t.card_name, t.meaning)?;
    writeln!(md)?;

    writeln!(
        md,
        "**Dog index:** {}/100, mostly {}. {}",
        r.dog_index.score, r.dog_index.dominant_breed, r.dog_index.insight
    )?;
    writeln!(md, "**Events ({}):**", r.event_horizon.vibe)?;
    bullet_list(md, &r.event_horizon.likely_events)?;
    writeln!(md, "**Psychogeography:** {}", r.psychogeography.join(", "))?;
    Ok(())
}

// =============================================================================
// EXPORTER
// =============================================================================

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub page_count: usize,
    pub size: u64,
}

/// Walks capture targets in order and writes the assembled dossier.
pub struct DossierExporter {
    targets: Vec<Box<dyn CaptureTarget>>,
}

impl Default for DossierExporter {
    fn default() -> Self {
        Self::new(SectionCapture::all())
    }
}

impl DossierExporter {
    pub fn new(targets: Vec<Box<dyn CaptureTarget>>) -> Self {
        Self { targets }
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// File name for a dossier written at `millis`.
    pub fn file_name(millis: i64, extension: &str) -> String {
        format!("{}{}.{}", defaults::EXPORT_FILE_PREFIX, millis, extension)
    }

    /// Capture every target, assemble with `builder`, and write into `out_dir`.
    pub async fn export(
        &self,
        report: &Report,
        mut builder: Box<dyn DossierBuilder>,
        out_dir: &Path,
    ) -> Result<ExportArtifact> {
        if self.targets.is_empty() {
            return Err(Error::Export("No pages to export".to_string()));
        }

        let start = Instant::now();
        for target in &self.targets {
            let page = target.capture(report).await.map_err(|e| {
                Error::Export(format!("Capture of {} failed: {}", target.name(), e))
            })?;

            if page.width != defaults::EXPORT_PAGE_WIDTH
                || page.height != defaults::EXPORT_PAGE_HEIGHT
            {
                return Err(Error::Export(format!(
                    "Page {} is {}x{}, expected {}x{}",
                    target.name(),
                    page.width,
                    page.height,
                    defaults::EXPORT_PAGE_WIDTH,
                    defaults::EXPORT_PAGE_HEIGHT
                )));
            }

            debug!(target = target.name(), bytes = page.data.len(), "Captured page");
            builder.add_page(page)?;
        }

        let extension = builder.extension();
        let data = builder.finish()?;

        let millis = chrono::Utc::now().timestamp_millis();
        let path = out_dir.join(Self::file_name(millis, extension));
        tokio::fs::create_dir_all(out_dir).await?;
        tokio::fs::write(&path, &data).await?;

        info!(
            subsystem = "export",
            op = "export",
            page_count = self.targets.len(),
            path = %path.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Dossier written"
        );

        Ok(ExportArtifact {
            path,
            page_count: self.targets.len(),
            size: data.len() as u64,
        })
    }
}
