//! Report data model for vibe-os.
//!
//! A [`Report`] is the structured result of one analysis invocation. Field
//! names serialize in camelCase so the same value round-trips through the
//! model's structured output, the history file, and exported dossiers.
//!
//! Every struct here is lenient on deserialization (`#[serde(default)]`):
//! history written under an older contract must still load. Strictness for
//! fresh model output is enforced earlier, by [`crate::schema::ReportSchema`],
//! before a value is ever deserialized into these types.

use serde::{Deserialize, Serialize};

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Commercial vacancy risk for the scanned location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum VacancyRisk {
    #[default]
    Low,
    Medium,
    High,
    Extreme,
}

impl VacancyRisk {
    pub const ALL: [&'static str; 4] = ["LOW", "MEDIUM", "HIGH", "EXTREME"];

    pub fn as_str(&self) -> &'static str {
        Self::ALL[*self as usize]
    }
}

/// How hard it is to get a business permit at the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PermitDifficulty {
    Easy,
    #[default]
    Moderate,
    Nightmare,
}

impl PermitDifficulty {
    pub const ALL: [&'static str; 3] = ["EASY", "MODERATE", "NIGHTMARE"];

    pub fn as_str(&self) -> &'static str {
        Self::ALL[*self as usize]
    }
}

/// Category of a detected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObjectCategory {
    Person,
    Architecture,
    Object,
    Nature,
    Transport,
    #[default]
    Other,
}

impl ObjectCategory {
    pub const ALL: [&'static str; 6] = [
        "person",
        "architecture",
        "object",
        "nature",
        "transport",
        "other",
    ];

    pub fn as_str(&self) -> &'static str {
        Self::ALL[*self as usize]
    }
}

// =============================================================================
// SUB-RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Demographic {
    pub label: String,
    pub percentage: f64,
    pub description: String,
}

/// Detected object with a bounding box in a normalized 0-1000 space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundingBox {
    pub label: String,
    pub category: ObjectCategory,
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl BoundingBox {
    /// Width in normalized units. Inverted boxes report zero.
    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin).max(0.0)
    }

    /// Height in normalized units. Inverted boxes report zero.
    pub fn height(&self) -> f64 {
        (self.ymax - self.ymin).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketingCopy {
    pub slogan: String,
    pub hashtags: Vec<String>,
    pub brand_colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuItem {
    pub name: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessRecommendation {
    pub title: String,
    pub description: String,
    pub reasoning: String,
    pub risk_factors: Vec<String>,
    pub marketing_copy: MarketingCopy,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RadarMetrics {
    pub innovation: f64,
    pub walkability: f64,
    pub safety: f64,
    pub community: f64,
    pub affluence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TemporalProjection {
    pub past: String,
    pub future: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetPersona {
    pub archetype: String,
    pub quote: String,
    pub accessories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LatteIndex {
    pub price: String,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PanopticonScore {
    pub score: f64,
    pub details: String,
}

/// Dating-app archetype of someone who would frequent the location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DatingProfile {
    pub name: String,
    pub age: f64,
    pub bio: String,
    pub app: String,
    pub looking_for: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldenHour {
    pub time: String,
    pub quality: String,
}

/// Another neighbourhood with a similar vibe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VibeMatch {
    pub location: String,
    pub city: String,
    pub match_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RentalOpportunity {
    pub estimated_rent_per_sq_ft: String,
    pub vacancy_risk: VacancyRisk,
    pub permit_difficulty: PermitDifficulty,
    pub best_lease_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistEntry {
    pub song: String,
    pub artist: String,
    pub vibe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestorPitch {
    pub subject_line: String,
    pub email_body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
    pub location_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DogIndex {
    pub score: f64,
    pub dominant_breed: String,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DigitalNomadScore {
    pub score: f64,
    pub wifi_reliability: String,
    pub laptop_density: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LiminalSpaceScore {
    pub score: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VibeTarot {
    pub card_name: String,
    pub meaning: String,
    pub visual_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EventHorizon {
    pub likely_events: Vec<String>,
    pub vibe: String,
}

/// Independent vs chain business split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompetitorRadar {
    pub indie_percentage: f64,
    pub chain_percentage: f64,
    pub dominant_chain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InfluencerTrap {
    pub score: f64,
    pub photo_spots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CaffeineSaturation {
    pub shops_per_block: f64,
    pub dominant_brew_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalUniform {
    pub top: String,
    pub bottom: String,
    pub shoes: String,
}

// =============================================================================
// REPORT
// =============================================================================

/// Street ethnography report produced by one analysis invocation.
///
/// Immutable once received; consumers clone rather than mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    /// Language the text values were written in.
    pub language: String,
    pub location_vibe: String,
    pub observed_demographics: Vec<Demographic>,
    pub visual_cues: Vec<String>,
    pub detected_objects: Vec<BoundingBox>,
    pub business_recommendation: BusinessRecommendation,
    pub radar_metrics: RadarMetrics,
    pub viability_score: f64,
    pub gentrification_index: f64,
    /// Instagrammability.
    pub social_score: f64,
    /// Hex color codes.
    pub color_palette: Vec<String>,
    pub soundscape: Vec<String>,
    pub scent_profile: Vec<String>,
    pub temporal_projection: TemporalProjection,
    pub target_persona: TargetPersona,
    pub anti_persona: String,

    // Environment
    pub architectural_style: String,
    pub atmosphere: String,
    pub commercial_density: String,
    pub construction_status: String,

    // Culture & logistics
    pub subcultures: Vec<String>,
    pub local_currency: String,
    pub peak_time: String,
    pub transit_access: Vec<String>,
    pub brand_affinity: Vec<String>,
    pub psychogeography: Vec<String>,

    pub latte_index: LatteIndex,
    pub panopticon_score: PanopticonScore,
    pub dating_profiles: Vec<DatingProfile>,
    pub golden_hour: GoldenHour,
    pub vibe_matches: Vec<VibeMatch>,
    pub rental_opportunity: RentalOpportunity,
    pub playlist: Vec<PlaylistEntry>,
    pub investor_pitch: InvestorPitch,
    pub coordinates: Coordinates,

    pub dog_index: DogIndex,
    pub digital_nomad_score: DigitalNomadScore,
    pub liminal_space_score: LiminalSpaceScore,
    pub vibe_tarot: VibeTarot,
    pub event_horizon: EventHorizon,
    pub competitor_radar: CompetitorRadar,
    pub influencer_trap: InfluencerTrap,
    pub caffeine_saturation: CaffeineSaturation,
    pub local_uniform: LocalUniform,
}

// =============================================================================
// HISTORY
// =============================================================================

/// Persisted snapshot of a past report.
///
/// Owns a deep copy of the report so history survives session reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation time in unix milliseconds, as a decimal string.
    pub id: String,
    /// Creation time in unix milliseconds.
    pub timestamp: i64,
    pub report: Report,
    /// `data:` URL of the analyzed media, or empty when dropped.
    #[serde(default)]
    pub thumbnail: String,
}

impl HistoryEntry {
    /// Thumbnail data URL, if one was kept.
    pub fn thumbnail(&self) -> Option<&str> {
        if self.thumbnail.is_empty() {
            None
        } else {
            Some(&self.thumbnail)
        }
    }

    /// Creation time as a UTC datetime.
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}
