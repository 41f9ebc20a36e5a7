//! Declarative report schema.
//!
//! [`ReportSchema`] is the single contract for the model's structured output.
//! It is sent verbatim (as [`ReportSchema::to_wire`]) with every analysis
//! request, and the same declaration validates the response before it is
//! turned into a [`Report`]. Responses that fail validation are rejected,
//! never repaired.
//!
//! Numeric ranges on [`SchemaNode::Number`] are validator-only: the wire form
//! carries plain `NUMBER` types and score scales stay a prompt convention.

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::models::{ObjectCategory, PermitDifficulty, Report, VacancyRisk};

/// Version of the canonical report contract.
pub const SCHEMA_VERSION: u32 = 2;

/// One node in a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Free text, or one of a fixed set of values.
    String { enumeration: Option<Vec<String>> },
    /// Any finite number, optionally bounded (inclusive) for validation.
    Number { range: Option<(f64, f64)> },
    /// Whole number.
    Integer,
    Boolean,
    /// Homogeneous ordered sequence.
    Array(Box<SchemaNode>),
    Object(ObjectSchema),
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String { enumeration: None }
    }

    pub fn string_enum(values: &[&str]) -> Self {
        SchemaNode::String {
            enumeration: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn number() -> Self {
        SchemaNode::Number { range: None }
    }

    /// Number bounded to `[min, max]` during validation.
    pub fn bounded(min: f64, max: f64) -> Self {
        SchemaNode::Number {
            range: Some((min, max)),
        }
    }

    /// Conventional 0-100 score.
    pub fn score() -> Self {
        Self::bounded(0.0, 100.0)
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array(Box::new(items))
    }

    pub fn string_list() -> Self {
        Self::array(Self::string())
    }

    /// Wire type tag in the structured-output dialect.
    pub fn type_tag(&self) -> &'static str {
        match self {
            SchemaNode::String { .. } => "STRING",
            SchemaNode::Number { .. } => "NUMBER",
            SchemaNode::Integer => "INTEGER",
            SchemaNode::Boolean => "BOOLEAN",
            SchemaNode::Array(_) => "ARRAY",
            SchemaNode::Object(_) => "OBJECT",
        }
    }

    /// Serialize to the structured-output schema dialect.
    pub fn to_wire(&self) -> Value {
        match self {
            SchemaNode::String {
                enumeration: Some(values),
            } => json!({ "type": "STRING", "enum": values }),
            SchemaNode::Array(items) => json!({ "type": "ARRAY", "items": items.to_wire() }),
            SchemaNode::Object(obj) => obj.to_wire(),
            other => json!({ "type": other.type_tag() }),
        }
    }

    /// Validate `value` against this node, appending violations under `path`.
    pub fn validate_into(&self, value: &Value, path: &str, violations: &mut Vec<String>) {
        match self {
            SchemaNode::String { enumeration } => match value.as_str() {
                Some(s) => {
                    if let Some(allowed) = enumeration {
                        if !allowed.iter().any(|a| a == s) {
                            violations.push(format!(
                                "{}: value {:?} not in [{}]",
                                path,
                                s,
                                allowed.join(", ")
                            ));
                        }
                    }
                }
                None => violations.push(type_mismatch(path, "string", value)),
            },
            SchemaNode::Number { range } => match value.as_f64() {
                Some(n) if n.is_finite() => {
                    if let Some((min, max)) = range {
                        if n < *min || n > *max {
                            violations
                                .push(format!("{}: {} outside range [{}, {}]", path, n, min, max));
                        }
                    }
                }
                _ => violations.push(type_mismatch(path, "number", value)),
            },
            SchemaNode::Integer => {
                let whole = value.is_i64()
                    || value.is_u64()
                    || value.as_f64().map(|n| n.fract() == 0.0).unwrap_or(false);
                if !whole {
                    violations.push(type_mismatch(path, "integer", value));
                }
            }
            SchemaNode::Boolean => {
                if !value.is_boolean() {
                    violations.push(type_mismatch(path, "boolean", value));
                }
            }
            SchemaNode::Array(items) => match value.as_array() {
                Some(elements) => {
                    for (i, element) in elements.iter().enumerate() {
                        items.validate_into(element, &format!("{}[{}]", path, i), violations);
                    }
                }
                None => violations.push(type_mismatch(path, "array", value)),
            },
            SchemaNode::Object(obj) => obj.validate_into(value, path, violations),
        }
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> String {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{}: expected {}, found {}", path, expected, found)
}

/// Object node: ordered properties plus the names that must be present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    properties: Vec<(String, SchemaNode)>,
    required: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an optional property.
    pub fn field(mut self, name: &str, node: SchemaNode) -> Self {
        self.properties.push((name.to_string(), node));
        self
    }

    /// Add a property that must be present.
    pub fn required_field(mut self, name: &str, node: SchemaNode) -> Self {
        self.required.push(name.to_string());
        self.field(name, node)
    }

    /// Wrap into a [`SchemaNode`].
    pub fn node(self) -> SchemaNode {
        SchemaNode::Object(self)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn to_wire(&self) -> Value {
        let mut properties = Map::new();
        for (name, node) in &self.properties {
            properties.insert(name.clone(), node.to_wire());
        }
        let mut wire = Map::new();
        wire.insert("type".to_string(), json!("OBJECT"));
        wire.insert("properties".to_string(), Value::Object(properties));
        if !self.required.is_empty() {
            wire.insert("required".to_string(), json!(self.required));
        }
        Value::Object(wire)
    }

    fn validate_into(&self, value: &Value, path: &str, violations: &mut Vec<String>) {
        let Some(map) = value.as_object() else {
            violations.push(type_mismatch(path, "object", value));
            return;
        };

        for name in &self.required {
            if !map.contains_key(name) {
                violations.push(format!("{}.{}: missing required field", path, name));
            }
        }

        // Unknown keys are ignored; declared keys are type-checked when present.
        for (name, node) in &self.properties {
            if let Some(child) = map.get(name) {
                node.validate_into(child, &format!("{}.{}", path, name), violations);
            }
        }
    }
}

/// Versioned report contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSchema {
    version: u32,
    root: ObjectSchema,
}

static CANONICAL: Lazy<ReportSchema> = Lazy::new(|| ReportSchema {
    version: SCHEMA_VERSION,
    root: canonical_root(),
});

impl ReportSchema {
    /// The canonical report contract.
    pub fn canonical() -> &'static ReportSchema {
        &CANONICAL
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn root(&self) -> &ObjectSchema {
        &self.root
    }

    /// Top-level fields every accepted report must carry.
    pub fn required_fields(&self) -> &[String] {
        self.root.required()
    }

    /// Structured-output constraint sent with the analysis request.
    pub fn to_wire(&self) -> Value {
        self.root.to_wire()
    }

    /// Check `value` against the contract.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let mut violations = Vec::new();
        self.root.validate_into(value, "$", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::SchemaViolation(violations))
        }
    }

    /// Parse model output text: JSON decode, validate, then construct.
    pub fn parse_report(&self, text: &str) -> Result<Report> {
        let value: Value = serde_json::from_str(text.trim())?;
        self.validate(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

fn canonical_root() -> ObjectSchema {
    let demographic = ObjectSchema::new()
        .field("label", SchemaNode::string())
        .field("percentage", SchemaNode::score())
        .field("description", SchemaNode::string());

    let coordinate = || SchemaNode::bounded(0.0, 1000.0);
    let detected_object = ObjectSchema::new()
        .required_field("label", SchemaNode::string())
        .required_field("category", SchemaNode::string_enum(&ObjectCategory::ALL))
        .required_field("ymin", coordinate())
        .required_field("xmin", coordinate())
        .required_field("ymax", coordinate())
        .required_field("xmax", coordinate());

    let business = ObjectSchema::new()
        .field("title", SchemaNode::string())
        .field("description", SchemaNode::string())
        .field("reasoning", SchemaNode::string())
        .field("riskFactors", SchemaNode::string_list())
        .field(
            "marketingCopy",
            ObjectSchema::new()
                .field("slogan", SchemaNode::string())
                .field("hashtags", SchemaNode::string_list())
                .field("brandColors", SchemaNode::string_list())
                .node(),
        )
        .field(
            "menuItems",
            SchemaNode::array(
                ObjectSchema::new()
                    .field("name", SchemaNode::string())
                    .field("price", SchemaNode::string())
                    .node(),
            ),
        );

    let radar = ObjectSchema::new()
        .field("innovation", SchemaNode::score())
        .field("walkability", SchemaNode::score())
        .field("safety", SchemaNode::score())
        .field("community", SchemaNode::score())
        .field("affluence", SchemaNode::score());

    let pair = |a: &str, b: &str| {
        ObjectSchema::new()
            .field(a, SchemaNode::string())
            .field(b, SchemaNode::string())
            .node()
    };

    ObjectSchema::new()
        .required_field("language", SchemaNode::string())
        .required_field("locationVibe", SchemaNode::string())
        .required_field("observedDemographics", SchemaNode::array(demographic.node()))
        .field("visualCues", SchemaNode::string_list())
        .required_field("detectedObjects", SchemaNode::array(detected_object.node()))
        .required_field("businessRecommendation", business.node())
        .required_field("radarMetrics", radar.node())
        .required_field("viabilityScore", SchemaNode::score())
        .required_field("gentrificationIndex", SchemaNode::score())
        .required_field("socialScore", SchemaNode::score())
        .required_field("colorPalette", SchemaNode::string_list())
        .required_field("soundscape", SchemaNode::string_list())
        .field("scentProfile", SchemaNode::string_list())
        .required_field("temporalProjection", pair("past", "future"))
        .required_field(
            "targetPersona",
            ObjectSchema::new()
                .field("archetype", SchemaNode::string())
                .field("quote", SchemaNode::string())
                .field("accessories", SchemaNode::string_list())
                .node(),
        )
        .required_field("antiPersona", SchemaNode::string())
        .required_field("architecturalStyle", SchemaNode::string())
        .required_field("atmosphere", SchemaNode::string())
        .required_field("commercialDensity", SchemaNode::string())
        .required_field("constructionStatus", SchemaNode::string())
        .required_field("subcultures", SchemaNode::string_list())
        .required_field("localCurrency", SchemaNode::string())
        .required_field("peakTime", SchemaNode::string())
        .required_field("transitAccess", SchemaNode::string_list())
        .required_field("brandAffinity", SchemaNode::string_list())
        .required_field("psychogeography", SchemaNode::string_list())
        .required_field("latteIndex", pair("price", "insight"))
        .required_field(
            "panopticonScore",
            ObjectSchema::new()
                .field("score", SchemaNode::score())
                .field("details", SchemaNode::string())
                .node(),
        )
        .required_field(
            "datingProfiles",
            SchemaNode::array(
                ObjectSchema::new()
                    .field("name", SchemaNode::string())
                    .field("age", SchemaNode::number())
                    .field("bio", SchemaNode::string())
                    .field("app", SchemaNode::string())
                    .field("lookingFor", SchemaNode::string())
                    .node(),
            ),
        )
        .required_field("goldenHour", pair("time", "quality"))
        .required_field(
            "vibeMatches",
            SchemaNode::array(
                ObjectSchema::new()
                    .field("location", SchemaNode::string())
                    .field("city", SchemaNode::string())
                    .field("matchScore", SchemaNode::score())
                    .field("reason", SchemaNode::string())
                    .node(),
            ),
        )
        .required_field(
            "rentalOpportunity",
            ObjectSchema::new()
                .field("estimatedRentPerSqFt", SchemaNode::string())
                .field("vacancyRisk", SchemaNode::string_enum(&VacancyRisk::ALL))
                .field(
                    "permitDifficulty",
                    SchemaNode::string_enum(&PermitDifficulty::ALL),
                )
                .field("bestLeaseTerm", SchemaNode::string())
                .node(),
        )
        .required_field(
            "playlist",
            SchemaNode::array(
                ObjectSchema::new()
                    .field("song", SchemaNode::string())
                    .field("artist", SchemaNode::string())
                    .field("vibe", SchemaNode::string())
                    .node(),
            ),
        )
        .required_field("investorPitch", pair("subjectLine", "emailBody"))
        .required_field(
            "coordinates",
            ObjectSchema::new()
                .required_field("lat", SchemaNode::bounded(-90.0, 90.0))
                .required_field("lng", SchemaNode::bounded(-180.0, 180.0))
                .field("locationName", SchemaNode::string())
                .node(),
        )
        .required_field(
            "dogIndex",
            ObjectSchema::new()
                .field("score", SchemaNode::score())
                .field("dominantBreed", SchemaNode::string())
                .field("insight", SchemaNode::string())
                .node(),
        )
        .required_field(
            "digitalNomadScore",
            ObjectSchema::new()
                .field("score", SchemaNode::score())
                .field("wifiReliability", SchemaNode::string())
                .field("laptopDensity", SchemaNode::string())
                .node(),
        )
        .required_field(
            "liminalSpaceScore",
            ObjectSchema::new()
                .field("score", SchemaNode::score())
                .field("description", SchemaNode::string())
                .node(),
        )
        .required_field(
            "vibeTarot",
            ObjectSchema::new()
                .field("cardName", SchemaNode::string())
                .field("meaning", SchemaNode::string())
                .field("visualSymbol", SchemaNode::string())
                .node(),
        )
        .required_field(
            "eventHorizon",
            ObjectSchema::new()
                .field("likelyEvents", SchemaNode::string_list())
                .field("vibe", SchemaNode::string())
                .node(),
        )
        .required_field(
            "competitorRadar",
            ObjectSchema::new()
                .field("indiePercentage", SchemaNode::score())
                .field("chainPercentage", SchemaNode::score())
                .field("dominantChain", SchemaNode::string())
                .node(),
        )
        .required_field(
            "influencerTrap",
            ObjectSchema::new()
                .field("score", SchemaNode::score())
                .field("photoSpots", SchemaNode::string_list())
                .node(),
        )
        .required_field(
            "caffeineSaturation",
            ObjectSchema::new()
                .field("shopsPerBlock", SchemaNode::number())
                .field("dominantBrewMethod", SchemaNode::string())
                .node(),
        )
        .required_field(
            "localUniform",
            ObjectSchema::new()
                .field("top", SchemaNode::string())
                .field("bottom", SchemaNode::string())
                .field("shoes", SchemaNode::string())
                .node(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest value satisfying every required field of the canonical schema.
    fn minimal_valid() -> Value {
        json!({
            "language": "English",
            "locationVibe": "Post-Industrial Creative Hub",
            "observedDemographics": [],
            "detectedObjects": [],
            "businessRecommendation": {},
            "radarMetrics": {},
            "viabilityScore": 94,
            "gentrificationIndex": 88,
            "socialScore": 95,
            "colorPalette": ["#A63C06"],
            "soundscape": [],
            "temporalProjection": {},
            "targetPersona": {},
            "antiPersona": "The Strip Mall Shopper",
            "architecturalStyle": "Adaptive Reuse Industrial",
            "atmosphere": "Curated Grittiness",
            "commercialDensity": "High Saturation",
            "constructionStatus": "Renovation Heavy",
            "subcultures": [],
            "localCurrency": "Aesthetics",
            "peakTime": "4:00 PM",
            "transitAccess": [],
            "brandAffinity": [],
            "psychogeography": [],
            "latteIndex": {},
            "panopticonScore": {},
            "datingProfiles": [],
            "goldenHour": {},
            "vibeMatches": [],
            "rentalOpportunity": {},
            "playlist": [],
            "investorPitch": {},
            "coordinates": { "lat": 51.5245, "lng": -0.078 },
            "dogIndex": {},
            "digitalNomadScore": {},
            "liminalSpaceScore": {},
            "vibeTarot": {},
            "eventHorizon": {},
            "competitorRadar": {},
            "influencerTrap": {},
            "caffeineSaturation": {},
            "localUniform": {}
        })
    }

    fn violations(value: &Value) -> Vec<String> {
        match ReportSchema::canonical().validate(value) {
            Err(Error::SchemaViolation(v)) => v,
            Err(other) => panic!("unexpected error: {}", other),
            Ok(()) => Vec::new(),
        }
    }

    #[test]
    fn test_canonical_required_fields() {
        let schema = ReportSchema::canonical();
        assert_eq!(schema.version(), SCHEMA_VERSION);
        assert_eq!(schema.required_fields().len(), 42);
        assert!(!schema.required_fields().iter().any(|f| f == "visualCues"));
        assert!(!schema.required_fields().iter().any(|f| f == "scentProfile"));
        assert!(schema.required_fields().iter().any(|f| f == "localUniform"));
        assert!(schema.required_fields().iter().any(|f| f == "language"));
    }

    #[test]
    fn test_minimal_valid_report_passes() {
        assert!(violations(&minimal_valid()).is_empty());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut value = minimal_valid();
        value.as_object_mut().unwrap().remove("viabilityScore");
        let v = violations(&value);
        assert_eq!(v, vec!["$.viabilityScore: missing required field".to_string()]);
    }

    #[test]
    fn test_missing_optional_field_accepted() {
        let mut value = minimal_valid();
        value.as_object_mut().unwrap().remove("visualCues");
        assert!(violations(&value).is_empty());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut value = minimal_valid();
        value["socialScore"] = json!("ninety-five");
        let v = violations(&value);
        assert_eq!(v.len(), 1);
        assert!(v[0].starts_with("$.socialScore: expected number"));
    }

    #[test]
    fn test_null_is_a_type_mismatch() {
        let mut value = minimal_valid();
        value["antiPersona"] = Value::Null;
        let v = violations(&value);
        assert_eq!(v, vec!["$.antiPersona: expected string, found null".to_string()]);
    }

    #[test]
    fn test_enum_violation_rejected() {
        let mut value = minimal_valid();
        value["rentalOpportunity"] = json!({ "vacancyRisk": "CATASTROPHIC" });
        let v = violations(&value);
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("$.rentalOpportunity.vacancyRisk"));
        assert!(v[0].contains("CATASTROPHIC"));
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let mut value = minimal_valid();
        value["viabilityScore"] = json!(140);
        let v = violations(&value);
        assert_eq!(v, vec!["$.viabilityScore: 140 outside range [0, 100]".to_string()]);
    }

    #[test]
    fn test_nested_required_in_array_items() {
        let mut value = minimal_valid();
        value["detectedObjects"] = json!([
            { "label": "Cyclist", "category": "person", "ymin": 500, "xmin": 100, "ymax": 900, "xmax": 300 },
            { "label": "Cobblestone", "category": "architecture", "ymin": 800, "xmin": 400, "ymax": 1000 }
        ]);
        let v = violations(&value);
        assert_eq!(v, vec!["$.detectedObjects[1].xmax: missing required field".to_string()]);
    }

    #[test]
    fn test_bounding_coordinate_range() {
        let mut value = minimal_valid();
        value["detectedObjects"] = json!([
            { "label": "Sky", "category": "nature", "ymin": 0, "xmin": 0, "ymax": 1200, "xmax": 1000 }
        ]);
        let v = violations(&value);
        assert_eq!(v.len(), 1);
        assert!(v[0].starts_with("$.detectedObjects[0].ymax"));
    }

    #[test]
    fn test_collects_every_violation() {
        let mut value = minimal_valid();
        let map = value.as_object_mut().unwrap();
        map.remove("dogIndex");
        map.remove("playlist");
        map.insert("colorPalette".to_string(), json!([1, 2]));
        let v = violations(&value);
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_non_object_root_rejected() {
        let v = violations(&json!([1, 2, 3]));
        assert_eq!(v, vec!["$: expected object, found array".to_string()]);
    }

    #[test]
    fn test_wire_schema_shape() {
        let wire = ReportSchema::canonical().to_wire();
        assert_eq!(wire["type"], "OBJECT");
        assert_eq!(wire["properties"]["soundscape"]["type"], "ARRAY");
        assert_eq!(wire["properties"]["soundscape"]["items"]["type"], "STRING");
        assert_eq!(
            wire["properties"]["detectedObjects"]["items"]["properties"]["category"]["enum"],
            json!(["person", "architecture", "object", "nature", "transport", "other"])
        );
        assert_eq!(
            wire["properties"]["rentalOpportunity"]["properties"]["permitDifficulty"]["enum"],
            json!(["EASY", "MODERATE", "NIGHTMARE"])
        );
        // Ranges stay out of the wire form.
        assert_eq!(
            wire["properties"]["viabilityScore"],
            json!({ "type": "NUMBER" })
        );
        assert_eq!(wire["required"].as_array().unwrap().len(), 42);
    }

    #[test]
    fn test_parse_report_constructs_after_validation() {
        let text = serde_json::to_string(&minimal_valid()).unwrap();
        let report = ReportSchema::canonical().parse_report(&text).unwrap();
        assert_eq!(report.location_vibe, "Post-Industrial Creative Hub");
        assert_eq!(report.coordinates.lat, 51.5245);
    }

    #[test]
    fn test_parse_report_rejects_malformed_json() {
        let err = ReportSchema::canonical()
            .parse_report("{\"language\": ")
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_integer_and_boolean_nodes() {
        let mut v = Vec::new();
        SchemaNode::Integer.validate_into(&json!(3), "$.n", &mut v);
        SchemaNode::Integer.validate_into(&json!(3.0), "$.n", &mut v);
        assert!(v.is_empty());
        SchemaNode::Integer.validate_into(&json!(3.5), "$.n", &mut v);
        SchemaNode::Boolean.validate_into(&json!("true"), "$.b", &mut v);
        assert_eq!(v.len(), 2);
    }
}
