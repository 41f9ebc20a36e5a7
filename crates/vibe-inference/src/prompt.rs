//! Instruction text sent alongside the media.

use vibe_core::languages;

/// Analytical dimensions the model is asked to cover, in prompt order.
pub const ANALYSES: [(&str, &str); 15] = [
    ("LATTE INDEX", "Estimate the local price of a latte."),
    ("PANOPTICON", "Rate the level of visible surveillance."),
    ("TINDER ARCHETYPES", "Write dating profiles for the locals."),
    ("GOLDEN HOUR", "Judge the lighting quality and best time."),
    ("INSTANT IPO", "Pitch a business that would thrive here."),
    ("DOG INDEX", "Read pet breeds as economic indicators."),
    ("NOMAD SCORE", "Gauge laptop and WiFi density."),
    ("LIMINAL METER", "Decide how soulless or eerie the space feels."),
    ("VIBE TAROT", "Assign a tarot card to this place."),
    ("EVENT HORIZON", "Predict the pop-ups and events that happen here."),
    ("COMPETITOR RADAR", "Split independent versus chain businesses."),
    ("INFLUENCER TRAP", "Score the photo and short-video potential."),
    ("CAFFEINE SATURATION", "Estimate coffee shop density."),
    ("LOCAL UNIFORM", "Describe exactly what people are wearing."),
    ("GEOLOCATION", "Estimate coordinates and a location name."),
];

/// Build the analysis instruction for the given target language.
///
/// Known language codes resolve to their display name; anything else is
/// passed through verbatim.
pub fn analysis_instruction(language: &str) -> String {
    let language = languages::display_name(language);

    let mut prompt = String::with_capacity(1600);
    prompt.push_str("Act as a world-renowned urban anthropologist and cultural strategist.\n");
    prompt.push_str("Analyze this footage of a street scene.\n\n");
    prompt.push_str("CRITICAL INSTRUCTION:\n");
    prompt.push_str(&format!(
        "Write ALL string values in the following language: \"{}\".\n",
        language
    ));
    prompt.push_str(&format!(
        "Keep every JSON key exactly as declared in English; only the content is in {}.\n",
        language
    ));
    prompt.push_str(&format!(
        "Set the \"language\" field to \"{}\".\n\n",
        language
    ));
    prompt.push_str(&format!(
        "PERFORM THESE {} DEEP ANALYSES:\n",
        ANALYSES.len()
    ));
    for (i, (name, task)) in ANALYSES.iter().enumerate() {
        prompt.push_str(&format!("{}. \"{}\": {}\n", i + 1, name, task));
    }
    prompt.push_str(
        "\nAlso fill in the business recommendation, demographic read, sensory profile \
         (colors, soundscape, scent), temporal projection, target persona and anti-persona, \
         radar metrics, and bounding boxes for detected objects (coordinates 0-1000).\n",
    );
    prompt.push_str("Scores are 0-100. Be witty, specific, and culturally sharp.\n");
    prompt
}

/// Instruction for brand logo generation.
pub fn logo_instruction(subject: &str) -> String {
    format!(
        "Design a minimal, cool, vector-style logo for: {}. White background.",
        subject
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_directive_uses_display_name() {
        let prompt = analysis_instruction("ja");
        assert!(prompt.contains("\"Japanese (日本語)\""));
        assert!(prompt.contains("only the content is in Japanese (日本語)"));
    }

    #[test]
    fn test_unknown_language_passes_through() {
        let prompt = analysis_instruction("Pirate English");
        assert!(prompt.contains("\"Pirate English\""));
    }

    #[test]
    fn test_all_analyses_listed_in_order() {
        let prompt = analysis_instruction("English");
        let mut last = 0;
        for (i, (name, _)) in ANALYSES.iter().enumerate() {
            let marker = format!("{}. \"{}\"", i + 1, name);
            let pos = prompt.find(&marker).unwrap();
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn test_logo_instruction() {
        assert_eq!(
            logo_instruction("Neon Noodle Bar"),
            "Design a minimal, cool, vector-style logo for: Neon Noodle Bar. White background."
        );
    }
}
