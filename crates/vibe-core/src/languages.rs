//! Target language catalog.
//!
//! Report text values are written in a caller-chosen language while field
//! names stay fixed. The catalog lists the languages offered by default;
//! free-text languages outside it are still passed through verbatim.

/// A selectable target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639 code.
    pub code: &'static str,
    /// Display name, with the endonym in parentheses where it differs.
    pub name: &'static str,
}

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("af", "Afrikaans"),
    ("sq", "Albanian (Shqip)"),
    ("am", "Amharic (አማርኛ)"),
    ("ar", "Arabic (العربية)"),
    ("hy", "Armenian (Հայերեն)"),
    ("az", "Azerbaijani (Azərbaycan)"),
    ("eu", "Basque (Euskara)"),
    ("be", "Belarusian (Беларуская)"),
    ("bn", "Bengali (বাংলা)"),
    ("bs", "Bosnian (Bosanski)"),
    ("bg", "Bulgarian (Български)"),
    ("my", "Burmese (မြန်မာဘာသာ)"),
    ("ca", "Catalan (Català)"),
    ("ny", "Chichewa"),
    ("zh", "Chinese (Simplified) (简体中文)"),
    ("hr", "Croatian (Hrvatski)"),
    ("cs", "Czech (Čeština)"),
    ("da", "Danish (Dansk)"),
    ("nl", "Dutch (Nederlands)"),
    ("eo", "Esperanto"),
    ("et", "Estonian (Eesti)"),
    ("fil", "Filipino (Tagalog)"),
    ("fi", "Finnish (Suomi)"),
    ("fr", "French (Français)"),
    ("gl", "Galician (Galego)"),
    ("ka", "Georgian (ქართული)"),
    ("de", "German (Deutsch)"),
    ("el", "Greek (Ελληνικά)"),
    ("gu", "Gujarati (ગુજરાતી)"),
    ("ha", "Hausa"),
    ("he", "Hebrew (עברית)"),
    ("hi", "Hindi (हिन्दी)"),
    ("hu", "Hungarian (Magyar)"),
    ("is", "Icelandic (Íslenska)"),
    ("ig", "Igbo (Asụsụ Igbo)"),
    ("id", "Indonesian (Bahasa Indonesia)"),
    ("ga", "Irish (Gaeilge)"),
    ("it", "Italian (Italiano)"),
    ("ja", "Japanese (日本語)"),
    ("jv", "Javanese (Basa Jawa)"),
    ("kn", "Kannada (ಕನ್ನಡ)"),
    ("kk", "Kazakh (Қазақша)"),
    ("km", "Khmer (ភាសាខ្មែរ)"),
    ("ko", "Korean (한국어)"),
    ("ky", "Kyrgyz (Кыргызча)"),
    ("lo", "Lao (ພາສາລາວ)"),
    ("la", "Latin"),
    ("lv", "Latvian (Latviešu)"),
    ("lt", "Lithuanian (Lietuvių)"),
    ("lb", "Luxembourgish (Lëtzebuergesch)"),
    ("mk", "Macedonian (Македонски)"),
    ("mg", "Malagasy"),
    ("ms", "Malay (Bahasa Melayu)"),
    ("ml", "Malayalam (മലയാളം)"),
    ("mt", "Maltese (Malti)"),
    ("mr", "Marathi (मराठी)"),
    ("mn", "Mongolian (Монгол)"),
    ("ne", "Nepali (नेपाली)"),
    ("no", "Norwegian (Norsk)"),
    ("ps", "Pashto (پښتو)"),
    ("fa", "Persian (فارسی)"),
    ("pl", "Polish (Polski)"),
    ("pt", "Portuguese (Português)"),
    ("pa", "Punjabi (ਪੰਜਾਬੀ)"),
    ("ro", "Romanian (Română)"),
    ("ru", "Russian (Русский)"),
    ("sa", "Sanskrit (संस्कृतम्)"),
    ("gd", "Scottish Gaelic (Gàidhlig)"),
    ("sr", "Serbian (Српски)"),
    ("st", "Sesotho"),
    ("sn", "Shona"),
    ("sd", "Sindhi (سنڌي)"),
    ("si", "Sinhala (සිංහල)"),
    ("sk", "Slovak (Slovenčina)"),
    ("sl", "Slovenian (Slovenščina)"),
    ("so", "Somali (Soomaaliga)"),
    ("es", "Spanish (Español)"),
    ("su", "Sundanese (Basa Sunda)"),
    ("sw", "Swahili (Kiswahili)"),
    ("sv", "Swedish (Svenska)"),
    ("tg", "Tajik (Тоҷикӣ)"),
    ("ta", "Tamil (தமிழ்)"),
    ("tt", "Tatar (Татарча)"),
    ("te", "Telugu (తెలుగు)"),
    ("th", "Thai (ไทย)"),
    ("ti", "Tigrinya (ትግርኛ)"),
    ("tr", "Turkish (Türkçe)"),
    ("uk", "Ukrainian (Українська)"),
    ("ur", "Urdu (اردو)"),
    ("ug", "Uyghur (ئۇيغۇرچە)"),
    ("uz", "Uzbek (Oʻzbek)"),
    ("vi", "Vietnamese (Tiếng Việt)"),
    ("cy", "Welsh (Cymraeg)"),
    ("xh", "Xhosa (isiXhosa)"),
    ("yi", "Yiddish (ייִדיש)"),
    ("yo", "Yoruba (Èdè Yorùbá)"),
    ("zu", "Zulu (isiZulu)"),
];

/// All catalog languages in declaration order.
pub fn all() -> impl Iterator<Item = Language> {
    LANGUAGES
        .iter()
        .map(|&(code, name)| Language { code, name })
}

/// Catalog languages sorted by display name.
pub fn sorted() -> Vec<Language> {
    let mut langs: Vec<Language> = all().collect();
    langs.sort_by(|a, b| a.name.cmp(b.name));
    langs
}

/// Look up a language by code or display name, case-insensitively.
///
/// The English part of a display name also matches, so `"french"` resolves
/// to `French (Français)`.
pub fn resolve(input: &str) -> Option<Language> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    all().find(|lang| {
        let name = lang.name.to_lowercase();
        lang.code.eq_ignore_ascii_case(&needle) || name == needle || english_name(&name) == needle
    })
}

/// Languages whose code or name contains `query` (case-insensitive).
pub fn search(query: &str) -> Vec<Language> {
    let needle = query.trim().to_lowercase();
    sorted()
        .into_iter()
        .filter(|lang| {
            lang.code.to_lowercase().contains(&needle)
                || lang.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Name to embed in the instruction text: the catalog name when known,
/// otherwise the caller's text unchanged.
pub fn display_name(input: &str) -> String {
    match resolve(input) {
        Some(lang) => lang.name.to_string(),
        None => input.trim().to_string(),
    }
}

fn english_name(name: &str) -> &str {
    match name.find(" (") {
        Some(idx) => &name[..idx],
        None => name,
    }
}
