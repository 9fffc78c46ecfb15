use serde::{Deserialize, Serialize};

/// A bookable guide — the canonical record behind one listing card
/// (name, location, fee, languages, keywords, introduction).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    /// Stable identifier, e.g. "guide-001"
    pub id: String,
    pub name: String,
    /// Prefecture or city label, e.g. "東京都"
    pub location: String,
    /// Display-language names as shown on the card, e.g. ["日本語", "英語"]
    #[serde(default)]
    pub languages: Vec<String>,
    /// Session fee in yen. `None` when the source record carried only free text.
    #[serde(default)]
    pub fee: Option<u32>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Free-form introduction shown on the card.
    #[serde(default)]
    pub intro: String,
}

/// The card-level view the matcher evaluates: denormalized attributes plus a
/// full-text blob used as fallback when an attribute doesn't carry the value.
#[derive(Debug, Clone)]
pub struct GuideCardView {
    pub id: String,
    pub location: String,
    /// Joined display-language list, e.g. "日本語, 英語"
    pub languages: String,
    pub fee: Option<u32>,
    /// Joined keyword list, e.g. "グルメ, 歴史"
    pub keywords: String,
    /// Everything rendered on the card, in one string.
    pub full_text: String,
}

impl GuideCardView {
    pub fn from_guide(guide: &Guide) -> Self {
        let languages = guide.languages.join(", ");
        let keywords = guide.keywords.join(", ");
        let fee_text = match guide.fee {
            Some(fee) => format!("¥{fee}"),
            None => String::new(),
        };
        let full_text = format!(
            "{} {} {} {} {} {}",
            guide.name, guide.location, languages, keywords, fee_text, guide.intro
        );
        Self {
            id: guide.id.clone(),
            location: guide.location.clone(),
            languages,
            fee: guide.fee,
            keywords,
            full_text,
        }
    }
}

/// A registered sponsor store (local business). Field names are camelCase on
/// the wire, matching the public registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorStore {
    pub id: String,
    pub store_name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    pub is_active: bool,
    #[serde(default)]
    pub registration_date: String,
}

/// UI locale for listing texts. One preference with one producer, replacing
/// the legacy selectedLanguage/preferredLanguage pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::Ja => "ja",
            Locale::En => "en",
        }
    }
}

impl From<&str> for Locale {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Locale::En,
            // Unknown tags fall back to Japanese, the site's primary locale.
            _ => Locale::Ja,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide() -> Guide {
        Guide {
            id: "guide-001".to_string(),
            name: "田中太郎".to_string(),
            location: "東京都".to_string(),
            languages: vec!["日本語".to_string(), "英語".to_string()],
            fee: Some(8000),
            keywords: vec!["グルメ".to_string(), "歴史".to_string()],
            intro: "下町グルメを案内します".to_string(),
        }
    }

    #[test]
    fn card_view_joins_attributes_and_builds_full_text() {
        let card = GuideCardView::from_guide(&guide());
        assert_eq!(card.languages, "日本語, 英語");
        assert_eq!(card.keywords, "グルメ, 歴史");
        assert!(card.full_text.contains("東京都"));
        assert!(card.full_text.contains("¥8000"));
        assert!(card.full_text.contains("下町グルメ"));
    }

    #[test]
    fn card_view_without_fee_has_no_currency_text() {
        let mut g = guide();
        g.fee = None;
        let card = GuideCardView::from_guide(&g);
        assert_eq!(card.fee, None);
        assert!(!card.full_text.contains('¥'));
    }

    #[test]
    fn locale_parses_tags_and_labels() {
        assert_eq!(Locale::from("en"), Locale::En);
        assert_eq!(Locale::from("English"), Locale::En);
        assert_eq!(Locale::from("ja"), Locale::Ja);
        assert_eq!(Locale::from("fr"), Locale::Ja);
    }
}
