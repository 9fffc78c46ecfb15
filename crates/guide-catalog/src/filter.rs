/// Guide card matching.
///
/// One authoritative filter implementation: conjunctive (AND) across the
/// location, language, fee, and keyword predicates, with OR semantics inside
/// the keyword predicate. Every predicate treats an empty or "all" selection
/// as a wildcard, and every string comparison goes through the same
/// `normalize` routine.
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::model::GuideCardView;

/// Selection labels that mean "no filter". Empty means nothing was selected.
const WILDCARD_LABELS: &[&str] = &["", "すべて", "all"];

/// Regions whose selection should also match their major cities.
const REGION_ALIASES: &[(&str, &[&str])] = &[("北海道", &["札幌", "函館", "旭川"])];

/// UI language labels mapped to the display-language strings cards carry.
const LANGUAGE_LABELS: &[(&str, &str)] = &[
    ("english", "英語"),
    ("japanese", "日本語"),
    ("chinese", "中国語"),
    ("korean", "韓国語"),
];

/// Current filter selections, snapshotted once per pass. Absent fields are
/// permissive defaults: every card passes the corresponding predicate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub language: String,
    /// Fee cap in yen. 0 means no cap.
    #[serde(default)]
    pub max_fee: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl FilterCriteria {
    /// Snapshot filter selections from loosely-typed inputs. `selected` holds
    /// checkbox-style keyword values; `free_text` is comma-split and merged
    /// in. Absent inputs degrade to match-all.
    pub fn from_inputs(
        location: Option<&str>,
        language: Option<&str>,
        max_fee: Option<u32>,
        selected: &[String],
        free_text: Option<&str>,
    ) -> Self {
        let mut keywords: Vec<String> = selected
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if let Some(text) = free_text {
            keywords.extend(
                text.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty()),
            );
        }
        Self {
            location: location.unwrap_or_default().trim().to_string(),
            language: language.unwrap_or_default().trim().to_string(),
            max_fee: max_fee.unwrap_or(0),
            keywords,
        }
    }
}

/// Returns true when the card satisfies every active criterion.
pub fn matches(card: &GuideCardView, criteria: &FilterCriteria) -> bool {
    matches_location(card, &criteria.location)
        && matches_language(card, &criteria.language)
        && matches_fee(card, criteria.max_fee)
        && matches_keywords(card, &criteria.keywords)
}

/// The one normalization routine consulted by every predicate: trim plus
/// Unicode-aware lowercase. Full-width/half-width folding is not performed.
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn is_wildcard(value: &str) -> bool {
    let v = normalize(value);
    WILDCARD_LABELS.iter().any(|label| v == *label)
}

/// Case-insensitive substring match of the selected location against the
/// card's location attribute or its full text. A region-level selection also
/// matches the region's major cities via the alias table.
fn matches_location(card: &GuideCardView, wanted: &str) -> bool {
    if is_wildcard(wanted) {
        return true;
    }
    let wanted = normalize(wanted);
    let location = normalize(&card.location);
    let full_text = normalize(&card.full_text);
    if location.contains(&wanted) || full_text.contains(&wanted) {
        return true;
    }
    for (region, cities) in REGION_ALIASES {
        if wanted == normalize(region) {
            return cities.iter().any(|city| {
                let city = normalize(city);
                location.contains(&city) || full_text.contains(&city)
            });
        }
    }
    false
}

/// Substring match against the card's language list or full text. UI
/// selections arrive as English labels ("English"); cards carry the
/// display-language strings ("英語"), so labels are mapped first.
fn matches_language(card: &GuideCardView, wanted: &str) -> bool {
    if is_wildcard(wanted) {
        return true;
    }
    let wanted = normalize(wanted);
    let display = LANGUAGE_LABELS
        .iter()
        .find(|(label, _)| *label == wanted)
        .map(|(_, display)| normalize(display))
        .unwrap_or(wanted);
    normalize(&card.languages).contains(&display) || normalize(&card.full_text).contains(&display)
}

/// Fee cap predicate: card fee must be at most `max_fee`; a cap of 0 means no
/// cap. When the card has no numeric fee it is recovered from the rendered
/// text; a card whose fee cannot be recovered at all passes the check. That
/// pass-through is pinned product behavior, not an oversight.
fn matches_fee(card: &GuideCardView, max_fee: u32) -> bool {
    if max_fee == 0 {
        return true;
    }
    match card.fee.or_else(|| fee_from_text(&card.full_text)) {
        Some(fee) => fee <= max_fee,
        None => true,
    }
}

/// OR across the selected keywords: any one keyword substring-matching the
/// card's keyword list or full text satisfies the predicate.
fn matches_keywords(card: &GuideCardView, keywords: &[String]) -> bool {
    let active: Vec<String> = keywords
        .iter()
        .map(|k| normalize(k))
        .filter(|k| !is_wildcard(k))
        .collect();
    if active.is_empty() {
        return true;
    }
    let card_keywords = normalize(&card.keywords);
    let full_text = normalize(&card.full_text);
    active
        .iter()
        .any(|k| card_keywords.contains(k.as_str()) || full_text.contains(k.as_str()))
}

static FEE_RE: OnceLock<Regex> = OnceLock::new();

fn fee_pattern() -> &'static Regex {
    FEE_RE.get_or_init(|| Regex::new(r"¥\s*([0-9][0-9,]*)").expect("valid regex"))
}

/// Recover a fee from rendered card text: `¥` followed by digits and commas.
pub fn fee_from_text(text: &str) -> Option<u32> {
    let caps = fee_pattern().captures(text)?;
    let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Guide;

    fn card(location: &str, languages: &[&str], fee: Option<u32>, keywords: &[&str], intro: &str) -> GuideCardView {
        GuideCardView::from_guide(&Guide {
            id: "guide-test".to_string(),
            name: "テストガイド".to_string(),
            location: location.to_string(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            fee,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            intro: intro.to_string(),
        })
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria::default()
    }

    #[test]
    fn wildcard_criteria_match_every_card() {
        let c = card("東京都", &["日本語"], Some(8000), &["グルメ"], "");
        assert!(matches(&c, &criteria()));
        let all = FilterCriteria {
            location: "すべて".to_string(),
            language: "all".to_string(),
            ..criteria()
        };
        assert!(matches(&c, &all));
    }

    #[test]
    fn location_matches_attribute_case_insensitively() {
        let c = card("Tokyo", &[], None, &[], "");
        let wanted = FilterCriteria {
            location: "tokyo".to_string(),
            ..criteria()
        };
        assert!(matches(&c, &wanted));
        let other = FilterCriteria {
            location: "osaka".to_string(),
            ..criteria()
        };
        assert!(!matches(&c, &other));
    }

    #[test]
    fn location_falls_back_to_full_text() {
        let c = card("関東", &[], None, &[], "浅草など東京都内を中心に案内");
        let wanted = FilterCriteria {
            location: "東京都".to_string(),
            ..criteria()
        };
        assert!(matches(&c, &wanted));
    }

    #[test]
    fn hokkaido_selection_matches_its_major_cities() {
        let wanted = FilterCriteria {
            location: "北海道".to_string(),
            ..criteria()
        };
        assert!(matches(&card("札幌市", &[], None, &[], ""), &wanted));
        assert!(matches(&card("函館", &[], None, &[], ""), &wanted));
        assert!(!matches(&card("仙台市", &[], None, &[], ""), &wanted));
    }

    #[test]
    fn language_label_maps_to_display_string() {
        let c = card("東京都", &["日本語", "英語"], None, &[], "");
        let english = FilterCriteria {
            language: "English".to_string(),
            ..criteria()
        };
        assert!(matches(&c, &english));
        let korean = FilterCriteria {
            language: "Korean".to_string(),
            ..criteria()
        };
        assert!(!matches(&c, &korean));
    }

    #[test]
    fn display_language_selection_matches_directly() {
        let c = card("東京都", &["中国語"], None, &[], "");
        let wanted = FilterCriteria {
            language: "中国語".to_string(),
            ..criteria()
        };
        assert!(matches(&c, &wanted));
    }

    #[test]
    fn fee_cap_is_inclusive() {
        let c = card("東京都", &[], Some(8000), &[], "");
        let at_cap = FilterCriteria {
            max_fee: 8000,
            ..criteria()
        };
        assert!(matches(&c, &at_cap));
        let below = FilterCriteria {
            max_fee: 7999,
            ..criteria()
        };
        assert!(!matches(&c, &below));
    }

    #[test]
    fn zero_fee_cap_passes_everything() {
        let c = card("東京都", &[], Some(50_000), &[], "");
        assert!(matches(&c, &criteria()));
    }

    #[test]
    fn fee_is_recovered_from_card_text() {
        let c = card("東京都", &[], None, &[], "1回 ¥12,000 から");
        let tight = FilterCriteria {
            max_fee: 10_000,
            ..criteria()
        };
        assert!(!matches(&c, &tight));
        let loose = FilterCriteria {
            max_fee: 15_000,
            ..criteria()
        };
        assert!(matches(&c, &loose));
    }

    #[test]
    fn unparseable_fee_passes_the_cap() {
        let c = card("東京都", &[], None, &[], "料金は応相談");
        let capped = FilterCriteria {
            max_fee: 5000,
            ..criteria()
        };
        assert!(matches(&c, &capped));
    }

    #[test]
    fn keywords_match_any_not_all() {
        let c = card("東京都", &[], None, &["グルメ", "歴史"], "");
        let one_of = FilterCriteria {
            keywords: vec!["夜景".to_string(), "グルメ".to_string()],
            ..criteria()
        };
        assert!(matches(&c, &one_of));
        let none_of = FilterCriteria {
            keywords: vec!["夜景".to_string(), "温泉".to_string()],
            ..criteria()
        };
        assert!(!matches(&c, &none_of));
    }

    #[test]
    fn keywords_fall_back_to_full_text() {
        let c = card("東京都", &[], None, &[], "夜景スポットに詳しいです");
        let wanted = FilterCriteria {
            keywords: vec!["夜景".to_string()],
            ..criteria()
        };
        assert!(matches(&c, &wanted));
    }

    #[test]
    fn predicates_combine_conjunctively() {
        let c = card("東京都", &["英語"], Some(8000), &["グルメ"], "");
        let all_pass = FilterCriteria {
            location: "東京都".to_string(),
            language: "English".to_string(),
            max_fee: 10_000,
            keywords: vec!["グルメ".to_string()],
        };
        assert!(matches(&c, &all_pass));
        let fee_fails = FilterCriteria {
            max_fee: 5000,
            ..all_pass
        };
        assert!(!matches(&c, &fee_fails));
    }

    #[test]
    fn from_inputs_merges_and_splits_keywords() {
        let selected = vec!["グルメ".to_string(), " ".to_string()];
        let c = FilterCriteria::from_inputs(
            Some(" 東京都 "),
            None,
            Some(9000),
            &selected,
            Some("夜景, 歴史 ,"),
        );
        assert_eq!(c.location, "東京都");
        assert_eq!(c.language, "");
        assert_eq!(c.max_fee, 9000);
        assert_eq!(c.keywords, vec!["グルメ", "夜景", "歴史"]);
    }

    #[test]
    fn from_inputs_defaults_are_permissive() {
        let c = FilterCriteria::from_inputs(None, None, None, &[], None);
        let any = card("どこか", &[], None, &[], "");
        assert!(matches(&any, &c));
    }

    #[test]
    fn fee_from_text_handles_commas_and_absence() {
        assert_eq!(fee_from_text("ガイド料 ¥8,000 より"), Some(8000));
        assert_eq!(fee_from_text("¥ 12000"), Some(12_000));
        assert_eq!(fee_from_text("8000円"), None);
    }
}
