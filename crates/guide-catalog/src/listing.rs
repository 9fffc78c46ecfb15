/// Listing view computation.
///
/// One pure pass from `(guides, criteria, locale)` to the complete view
/// state: per-card visibility, counts, localized counter text, and the
/// no-results flag. Recomputed from scratch on every criteria or state
/// change; visibility is owned here and nowhere else.
use serde::Serialize;

use crate::filter::{self, FilterCriteria};
use crate::model::{Guide, GuideCardView, Locale};

/// One listing entry: the card id plus its computed visibility.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVisibility {
    pub id: String,
    pub visible: bool,
}

/// The complete view state for one filter pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub cards: Vec<CardVisibility>,
    pub visible_count: usize,
    pub total_count: usize,
    pub counter_text: String,
    pub no_results: bool,
}

/// Run one filter pass over the guides.
pub fn render(guides: &[Guide], criteria: &FilterCriteria, locale: Locale) -> ListingView {
    let mut cards = Vec::with_capacity(guides.len());
    let mut visible_count = 0;
    for guide in guides {
        let card = GuideCardView::from_guide(guide);
        let visible = filter::matches(&card, criteria);
        if visible {
            visible_count += 1;
        }
        cards.push(CardVisibility {
            id: guide.id.clone(),
            visible,
        });
    }
    let total_count = guides.len();
    ListingView {
        cards,
        visible_count,
        total_count,
        counter_text: counter_text(visible_count, locale),
        no_results: visible_count == 0,
    }
}

/// Localized results counter shown above the card grid.
pub fn counter_text(count: usize, locale: Locale) -> String {
    match locale {
        Locale::Ja => format!("{count}人のガイドが見つかりました"),
        Locale::En => match count {
            1 => "1 guide found".to_string(),
            n => format!("{n} guides found"),
        },
    }
}
