/// Guide seed loading.
///
/// Accepts two shapes:
/// - canonical: a JSON array of guide records
/// - legacy export: an object mapping the old storage keys (`guidesData`,
///   `tomoTrip_guides`, `userAddedGuides`, plus per-guide `guide_<id>` keys)
///   to guide arrays or single records
///
/// Legacy keys are merged in a fixed order with later sources winning on id
/// collisions. Malformed entries are skipped with a warning; only an
/// unreadable document is an error.
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;
use crate::model::Guide;

/// Legacy array keys in merge order (later wins on id collision).
const LEGACY_KEYS: &[&str] = &["guidesData", "tomoTrip_guides", "userAddedGuides"];

pub fn load_guides(raw: &str) -> Result<Vec<Guide>, AppError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AppError::Seed(format!("invalid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(collect_guides(&items, "guides")),
        Value::Object(map) => {
            let mut merged: Vec<Guide> = Vec::new();
            for key in LEGACY_KEYS {
                if let Some(Value::Array(items)) = map.get(*key) {
                    for guide in collect_guides(items, key) {
                        upsert(&mut merged, guide);
                    }
                }
            }
            // Per-guide keys hold a single record each. Sorted so the merge
            // order is deterministic.
            let mut single_keys: Vec<&String> =
                map.keys().filter(|k| k.starts_with("guide_")).collect();
            single_keys.sort();
            for key in single_keys {
                match serde_json::from_value::<Guide>(map[key].clone()) {
                    Ok(guide) => upsert(&mut merged, guide),
                    Err(e) => warn!(key = %key, error = %e, "skipping malformed legacy guide"),
                }
            }
            Ok(merged)
        }
        _ => Err(AppError::Seed(
            "expected a guide array or a legacy export object".to_string(),
        )),
    }
}

fn collect_guides(items: &[Value], source: &str) -> Vec<Guide> {
    let mut guides = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<Guide>(item.clone()) {
            Ok(guide) => guides.push(guide),
            Err(e) => warn!(source, index, error = %e, "skipping malformed guide entry"),
        }
    }
    guides
}

/// Replace an existing guide with the same id, otherwise append.
fn upsert(merged: &mut Vec<Guide>, guide: Guide) {
    match merged.iter_mut().find(|g| g.id == guide.id) {
        Some(existing) => *existing = guide,
        None => merged.push(guide),
    }
}
