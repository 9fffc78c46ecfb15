use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::filter::FilterCriteria;
use crate::listing::{self, ListingView};
use crate::model::{Guide, Locale, SponsorStore};
use crate::sponsor::SponsorRegistration;
use crate::store::{self, CatalogStore};

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Guide listing and registration.
pub const GUIDES_PATH: &str = "/api/guides";
/// Guide detail.
pub const GUIDE_PATH: &str = "/api/guides/{id}";
/// Sponsor store listing and registration.
pub const SPONSOR_STORES_PATH: &str = "/api/sponsor-stores";
/// Consolidated language preference.
pub const LANGUAGE_PREF_PATH: &str = "/api/preferences/language";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(GUIDES_PATH, get(list_guides).post(register_guide))
        .route(GUIDE_PATH, get(get_guide))
        .route(
            SPONSOR_STORES_PATH,
            get(list_sponsor_stores).post(register_sponsor_store),
        )
        .route(LANGUAGE_PREF_PATH, get(get_language).put(set_language))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Filter selections as they arrive on the query string. All optional; no
/// parameters means the full catalog. `keyword` is checkbox-style and may
/// repeat, so the query is read as raw pairs rather than a flat struct.
#[derive(Debug, Default)]
struct GuideListParams {
    location: Option<String>,
    language: Option<String>,
    max_fee: Option<u32>,
    /// Checkbox-style keyword selections, one per `keyword` pair.
    keyword: Vec<String>,
    /// Free-text keywords, comma-separated.
    keywords: Option<String>,
    /// Per-request locale override for the counter text.
    locale: Option<String>,
}

impl GuideListParams {
    /// Collect raw query pairs. `keyword` accumulates across repeats; scalar
    /// fields take the last occurrence; unknown keys are ignored.
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, AppError> {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "location" => params.location = Some(value.clone()),
                "language" => params.language = Some(value.clone()),
                "max_fee" => {
                    let fee = value.trim().parse::<u32>().map_err(|_| AppError::Validation {
                        field: "max_fee",
                        message: format!("not a number: {value}"),
                    })?;
                    params.max_fee = Some(fee);
                }
                "keyword" => params.keyword.push(value.clone()),
                "keywords" => params.keywords = Some(value.clone()),
                "locale" => params.locale = Some(value.clone()),
                _ => {}
            }
        }
        Ok(params)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GuideListResponse {
    /// The matching guides, in catalog order.
    guides: Vec<Guide>,
    #[serde(flatten)]
    view: ListingView,
}

async fn list_guides(
    State(st): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<GuideListResponse>, AppError> {
    let params = GuideListParams::from_pairs(&pairs)?;
    let criteria = FilterCriteria::from_inputs(
        params.location.as_deref(),
        params.language.as_deref(),
        params.max_fee,
        &params.keyword,
        params.keywords.as_deref(),
    );
    let locale = match params.locale.as_deref() {
        Some(tag) => Locale::from(tag),
        None => st.store.locale().await,
    };

    let guides = st.store.guides().await;
    let view = listing::render(&guides, &criteria, locale);
    let visible: Vec<Guide> = guides
        .into_iter()
        .zip(view.cards.iter())
        .filter(|(_, card)| card.visible)
        .map(|(guide, _)| guide)
        .collect();

    Ok(Json(GuideListResponse {
        guides: visible,
        view,
    }))
}

/// Guide registration request body. The id is server-assigned unless the
/// caller provides one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuideRegistration {
    #[serde(default)]
    id: Option<String>,
    name: String,
    location: String,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    fee: Option<u32>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    intro: String,
}

async fn register_guide(
    State(st): State<AppState>,
    Json(body): Json<GuideRegistration>,
) -> Result<(StatusCode, Json<Guide>), AppError> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation {
            field: "name",
            message: "must not be empty".to_string(),
        });
    }
    let location = body.location.trim().to_string();
    if location.is_empty() {
        return Err(AppError::Validation {
            field: "location",
            message: "must not be empty".to_string(),
        });
    }

    let id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| store::mint_id("guide"));
    let guide = Guide {
        id,
        name,
        location,
        languages: body.languages,
        fee: body.fee,
        keywords: body.keywords,
        intro: body.intro,
    };
    let stored = st.store.add_guide(guide).await?;
    info!(id = %stored.id, "guide registered");
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_guide(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Guide>, AppError> {
    st.store
        .guide(&id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

async fn list_sponsor_stores(State(st): State<AppState>) -> Json<Vec<SponsorStore>> {
    Json(st.store.sponsors().await)
}

async fn register_sponsor_store(
    State(st): State<AppState>,
    Json(body): Json<SponsorRegistration>,
) -> Result<(StatusCode, Json<SponsorStore>), AppError> {
    let record = st.store.register_sponsor(body).await?;
    info!(id = %record.id, "sponsor store registered");
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagePreference {
    language: String,
}

async fn get_language(State(st): State<AppState>) -> Json<LanguagePreference> {
    Json(LanguagePreference {
        language: st.store.locale().await.tag().to_string(),
    })
}

async fn set_language(
    State(st): State<AppState>,
    Json(body): Json<LanguagePreference>,
) -> Json<LanguagePreference> {
    let locale = Locale::from(body.language.as_str());
    st.store.set_locale(locale).await;
    Json(LanguagePreference {
        language: locale.tag().to_string(),
    })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation { .. } | AppError::Seed(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
