/// The catalog store: one typed owner for all persisted state, one producer
/// per key.
///
/// In-memory state is authoritative; Redis is a write-through snapshot layer
/// with graceful degradation. Every mutation bumps a revision published on a
/// watch channel, so views subscribe instead of polling.
///
/// Key schema (namespaced):
/// - `tomo:v1:guides` — JSON-serialized Vec<Guide>
/// - `tomo:v1:sponsor_stores` — JSON-serialized Vec<SponsorStore>
/// - `tomo:v1:locale` — locale tag ("ja" / "en")
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use tokio::sync::{watch, RwLock};
use tracing::warn;

use tomo_common::redis::RedisStore;

use crate::error::AppError;
use crate::model::{Guide, Locale, SponsorStore};
use crate::sponsor::SponsorRegistration;

const KEY_GUIDES: &str = "tomo:v1:guides";
const KEY_SPONSORS: &str = "tomo:v1:sponsor_stores";
const KEY_LOCALE: &str = "tomo:v1:locale";

struct CatalogState {
    guides: Vec<Guide>,
    sponsors: Vec<SponsorStore>,
    locale: Locale,
}

pub struct CatalogStore {
    state: RwLock<CatalogState>,
    redis: RedisStore,
    revision_tx: watch::Sender<u64>,
}

impl CatalogStore {
    pub fn new(redis: RedisStore) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            state: RwLock::new(CatalogState {
                guides: Vec::new(),
                sponsors: Vec::new(),
                locale: Locale::default(),
            }),
            redis,
            revision_tx,
        }
    }

    /// Subscribe to state revisions. Each mutation bumps the revision once.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    fn bump(&self) {
        self.revision_tx.send_modify(|rev| *rev += 1);
    }

    /// Restore persisted snapshots. Returns true when a guides snapshot was
    /// found; absence is not an error (fresh start, or Redis down).
    pub async fn restore(&self) -> bool {
        let mut restored = false;
        if let Some(raw) = self.redis.get(KEY_GUIDES).await {
            match serde_json::from_str::<Vec<Guide>>(&raw) {
                Ok(guides) => {
                    self.state.write().await.guides = guides;
                    restored = true;
                }
                Err(e) => warn!(error = %e, key = KEY_GUIDES, "snapshot deserialization failed"),
            }
        }
        if let Some(raw) = self.redis.get(KEY_SPONSORS).await {
            match serde_json::from_str::<Vec<SponsorStore>>(&raw) {
                Ok(sponsors) => self.state.write().await.sponsors = sponsors,
                Err(e) => warn!(error = %e, key = KEY_SPONSORS, "snapshot deserialization failed"),
            }
        }
        if let Some(raw) = self.redis.get(KEY_LOCALE).await {
            self.state.write().await.locale = Locale::from(raw.as_str());
        }
        if restored {
            self.bump();
        }
        restored
    }

    // --- guides (producers: seed loader, guide registration) ---

    pub async fn guides(&self) -> Vec<Guide> {
        self.state.read().await.guides.clone()
    }

    pub async fn guide(&self, id: &str) -> Option<Guide> {
        self.state
            .read()
            .await
            .guides
            .iter()
            .find(|g| g.id == id)
            .cloned()
    }

    pub async fn replace_guides(&self, guides: Vec<Guide>) {
        self.state.write().await.guides = guides;
        self.persist_guides().await;
        self.bump();
    }

    pub async fn add_guide(&self, guide: Guide) -> Result<Guide, AppError> {
        {
            let mut state = self.state.write().await;
            if state.guides.iter().any(|g| g.id == guide.id) {
                return Err(AppError::Validation {
                    field: "id",
                    message: format!("guide id already exists: {}", guide.id),
                });
            }
            state.guides.push(guide.clone());
        }
        self.persist_guides().await;
        self.bump();
        Ok(guide)
    }

    async fn persist_guides(&self) {
        let state = self.state.read().await;
        if let Ok(json) = serde_json::to_string(&state.guides) {
            self.redis.set(KEY_GUIDES, &json).await;
        }
    }

    // --- sponsor stores (producer: sponsor registration) ---

    pub async fn sponsors(&self) -> Vec<SponsorStore> {
        self.state.read().await.sponsors.clone()
    }

    /// Register a sponsor store. Rejects a duplicate email with
    /// `AppError::DuplicateEmail` (case-insensitive comparison).
    pub async fn register_sponsor(
        &self,
        registration: SponsorRegistration,
    ) -> Result<SponsorStore, AppError> {
        registration.validate()?;
        let record = {
            let mut state = self.state.write().await;
            let email = registration.email.trim().to_lowercase();
            if state
                .sponsors
                .iter()
                .any(|s| s.email.to_lowercase() == email)
            {
                return Err(AppError::DuplicateEmail(registration.email.trim().to_string()));
            }
            let record = registration.into_record(mint_id("store"));
            state.sponsors.push(record.clone());
            record
        };
        self.persist_sponsors().await;
        self.bump();
        Ok(record)
    }

    async fn persist_sponsors(&self) {
        let state = self.state.read().await;
        if let Ok(json) = serde_json::to_string(&state.sponsors) {
            self.redis.set(KEY_SPONSORS, &json).await;
        }
    }

    // --- locale (producer: language preference endpoint) ---

    pub async fn locale(&self) -> Locale {
        self.state.read().await.locale
    }

    pub async fn set_locale(&self, locale: Locale) {
        self.state.write().await.locale = locale;
        self.redis.set(KEY_LOCALE, locale.tag()).await;
        self.bump();
    }
}

static RECORD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mint a short unique record id: hash of wall time, pid, and a process-local
/// counter, prefixed by the record kind ("store-1a2b…").
pub fn mint_id(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let counter = RECORD_COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();

    let mut h = Sha256::new();
    h.update(now.as_nanos().to_le_bytes());
    h.update(pid.to_le_bytes());
    h.update(counter.to_le_bytes());
    let digest = h.finalize();
    format!("{prefix}-{}", hex_lower(&digest[..8]))
}

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CatalogStore {
        CatalogStore::new(RedisStore::new(None))
    }

    fn guide(id: &str) -> Guide {
        Guide {
            id: id.to_string(),
            name: "ガイド".to_string(),
            location: "東京都".to_string(),
            languages: Vec::new(),
            fee: None,
            keywords: Vec::new(),
            intro: String::new(),
        }
    }

    fn registration(email: &str) -> SponsorRegistration {
        SponsorRegistration {
            store_name: "店".to_string(),
            category: "cafe".to_string(),
            description: String::new(),
            address: String::new(),
            phone: String::new(),
            email: email.to_string(),
            is_active: true,
            registration_date: String::new(),
        }
    }

    #[tokio::test]
    async fn add_guide_rejects_duplicate_id() {
        let store = store();
        store.add_guide(guide("guide-1")).await.unwrap();
        assert!(store.add_guide(guide("guide-1")).await.is_err());
        assert_eq!(store.guides().await.len(), 1);
    }

    #[tokio::test]
    async fn guide_lookup_by_id() {
        let store = store();
        store.add_guide(guide("guide-1")).await.unwrap();
        assert!(store.guide("guide-1").await.is_some());
        assert!(store.guide("guide-2").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_sponsor_email_is_rejected_case_insensitively() {
        let store = store();
        store
            .register_sponsor(registration("info@monja.example"))
            .await
            .unwrap();
        let err = store
            .register_sponsor(registration("INFO@Monja.example"))
            .await
            .unwrap_err();
        match err {
            AppError::DuplicateEmail(email) => assert_eq!(email, "INFO@Monja.example"),
            other => panic!("expected duplicate email error, got {other:?}"),
        }
        assert_eq!(store.sponsors().await.len(), 1);
    }

    #[tokio::test]
    async fn distinct_sponsor_emails_are_both_stored() {
        let store = store();
        let first = store
            .register_sponsor(registration("a@example.com"))
            .await
            .unwrap();
        let second = store
            .register_sponsor(registration("b@example.com"))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.sponsors().await.len(), 2);
    }

    #[tokio::test]
    async fn every_mutation_bumps_the_revision_once() {
        let store = store();
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), 0);

        store.replace_guides(vec![guide("guide-1")]).await;
        assert_eq!(*rx.borrow(), 1);

        store.set_locale(Locale::En).await;
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(store.locale().await, Locale::En);

        store
            .register_sponsor(registration("a@example.com"))
            .await
            .unwrap();
        assert_eq!(*rx.borrow(), 3);
    }

    #[tokio::test]
    async fn restore_without_redis_reports_fresh_start() {
        let store = store();
        assert!(!store.restore().await);
        assert!(store.guides().await.is_empty());
    }

    #[test]
    fn minted_ids_carry_prefix_and_differ() {
        let a = mint_id("store");
        let b = mint_id("store");
        assert!(a.starts_with("store-"));
        assert_ne!(a, b);
    }
}
