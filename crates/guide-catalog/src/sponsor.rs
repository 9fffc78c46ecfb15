use serde::Deserialize;

use crate::error::AppError;
use crate::model::SponsorStore;

/// Sponsor registration request body, as posted to the registration
/// endpoint. Optional fields default rather than fail; `isActive` defaults
/// to true for new stores.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorRegistration {
    pub store_name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub registration_date: String,
}

fn default_is_active() -> bool {
    true
}

impl SponsorRegistration {
    /// Reject registrations missing the fields a store record requires.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.store_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "storeName",
                message: "must not be empty".to_string(),
            });
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation {
                field: "category",
                message: "must not be empty".to_string(),
            });
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AppError::Validation {
                field: "email",
                message: "must not be empty".to_string(),
            });
        }
        if !email.contains('@') {
            return Err(AppError::Validation {
                field: "email",
                message: format!("not an email address: {email}"),
            });
        }
        Ok(())
    }

    /// Build the stored record with a server-assigned id.
    pub fn into_record(self, id: String) -> SponsorStore {
        SponsorStore {
            id,
            store_name: self.store_name.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description,
            address: self.address,
            phone: self.phone,
            email: self.email.trim().to_string(),
            is_active: self.is_active,
            registration_date: self.registration_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> SponsorRegistration {
        SponsorRegistration {
            store_name: "浅草もんじゃ横丁".to_string(),
            category: "restaurant".to_string(),
            description: String::new(),
            address: "東京都台東区".to_string(),
            phone: "03-0000-0000".to_string(),
            email: "info@monja.example".to_string(),
            is_active: true,
            registration_date: "2025-04-01".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn empty_store_name_is_rejected() {
        let mut r = registration();
        r.store_name = "  ".to_string();
        match r.validate() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "storeName"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut r = registration();
        r.email = "not-an-email".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn is_active_defaults_to_true_on_the_wire() {
        let r: SponsorRegistration = serde_json::from_str(
            r#"{"storeName":"店","category":"cafe","email":"a@b.example"}"#,
        )
        .unwrap();
        assert!(r.is_active);
        assert_eq!(r.registration_date, "");
    }

    #[test]
    fn into_record_trims_identity_fields() {
        let mut r = registration();
        r.store_name = " 浅草もんじゃ横丁 ".to_string();
        r.email = " INFO@monja.example ".to_string();
        let record = r.into_record("store-1".to_string());
        assert_eq!(record.store_name, "浅草もんじゃ横丁");
        assert_eq!(record.email, "INFO@monja.example");
        assert_eq!(record.id, "store-1");
    }
}
