//! Institution model (donors and receivers)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::InstitutionKind;

/// Institution record, keyed by its normalized RUT
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Institution {
    /// Normalized RUT (e.g. "76123456-7")
    pub rut: String,
    pub name: String,
    pub kind: InstitutionKind,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub commune: Option<String>,
    pub registered_on: NaiveDate,
}

impl std::fmt::Display for Institution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Create institution request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInstitution {
    /// RUT in any common format ("76.123.456-7", "761234567")
    pub rut: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub kind: InstitutionKind,
    #[validate(length(max = 100))]
    pub contact_name: Option<String>,
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub commune: Option<String>,
}

/// Update institution request (the RUT is immutable)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInstitution {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub kind: Option<InstitutionKind>,
    #[validate(length(max = 100))]
    pub contact_name: Option<String>,
    /// `null` clears the contact email
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(email(message = "Invalid contact email"))]
    #[schema(value_type = Option<String>, nullable)]
    pub contact_email: Option<Option<String>>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub commune: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_email_can_be_cleared() {
        let update: UpdateInstitution =
            serde_json::from_value(serde_json::json!({ "contact_email": null })).unwrap();
        assert_eq!(update.contact_email, Some(None));
        assert!(update.validate().is_ok());

        let update: UpdateInstitution =
            serde_json::from_value(serde_json::json!({ "name": "Liceo A-12" })).unwrap();
        assert_eq!(update.contact_email, None);
    }

    #[test]
    fn malformed_contact_email_still_fails_validation() {
        let update: UpdateInstitution =
            serde_json::from_value(serde_json::json!({ "contact_email": "not-an-email" })).unwrap();
        assert!(update.validate().is_err());
    }
}
