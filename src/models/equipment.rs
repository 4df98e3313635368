//! Equipment model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::EquipmentKind;

/// A single donated item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Parent donation
    pub donation_id: i32,
    /// Serial number, unique when present
    pub serial_number: Option<String>,
    pub kind: EquipmentKind,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// e.g. "8GB DDR4"
    pub ram: Option<String>,
    /// e.g. "256GB SSD"
    pub storage: Option<String>,
    /// Faults and cosmetic state on arrival
    pub condition_notes: Option<String>,
    /// Stored path of the condition photo
    pub photo_path: Option<String>,
}

impl std::fmt::Display for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (S/N: {})",
            self.brand.as_deref().unwrap_or("Equipment"),
            self.model.as_deref().unwrap_or("No model"),
            self.serial_number.as_deref().unwrap_or("N/A")
        )
    }
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    pub donation_id: i32,
    #[validate(length(min = 1, max = 50))]
    pub serial_number: Option<String>,
    pub kind: EquipmentKind,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(length(max = 20))]
    pub ram: Option<String>,
    #[validate(length(max = 50))]
    pub storage: Option<String>,
    pub condition_notes: Option<String>,
    pub photo_path: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub donation_id: Option<i32>,
    /// `null` clears the serial number
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(length(max = 50))]
    #[schema(value_type = Option<String>, nullable)]
    pub serial_number: Option<Option<String>>,
    pub kind: Option<EquipmentKind>,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(length(max = 20))]
    pub ram: Option<String>,
    #[validate(length(max = 50))]
    pub storage: Option<String>,
    pub condition_notes: Option<String>,
    pub photo_path: Option<String>,
}

impl UpdateEquipment {
    /// Identity fields a technician may not change
    pub fn identity_fields_set(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.donation_id.is_some() {
            fields.push("donation_id");
        }
        if self.serial_number.is_some() {
            fields.push("serial_number");
        }
        if self.kind.is_some() {
            fields.push("kind");
        }
        if self.brand.is_some() {
            fields.push("brand");
        }
        if self.model.is_some() {
            fields.push("model");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_for_missing_fields() {
        let equipment = Equipment {
            id: 1,
            donation_id: 1,
            serial_number: None,
            kind: EquipmentKind::Other,
            brand: None,
            model: None,
            ram: None,
            storage: None,
            condition_notes: None,
            photo_path: None,
        };
        assert_eq!(equipment.to_string(), "Equipment No model (S/N: N/A)");
    }

    #[test]
    fn identity_fields_are_reported() {
        let update: UpdateEquipment = serde_json::from_value(serde_json::json!({
            "ram": "16GB",
            "serial_number": "SN-1",
            "brand": "Dell"
        }))
        .unwrap();
        assert_eq!(update.identity_fields_set(), vec!["serial_number", "brand"]);
    }

    #[test]
    fn null_serial_clears_while_absent_serial_is_untouched() {
        let clear: UpdateEquipment =
            serde_json::from_value(serde_json::json!({ "serial_number": null })).unwrap();
        assert_eq!(clear.serial_number, Some(None));
        assert_eq!(clear.identity_fields_set(), vec!["serial_number"]);

        let untouched: UpdateEquipment =
            serde_json::from_value(serde_json::json!({ "ram": "8GB" })).unwrap();
        assert_eq!(untouched.serial_number, None);
        assert!(untouched.identity_fields_set().is_empty());
    }
}
