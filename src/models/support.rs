//! Support ticket model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::SupportKind;

/// Support ticket raised against an assignment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Support {
    pub id: i32,
    pub assignment_id: i32,
    /// Technician in charge; cleared when the technician account is deleted
    pub technician_id: Option<i32>,
    pub kind: SupportKind,
    pub event_date: NaiveDate,
    pub description: Option<String>,
    pub resolution: Option<String>,
}

impl std::fmt::Display for Support {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Support #{} ({}) for Assignment #{}",
            self.id, self.kind, self.assignment_id
        )
    }
}

/// Full support ticket creation (admin, technician)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupport {
    pub assignment_id: i32,
    pub technician_id: Option<i32>,
    pub kind: SupportKind,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(max = 4000))]
    pub resolution: Option<String>,
}

/// Restricted ticket submission open to every role
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitTicket {
    pub assignment_id: i32,
    pub kind: SupportKind,
    #[validate(length(min = 1, max = 4000, message = "Describe the problem"))]
    pub description: String,
}

/// Update support ticket request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSupport {
    pub assignment_id: Option<i32>,
    /// `null` unassigns the technician
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub technician_id: Option<Option<i32>>,
    pub kind: Option<SupportKind>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(max = 4000))]
    pub resolution: Option<String>,
}

impl UpdateSupport {
    /// Fields a technician may not change
    pub fn locked_fields_set(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.assignment_id.is_some() {
            fields.push("assignment_id");
        }
        if self.kind.is_some() {
            fields.push("kind");
        }
        fields
    }
}

impl From<SubmitTicket> for CreateSupport {
    fn from(ticket: SubmitTicket) -> Self {
        CreateSupport {
            assignment_id: ticket.assignment_id,
            technician_id: None,
            kind: ticket.kind,
            description: Some(ticket.description),
            resolution: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names_kind_and_assignment() {
        let ticket = Support {
            id: 4,
            assignment_id: 9,
            technician_id: None,
            kind: SupportKind::Logistical,
            event_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            description: None,
            resolution: None,
        };
        assert_eq!(ticket.to_string(), "Support #4 (logistical) for Assignment #9");
    }

    #[test]
    fn submitted_ticket_has_no_technician_or_resolution() {
        let create = CreateSupport::from(SubmitTicket {
            assignment_id: 2,
            kind: SupportKind::Technical,
            description: "Screen flickers".into(),
        });
        assert_eq!(create.technician_id, None);
        assert_eq!(create.resolution, None);
        assert_eq!(create.description.as_deref(), Some("Screen flickers"));
    }

    #[test]
    fn technician_can_be_unassigned() {
        let update: UpdateSupport =
            serde_json::from_value(serde_json::json!({ "technician_id": null })).unwrap();
        assert_eq!(update.technician_id, Some(None));

        let update: UpdateSupport =
            serde_json::from_value(serde_json::json!({ "technician_id": 3 })).unwrap();
        assert_eq!(update.technician_id, Some(Some(3)));

        let update: UpdateSupport =
            serde_json::from_value(serde_json::json!({ "resolution": "Cable replaced" })).unwrap();
        assert_eq!(update.technician_id, None);
    }
}
