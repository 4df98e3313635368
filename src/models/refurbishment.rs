//! Refurbishment model (one per equipment item)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::RefurbishmentStatus;

/// Refurbishment record, keyed by the equipment it concerns
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Refurbishment {
    pub equipment_id: i32,
    /// Technician in charge; cleared when the technician account is deleted
    pub technician_id: Option<i32>,
    pub workshop: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actions_taken: Option<String>,
    pub final_status: RefurbishmentStatus,
    /// Stored path of the evidence photo
    pub evidence_path: Option<String>,
}

/// Create refurbishment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRefurbishment {
    pub equipment_id: i32,
    pub technician_id: Option<i32>,
    #[validate(length(max = 150))]
    pub workshop: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actions_taken: Option<String>,
    pub final_status: Option<RefurbishmentStatus>,
    pub evidence_path: Option<String>,
}

/// Update refurbishment request (the equipment is fixed)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRefurbishment {
    /// `null` unassigns the technician
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub technician_id: Option<Option<i32>>,
    #[validate(length(max = 150))]
    pub workshop: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actions_taken: Option<String>,
    pub final_status: Option<RefurbishmentStatus>,
    pub evidence_path: Option<String>,
}
