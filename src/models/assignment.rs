//! Assignment model (equipment requests) and delivery details

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::AssignmentStatus;

/// Assignment record joined with the receiving institution's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: i32,
    /// Receiving institution RUT
    pub institution_rut: String,
    pub institution_name: String,
    pub request_date: NaiveDate,
    pub requested_quantity: i32,
    pub status: AssignmentStatus,
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assignment #{} for {}", self.id, self.institution_name)
    }
}

/// Create assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssignment {
    pub institution_rut: String,
    #[validate(range(min = 1, message = "At least one item must be requested"))]
    pub requested_quantity: i32,
    pub status: Option<AssignmentStatus>,
}

/// Update assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAssignment {
    pub institution_rut: Option<String>,
    #[validate(range(min = 1, message = "At least one item must be requested"))]
    pub requested_quantity: Option<i32>,
    pub status: Option<AssignmentStatus>,
}

/// One delivered equipment item within an assignment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssignmentDetail {
    pub id: i32,
    pub assignment_id: i32,
    /// Each equipment item is delivered at most once
    pub equipment_id: i32,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl std::fmt::Display for AssignmentDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Equipment #{} in Assignment #{}",
            self.equipment_id, self.assignment_id
        )
    }
}

/// Create delivery detail request (assignment taken from the path)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssignmentDetail {
    pub equipment_id: i32,
    /// Delivery date (YYYY-MM-DD)
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Update delivery detail request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAssignmentDetail {
    pub equipment_id: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
