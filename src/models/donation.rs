//! Donation model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::DonationStatus;

/// Donation record joined with its donor's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Donation {
    pub id: i32,
    /// Donor institution RUT
    pub institution_rut: String,
    /// Donor institution name
    pub institution_name: String,
    pub offer_date: NaiveDate,
    pub status: DonationStatus,
    /// Number of items declared by the donor
    pub total_equipment: i32,
}

impl std::fmt::Display for Donation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Donation #{} from {}", self.id, self.institution_name)
    }
}

/// Create donation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDonation {
    /// Donor institution RUT (any common format)
    pub institution_rut: String,
    /// Defaults to pending; volunteers cannot set it
    pub status: Option<DonationStatus>,
    #[validate(range(min = 1, message = "A donation declares at least one item"))]
    pub total_equipment: i32,
}

/// Update donation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDonation {
    pub institution_rut: Option<String>,
    pub status: Option<DonationStatus>,
    #[validate(range(min = 1, message = "A donation declares at least one item"))]
    pub total_equipment: Option<i32>,
}
