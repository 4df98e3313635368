//! Data models for ReConectaTec

pub mod assignment;
pub mod donation;
pub mod enums;
pub mod equipment;
pub mod institution;
pub mod refurbishment;
pub mod rut;
pub mod support;
pub mod user;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

// Re-export commonly used types
pub use assignment::{Assignment, AssignmentDetail};
pub use donation::Donation;
pub use enums::{
    AssignmentStatus, DonationStatus, EquipmentKind, InstitutionKind, RefurbishmentStatus, Role,
    SupportKind,
};
pub use equipment::Equipment;
pub use institution::Institution;
pub use refurbishment::Refurbishment;
pub use support::Support;
pub use user::{User, UserClaims};

/// Free-text search accepted by every list endpoint
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Case-insensitive search term
    pub q: Option<String>,
}

impl SearchQuery {
    /// The trimmed term, or None when absent or blank
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
