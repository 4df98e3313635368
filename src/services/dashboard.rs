//! Dashboard service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Record counts shown on the administrator dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub institutions: i64,
    pub users: i64,
    pub donations: i64,
    pub equipment: i64,
    pub assignments: i64,
    pub refurbishments: i64,
    pub support_tickets: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let repo = &self.repository;
        let (institutions, users, donations, equipment, assignments, refurbishments, support_tickets) = tokio::try_join!(
            repo.institutions.count(),
            repo.users.count(),
            repo.donations.count(),
            repo.equipment.count(),
            repo.assignments.count(),
            repo.refurbishments.count(),
            repo.support.count(),
        )?;

        Ok(DashboardSummary {
            institutions,
            users,
            donations,
            equipment,
            assignments,
            refurbishments,
            support_tickets,
        })
    }
}
