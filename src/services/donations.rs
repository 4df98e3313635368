//! Donations service

use super::deletion::{conflict, group, guarded_delete};
use crate::{
    error::{AppError, AppResult},
    models::{
        donation::{CreateDonation, Donation, UpdateDonation},
        enums::DonationStatus,
        rut::normalize_rut,
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DonationsService {
    repository: Repository,
}

impl DonationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Donation>> {
        let normalized = term.and_then(|t| normalize_rut(t).ok());
        self.repository
            .donations
            .list(term, normalized.as_deref())
            .await
    }

    pub async fn get(&self, id: i32) -> AppResult<Donation> {
        self.repository.donations.get_by_id(id).await
    }

    /// Normalize a RUT and check that the institution exists
    async fn institution_reference(&self, rut: &str) -> AppResult<String> {
        let rut = normalize_rut(rut)?;
        if !self.repository.institutions.rut_exists(&rut).await? {
            return Err(AppError::Validation(format!("Institution {} does not exist", rut)));
        }
        Ok(rut)
    }

    /// Register a donation. Volunteers cannot choose the status; it starts pending.
    pub async fn create(&self, claims: &UserClaims, data: CreateDonation) -> AppResult<Donation> {
        if claims.is_volunteer() && data.status.is_some() {
            return Err(AppError::Authorization(
                "Volunteers cannot set: status".to_string(),
            ));
        }

        let rut = self.institution_reference(&data.institution_rut).await?;
        let status = data.status.unwrap_or(DonationStatus::Pending);

        let donation = self
            .repository
            .donations
            .create(&rut, status, data.total_equipment)
            .await?;
        tracing::info!(donation_id = donation.id, institution = %rut, "Donation registered");
        Ok(donation)
    }

    pub async fn update(&self, id: i32, data: UpdateDonation) -> AppResult<Donation> {
        self.repository.donations.get_by_id(id).await?;

        let rut = match data.institution_rut {
            Some(ref rut) => Some(self.institution_reference(rut).await?),
            None => None,
        };

        self.repository
            .donations
            .update(id, rut.as_deref(), &data)
            .await
    }

    /// Delete a donation.
    ///
    /// Without `cascade`, a donation that still has equipment is reported as a
    /// conflict listing the items. With `cascade`, the equipment is removed too.
    pub async fn delete(&self, id: i32, cascade: bool) -> AppResult<()> {
        let donation = self.repository.donations.get_by_id(id).await?;
        let target = donation.to_string();

        if !cascade {
            let equipment = self.repository.equipment.list_by_donation(id).await?;
            if let Some(items) = group("Equipment", &equipment) {
                return Err(AppError::DependentRecords(conflict(&target, vec![items])));
            }
        }

        guarded_delete(
            &target,
            || self.repository.donations.delete(id),
            || async {
                let equipment = self.repository.equipment.list_by_donation(id).await?;
                Ok(group("Equipment", &equipment).into_iter().collect())
            },
        )
        .await?;

        tracing::info!(donation_id = id, cascade, "Donation deleted");
        Ok(())
    }
}
