//! Refurbishments service

use super::deletion::guarded_delete;
use crate::{
    error::{AppError, AppResult},
    models::{
        refurbishment::{CreateRefurbishment, Refurbishment, UpdateRefurbishment},
        user::UserClaims,
    },
    repository::Repository,
};

/// Technicians may only modify refurbishments that are unassigned or their own
fn check_own_work(claims: &UserClaims, refurbishment: &Refurbishment) -> AppResult<()> {
    if !claims.is_technician() {
        return Ok(());
    }
    match refurbishment.technician_id {
        Some(technician_id) if technician_id != claims.user_id => Err(AppError::Authorization(format!(
            "Refurbishment of equipment {} is assigned to another technician",
            refurbishment.equipment_id
        ))),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct RefurbishmentsService {
    repository: Repository,
}

impl RefurbishmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Refurbishment>> {
        self.repository.refurbishments.list(term).await
    }

    pub async fn get(&self, equipment_id: i32) -> AppResult<Refurbishment> {
        self.repository.refurbishments.get(equipment_id).await
    }

    async fn check_technician(&self, technician_id: i32) -> AppResult<()> {
        if !self.repository.users.is_technician(technician_id).await? {
            return Err(AppError::Validation(format!(
                "User {} is not a technician",
                technician_id
            )));
        }
        Ok(())
    }

    /// Open a refurbishment. A technician creating one without a technician is recorded as its technician.
    pub async fn create(&self, claims: &UserClaims, data: CreateRefurbishment) -> AppResult<Refurbishment> {
        if !self.repository.equipment.exists(data.equipment_id).await? {
            return Err(AppError::Validation(format!(
                "Equipment {} does not exist",
                data.equipment_id
            )));
        }
        if self.repository.refurbishments.find(data.equipment_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Equipment {} already has a refurbishment record",
                data.equipment_id
            )));
        }

        let technician_id = match data.technician_id {
            Some(id) => {
                self.check_technician(id).await?;
                Some(id)
            }
            None if claims.is_technician() => Some(claims.user_id),
            None => None,
        };

        let refurbishment = self.repository.refurbishments.create(&data, technician_id).await?;
        tracing::info!(equipment_id = refurbishment.equipment_id, ?technician_id, "Refurbishment opened");
        Ok(refurbishment)
    }

    pub async fn update(
        &self,
        claims: &UserClaims,
        equipment_id: i32,
        data: UpdateRefurbishment,
    ) -> AppResult<Refurbishment> {
        let current = self.repository.refurbishments.get(equipment_id).await?;
        check_own_work(claims, &current)?;

        if let Some(Some(technician_id)) = data.technician_id {
            self.check_technician(technician_id).await?;
        }

        self.repository.refurbishments.update(equipment_id, &data).await
    }

    pub async fn delete(&self, claims: &UserClaims, equipment_id: i32) -> AppResult<()> {
        let current = self.repository.refurbishments.get(equipment_id).await?;
        check_own_work(claims, &current)?;

        guarded_delete(
            &format!("the refurbishment of equipment {}", equipment_id),
            || self.repository.refurbishments.delete(equipment_id),
            || async { Ok(vec![]) },
        )
        .await
    }
}
