//! Equipment service

use super::deletion::{group, guarded_delete};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::UserClaims,
    },
    repository::Repository,
};

/// Blank serial numbers are stored as NULL so they never collide
fn normalize_serial(serial: &mut Option<String>) {
    *serial = serial
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
}

/// On update, a blank serial clears the stored one; an absent serial is left alone
fn normalize_serial_change(change: &mut Option<Option<String>>) {
    if let Some(serial) = change.as_mut() {
        normalize_serial(serial);
    }
}

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list(term).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    async fn check_donation(&self, donation_id: i32) -> AppResult<()> {
        if !self.repository.donations.exists(donation_id).await? {
            return Err(AppError::Validation(format!(
                "Donation {} does not exist",
                donation_id
            )));
        }
        Ok(())
    }

    async fn check_serial(&self, serial: Option<&str>, exclude_id: Option<i32>) -> AppResult<()> {
        if let Some(serial) = serial {
            if self.repository.equipment.serial_exists(serial, exclude_id).await? {
                return Err(AppError::Conflict(format!(
                    "Serial number {} already registered",
                    serial
                )));
            }
        }
        Ok(())
    }

    pub async fn create(&self, mut data: CreateEquipment) -> AppResult<Equipment> {
        normalize_serial(&mut data.serial_number);
        self.check_donation(data.donation_id).await?;
        self.check_serial(data.serial_number.as_deref(), None).await?;

        let equipment = self.repository.equipment.create(&data).await?;
        tracing::info!(equipment_id = equipment.id, donation_id = equipment.donation_id, "Equipment registered");
        Ok(equipment)
    }

    /// Update equipment. Technicians may only touch the technical details.
    pub async fn update(&self, claims: &UserClaims, id: i32, mut data: UpdateEquipment) -> AppResult<Equipment> {
        if claims.is_technician() {
            let locked = data.identity_fields_set();
            if !locked.is_empty() {
                return Err(AppError::Authorization(format!(
                    "Technicians cannot change: {}",
                    locked.join(", ")
                )));
            }
        }

        self.repository.equipment.get_by_id(id).await?;

        normalize_serial_change(&mut data.serial_number);
        if let Some(donation_id) = data.donation_id {
            self.check_donation(donation_id).await?;
        }
        let serial = data.serial_number.as_ref().and_then(|s| s.as_deref());
        self.check_serial(serial, Some(id)).await?;

        self.repository.equipment.update(id, &data).await
    }

    /// Delete equipment; its refurbishment record and delivery detail go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let equipment = self.repository.equipment.get_by_id(id).await?;

        guarded_delete(
            &equipment.to_string(),
            || self.repository.equipment.delete(id),
            || async {
                let refurbishment = self
                    .repository
                    .refurbishments
                    .find(id)
                    .await?
                    .map(|r| format!("Refurbishment of equipment #{} ({})", r.equipment_id, r.final_status));
                let detail = self.repository.assignments.detail_for_equipment(id).await?;
                let refurbishments: Vec<String> = refurbishment.into_iter().collect();
                let details: Vec<_> = detail.into_iter().collect();
                Ok([group("Refurbishments", &refurbishments), group("Delivery details", &details)]
                    .into_iter()
                    .flatten()
                    .collect())
            },
        )
        .await
    }
}
