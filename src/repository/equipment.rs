//! Equipment repository

use sqlx::{Pool, Postgres};

use super::{is_unique_violation, like_pattern, search_condition};
use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, Equipment, UpdateEquipment},
};

fn serial_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Serial number already registered".to_string())
    } else {
        e.into()
    }
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment, optionally filtered by id, brand, model or serial number
    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Equipment>> {
        let rows = match term {
            Some(term) => {
                let query = format!(
                    "SELECT * FROM equipment WHERE {} ORDER BY id",
                    search_condition(&["brand", "model", "serial_number"], Some("id"))
                );
                sqlx::query_as::<_, Equipment>(&query)
                    .bind(like_pattern(term))
                    .bind(term)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Equipment belonging to a donation
    pub async fn list_by_donation(&self, donation_id: i32) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE donation_id = $1 ORDER BY id")
            .bind(donation_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check if a serial number is already registered on another item
    pub async fn serial_exists(&self, serial: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(serial)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (donation_id, serial_number, kind, brand, model, ram, storage, condition_notes, photo_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.donation_id)
        .bind(&data.serial_number)
        .bind(data.kind)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.ram)
        .bind(&data.storage)
        .bind(&data.condition_notes)
        .bind(&data.photo_path)
        .fetch_one(&self.pool)
        .await
        .map_err(serial_conflict)
    }

    /// Update equipment
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.donation_id, "donation_id");
        add_field!(data.serial_number, "serial_number");
        add_field!(data.kind, "kind");
        add_field!(data.brand, "brand");
        add_field!(data.model, "model");
        add_field!(data.ram, "ram");
        add_field!(data.storage, "storage");
        add_field!(data.condition_notes, "condition_notes");
        add_field!(data.photo_path, "photo_path");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.donation_id);
        bind_field!(data.serial_number);
        bind_field!(data.kind);
        bind_field!(data.brand);
        bind_field!(data.model);
        bind_field!(data.ram);
        bind_field!(data.storage);
        bind_field!(data.condition_notes);
        bind_field!(data.photo_path);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(serial_conflict)?
            .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    /// Delete equipment; its refurbishment and delivery detail go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
