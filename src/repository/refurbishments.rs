//! Refurbishments repository

use sqlx::{Pool, Postgres};

use super::{is_unique_violation, like_pattern, search_condition};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RefurbishmentStatus,
        refurbishment::{CreateRefurbishment, Refurbishment, UpdateRefurbishment},
    },
};

#[derive(Clone)]
pub struct RefurbishmentsRepository {
    pool: Pool<Postgres>,
}

impl RefurbishmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List refurbishments, optionally filtered by equipment id, workshop or final status
    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Refurbishment>> {
        let rows = match term {
            Some(term) => {
                let query = format!(
                    "SELECT * FROM refurbishments WHERE {} ORDER BY equipment_id",
                    search_condition(&["workshop", "final_status"], Some("equipment_id"))
                );
                sqlx::query_as::<_, Refurbishment>(&query)
                    .bind(like_pattern(term))
                    .bind(term)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Refurbishment>("SELECT * FROM refurbishments ORDER BY equipment_id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Refurbishment of an equipment item, if any
    pub async fn find(&self, equipment_id: i32) -> AppResult<Option<Refurbishment>> {
        let row = sqlx::query_as::<_, Refurbishment>("SELECT * FROM refurbishments WHERE equipment_id = $1")
            .bind(equipment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get(&self, equipment_id: i32) -> AppResult<Refurbishment> {
        self.find(equipment_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Refurbishment of equipment {} not found", equipment_id))
        })
    }

    /// Create a refurbishment record for an equipment item
    pub async fn create(&self, data: &CreateRefurbishment, technician_id: Option<i32>) -> AppResult<Refurbishment> {
        sqlx::query_as::<_, Refurbishment>(
            r#"
            INSERT INTO refurbishments
                (equipment_id, technician_id, workshop, start_date, end_date, actions_taken, final_status, evidence_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.equipment_id)
        .bind(technician_id)
        .bind(&data.workshop)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.actions_taken)
        .bind(data.final_status.unwrap_or(RefurbishmentStatus::InProgress))
        .bind(&data.evidence_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Equipment {} already has a refurbishment record",
                    data.equipment_id
                ))
            } else {
                e.into()
            }
        })
    }

    /// Update a refurbishment
    pub async fn update(&self, equipment_id: i32, data: &UpdateRefurbishment) -> AppResult<Refurbishment> {
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

        add_field!(data.technician_id, "technician_id");
        add_field!(data.workshop, "workshop");
        add_field!(data.start_date, "start_date");
        add_field!(data.end_date, "end_date");
        add_field!(data.actions_taken, "actions_taken");
        add_field!(data.final_status, "final_status");
        add_field!(data.evidence_path, "evidence_path");

        if sets.is_empty() {
            return self.get(equipment_id).await;
        }

        let query = format!(
            "UPDATE refurbishments SET {} WHERE equipment_id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Refurbishment>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.technician_id);
        bind_field!(data.workshop);
        bind_field!(data.start_date);
        bind_field!(data.end_date);
        bind_field!(data.actions_taken);
        bind_field!(data.final_status);
        bind_field!(data.evidence_path);

        builder
            .bind(equipment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Refurbishment of equipment {} not found", equipment_id)))
    }

    pub async fn delete(&self, equipment_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM refurbishments WHERE equipment_id = $1")
            .bind(equipment_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Refurbishment of equipment {} not found",
                equipment_id
            )));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refurbishments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
