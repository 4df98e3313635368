//! Donations repository

use sqlx::{Pool, Postgres};

use super::{like_pattern, search_condition_with_rut};
use crate::{
    error::{AppError, AppResult},
    models::{
        donation::{Donation, UpdateDonation},
        enums::DonationStatus,
    },
};

const DONATION_SELECT: &str = r#"
    SELECT d.id, d.institution_rut, i.name AS institution_name, d.offer_date, d.status, d.total_equipment
    FROM donations d
    JOIN institutions i ON i.rut = d.institution_rut
"#;

#[derive(Clone)]
pub struct DonationsRepository {
    pool: Pool<Postgres>,
}

impl DonationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List donations, optionally filtered by id, institution name, RUT or status
    pub async fn list(&self, term: Option<&str>, normalized_rut: Option<&str>) -> AppResult<Vec<Donation>> {
        let rows = match term {
            Some(term) => {
                let query = format!(
                    "{} WHERE {} ORDER BY d.offer_date DESC, d.id DESC",
                    DONATION_SELECT,
                    search_condition_with_rut(
                        &["i.name", "d.institution_rut", "d.status"],
                        Some("d.id"),
                        "d.institution_rut",
                    )
                );
                sqlx::query_as::<_, Donation>(&query)
                    .bind(like_pattern(term))
                    .bind(term)
                    .bind(normalized_rut.unwrap_or(term))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} ORDER BY d.offer_date DESC, d.id DESC", DONATION_SELECT);
                sqlx::query_as::<_, Donation>(&query).fetch_all(&self.pool).await?
            }
        };
        Ok(rows)
    }

    /// Donations offered by an institution
    pub async fn list_by_institution(&self, rut: &str) -> AppResult<Vec<Donation>> {
        let query = format!("{} WHERE d.institution_rut = $1 ORDER BY d.id", DONATION_SELECT);
        let rows = sqlx::query_as::<_, Donation>(&query)
            .bind(rut)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get donation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Donation> {
        let query = format!("{} WHERE d.id = $1", DONATION_SELECT);
        sqlx::query_as::<_, Donation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Donation with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM donations WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a donation; the offer date is set by the database
    pub async fn create(&self, institution_rut: &str, status: DonationStatus, total_equipment: i32) -> AppResult<Donation> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO donations (institution_rut, status, total_equipment)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(institution_rut)
        .bind(status)
        .bind(total_equipment)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a donation; `institution_rut` must already be normalized
    pub async fn update(&self, id: i32, institution_rut: Option<&str>, data: &UpdateDonation) -> AppResult<Donation> {
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

        add_field!(institution_rut, "institution_rut");
        add_field!(data.status, "status");
        add_field!(data.total_equipment, "total_equipment");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE donations SET {} WHERE id = ${}", sets.join(", "), idx);
        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(institution_rut);
        bind_field!(data.status);
        bind_field!(data.total_equipment);

        let result = builder.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Donation with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a donation; its equipment and everything hanging off it go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Donation with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
