//! Institutions repository

use sqlx::{Pool, Postgres};

use super::{is_unique_violation, like_pattern, search_condition};
use crate::{
    error::{AppError, AppResult},
    models::institution::{CreateInstitution, Institution, UpdateInstitution},
};

#[derive(Clone)]
pub struct InstitutionsRepository {
    pool: Pool<Postgres>,
}

impl InstitutionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List institutions, optionally filtered by name, RUT, contact email or commune.
    ///
    /// `normalized_rut` is the term in canonical RUT form when it parses as one.
    pub async fn list(&self, term: Option<&str>, normalized_rut: Option<&str>) -> AppResult<Vec<Institution>> {
        let Some(term) = term else {
            let rows = sqlx::query_as::<_, Institution>("SELECT * FROM institutions ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
            return Ok(rows);
        };

        let query = format!(
            "SELECT * FROM institutions WHERE {} OR rut = $2 ORDER BY name",
            search_condition(&["name", "rut", "contact_email", "commune"], None)
        );
        let rows = sqlx::query_as::<_, Institution>(&query)
            .bind(like_pattern(term))
            .bind(normalized_rut.unwrap_or(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get institution by normalized RUT
    pub async fn get_by_rut(&self, rut: &str) -> AppResult<Institution> {
        sqlx::query_as::<_, Institution>("SELECT * FROM institutions WHERE rut = $1")
            .bind(rut)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Institution {} not found", rut)))
    }

    pub async fn rut_exists(&self, rut: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM institutions WHERE rut = $1)")
            .bind(rut)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check if a contact email is already used by another institution
    pub async fn contact_email_exists(&self, email: &str, exclude_rut: Option<&str>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM institutions WHERE LOWER(contact_email) = LOWER($1) AND rut IS DISTINCT FROM $2)",
        )
        .bind(email)
        .bind(exclude_rut)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create an institution; `rut` must already be normalized
    pub async fn create(&self, rut: &str, data: &CreateInstitution) -> AppResult<Institution> {
        sqlx::query_as::<_, Institution>(
            r#"
            INSERT INTO institutions (rut, name, kind, contact_name, contact_email, phone, address, commune)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(rut)
        .bind(data.name.trim())
        .bind(data.kind)
        .bind(&data.contact_name)
        .bind(&data.contact_email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.commune)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("An institution with this RUT or contact email already exists".to_string())
            } else {
                e.into()
            }
        })
    }

    /// Update an institution
    pub async fn update(&self, rut: &str, data: &UpdateInstitution) -> AppResult<Institution> {
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

        add_field!(data.name, "name");
        add_field!(data.kind, "kind");
        add_field!(data.contact_name, "contact_name");
        add_field!(data.contact_email, "contact_email");
        add_field!(data.phone, "phone");
        add_field!(data.address, "address");
        add_field!(data.commune, "commune");

        if sets.is_empty() {
            return self.get_by_rut(rut).await;
        }

        let query = format!(
            "UPDATE institutions SET {} WHERE rut = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Institution>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.kind);
        bind_field!(data.contact_name);
        bind_field!(data.contact_email);
        bind_field!(data.phone);
        bind_field!(data.address);
        bind_field!(data.commune);

        builder
            .bind(rut)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Contact email already used by another institution".to_string())
                } else {
                    e.into()
                }
            })?
            .ok_or_else(|| AppError::NotFound(format!("Institution {} not found", rut)))
    }

    /// Delete an institution. Donations and assignments restrict the delete.
    pub async fn delete(&self, rut: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM institutions WHERE rut = $1")
            .bind(rut)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Institution {} not found", rut)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM institutions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
