//! Assignments and delivery details repository

use sqlx::{Pool, Postgres};

use super::{is_unique_violation, like_pattern, search_condition_with_rut};
use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            Assignment, AssignmentDetail, CreateAssignmentDetail, UpdateAssignment, UpdateAssignmentDetail,
        },
        enums::AssignmentStatus,
    },
};

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.institution_rut, i.name AS institution_name, a.request_date, a.requested_quantity, a.status
    FROM assignments a
    JOIN institutions i ON i.rut = a.institution_rut
"#;

fn detail_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Equipment is already part of an assignment".to_string())
    } else {
        e.into()
    }
}

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List assignments, optionally filtered by id, institution name, RUT or status
    pub async fn list(&self, term: Option<&str>, normalized_rut: Option<&str>) -> AppResult<Vec<Assignment>> {
        let rows = match term {
            Some(term) => {
                let query = format!(
                    "{} WHERE {} ORDER BY a.request_date DESC, a.id DESC",
                    ASSIGNMENT_SELECT,
                    search_condition_with_rut(
                        &["i.name", "a.institution_rut", "a.status"],
                        Some("a.id"),
                        "a.institution_rut",
                    )
                );
                sqlx::query_as::<_, Assignment>(&query)
                    .bind(like_pattern(term))
                    .bind(term)
                    .bind(normalized_rut.unwrap_or(term))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{} ORDER BY a.request_date DESC, a.id DESC", ASSIGNMENT_SELECT);
                sqlx::query_as::<_, Assignment>(&query).fetch_all(&self.pool).await?
            }
        };
        Ok(rows)
    }

    /// Assignments requested by an institution
    pub async fn list_by_institution(&self, rut: &str) -> AppResult<Vec<Assignment>> {
        let query = format!("{} WHERE a.institution_rut = $1 ORDER BY a.id", ASSIGNMENT_SELECT);
        let rows = sqlx::query_as::<_, Assignment>(&query)
            .bind(rut)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get assignment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Assignment> {
        let query = format!("{} WHERE a.id = $1", ASSIGNMENT_SELECT);
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assignments WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create an assignment; the request date is set by the database
    pub async fn create(
        &self,
        institution_rut: &str,
        requested_quantity: i32,
        status: AssignmentStatus,
    ) -> AppResult<Assignment> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO assignments (institution_rut, requested_quantity, status)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(institution_rut)
        .bind(requested_quantity)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an assignment; `institution_rut` must already be normalized
    pub async fn update(&self, id: i32, institution_rut: Option<&str>, data: &UpdateAssignment) -> AppResult<Assignment> {
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
        add_field!(data.requested_quantity, "requested_quantity");
        add_field!(data.status, "status");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE assignments SET {} WHERE id = ${}", sets.join(", "), idx);
        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(institution_rut);
        bind_field!(data.requested_quantity);
        bind_field!(data.status);

        let result = builder.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Assignment with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete an assignment; its details and support tickets go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Assignment with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assignments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ---- Delivery details ----

    /// Details of an assignment
    pub async fn list_details(&self, assignment_id: i32) -> AppResult<Vec<AssignmentDetail>> {
        let rows = sqlx::query_as::<_, AssignmentDetail>(
            "SELECT * FROM assignment_details WHERE assignment_id = $1 ORDER BY id",
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The delivery detail an equipment item appears in, if any
    pub async fn detail_for_equipment(&self, equipment_id: i32) -> AppResult<Option<AssignmentDetail>> {
        let row = sqlx::query_as::<_, AssignmentDetail>("SELECT * FROM assignment_details WHERE equipment_id = $1")
            .bind(equipment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_detail(&self, id: i32) -> AppResult<AssignmentDetail> {
        sqlx::query_as::<_, AssignmentDetail>("SELECT * FROM assignment_details WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment detail with id {} not found", id)))
    }

    /// Check if an equipment item already appears in another detail
    pub async fn equipment_assigned(&self, equipment_id: i32, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assignment_details WHERE equipment_id = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(equipment_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create_detail(&self, assignment_id: i32, data: &CreateAssignmentDetail) -> AppResult<AssignmentDetail> {
        sqlx::query_as::<_, AssignmentDetail>(
            r#"
            INSERT INTO assignment_details (assignment_id, equipment_id, delivery_date, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(data.equipment_id)
        .bind(data.delivery_date)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(detail_conflict)
    }

    pub async fn update_detail(&self, id: i32, data: &UpdateAssignmentDetail) -> AppResult<AssignmentDetail> {
        sqlx::query_as::<_, AssignmentDetail>(
            r#"
            UPDATE assignment_details SET
                equipment_id = COALESCE($1, equipment_id),
                delivery_date = COALESCE($2, delivery_date),
                notes = COALESCE($3, notes)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.equipment_id)
        .bind(data.delivery_date)
        .bind(&data.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(detail_conflict)?
        .ok_or_else(|| AppError::NotFound(format!("Assignment detail with id {} not found", id)))
    }

    pub async fn delete_detail(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assignment_details WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Assignment detail with id {} not found", id)));
        }
        Ok(())
    }
}
