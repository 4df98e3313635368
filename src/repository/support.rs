//! Support tickets repository

use sqlx::{FromRow, Pool, Postgres};

use super::{like_pattern, search_condition};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::SupportKind,
        support::{CreateSupport, Support, UpdateSupport},
    },
};

/// Ticket joined with its assignment, institution and technician, for notifications
#[derive(Debug, Clone, FromRow)]
pub struct TicketContext {
    pub id: i32,
    pub assignment_id: i32,
    pub kind: SupportKind,
    pub description: Option<String>,
    pub resolution: Option<String>,
    pub institution_name: Option<String>,
    pub contact_email: Option<String>,
    pub technician_first_name: Option<String>,
    pub technician_last_name: Option<String>,
}

#[derive(Clone)]
pub struct SupportRepository {
    pool: Pool<Postgres>,
}

impl SupportRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List tickets, optionally filtered by id, kind or description
    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Support>> {
        let rows = match term {
            Some(term) => {
                let query = format!(
                    "SELECT * FROM support_tickets WHERE {} ORDER BY event_date DESC, id DESC",
                    search_condition(&["kind", "description"], Some("id"))
                );
                sqlx::query_as::<_, Support>(&query)
                    .bind(like_pattern(term))
                    .bind(term)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Support>("SELECT * FROM support_tickets ORDER BY event_date DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Tickets raised against an assignment
    pub async fn list_by_assignment(&self, assignment_id: i32) -> AppResult<Vec<Support>> {
        let rows = sqlx::query_as::<_, Support>("SELECT * FROM support_tickets WHERE assignment_id = $1 ORDER BY id")
            .bind(assignment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get ticket by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Support> {
        sqlx::query_as::<_, Support>("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Support ticket with id {} not found", id)))
    }

    /// Create a ticket; the event date is set by the database
    pub async fn create(&self, data: &CreateSupport) -> AppResult<Support> {
        let row = sqlx::query_as::<_, Support>(
            r#"
            INSERT INTO support_tickets (assignment_id, technician_id, kind, description, resolution)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.assignment_id)
        .bind(data.technician_id)
        .bind(data.kind)
        .bind(&data.description)
        .bind(&data.resolution)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a ticket
    pub async fn update(&self, id: i32, data: &UpdateSupport) -> AppResult<Support> {
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

        add_field!(data.assignment_id, "assignment_id");
        add_field!(data.technician_id, "technician_id");
        add_field!(data.kind, "kind");
        add_field!(data.description, "description");
        add_field!(data.resolution, "resolution");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE support_tickets SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Support>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.assignment_id);
        bind_field!(data.technician_id);
        bind_field!(data.kind);
        bind_field!(data.description);
        bind_field!(data.resolution);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Support ticket with id {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Support ticket with id {} not found", id)));
        }
        Ok(())
    }

    /// Follow ticket -> assignment -> institution, plus the technician, for notifications.
    ///
    /// Returns None when the ticket no longer exists.
    pub async fn context(&self, id: i32) -> AppResult<Option<TicketContext>> {
        let row = sqlx::query_as::<_, TicketContext>(
            r#"
            SELECT s.id, s.assignment_id, s.kind, s.description, s.resolution,
                   i.name AS institution_name, i.contact_email,
                   u.first_name AS technician_first_name, u.last_name AS technician_last_name
            FROM support_tickets s
            LEFT JOIN assignments a ON a.id = s.assignment_id
            LEFT JOIN institutions i ON i.rut = a.institution_rut
            LEFT JOIN users u ON u.id = s.technician_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM support_tickets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
