//! Users repository for database operations

use sqlx::{Pool, Postgres};

use super::{is_unique_violation, like_pattern, search_condition};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{UpdateUser, User, UserRow},
    },
};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, role, is_active, created_at";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List users, optionally filtered by first name, last name or email
    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<User>> {
        let rows = match term {
            Some(term) => {
                let query = format!(
                    "SELECT {} FROM users WHERE {} ORDER BY last_name, first_name",
                    USER_COLUMNS,
                    search_condition(&["first_name", "last_name", "email"], None)
                );
                sqlx::query_as::<_, UserRow>(&query)
                    .bind(like_pattern(term))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {} FROM users ORDER BY last_name, first_name", USER_COLUMNS);
                sqlx::query_as::<_, UserRow>(&query).fetch_all(&self.pool).await?
            }
        };
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (login identifier)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id IS DISTINCT FROM $2)",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether an active administrator account exists
    pub async fn has_admin(&self) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin' AND is_active)")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Whether the user exists and holds the technician role
    pub async fn is_technician(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND role = 'technician')")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a user; `password_hash` is the argon2 hash
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        role: Role,
        password_hash: &str,
    ) -> AppResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, role, password, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(role)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map(User::from)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email already exists".to_string())
                } else {
                    e.into()
                }
            })
    }

    /// Update user (admin)
    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
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

        add_field!(data.first_name, "first_name");
        add_field!(data.last_name, "last_name");
        add_field!(data.email, "email");
        add_field!(data.role, "role");
        add_field!(data.is_active, "is_active");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            USER_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, UserRow>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.first_name);
        bind_field!(data.last_name);
        bind_field!(data.email);
        bind_field!(data.role);
        bind_field!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Update own profile (names and optionally the password hash)
    pub async fn update_profile(
        &self,
        id: i32,
        first_name: Option<&str>,
        last_name: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        let query = format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                password = COALESCE($3, password)
            WHERE id = $4
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(first_name)
            .bind(last_name)
            .bind(password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete user. Refurbishments and tickets assigned to the user lose their technician.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
