//! Repository layer for database operations

pub mod assignments;
pub mod donations;
pub mod equipment;
pub mod institutions;
pub mod refurbishments;
pub mod support;
pub mod users;

use sqlx::{Pool, Postgres};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub institutions: institutions::InstitutionsRepository,
    pub users: users::UsersRepository,
    pub donations: donations::DonationsRepository,
    pub equipment: equipment::EquipmentRepository,
    pub assignments: assignments::AssignmentsRepository,
    pub refurbishments: refurbishments::RefurbishmentsRepository,
    pub support: support::SupportRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            institutions: institutions::InstitutionsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            donations: donations::DonationsRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            assignments: assignments::AssignmentsRepository::new(pool.clone()),
            refurbishments: refurbishments::RefurbishmentsRepository::new(pool.clone()),
            support: support::SupportRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Build the WHERE condition of a free-text search.
///
/// Text columns are compared with `LOWER(col) LIKE $1` (the caller binds
/// [`like_pattern`]); the id column, when given, is compared with
/// `CAST(col AS TEXT) = $2` (the caller binds the trimmed term).
pub fn search_condition(text_columns: &[&str], id_column: Option<&str>) -> String {
    let mut parts: Vec<String> = text_columns
        .iter()
        .map(|col| format!("LOWER({}) LIKE $1 ESCAPE '\\'", col))
        .collect();
    if let Some(id) = id_column {
        parts.push(format!("CAST({} AS TEXT) = $2", id));
    }
    format!("({})", parts.join(" OR "))
}

/// [`search_condition`] plus an exact match of `rut_column` against `$3`,
/// which the caller binds to the normalized RUT (or the raw term when the
/// term is not a RUT).
pub fn search_condition_with_rut(text_columns: &[&str], id_column: Option<&str>, rut_column: &str) -> String {
    let base = search_condition(text_columns, id_column);
    format!("({} OR {} = $3)", base, rut_column)
}

/// Lowercased `%term%` pattern with LIKE metacharacters escaped
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}

/// The statement was rejected because other rows still reference the target
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

/// The statement would duplicate a unique value
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_code(err, UNIQUE_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_condition_ors_text_and_id_columns() {
        let cond = search_condition(&["e.brand", "e.serial_number"], Some("e.id"));
        assert_eq!(
            cond,
            "(LOWER(e.brand) LIKE $1 ESCAPE '\\' OR LOWER(e.serial_number) LIKE $1 ESCAPE '\\' OR CAST(e.id AS TEXT) = $2)"
        );
    }

    #[test]
    fn search_condition_without_id_column() {
        let cond = search_condition(&["name"], None);
        assert_eq!(cond, "(LOWER(name) LIKE $1 ESCAPE '\\')");
    }

    #[test]
    fn rut_condition_matches_normalized_form() {
        let cond = search_condition_with_rut(&["i.name"], Some("d.id"), "d.institution_rut");
        assert_eq!(
            cond,
            "((LOWER(i.name) LIKE $1 ESCAPE '\\' OR CAST(d.id AS TEXT) = $2) OR d.institution_rut = $3)"
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("SN_100%"), "%sn\\_100\\%%");
        assert_eq!(like_pattern("Dell"), "%dell%");
    }

    #[test]
    fn non_database_errors_are_not_violations() {
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
