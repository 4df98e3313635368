//! Deletion guard: turns foreign-key rejections into an enumerated conflict

use std::{fmt::Display, future::Future};

use crate::{
    error::{AppError, AppResult, DeletionConflict, DependentGroup},
    repository::is_foreign_key_violation,
};

/// Build a dependent group from display labels; None when there are no records
pub fn group<T: Display>(kind: &str, records: &[T]) -> Option<DependentGroup> {
    if records.is_empty() {
        return None;
    }
    Some(DependentGroup {
        kind: kind.to_string(),
        records: records.iter().map(ToString::to_string).collect(),
    })
}

/// Human-readable conflict naming the target and what still depends on it
pub fn conflict(target: &str, dependents: Vec<DependentGroup>) -> DeletionConflict {
    let message = if dependents.is_empty() {
        format!(
            "Cannot delete {} because other records still depend on it",
            target
        )
    } else {
        let listed: Vec<String> = dependents
            .iter()
            .map(|g| format!("{}: {}", g.kind, g.records.join(", ")))
            .collect();
        format!(
            "Cannot delete {} because it is referenced by {}",
            target,
            listed.join("; ")
        )
    };
    DeletionConflict { message, dependents }
}

/// Run `delete`; on a foreign-key violation, run `enumerate` and report the conflict.
///
/// The delete is a single statement, so a rejected delete leaves the store untouched.
pub async fn guarded_delete<D, DF, E, EF>(target: &str, delete: D, enumerate: E) -> AppResult<()>
where
    D: FnOnce() -> DF,
    DF: Future<Output = AppResult<()>>,
    E: FnOnce() -> EF,
    EF: Future<Output = AppResult<Vec<DependentGroup>>>,
{
    match delete().await {
        Err(AppError::Database(e)) if is_foreign_key_violation(&e) => {
            tracing::info!(record = target, "Delete blocked by dependent records");
            let dependents = enumerate().await?;
            Err(AppError::DependentRecords(conflict(target, dependents)))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_groups_are_dropped() {
        let none: Vec<String> = vec![];
        assert!(group("Donations", &none).is_none());
        let g = group("Donations", &["Donation #1 from Liceo A"]).unwrap();
        assert_eq!(g.records, vec!["Donation #1 from Liceo A".to_string()]);
    }

    #[test]
    fn conflict_lists_every_group() {
        let dependents = vec![
            group("Donations", &["Donation #1 from Liceo A"]).unwrap(),
            group("Assignments", &["Assignment #4 for Liceo A", "Assignment #5 for Liceo A"]).unwrap(),
        ];
        let c = conflict("Liceo A", dependents);
        assert_eq!(
            c.message,
            "Cannot delete Liceo A because it is referenced by Donations: Donation #1 from Liceo A; \
             Assignments: Assignment #4 for Liceo A, Assignment #5 for Liceo A"
        );
        assert_eq!(c.dependents.len(), 2);
    }

    #[test]
    fn conflict_without_enumeration_is_generic() {
        let c = conflict("user Ana Rojas", vec![]);
        assert!(c.message.contains("other records still depend on it"));
        assert!(c.dependents.is_empty());
    }

    #[tokio::test]
    async fn successful_delete_passes_through() {
        let result = guarded_delete("x", || async { Ok(()) }, || async { Ok(vec![]) }).await;
        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn other_errors_are_not_rewritten() {
        let result = guarded_delete(
            "x",
            || async { Err(AppError::NotFound("gone".into())) },
            || async { Err(AppError::Internal("dependents must not be enumerated".into())) },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
