//! Assignments service, including delivery details

use super::deletion::{group, guarded_delete};
use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            Assignment, AssignmentDetail, CreateAssignment, CreateAssignmentDetail, UpdateAssignment,
            UpdateAssignmentDetail,
        },
        enums::AssignmentStatus,
        rut::normalize_rut,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
}

impl AssignmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Assignment>> {
        let normalized = term.and_then(|t| normalize_rut(t).ok());
        self.repository
            .assignments
            .list(term, normalized.as_deref())
            .await
    }

    pub async fn get(&self, id: i32) -> AppResult<Assignment> {
        self.repository.assignments.get_by_id(id).await
    }

    async fn institution_reference(&self, rut: &str) -> AppResult<String> {
        let rut = normalize_rut(rut)?;
        if !self.repository.institutions.rut_exists(&rut).await? {
            return Err(AppError::Validation(format!("Institution {} does not exist", rut)));
        }
        Ok(rut)
    }

    pub async fn create(&self, data: CreateAssignment) -> AppResult<Assignment> {
        let rut = self.institution_reference(&data.institution_rut).await?;
        let assignment = self
            .repository
            .assignments
            .create(
                &rut,
                data.requested_quantity,
                data.status.unwrap_or(AssignmentStatus::Pending),
            )
            .await?;
        tracing::info!(assignment_id = assignment.id, institution = %rut, "Assignment requested");
        Ok(assignment)
    }

    pub async fn update(&self, id: i32, data: UpdateAssignment) -> AppResult<Assignment> {
        self.repository.assignments.get_by_id(id).await?;

        let rut = match data.institution_rut {
            Some(ref rut) => Some(self.institution_reference(rut).await?),
            None => None,
        };

        self.repository
            .assignments
            .update(id, rut.as_deref(), &data)
            .await
    }

    /// Delete an assignment; its delivery details and support tickets go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let assignment = self.repository.assignments.get_by_id(id).await?;

        guarded_delete(
            &assignment.to_string(),
            || self.repository.assignments.delete(id),
            || async {
                let details = self.repository.assignments.list_details(id).await?;
                let tickets = self.repository.support.list_by_assignment(id).await?;
                Ok([group("Delivery details", &details), group("Support tickets", &tickets)]
                    .into_iter()
                    .flatten()
                    .collect())
            },
        )
        .await
    }

    // ---- Delivery details ----

    pub async fn list_details(&self, assignment_id: i32) -> AppResult<Vec<AssignmentDetail>> {
        self.repository.assignments.get_by_id(assignment_id).await?;
        self.repository.assignments.list_details(assignment_id).await
    }

    async fn check_equipment(&self, equipment_id: i32, exclude_detail: Option<i32>) -> AppResult<()> {
        if !self.repository.equipment.exists(equipment_id).await? {
            return Err(AppError::Validation(format!(
                "Equipment {} does not exist",
                equipment_id
            )));
        }
        if self
            .repository
            .assignments
            .equipment_assigned(equipment_id, exclude_detail)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Equipment {} is already part of an assignment",
                equipment_id
            )));
        }
        Ok(())
    }

    /// Add an equipment item to an assignment
    pub async fn add_detail(&self, assignment_id: i32, data: CreateAssignmentDetail) -> AppResult<AssignmentDetail> {
        self.repository.assignments.get_by_id(assignment_id).await?;
        self.check_equipment(data.equipment_id, None).await?;

        let detail = self.repository.assignments.create_detail(assignment_id, &data).await?;
        tracing::info!(assignment_id, equipment_id = detail.equipment_id, "Equipment added to assignment");
        Ok(detail)
    }

    pub async fn update_detail(&self, id: i32, data: UpdateAssignmentDetail) -> AppResult<AssignmentDetail> {
        self.repository.assignments.get_detail(id).await?;
        if let Some(equipment_id) = data.equipment_id {
            self.check_equipment(equipment_id, Some(id)).await?;
        }
        self.repository.assignments.update_detail(id, &data).await
    }

    pub async fn delete_detail(&self, id: i32) -> AppResult<()> {
        self.repository.assignments.delete_detail(id).await
    }
}
