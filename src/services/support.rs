//! Support tickets service

use super::notifications::NotificationService;
use crate::{
    error::{AppError, AppResult},
    models::{
        support::{CreateSupport, SubmitTicket, Support, UpdateSupport},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SupportService {
    repository: Repository,
    notifications: NotificationService,
}

impl SupportService {
    pub fn new(repository: Repository, notifications: NotificationService) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Support>> {
        self.repository.support.list(term).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Support> {
        self.repository.support.get_by_id(id).await
    }

    async fn check_references(&self, assignment_id: Option<i32>, technician_id: Option<i32>) -> AppResult<()> {
        if let Some(assignment_id) = assignment_id {
            if !self.repository.assignments.exists(assignment_id).await? {
                return Err(AppError::Validation(format!(
                    "Assignment {} does not exist",
                    assignment_id
                )));
            }
        }
        if let Some(technician_id) = technician_id {
            if !self.repository.users.is_technician(technician_id).await? {
                return Err(AppError::Validation(format!(
                    "User {} is not a technician",
                    technician_id
                )));
            }
        }
        Ok(())
    }

    /// Open a ticket and confirm it to the submitter
    pub async fn create(&self, claims: &UserClaims, data: CreateSupport) -> AppResult<Support> {
        self.check_references(Some(data.assignment_id), data.technician_id)
            .await?;

        let ticket = self.repository.support.create(&data).await?;
        tracing::info!(ticket_id = ticket.id, assignment_id = ticket.assignment_id, "Support ticket opened");
        self.notifications.ticket_created(claims.user_id, ticket.id);
        Ok(ticket)
    }

    /// Restricted submission available to every role
    pub async fn submit(&self, claims: &UserClaims, ticket: SubmitTicket) -> AppResult<Support> {
        self.create(claims, CreateSupport::from(ticket)).await
    }

    /// Update a ticket and notify the receiving institution.
    /// Technicians cannot move a ticket to another assignment or change its kind.
    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdateSupport) -> AppResult<Support> {
        if claims.is_technician() {
            let locked = data.locked_fields_set();
            if !locked.is_empty() {
                return Err(AppError::Authorization(format!(
                    "Technicians cannot change: {}",
                    locked.join(", ")
                )));
            }
        }

        self.repository.support.get_by_id(id).await?;
        self.check_references(data.assignment_id, data.technician_id.flatten())
            .await?;

        let ticket = self.repository.support.update(id, &data).await?;
        self.notifications.ticket_updated(ticket.id);
        Ok(ticket)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.support.delete(id).await
    }
}
