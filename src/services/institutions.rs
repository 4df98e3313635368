//! Institutions service

use super::deletion::{group, guarded_delete};
use crate::{
    error::{AppError, AppResult},
    models::{
        institution::{CreateInstitution, Institution, UpdateInstitution},
        rut::normalize_rut,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InstitutionsService {
    repository: Repository,
}

impl InstitutionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List institutions; a term that parses as a RUT also matches its normalized form
    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<Institution>> {
        let normalized = term.and_then(|t| normalize_rut(t).ok());
        self.repository
            .institutions
            .list(term, normalized.as_deref())
            .await
    }

    pub async fn get(&self, rut: &str) -> AppResult<Institution> {
        let rut = normalize_rut(rut)?;
        self.repository.institutions.get_by_rut(&rut).await
    }

    pub async fn create(&self, data: CreateInstitution) -> AppResult<Institution> {
        let rut = normalize_rut(&data.rut)?;

        if self.repository.institutions.rut_exists(&rut).await? {
            return Err(AppError::Conflict(format!(
                "An institution with RUT {} already exists",
                rut
            )));
        }
        if let Some(ref email) = data.contact_email {
            if self.repository.institutions.contact_email_exists(email, None).await? {
                return Err(AppError::Conflict(
                    "Contact email already used by another institution".to_string(),
                ));
            }
        }

        let institution = self.repository.institutions.create(&rut, &data).await?;
        tracing::info!(rut = %institution.rut, "Institution registered");
        Ok(institution)
    }

    pub async fn update(&self, rut: &str, data: UpdateInstitution) -> AppResult<Institution> {
        let rut = normalize_rut(rut)?;
        self.repository.institutions.get_by_rut(&rut).await?;

        if let Some(Some(ref email)) = data.contact_email {
            if self
                .repository
                .institutions
                .contact_email_exists(email, Some(&rut))
                .await?
            {
                return Err(AppError::Conflict(
                    "Contact email already used by another institution".to_string(),
                ));
            }
        }

        self.repository.institutions.update(&rut, &data).await
    }

    /// Delete an institution unless donations or assignments still reference it
    pub async fn delete(&self, rut: &str) -> AppResult<()> {
        let rut = normalize_rut(rut)?;
        let institution = self.repository.institutions.get_by_rut(&rut).await?;

        guarded_delete(
            &institution.name,
            || self.repository.institutions.delete(&rut),
            || async {
                let donations = self.repository.donations.list_by_institution(&rut).await?;
                let assignments = self.repository.assignments.list_by_institution(&rut).await?;
                Ok([group("Donations", &donations), group("Assignments", &assignments)]
                    .into_iter()
                    .flatten()
                    .collect())
            },
        )
        .await
    }
}
