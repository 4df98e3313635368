//! Business logic services

pub mod assignments;
pub mod dashboard;
pub mod deletion;
pub mod donations;
pub mod email;
pub mod equipment;
pub mod institutions;
pub mod notifications;
pub mod redis;
pub mod refurbishments;
pub mod support;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub institutions: institutions::InstitutionsService,
    pub donations: donations::DonationsService,
    pub equipment: equipment::EquipmentService,
    pub assignments: assignments::AssignmentsService,
    pub refurbishments: refurbishments::RefurbishmentsService,
    pub support: support::SupportService,
    pub dashboard: dashboard::DashboardService,
    pub redis: redis::RedisService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        mailer: Arc<dyn email::MailTransport>,
        redis_service: redis::RedisService,
    ) -> Self {
        let notifications = notifications::NotificationService::new(repository.clone(), mailer);
        Self {
            users: users::UsersService::new(
                repository.clone(),
                auth_config,
                redis_service.clone(),
                notifications.clone(),
            ),
            institutions: institutions::InstitutionsService::new(repository.clone()),
            donations: donations::DonationsService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            assignments: assignments::AssignmentsService::new(repository.clone()),
            refurbishments: refurbishments::RefurbishmentsService::new(repository.clone()),
            support: support::SupportService::new(repository.clone(), notifications),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            redis: redis_service,
            repository,
        }
    }

    /// Database connectivity check used by the readiness probe
    pub async fn ping_database(&self) -> Result<(), sqlx::Error> {
        self.repository.ping().await
    }
}
