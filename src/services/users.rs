//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use super::{
    deletion::guarded_delete, notifications::NotificationService, redis::RedisService,
};
use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{CreateUser, UpdateProfile, UpdateUser, User, UserClaims},
    },
    repository::Repository,
};

const MIN_PASSWORD_LENGTH: usize = 8;
const TEMPORARY_PASSWORD_LENGTH: usize = 12;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890", "qwerty123",
    "qwertyuiop", "abc12345", "iloveyou", "11111111", "00000000", "admin123", "welcome1",
    "letmein1", "sunshine", "football", "baseball", "princess", "trustno1", "passw0rd",
    "contraseña", "contrasena", "superman", "starwars", "dragon123",
];

/// Password rules: length, not all digits, not common, not built from the user's own details
pub fn validate_password_strength(password: &str, attributes: &[&str]) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must contain at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("Password cannot be entirely numeric".to_string()));
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AppError::Validation("Password is too common".to_string()));
    }
    for attr in attributes {
        let attr = attr.trim().to_lowercase();
        if attr.chars().count() >= 3 && (lowered.contains(&attr) || attr.contains(&lowered)) {
            return Err(AppError::Validation(
                "Password is too similar to your personal information".to_string(),
            ));
        }
    }
    Ok(())
}

/// Random alphanumeric password that satisfies the strength rules
pub fn generate_temporary_password() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(TEMPORARY_PASSWORD_LENGTH)
            .map(char::from)
            .collect();
        if candidate.chars().any(|c| c.is_ascii_alphabetic()) && candidate.chars().any(|c| c.is_ascii_digit()) {
            return candidate;
        }
    }
}

fn personal_attributes<'a>(email: &'a str, first_name: &'a str, last_name: &'a str) -> [&'a str; 3] {
    let local_part = email.split('@').next().unwrap_or(email);
    [local_part, first_name, last_name]
}

/// The bootstrap administrator is held to the same rules as any account
fn check_bootstrap_password(email: &str, password: &str) -> AppResult<()> {
    validate_password_strength(password, &personal_attributes(email, "System", "Administrator"))
        .map_err(|e| match e {
            AppError::Validation(msg) => {
                AppError::Validation(format!("Bootstrap administrator password rejected: {}", msg))
            }
            other => other,
        })
}

fn check_confirmation(password: &str, confirmation: Option<&str>) -> AppResult<()> {
    match confirmation {
        Some(c) if c == password => Ok(()),
        _ => Err(AppError::Validation("Passwords do not match".to_string())),
    }
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    redis: RedisService,
    notifications: NotificationService,
}

impl UsersService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        redis: RedisService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            repository,
            config,
            redis,
            notifications,
        }
    }

    /// Authenticate user by email and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        if user.role.is_none() {
            tracing::warn!(user_id = user.id, "User without a recognized role signed in");
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + self.config.token_lifetime_seconds();

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            jti: uuid::Uuid::new_v4().to_string(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Revoke the presented token until it expires
    pub async fn logout(&self, claims: &UserClaims) -> AppResult<()> {
        let remaining = (claims.exp - Utc::now().timestamp()).max(0) as u64;
        self.redis.revoke_token(&claims.jti, remaining).await
    }

    pub async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        self.redis.is_token_revoked(jti).await
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn list(&self, term: Option<&str>) -> AppResult<Vec<User>> {
        self.repository.users.list(term).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a new user and send the welcome email with the initial password
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        let email = user.email.trim().to_lowercase();
        if self.repository.users.email_exists(&email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password = match user.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                check_confirmation(password, user.password_confirmation.as_deref())?;
                validate_password_strength(
                    password,
                    &personal_attributes(&email, &user.first_name, &user.last_name),
                )?;
                password.to_string()
            }
            None => generate_temporary_password(),
        };

        let hash = self.hash_password(&password)?;
        let created = self
            .repository
            .users
            .create(user.first_name.trim(), user.last_name.trim(), &email, user.role, &hash)
            .await?;

        tracing::info!(user_id = created.id, role = %user.role, "User created");
        self.notifications.user_created(&created, &password);
        Ok(created)
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i32, mut user: UpdateUser) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;

        if let Some(ref mut email) = user.email {
            *email = email.trim().to_lowercase();
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        self.repository.users.update(id, &user).await
    }

    /// Delete a user; technician references are cleared by the database
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        let user = self.repository.users.get_by_id(id).await?;
        let target = format!("user {}", user.full_name());
        guarded_delete(
            &target,
            || self.repository.users.delete(id),
            || async { Ok(vec![]) },
        )
        .await
    }

    /// Update user's own profile (names, password)
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        let user = self.repository.users.get_by_id(user_id).await?;

        let first_name = profile.first_name.as_deref().map(str::trim);
        let last_name = profile.last_name.as_deref().map(str::trim);

        let password_hash = match profile.new_password.as_deref().filter(|p| !p.is_empty()) {
            Some(new_password) => {
                check_confirmation(new_password, profile.confirm_password.as_deref())?;
                validate_password_strength(
                    new_password,
                    &personal_attributes(
                        &user.email,
                        first_name.unwrap_or(&user.first_name),
                        last_name.unwrap_or(&user.last_name),
                    ),
                )?;
                Some(self.hash_password(new_password)?)
            }
            None => None,
        };

        let updated = self
            .repository
            .users
            .update_profile(user_id, first_name, last_name, password_hash.as_deref())
            .await?;

        self.notifications.profile_updated(&updated);
        Ok(updated)
    }

    /// Create the configured administrator when no administrator exists yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let Some((email, password)) = self.config.bootstrap_admin() else {
            if self.config.bootstrap_admin_email.is_some() || self.config.bootstrap_admin_password.is_some() {
                tracing::warn!("Incomplete bootstrap administrator credentials; none created");
            }
            return Ok(());
        };

        if self.repository.users.has_admin().await? {
            return Ok(());
        }
        if self.repository.users.email_exists(email, None).await? {
            tracing::warn!(%email, "Bootstrap administrator email is taken by a non-admin account");
            return Ok(());
        }

        check_bootstrap_password(email, password)?;
        let hash = self.hash_password(password)?;
        let admin = self
            .repository
            .users
            .create("System", "Administrator", &email.to_lowercase(), Role::Admin, &hash)
            .await?;
        tracing::info!(user_id = admin.id, %email, "Bootstrap administrator created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_bootstrap_passwords_are_rejected() {
        // Contains the email local part
        let err = check_bootstrap_password("admin@reconectatec.cl", "reconecta-admin").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.starts_with("Bootstrap administrator")));
        assert!(check_bootstrap_password("admin@reconectatec.cl", "password").is_err());
        assert!(check_bootstrap_password("admin@reconectatec.cl", "administrator1").is_err());
        assert!(check_bootstrap_password("admin@reconectatec.cl", "Vq4!rW9zKe").is_ok());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password_strength("Ab1", &[]).is_err());
    }

    #[test]
    fn numeric_passwords_are_rejected() {
        assert!(validate_password_strength("98127364501", &[]).is_err());
    }

    #[test]
    fn common_passwords_are_rejected() {
        assert!(validate_password_strength("Password123", &[]).is_err());
    }

    #[test]
    fn passwords_built_from_personal_data_are_rejected() {
        let attrs = personal_attributes("ana.rojas@example.cl", "Ana", "Rojas");
        assert!(validate_password_strength("ana.rojas2024", &attrs).is_err());
        assert!(validate_password_strength("xRojas!77", &attrs).is_err());
    }

    #[test]
    fn strong_password_passes() {
        let attrs = personal_attributes("ana@example.cl", "Ana", "Rojas");
        assert!(validate_password_strength("Tr3s-Volcanes", &attrs).is_ok());
    }

    #[test]
    fn temporary_passwords_satisfy_the_rules() {
        for _ in 0..20 {
            let password = generate_temporary_password();
            assert_eq!(password.len(), TEMPORARY_PASSWORD_LENGTH);
            assert!(validate_password_strength(&password, &[]).is_ok());
        }
    }

    #[test]
    fn confirmation_must_match() {
        assert!(check_confirmation("Tr3s-Volcanes", Some("Tr3s-Volcanes")).is_ok());
        assert!(check_confirmation("Tr3s-Volcanes", Some("other")).is_err());
        assert!(check_confirmation("Tr3s-Volcanes", None).is_err());
    }
}
