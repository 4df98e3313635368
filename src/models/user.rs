//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::Role;
use crate::{
    error::AppError,
    policy::{self, Action, Resource},
};

/// Internal row structure for database queries (role kept as raw text)
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    role: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password: row.password,
            // Accounts with a missing or unknown role still load; the policy denies them.
            role: row.role.and_then(|r| r.parse().ok()),
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Login identifier (unique, case-insensitive)
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: Option<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = self.role.map(|r| r.label()).unwrap_or("no role");
        write!(f, "{} {} ({})", self.first_name, self.last_name, role)
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Role,
    /// Initial password; a temporary one is generated when omitted
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// Update user request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Self-service profile update; the email cannot be changed here
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Login email
    pub sub: String,
    pub user_id: i32,
    pub role: Option<Role>,
    /// Token id, used for logout revocation
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Require permission for an action on a resource
    pub fn require(&self, resource: Resource, action: Action) -> Result<(), AppError> {
        if policy::allows(self.role, resource, action) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Insufficient rights to {} {}",
                action, resource
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_technician(&self) -> bool {
        self.role == Some(Role::Technician)
    }

    pub fn is_volunteer(&self) -> bool {
        self.role == Some(Role::Volunteer)
    }

    /// Align the claims with the stored account: a disabled account is
    /// rejected and the stored role replaces the one signed into the token.
    pub fn sync_with(&mut self, user: &User) -> Result<(), AppError> {
        if user.id != self.user_id {
            return Err(AppError::Authentication("Token does not match the account".to_string()));
        }
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        self.role = user.role;
        Ok(())
    }

    /// Require any recognized role
    pub fn require_role(&self) -> Result<Role, AppError> {
        self.role
            .ok_or_else(|| AppError::Authorization("Account has no recognized role".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<Role>) -> UserClaims {
        UserClaims {
            sub: "ana@example.cl".into(),
            user_id: 7,
            role,
            jti: "t-1".into(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn token_round_trip_keeps_role() {
        let token = claims(Some(Role::Technician)).create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.role, Some(Role::Technician));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = claims(Some(Role::Admin)).create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    fn account(role: Option<Role>, is_active: bool) -> User {
        User {
            id: 7,
            first_name: "Ana".into(),
            last_name: "Soto".into(),
            email: "ana@example.cl".into(),
            password: String::new(),
            role,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stored_role_replaces_token_role() {
        let mut c = claims(Some(Role::Admin));
        c.sync_with(&account(Some(Role::Volunteer), true)).unwrap();
        assert_eq!(c.role, Some(Role::Volunteer));
        assert!(c.require(Resource::User, Action::Read).is_err());
    }

    #[test]
    fn disabled_account_is_rejected() {
        let mut c = claims(Some(Role::Volunteer));
        let err = c.sync_with(&account(Some(Role::Volunteer), false)).unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[test]
    fn roleless_claims_are_denied() {
        let c = claims(None);
        assert!(c.require(Resource::Donation, Action::Read).is_err());
        assert!(c.require_role().is_err());
    }

    #[test]
    fn unknown_role_text_loads_as_none() {
        let row = UserRow {
            id: 1,
            first_name: "Root".into(),
            last_name: "User".into(),
            email: "root@example.cl".into(),
            password: String::new(),
            role: Some("superuser".into()),
            is_active: true,
            created_at: Utc::now(),
        };
        let user = User::from(row);
        assert_eq!(user.role, None);
        assert_eq!(user.to_string(), "Root User (no role)");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            first_name: "Ana".into(),
            last_name: "Rojas".into(),
            email: "ana@example.cl".into(),
            password: "$argon2id$secret".into(),
            role: Some(Role::Volunteer),
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "volunteer");
    }
}
