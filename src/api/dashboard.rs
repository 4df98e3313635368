//! Role-based landing and summary counts

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    policy::{landing_route, Action, Resource},
    services::dashboard::DashboardSummary,
    AppState,
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct LandingResponse {
    /// Route the client should open for this role
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Resolve the landing route for the signed-in user
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Landing route", body = LandingResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn landing(AuthenticatedUser(claims): AuthenticatedUser) -> Json<LandingResponse> {
    let warning = match claims.role {
        Some(_) => None,
        None => {
            tracing::warn!(user_id = claims.user_id, "Account has no recognized role");
            Some("Your account has no recognized role; contact an administrator".to_string())
        }
    };

    Json(LandingResponse {
        redirect: landing_route(claims.role).to_string(),
        warning,
    })
}

/// Record counts for the administrator dashboard
#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Record counts", body = DashboardSummary),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn summary(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardSummary>> {
    claims.require(Resource::Dashboard, Action::Read)?;

    let summary = state.services.dashboard.summary().await?;
    Ok(Json(summary))
}
