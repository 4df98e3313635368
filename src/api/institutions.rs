//! Institution endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        institution::{CreateInstitution, Institution, UpdateInstitution},
        SearchQuery,
    },
    policy::{Action, Resource},
    AppState,
};

use super::AuthenticatedUser;

/// List institutions
#[utoipa::path(
    get,
    path = "/institutions",
    tag = "institutions",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "List of institutions", body = Vec<Institution>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_institutions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Institution>>> {
    claims.require(Resource::Institution, Action::Read)?;

    let institutions = state.services.institutions.list(query.term()).await?;
    Ok(Json(institutions))
}

/// Get an institution by RUT (any accepted format)
#[utoipa::path(
    get,
    path = "/institutions/{rut}",
    tag = "institutions",
    security(("bearer_auth" = [])),
    params(
        ("rut" = String, Path, description = "Institution RUT")
    ),
    responses(
        (status = 200, description = "Institution details", body = Institution),
        (status = 400, description = "Malformed RUT"),
        (status = 404, description = "Institution not found")
    )
)]
pub async fn get_institution(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(rut): Path<String>,
) -> AppResult<Json<Institution>> {
    claims.require(Resource::Institution, Action::Read)?;

    let institution = state.services.institutions.get(&rut).await?;
    Ok(Json(institution))
}

/// Register an institution; the RUT is stored normalized
#[utoipa::path(
    post,
    path = "/institutions",
    tag = "institutions",
    security(("bearer_auth" = [])),
    request_body = CreateInstitution,
    responses(
        (status = 201, description = "Institution created", body = Institution),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "RUT or contact email already registered")
    )
)]
pub async fn create_institution(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateInstitution>,
) -> AppResult<(StatusCode, Json<Institution>)> {
    claims.require(Resource::Institution, Action::Create)?;
    data.validate()?;

    let created = state.services.institutions.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an institution
#[utoipa::path(
    put,
    path = "/institutions/{rut}",
    tag = "institutions",
    security(("bearer_auth" = [])),
    params(
        ("rut" = String, Path, description = "Institution RUT")
    ),
    request_body = UpdateInstitution,
    responses(
        (status = 200, description = "Institution updated", body = Institution),
        (status = 404, description = "Institution not found"),
        (status = 409, description = "Contact email already registered")
    )
)]
pub async fn update_institution(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(rut): Path<String>,
    Json(data): Json<UpdateInstitution>,
) -> AppResult<Json<Institution>> {
    claims.require(Resource::Institution, Action::Update)?;
    data.validate()?;

    let updated = state.services.institutions.update(&rut, data).await?;
    Ok(Json(updated))
}

/// Delete an institution
#[utoipa::path(
    delete,
    path = "/institutions/{rut}",
    tag = "institutions",
    security(("bearer_auth" = [])),
    params(
        ("rut" = String, Path, description = "Institution RUT")
    ),
    responses(
        (status = 204, description = "Institution deleted"),
        (status = 404, description = "Institution not found"),
        (status = 409, description = "Donations or assignments still reference the institution", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_institution(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(rut): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Resource::Institution, Action::Delete)?;

    state.services.institutions.delete(&rut).await?;
    Ok(StatusCode::NO_CONTENT)
}
