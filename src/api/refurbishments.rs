//! Refurbishment endpoints (keyed by equipment ID)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        refurbishment::{CreateRefurbishment, Refurbishment, UpdateRefurbishment},
        SearchQuery,
    },
    policy::{Action, Resource},
    AppState,
};

use super::AuthenticatedUser;

/// List refurbishments
#[utoipa::path(
    get,
    path = "/refurbishments",
    tag = "refurbishments",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "List of refurbishments", body = Vec<Refurbishment>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_refurbishments(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Refurbishment>>> {
    claims.require(Resource::Refurbishment, Action::Read)?;

    let refurbishments = state.services.refurbishments.list(query.term()).await?;
    Ok(Json(refurbishments))
}

/// Get the refurbishment of an equipment item
#[utoipa::path(
    get,
    path = "/refurbishments/{equipment_id}",
    tag = "refurbishments",
    security(("bearer_auth" = [])),
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Refurbishment details", body = Refurbishment),
        (status = 404, description = "Refurbishment not found")
    )
)]
pub async fn get_refurbishment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(equipment_id): Path<i32>,
) -> AppResult<Json<Refurbishment>> {
    claims.require(Resource::Refurbishment, Action::Read)?;

    let refurbishment = state.services.refurbishments.get(equipment_id).await?;
    Ok(Json(refurbishment))
}

/// Open a refurbishment record
#[utoipa::path(
    post,
    path = "/refurbishments",
    tag = "refurbishments",
    security(("bearer_auth" = [])),
    request_body = CreateRefurbishment,
    responses(
        (status = 201, description = "Refurbishment created", body = Refurbishment),
        (status = 400, description = "Unknown equipment or technician"),
        (status = 409, description = "Equipment already has a refurbishment record")
    )
)]
pub async fn create_refurbishment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRefurbishment>,
) -> AppResult<(StatusCode, Json<Refurbishment>)> {
    claims.require(Resource::Refurbishment, Action::Create)?;
    data.validate()?;

    let created = state.services.refurbishments.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a refurbishment
#[utoipa::path(
    put,
    path = "/refurbishments/{equipment_id}",
    tag = "refurbishments",
    security(("bearer_auth" = [])),
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    request_body = UpdateRefurbishment,
    responses(
        (status = 200, description = "Refurbishment updated", body = Refurbishment),
        (status = 403, description = "Assigned to another technician"),
        (status = 404, description = "Refurbishment not found")
    )
)]
pub async fn update_refurbishment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(equipment_id): Path<i32>,
    Json(data): Json<UpdateRefurbishment>,
) -> AppResult<Json<Refurbishment>> {
    claims.require(Resource::Refurbishment, Action::Update)?;
    data.validate()?;

    let updated = state
        .services
        .refurbishments
        .update(&claims, equipment_id, data)
        .await?;
    Ok(Json(updated))
}

/// Delete a refurbishment
#[utoipa::path(
    delete,
    path = "/refurbishments/{equipment_id}",
    tag = "refurbishments",
    security(("bearer_auth" = [])),
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 204, description = "Refurbishment deleted"),
        (status = 403, description = "Assigned to another technician"),
        (status = 404, description = "Refurbishment not found")
    )
)]
pub async fn delete_refurbishment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(equipment_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Resource::Refurbishment, Action::Delete)?;

    state
        .services
        .refurbishments
        .delete(&claims, equipment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
