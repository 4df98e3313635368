//! Assignment and delivery detail endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        assignment::{
            Assignment, AssignmentDetail, CreateAssignment, CreateAssignmentDetail, UpdateAssignment,
            UpdateAssignmentDetail,
        },
        SearchQuery,
    },
    policy::{Action, Resource},
    AppState,
};

use super::AuthenticatedUser;

/// List assignments
#[utoipa::path(
    get,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "List of assignments", body = Vec<Assignment>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Assignment>>> {
    claims.require(Resource::Assignment, Action::Read)?;

    let assignments = state.services.assignments.list(query.term()).await?;
    Ok(Json(assignments))
}

/// Get assignment by ID
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment details", body = Assignment),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Assignment>> {
    claims.require(Resource::Assignment, Action::Read)?;

    let assignment = state.services.assignments.get(id).await?;
    Ok(Json(assignment))
}

/// Register an equipment request from a receiving institution
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Invalid input or unknown institution")
    )
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    claims.require(Resource::Assignment, Action::Create)?;
    data.validate()?;

    let created = state.services.assignments.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an assignment
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    request_body = UpdateAssignment,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAssignment>,
) -> AppResult<Json<Assignment>> {
    claims.require(Resource::Assignment, Action::Update)?;
    data.validate()?;

    let updated = state.services.assignments.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete an assignment together with its details and support tickets
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Assignment still referenced", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Resource::Assignment, Action::Delete)?;

    state.services.assignments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the equipment delivered under an assignment
#[utoipa::path(
    get,
    path = "/assignments/{id}/details",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Delivery details", body = Vec<AssignmentDetail>),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn list_details(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<AssignmentDetail>>> {
    claims.require(Resource::Assignment, Action::Read)?;

    let details = state.services.assignments.list_details(id).await?;
    Ok(Json(details))
}

/// Add an equipment item to an assignment
#[utoipa::path(
    post,
    path = "/assignments/{id}/details",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    request_body = CreateAssignmentDetail,
    responses(
        (status = 201, description = "Detail created", body = AssignmentDetail),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Equipment already assigned")
    )
)]
pub async fn create_detail(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateAssignmentDetail>,
) -> AppResult<(StatusCode, Json<AssignmentDetail>)> {
    claims.require(Resource::Assignment, Action::Update)?;

    let detail = state.services.assignments.add_detail(id, data).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Update a delivery detail
#[utoipa::path(
    put,
    path = "/assignment-details/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Detail ID")
    ),
    request_body = UpdateAssignmentDetail,
    responses(
        (status = 200, description = "Detail updated", body = AssignmentDetail),
        (status = 404, description = "Detail not found"),
        (status = 409, description = "Equipment already assigned")
    )
)]
pub async fn update_detail(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAssignmentDetail>,
) -> AppResult<Json<AssignmentDetail>> {
    claims.require(Resource::Assignment, Action::Update)?;

    let detail = state.services.assignments.update_detail(id, data).await?;
    Ok(Json(detail))
}

/// Remove an equipment item from its assignment
#[utoipa::path(
    delete,
    path = "/assignment-details/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Detail ID")
    ),
    responses(
        (status = 204, description = "Detail deleted"),
        (status = 404, description = "Detail not found")
    )
)]
pub async fn delete_detail(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Resource::Assignment, Action::Update)?;

    state.services.assignments.delete_detail(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
