//! Support ticket endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        support::{CreateSupport, SubmitTicket, Support, UpdateSupport},
        SearchQuery,
    },
    policy::{Action, Resource},
    AppState,
};

use super::AuthenticatedUser;

/// List support tickets
#[utoipa::path(
    get,
    path = "/support",
    tag = "support",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "List of tickets", body = Vec<Support>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Support>>> {
    claims.require(Resource::Support, Action::Read)?;

    let tickets = state.services.support.list(query.term()).await?;
    Ok(Json(tickets))
}

/// Get support ticket by ID
#[utoipa::path(
    get,
    path = "/support/{id}",
    tag = "support",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket details", body = Support),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Support>> {
    claims.require(Resource::Support, Action::Read)?;

    let ticket = state.services.support.get(id).await?;
    Ok(Json(ticket))
}

/// Open a support ticket
#[utoipa::path(
    post,
    path = "/support",
    tag = "support",
    security(("bearer_auth" = [])),
    request_body = CreateSupport,
    responses(
        (status = 201, description = "Ticket created", body = Support),
        (status = 400, description = "Unknown assignment or technician")
    )
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateSupport>,
) -> AppResult<(StatusCode, Json<Support>)> {
    claims.require(Resource::Support, Action::Create)?;
    data.validate()?;

    let created = state.services.support.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Submit a ticket (open to every role)
#[utoipa::path(
    post,
    path = "/support/tickets",
    tag = "support",
    security(("bearer_auth" = [])),
    request_body = SubmitTicket,
    responses(
        (status = 201, description = "Ticket submitted", body = Support),
        (status = 400, description = "Unknown assignment"),
        (status = 403, description = "Account has no recognized role")
    )
)]
pub async fn submit_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(ticket): Json<SubmitTicket>,
) -> AppResult<(StatusCode, Json<Support>)> {
    claims.require_role()?;
    ticket.validate()?;

    let created = state.services.support.submit(&claims, ticket).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a support ticket
#[utoipa::path(
    put,
    path = "/support/{id}",
    tag = "support",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Ticket ID")
    ),
    request_body = UpdateSupport,
    responses(
        (status = 200, description = "Ticket updated", body = Support),
        (status = 403, description = "Field not editable by this role"),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn update_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateSupport>,
) -> AppResult<Json<Support>> {
    claims.require(Resource::Support, Action::Update)?;
    data.validate()?;

    let updated = state.services.support.update(&claims, id, data).await?;
    Ok(Json(updated))
}

/// Delete a support ticket
#[utoipa::path(
    delete,
    path = "/support/{id}",
    tag = "support",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Ticket ID")
    ),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn delete_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Resource::Support, Action::Delete)?;

    state.services.support.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
