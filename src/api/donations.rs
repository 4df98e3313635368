//! Donation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        donation::{CreateDonation, Donation, UpdateDonation},
        SearchQuery,
    },
    policy::{Action, Resource},
    AppState,
};

use super::AuthenticatedUser;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DeleteDonationQuery {
    /// Also delete the donation's equipment
    #[serde(default)]
    pub cascade: bool,
}

/// List donations
#[utoipa::path(
    get,
    path = "/donations",
    tag = "donations",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "List of donations", body = Vec<Donation>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_donations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Donation>>> {
    claims.require(Resource::Donation, Action::Read)?;

    let donations = state.services.donations.list(query.term()).await?;
    Ok(Json(donations))
}

/// Get donation by ID
#[utoipa::path(
    get,
    path = "/donations/{id}",
    tag = "donations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Donation ID")
    ),
    responses(
        (status = 200, description = "Donation details", body = Donation),
        (status = 404, description = "Donation not found")
    )
)]
pub async fn get_donation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Donation>> {
    claims.require(Resource::Donation, Action::Read)?;

    let donation = state.services.donations.get(id).await?;
    Ok(Json(donation))
}

/// Register a donation
#[utoipa::path(
    post,
    path = "/donations",
    tag = "donations",
    security(("bearer_auth" = [])),
    request_body = CreateDonation,
    responses(
        (status = 201, description = "Donation created", body = Donation),
        (status = 400, description = "Invalid input or unknown institution"),
        (status = 403, description = "Volunteers cannot set the status")
    )
)]
pub async fn create_donation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateDonation>,
) -> AppResult<(StatusCode, Json<Donation>)> {
    claims.require(Resource::Donation, Action::Create)?;
    data.validate()?;

    let created = state.services.donations.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a donation
#[utoipa::path(
    put,
    path = "/donations/{id}",
    tag = "donations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Donation ID")
    ),
    request_body = UpdateDonation,
    responses(
        (status = 200, description = "Donation updated", body = Donation),
        (status = 404, description = "Donation not found")
    )
)]
pub async fn update_donation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateDonation>,
) -> AppResult<Json<Donation>> {
    claims.require(Resource::Donation, Action::Update)?;
    data.validate()?;

    let updated = state.services.donations.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete a donation
#[utoipa::path(
    delete,
    path = "/donations/{id}",
    tag = "donations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Donation ID"),
        DeleteDonationQuery
    ),
    responses(
        (status = 204, description = "Donation deleted"),
        (status = 404, description = "Donation not found"),
        (status = 409, description = "Equipment still belongs to the donation", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_donation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<DeleteDonationQuery>,
) -> AppResult<StatusCode> {
    claims.require(Resource::Donation, Action::Delete)?;

    state.services.donations.delete(id, query.cascade).await?;
    Ok(StatusCode::NO_CONTENT)
}
