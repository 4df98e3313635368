//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    assignments, auth, dashboard, donations, equipment, health, institutions, refurbishments, support,
    users,
};
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ReConectaTec API",
        version = "1.0.0",
        description = "Donated equipment tracking: donations, refurbishment, delivery and support"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Dashboard
        dashboard::landing,
        dashboard::summary,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::update_my_profile,
        // Institutions
        institutions::list_institutions,
        institutions::get_institution,
        institutions::create_institution,
        institutions::update_institution,
        institutions::delete_institution,
        // Donations
        donations::list_donations,
        donations::get_donation,
        donations::create_donation,
        donations::update_donation,
        donations::delete_donation,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Assignments
        assignments::list_assignments,
        assignments::get_assignment,
        assignments::create_assignment,
        assignments::update_assignment,
        assignments::delete_assignment,
        assignments::list_details,
        assignments::create_detail,
        assignments::update_detail,
        assignments::delete_detail,
        // Refurbishments
        refurbishments::list_refurbishments,
        refurbishments::get_refurbishment,
        refurbishments::create_refurbishment,
        refurbishments::update_refurbishment,
        refurbishments::delete_refurbishment,
        // Support
        support::list_tickets,
        support::get_ticket,
        support::create_ticket,
        support::submit_ticket,
        support::update_ticket,
        support::delete_ticket,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Dashboard
            dashboard::LandingResponse,
            crate::services::dashboard::DashboardSummary,
            // Enums
            models::enums::InstitutionKind,
            models::enums::Role,
            models::enums::DonationStatus,
            models::enums::EquipmentKind,
            models::enums::AssignmentStatus,
            models::enums::RefurbishmentStatus,
            models::enums::SupportKind,
            // Users
            models::user::User,
            models::user::CreateUser,
            models::user::UpdateUser,
            models::user::UpdateProfile,
            // Institutions
            models::institution::Institution,
            models::institution::CreateInstitution,
            models::institution::UpdateInstitution,
            // Donations
            models::donation::Donation,
            models::donation::CreateDonation,
            models::donation::UpdateDonation,
            // Equipment
            models::equipment::Equipment,
            models::equipment::CreateEquipment,
            models::equipment::UpdateEquipment,
            // Assignments
            models::assignment::Assignment,
            models::assignment::CreateAssignment,
            models::assignment::UpdateAssignment,
            models::assignment::AssignmentDetail,
            models::assignment::CreateAssignmentDetail,
            models::assignment::UpdateAssignmentDetail,
            // Refurbishments
            models::refurbishment::Refurbishment,
            models::refurbishment::CreateRefurbishment,
            models::refurbishment::UpdateRefurbishment,
            // Support
            models::support::Support,
            models::support::CreateSupport,
            models::support::SubmitTicket,
            models::support::UpdateSupport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::DependentGroup,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "dashboard", description = "Landing route and summary counts"),
        (name = "users", description = "User management"),
        (name = "institutions", description = "Donor and receiving institutions"),
        (name = "donations", description = "Donation intake"),
        (name = "equipment", description = "Donated equipment"),
        (name = "assignments", description = "Equipment requests and deliveries"),
        (name = "refurbishments", description = "Workshop refurbishment records"),
        (name = "support", description = "Support tickets")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by `security(("bearer_auth" = []))`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
