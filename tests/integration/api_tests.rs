//! API integration tests
//!
//! Need a running server whose bootstrap administrator matches
//! `RECONECTA_TEST_ADMIN_EMAIL` / `RECONECTA_TEST_ADMIN_PASSWORD`, e.g.:
//!
//! ```text
//! RECONECTA__AUTH__BOOTSTRAP_ADMIN_EMAIL=admin@reconectatec.cl \
//! RECONECTA__AUTH__BOOTSTRAP_ADMIN_PASSWORD='Wx8!nB3qRt' cargo run
//! ```

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_ADMIN_EMAIL: &str = "admin@reconectatec.cl";
const DEFAULT_ADMIN_PASSWORD: &str = "Wx8!nB3qRt";
const USER_PASSWORD: &str = "Tq7#mZ2vLp";

fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Random RUT body, formatted with dots and dash
fn unique_rut() -> (String, String) {
    let body = uuid::Uuid::new_v4().as_u128() % 89_999_999 + 10_000_000;
    let digits = body.to_string();
    (dotted_rut(&digits), format!("{}-5", digits))
}

/// "76123456" -> "76.123.456-5"
fn dotted_rut(digits: &str) -> String {
    format!("{}.{}.{}-5", &digits[..2], &digits[2..5], &digits[5..])
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK, "login failed for {}", email);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn admin_credentials() -> (String, String) {
    let email = std::env::var("RECONECTA_TEST_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let password =
        std::env::var("RECONECTA_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    (email, password)
}

async fn admin_token(client: &Client) -> String {
    let (email, password) = admin_credentials();
    login(client, &email, &password).await
}

/// Create a user with the given role and return (id, token)
async fn user_with_role(client: &Client, admin: &str, role: &str) -> (i64, String) {
    let email = format!("{}-{}@example.org", role, unique_suffix());
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "first_name": "Camila",
            "last_name": "Rojas",
            "email": email,
            "role": role,
            "password": USER_PASSWORD,
            "password_confirmation": USER_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse user");
    let id = body["id"].as_i64().expect("No user id");
    (id, login(client, &email, USER_PASSWORD).await)
}

async fn create_institution(client: &Client, token: &str, kind: &str) -> String {
    let (dotted, _) = unique_rut();
    let response = client
        .post(format!("{}/institutions", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "rut": dotted,
            "name": format!("Fundacion {}", unique_suffix()),
            "kind": kind,
            "contact_email": format!("contacto-{}@example.org", unique_suffix())
        }))
        .send()
        .await
        .expect("Failed to create institution");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse institution");
    body["rut"].as_str().expect("No rut").to_string()
}

async fn post_json(client: &Client, token: &str, path: &str, payload: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_json(client: &Client, token: &str, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn put_json(client: &Client, token: &str, path: &str, payload: Value) -> (StatusCode, Value) {
    let response = client
        .put(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn delete(client: &Client, token: &str, path: &str) -> (StatusCode, Value) {
    let response = client
        .delete(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_returns_landing_route() {
    let client = Client::new();
    let (email, password) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["redirect"], "/api/v1/dashboard/summary");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (email, _) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["login_url"], "/api/v1/auth/login");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/donations", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_token() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/auth/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&client, &token, "/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_volunteer_permissions() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (_, volunteer) = user_with_role(&client, &admin, "volunteer").await;
    let donor = create_institution(&client, &admin, "donor").await;

    // Volunteers register donations but cannot pick the status
    let (status, body) = post_json(
        &client,
        &volunteer,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let donation_id = body["id"].as_i64().expect("No donation id");

    let (status, body) = post_json(
        &client,
        &volunteer,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 1, "status": "received" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap_or_default().contains("status"));

    let (status, _) = delete(&client, &volunteer, &format!("/donations/{}", donation_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_json(&client, &volunteer, "/equipment").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_json(&client, &volunteer, "/dashboard/summary").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get_json(&client, &volunteer, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/api/v1/donations");
}

#[tokio::test]
#[ignore]
async fn test_technician_permissions() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (_, technician) = user_with_role(&client, &admin, "technician").await;

    let (status, _) = get_json(&client, &technician, "/equipment").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&client, &technician, "/donations").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_json(&client, &technician, "/institutions").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_json(&client, &technician, "/users").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_institution_rut_is_normalized() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (dotted, canonical) = unique_rut();

    let (status, body) = post_json(
        &client,
        &admin,
        "/institutions",
        json!({ "rut": dotted, "name": "Colegio Los Andes", "kind": "receiver" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rut"], canonical.as_str());

    // Any common format finds the same institution
    let compact = canonical.replace('-', "");
    let (status, body) = get_json(&client, &admin, &format!("/institutions/{}", compact)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rut"], canonical.as_str());

    let (status, _) = post_json(
        &client,
        &admin,
        "/institutions",
        json!({ "rut": compact, "name": "Duplicate", "kind": "donor" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post_json(
        &client,
        &admin,
        "/institutions",
        json!({ "rut": "ABC-1", "name": "Broken", "kind": "donor" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_institution_delete_is_restricted() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let donor = create_institution(&client, &admin, "donor").await;

    let (status, _) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = delete(&client, &admin, &format!("/institutions/{}", donor)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["dependents"][0]["kind"], "Donations");
    assert!(body["message"].as_str().unwrap_or_default().contains("Donations"));
}

#[tokio::test]
#[ignore]
async fn test_donation_delete_conflict_then_cascade() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let donor = create_institution(&client, &admin, "donor").await;

    let (_, donation) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 1 }),
    )
    .await;
    let donation_id = donation["id"].as_i64().expect("No donation id");
    assert!(donation["institution_name"].is_string());

    let (status, equipment) = post_json(
        &client,
        &admin,
        "/equipment",
        json!({ "donation_id": donation_id, "kind": "laptop", "brand": "Lenovo" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let equipment_id = equipment["id"].as_i64().expect("No equipment id");

    let (status, body) = delete(&client, &admin, &format!("/donations/{}", donation_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["dependents"][0]["kind"], "Equipment");

    let (status, _) = delete(&client, &admin, &format!("/donations/{}?cascade=true", donation_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get_json(&client, &admin, &format!("/equipment/{}", equipment_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_serial_numbers_are_unique_and_searchable() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let donor = create_institution(&client, &admin, "donor").await;
    let (_, donation) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 2 }),
    )
    .await;
    let donation_id = donation["id"].as_i64().expect("No donation id");
    let serial = format!("SN-{}", unique_suffix());

    let (status, _) = post_json(
        &client,
        &admin,
        "/equipment",
        json!({ "donation_id": donation_id, "kind": "desktop", "serial_number": serial }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        &client,
        &admin,
        "/equipment",
        json!({ "donation_id": donation_id, "kind": "desktop", "serial_number": serial }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let needle = serial.to_lowercase();
    let (status, body) = get_json(&client, &admin, &format!("/equipment?q={}", needle)).await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().expect("Expected a list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["serial_number"], serial.as_str());
}

#[tokio::test]
#[ignore]
async fn test_assignment_delete_cascades_details_and_tickets() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let donor = create_institution(&client, &admin, "donor").await;
    let receiver = create_institution(&client, &admin, "receiver").await;

    let (_, donation) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 1 }),
    )
    .await;
    let (_, equipment) = post_json(
        &client,
        &admin,
        "/equipment",
        json!({ "donation_id": donation["id"], "kind": "laptop" }),
    )
    .await;
    let equipment_id = equipment["id"].as_i64().expect("No equipment id");

    let (status, assignment) = post_json(
        &client,
        &admin,
        "/assignments",
        json!({ "institution_rut": receiver, "requested_quantity": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let assignment_id = assignment["id"].as_i64().expect("No assignment id");

    let details_path = format!("/assignments/{}/details", assignment_id);
    let (status, _) = post_json(
        &client,
        &admin,
        &details_path,
        json!({ "equipment_id": equipment_id, "delivery_date": "2025-03-14" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // An item is delivered at most once
    let (status, _) = post_json(&client, &admin, &details_path, json!({ "equipment_id": equipment_id })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, ticket) = post_json(
        &client,
        &admin,
        "/support/tickets",
        json!({ "assignment_id": assignment_id, "kind": "technical", "description": "Screen flickers" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ticket_id = ticket["id"].as_i64().expect("No ticket id");

    let (status, _) = delete(&client, &admin, &format!("/assignments/{}", assignment_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get_json(&client, &admin, &format!("/support/{}", ticket_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The equipment itself survives
    let (status, _) = get_json(&client, &admin, &format!("/equipment/{}", equipment_id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_deleting_technician_clears_references() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (technician_id, technician) = user_with_role(&client, &admin, "technician").await;
    let donor = create_institution(&client, &admin, "donor").await;

    let (_, donation) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 1 }),
    )
    .await;
    let (_, equipment) = post_json(
        &client,
        &admin,
        "/equipment",
        json!({ "donation_id": donation["id"], "kind": "monitor" }),
    )
    .await;
    let equipment_id = equipment["id"].as_i64().expect("No equipment id");

    // A technician opening a record is recorded as its technician
    let (status, refurbishment) = post_json(
        &client,
        &technician,
        "/refurbishments",
        json!({ "equipment_id": equipment_id, "workshop": "Taller Central" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(refurbishment["technician_id"], technician_id);
    assert_eq!(refurbishment["final_status"], "in_progress");

    let (status, _) = delete(&client, &admin, &format!("/users/{}", technician_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = get_json(&client, &admin, &format!("/refurbishments/{}", equipment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["technician_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_user_email_is_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let email = format!("dup-{}@example.org", unique_suffix());

    let payload = json!({
        "first_name": "Ignacio",
        "last_name": "Soto",
        "email": email,
        "role": "volunteer",
        "password": USER_PASSWORD,
        "password_confirmation": USER_PASSWORD
    });

    let (status, _) = post_json(&client, &admin, "/users", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(&client, &admin, "/users", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_dashboard_summary_counts() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let (status, body) = get_json(&client, &admin, "/dashboard/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["users"].as_i64().unwrap_or_default() >= 1);
    assert!(body["equipment"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_deactivated_user_token_is_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (volunteer_id, volunteer) = user_with_role(&client, &admin, "volunteer").await;

    let (status, _) = get_json(&client, &volunteer, "/donations").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = put_json(
        &client,
        &admin,
        &format!("/users/{}", volunteer_id),
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The token is still within its lifetime but the account is gone
    let (status, _) = get_json(&client, &volunteer, "/donations").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_role_change_applies_to_existing_token() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (technician_id, technician) = user_with_role(&client, &admin, "technician").await;

    let (status, _) = get_json(&client, &technician, "/equipment").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = put_json(
        &client,
        &admin,
        &format!("/users/{}", technician_id),
        json!({ "role": "volunteer" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&client, &technician, "/equipment").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = get_json(&client, &technician, "/donations").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_search_by_dotted_rut_finds_donations_and_assignments() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let donor = create_institution(&client, &admin, "donor").await;
    let receiver = create_institution(&client, &admin, "receiver").await;

    let (status, _) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_json(
        &client,
        &admin,
        "/assignments",
        json!({ "institution_rut": receiver, "requested_quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Stored as "76123456-5", searched as "76.123.456-5"
    let donor_dotted = dotted_rut(donor.trim_end_matches("-5"));
    let (status, body) = get_json(&client, &admin, &format!("/donations?q={}", donor_dotted)).await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().expect("Expected a list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["institution_rut"], donor.as_str());

    let receiver_dotted = dotted_rut(receiver.trim_end_matches("-5"));
    let (status, body) = get_json(&client, &admin, &format!("/assignments?q={}", receiver_dotted)).await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().expect("Expected a list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["institution_rut"], receiver.as_str());
}

#[tokio::test]
#[ignore]
async fn test_optional_fields_can_be_cleared() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let donor = create_institution(&client, &admin, "donor").await;

    let (status, institution) =
        put_json(&client, &admin, &format!("/institutions/{}", donor), json!({ "contact_email": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(institution["contact_email"].is_null());

    let (_, donation) = post_json(
        &client,
        &admin,
        "/donations",
        json!({ "institution_rut": donor, "total_equipment": 1 }),
    )
    .await;
    let serial = format!("SN-{}", unique_suffix());
    let (_, equipment) = post_json(
        &client,
        &admin,
        "/equipment",
        json!({ "donation_id": donation["id"], "kind": "laptop", "serial_number": serial }),
    )
    .await;
    let equipment_id = equipment["id"].as_i64().expect("No equipment id");

    let (status, equipment) = put_json(
        &client,
        &admin,
        &format!("/equipment/{}", equipment_id),
        json!({ "serial_number": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(equipment["serial_number"].is_null());

    let (technician_id, _) = user_with_role(&client, &admin, "technician").await;
    let (status, _) = post_json(
        &client,
        &admin,
        "/refurbishments",
        json!({ "equipment_id": equipment_id, "technician_id": technician_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, refurbishment) = put_json(
        &client,
        &admin,
        &format!("/refurbishments/{}", equipment_id),
        json!({ "technician_id": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refurbishment["technician_id"].is_null());
}
