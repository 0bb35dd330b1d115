//! End-to-end tests driving the HTTP API against the in-memory backend
//!
//! Covers the storefront flow (quote, submit, claim, own orders) and the
//! admin console (order lifecycle, gallery, visitor statistics).

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use garage::prelude::*;
use serde_json::{Value, json};

const ADMIN_EMAIL: &str = "admin@admin.com";
const ADMIN_PASSWORD: &str = "admin-secret";

fn server_with(identities: InMemoryIdentityProvider) -> (TestServer, InMemoryClaimOutbox) {
    let outbox = InMemoryClaimOutbox::new();
    let app = ServerBuilder::new()
        .with_identity_provider(identities)
        .with_claim_delivery(outbox.clone())
        .with_in_memory_backend()
        .build()
        .expect("Failed to build app");

    (TestServer::new(app), outbox)
}

/// Server with a seeded admin account, plus the outbox receiving claim tokens
fn create_test_app() -> (TestServer, InMemoryClaimOutbox) {
    let identities = InMemoryIdentityProvider::new()
        .with_account(ADMIN_EMAIL, ADMIN_PASSWORD)
        .expect("seed admin");
    server_with(identities)
}

fn create_test_server() -> TestServer {
    create_test_app().0
}

fn default_config() -> Value {
    json!({
        "width": 300,
        "length": 500,
        "height": 220,
        "color": "RAL7016",
        "roofType": "standard",
        "gateType": "rollup",
        "gatePosition": "front",
        "wallThickness": "standard",
        "foundation": "concrete",
        "extras": []
    })
}

fn submission(email: &str) -> Value {
    json!({
        "config": default_config(),
        "customer": { "name": "Jan Kowalski", "email": email, "phone": "+49 170 1234567" }
    })
}

async fn sign_in(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/auth/sign-in")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}

async fn admin_token(server: &TestServer) -> String {
    sign_in(server, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

async fn submit(server: &TestServer, email: &str) -> Value {
    let response = server.post("/orders").json(&submission(email)).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let server = create_test_server();

        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "garage-configurator");
        }
    }
}

// =============================================================================
// Pricing Tests
// =============================================================================

mod pricing_tests {
    use super::*;

    #[tokio::test]
    async fn test_quote_default_configuration() {
        let server = create_test_server();

        let response = server.post("/pricing/quote").json(&default_config()).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["total"], 2600.0);
        assert_eq!(body["breakdown"]["base"], 1800.0);
        assert_eq!(body["breakdown"]["foundation"], 800.0);
        assert!(body["issues"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quote_reports_unknown_options_without_failing() {
        let server = create_test_server();
        let mut config = default_config();
        config["roofType"] = json!("dome");
        config["extras"] = json!(["door", "jacuzzi"]);

        let response = server.post("/pricing/quote").json(&config).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["total"], 2899.0);
        let fields: Vec<&str> = body["issues"]
            .as_array()
            .unwrap()
            .iter()
            .map(|issue| issue["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"roofType"));
        assert!(fields.contains(&"extras"));
    }

    #[tokio::test]
    async fn test_catalog_lists_tables_and_bounds() {
        let server = create_test_server();

        let response = server.get("/pricing/catalog").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["catalog"]["roof_types"].as_array().unwrap().len(), 5);
        assert_eq!(body["dimensions"]["width"]["min"], 250);
        assert_eq!(body["dimensions"]["width"]["max"], 800);
        assert_eq!(body["defaults"]["roofType"], "standard");
    }
}

// =============================================================================
// Order Submission Tests
// =============================================================================

mod submission_tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_submission_provisions_identity() {
        let (server, outbox) = create_test_app();

        let body = submit(&server, "jan@example.com").await;
        assert_eq!(body["order"]["status"], "pending");
        assert_eq!(body["order"]["total_price"], 2600.0);
        assert_eq!(body["order"]["customer"]["email"], "jan@example.com");
        assert!(body["order"]["customer"]["user_id"].is_string());
        assert_eq!(body["claim_sent"], true);

        // the claim goes to the mailbox, never back to the caller
        assert!(body.get("claim_token").is_none());
        assert!(outbox.latest("jan@example.com").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_known_email_requires_sign_in() {
        let server = create_test_server();
        submit(&server, "jan@example.com").await;

        let response = server
            .post("/orders")
            .json(&submission("JAN@example.com "))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let error: Value = response.json();
        assert_eq!(error["code"], "SIGN_IN_REQUIRED");
    }

    #[tokio::test]
    async fn test_stranger_cannot_order_into_existing_account() {
        let server = create_test_server();
        server
            .post("/auth/sign-up")
            .json(&json!({ "email": "anna@example.com", "password": "secret99" }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/orders")
            .json(&submission("anna@example.com"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let token = sign_in(&server, "anna@example.com", "secret99").await;
        let body: Value = server
            .get("/orders/mine")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(body["count"], 0);

        let admin = admin_token(&server).await;
        let body: Value = server
            .get("/admin/orders")
            .authorization_bearer(&admin)
            .await
            .json();
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_admin_email_cannot_be_taken_over() {
        let (server, outbox) = server_with(InMemoryIdentityProvider::new());

        let response = server.post("/orders").json(&submission(ADMIN_EMAIL)).await;
        response.assert_status(StatusCode::FORBIDDEN);
        let error: Value = response.json();
        assert_eq!(error["code"], "IDENTITY_RESERVED");
        assert!(outbox.latest(ADMIN_EMAIL).unwrap().is_none());

        let response = server
            .post("/auth/sign-up")
            .json(&json!({ "email": "Admin@Admin.com", "password": "takeover1" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        server
            .post("/auth/sign-in")
            .json(&json!({ "email": ADMIN_EMAIL, "password": "takeover1" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_seeded_admin_email_refused_for_anonymous_orders() {
        let server = create_test_server();
        let response = server.post("/orders").json(&submission(ADMIN_EMAIL)).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected_with_fields() {
        let server = create_test_server();
        let mut body = submission("not-an-email");
        body["config"]["width"] = json!(245);
        body["customer"]["name"] = json!("   ");

        let response = server.post("/orders").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let error: Value = response.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");
        let fields: Vec<&str> = error["details"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"customer.name"));
        assert!(fields.contains(&"customer.email"));
        assert!(fields.contains(&"config.width"));
    }

    #[tokio::test]
    async fn test_unknown_option_blocks_submission() {
        let server = create_test_server();
        let mut body = submission("jan@example.com");
        body["config"]["extras"] = json!(["jacuzzi"]);

        let response = server.post("/orders").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_claim_then_list_own_orders() {
        let (server, outbox) = create_test_app();
        let receipt = submit(&server, "jan@example.com").await;
        let claim_token = outbox
            .latest("jan@example.com")
            .unwrap()
            .expect("claim token delivered");

        let response = server
            .post("/auth/claim")
            .json(&json!({ "claim_token": claim_token, "password": "garage123" }))
            .await;
        response.assert_status_ok();
        let session: Value = response.json();
        assert_eq!(session["is_admin"], false);

        // claim tokens are single use
        let again = server
            .post("/auth/claim")
            .json(&json!({ "claim_token": claim_token, "password": "garage123" }))
            .await;
        again.assert_status(StatusCode::UNAUTHORIZED);

        let token = sign_in(&server, "jan@example.com", "garage123").await;
        let response = server.get("/orders/mine").authorization_bearer(&token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["orders"][0]["id"], receipt["order"]["id"]);
    }

    #[tokio::test]
    async fn test_signed_in_submission_uses_session_identity() {
        let server = create_test_server();
        let response = server
            .post("/auth/sign-up")
            .json(&json!({ "email": "anna@example.com", "password": "secret99" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let session: Value = response.json();
        let token = session["access_token"].as_str().unwrap();

        let response = server
            .post("/orders")
            .authorization_bearer(token)
            .json(&submission("other@example.com"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let receipt: Value = response.json();
        assert_eq!(
            receipt["order"]["customer"]["user_id"],
            session["identity"]["id"]
        );
        assert_eq!(receipt["claim_sent"], false);
    }

    #[tokio::test]
    async fn test_own_orders_require_sign_in() {
        let server = create_test_server();
        server
            .get("/orders/mine")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Admin Order Tests
// =============================================================================

mod admin_order_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_routes_reject_anonymous_and_customers() {
        let server = create_test_server();
        server
            .get("/admin/orders")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/auth/sign-up")
            .json(&json!({ "email": "anna@example.com", "password": "secret99" }))
            .await
            .assert_status(StatusCode::CREATED);
        let token = sign_in(&server, "anna@example.com", "secret99").await;
        server
            .get("/admin/orders")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let server = create_test_server();
        server
            .get("/admin/orders")
            .authorization_bearer("forged")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_lists_and_filters_orders() {
        let server = create_test_server();
        let token = admin_token(&server).await;
        let first = submit(&server, "jan@example.com").await;
        submit(&server, "eva@example.com").await;

        let response = server.get("/admin/orders").authorization_bearer(&token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);

        let id = first["order"]["id"].as_str().unwrap();
        server
            .put(&format!("/admin/orders/{}/status", id))
            .authorization_bearer(&token)
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status_ok();

        let response = server
            .get("/admin/orders")
            .add_query_param("status", "approved")
            .authorization_bearer(&token)
            .await;
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["orders"][0]["id"], id);

        server
            .get("/admin/orders")
            .add_query_param("status", "lost")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let server = create_test_server();
        let token = admin_token(&server).await;
        let receipt = submit(&server, "jan@example.com").await;
        let id = receipt["order"]["id"].as_str().unwrap();
        let status_path = format!("/admin/orders/{}/status", id);

        let response = server
            .put(&status_path)
            .authorization_bearer(&token)
            .json(&json!({ "status": "shipped" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: Value = response.json();
        assert_eq!(error["code"], "INVALID_TRANSITION");

        for status in ["approved", "shipped", "delivered"] {
            let response = server
                .put(&status_path)
                .authorization_bearer(&token)
                .json(&json!({ "status": status }))
                .await;
            response.assert_status_ok();
            let order: Value = response.json();
            assert_eq!(order["status"], status);
            assert_eq!(order["total_price"], 2600.0);
        }

        let response = server
            .get(&format!("/admin/orders/{}/transitions", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "delivered");
        assert_eq!(body["policy"], "strict");
        assert!(body["transitions"].as_array().unwrap().is_empty());

        server
            .put(&status_path)
            .authorization_bearer(&token)
            .json(&json!({ "status": "rejected" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_status_and_order() {
        let server = create_test_server();
        let token = admin_token(&server).await;
        let receipt = submit(&server, "jan@example.com").await;
        let id = receipt["order"]["id"].as_str().unwrap();

        server
            .put(&format!("/admin/orders/{}/status", id))
            .authorization_bearer(&token)
            .json(&json!({ "status": "teleported" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get(&format!("/admin/orders/{}", Uuid::new_v4()))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let error: Value = response.json();
        assert_eq!(error["code"], "ORDER_NOT_FOUND");
    }
}

// =============================================================================
// Gallery Tests
// =============================================================================

mod gallery_tests {
    use super::*;

    #[tokio::test]
    async fn test_gallery_lifecycle() {
        let server = create_test_server();
        let token = admin_token(&server).await;

        let response = server
            .post("/admin/gallery")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Doppelgarage Anthrazit",
                "description": "6 x 6 m mit Satteldach",
                "image_url": "https://cdn.example.com/garages/1.jpg",
                "price": 5400.0
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let image: Value = response.json();
        let id = image["id"].as_str().unwrap().to_string();

        let response = server.get("/gallery").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["images"][0]["title"], "Doppelgarage Anthrazit");

        server
            .delete(&format!("/admin/gallery/{}", id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .delete(&format!("/admin/gallery/{}", id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_gallery_validation_and_auth() {
        let server = create_test_server();

        server
            .post("/admin/gallery")
            .json(&json!({ "title": "x", "image_url": "https://cdn.example.com/x.jpg" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let token = admin_token(&server).await;
        let response = server
            .post("/admin/gallery")
            .authorization_bearer(&token)
            .json(&json!({ "title": "", "image_url": "", "price": -1.0 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");
    }
}

// =============================================================================
// Visitor Tests
// =============================================================================

mod visitor_tests {
    use super::*;

    #[tokio::test]
    async fn test_visits_are_aggregated() {
        let server = create_test_server();

        for page in ["/", "/konfigurator", "/konfigurator"] {
            server
                .post("/visits")
                .add_header(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"))
                .json(&json!({ "page": page }))
                .await
                .assert_status(StatusCode::ACCEPTED);
        }

        let token = admin_token(&server).await;
        let response = server.get("/admin/stats").authorization_bearer(&token).await;
        response.assert_status_ok();

        let stats: Value = response.json();
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["by_page"]["/konfigurator"], 2);
        assert_eq!(stats["by_page"]["/"], 1);
        let by_date_sum: u64 = stats["by_date"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_u64().unwrap())
            .sum();
        assert_eq!(by_date_sum, 3);
    }

    #[tokio::test]
    async fn test_malformed_visit_is_still_accepted() {
        let server = create_test_server();
        server
            .post("/visits")
            .text("not json")
            .await
            .assert_status(StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_stats_are_admin_only() {
        let server = create_test_server();
        server
            .get("/admin/stats")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Session Tests
// =============================================================================

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_conflict_and_bad_credentials() {
        let server = create_test_server();
        let credentials = json!({ "email": "anna@example.com", "password": "secret99" });

        server
            .post("/auth/sign-up")
            .json(&credentials)
            .await
            .assert_status(StatusCode::CREATED);
        let response = server.post("/auth/sign-up").json(&credentials).await;
        response.assert_status(StatusCode::CONFLICT);

        server
            .post("/auth/sign-in")
            .json(&json!({ "email": "anna@example.com", "password": "wrong-one" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password() {
        let server = create_test_server();
        server
            .post("/auth/sign-up")
            .json(&json!({ "email": "anna@example.com", "password": "123" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_reports_role() {
        let server = create_test_server();

        let response = server.get("/auth/me").await;
        let body: Value = response.json();
        assert_eq!(body["authenticated"], false);

        let token = admin_token(&server).await;
        let response = server.get("/auth/me").authorization_bearer(&token).await;
        let body: Value = response.json();
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["is_admin"], true);
        assert_eq!(body["email"], ADMIN_EMAIL);
    }
}
