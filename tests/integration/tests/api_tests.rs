//! End-to-end HTTP tests against a server on an ephemeral port
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, error_body, rate_limited_config, AuthBody, LoginForm,
    MicropostBody, PageBody, SignupForm, TestServer,
};
use microblog_core::{UserId, UserRepository};
use serde_json::json;

/// Sign up, follow the mailed activation link and return the session
async fn activated_session(server: &TestServer) -> (SignupForm, AuthBody) {
    let form = SignupForm::unique();
    let response = server.post("/api/v1/users", &form).await.unwrap();
    assert_status(response, 201).await;

    let token = server.last_mailed_token();
    let path = format!(
        "/api/v1/account_activations/{token}/edit?email={}",
        form.email
    );
    let body = assert_json(server.get(&path).await.unwrap(), 200).await;
    let auth: AuthBody = serde_json::from_value(body).unwrap();
    (form, auth)
}

fn user_id(auth: &AuthBody) -> UserId {
    UserId::parse(&auth.user.id).unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await.unwrap();

    let body = assert_json(server.get("/health").await.unwrap(), 200).await;
    assert_eq!(body["status"], "healthy");

    let body = assert_json(server.get("/health/ready").await.unwrap(), 200).await;
    assert!(body["checks"]["database"].is_string());
}

// ============================================================================
// Accounts and sessions
// ============================================================================

#[tokio::test]
async fn test_signup_activation_and_login() {
    let server = TestServer::start().await.unwrap();
    let form = SignupForm::unique();

    let body = assert_json(server.post("/api/v1/users", &form).await.unwrap(), 201).await;
    assert_eq!(body["user"]["activated"], false);
    assert!(body["message"].is_string());

    let response = server
        .post("/api/v1/sessions", &LoginForm::new(&form.email, false))
        .await
        .unwrap();
    let error = error_body(assert_json(response, 403).await);
    assert_eq!(error.code, "ACCOUNT_NOT_ACTIVATED");

    let message = server.outbox.last().unwrap();
    assert!(message.link.contains("/account_activations/"));
    let token = server.last_mailed_token();

    let response = server
        .get(&format!(
            "/api/v1/account_activations/{token}/edit?email=wrong%40example.com"
        ))
        .await
        .unwrap();
    let error = error_body(assert_json(response, 400).await);
    assert_eq!(error.code, "INVALID_ACTIVATION_LINK");

    let body = assert_json(
        server
            .get(&format!(
                "/api/v1/account_activations/{token}/edit?email={}",
                form.email
            ))
            .await
            .unwrap(),
        200,
    )
    .await;
    let auth: AuthBody = serde_json::from_value(body).unwrap();
    assert!(auth.user.activated);
    assert_eq!(auth.token_type, "Bearer");
    assert!(auth.message.is_some());

    let response = server
        .post("/api/v1/sessions", &LoginForm::new(&form.email, false))
        .await
        .unwrap();
    let auth: AuthBody = serde_json::from_value(assert_json(response, 200).await).unwrap();
    assert_eq!(auth.user.email, form.email);
    assert!(auth.expires_in > 0);

    let body = assert_json(
        server
            .get_auth("/api/v1/users/me", &auth.access_token)
            .await
            .unwrap(),
        200,
    )
    .await;
    assert_eq!(body["email"], form.email.as_str());
}

#[tokio::test]
async fn test_remember_me_cookies_restore_session_until_logout() {
    let server = TestServer::start().await.unwrap();
    let (form, _) = activated_session(&server).await;

    // No cookies yet
    let response = server.post("/api/v1/sessions/remembered", &json!({})).await.unwrap();
    assert_status(response, 401).await;

    let response = server
        .post("/api/v1/sessions", &LoginForm::new(&form.email, true))
        .await
        .unwrap();
    let auth: AuthBody = serde_json::from_value(assert_json(response, 200).await).unwrap();

    let response = server.post("/api/v1/sessions/remembered", &json!({})).await.unwrap();
    let restored: AuthBody = serde_json::from_value(assert_json(response, 200).await).unwrap();
    assert_eq!(restored.user.id, auth.user.id);

    let response = server
        .delete_auth("/api/v1/sessions", &auth.access_token)
        .await
        .unwrap();
    assert_status(response, 204).await;

    let response = server.post("/api/v1/sessions/remembered", &json!({})).await.unwrap();
    assert_status(response, 401).await;
}

#[tokio::test]
async fn test_signup_validation_errors_have_field_details() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post(
            "/api/v1/users",
            &json!({
                "name": "",
                "email": "not-an-email",
                "password": "foo",
                "password_confirmation": "bar"
            }),
        )
        .await
        .unwrap();
    let error = error_body(assert_json(response, 400).await);
    assert_eq!(error.code, "VALIDATION_ERROR");
    let details = error.details.unwrap();
    assert!(details.get("name").is_some());
    assert!(details.get("email").is_some());
    assert!(details.get("password").is_some());
    assert!(server.outbox.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_in_other_case_is_conflict() {
    let server = TestServer::start().await.unwrap();
    let form = SignupForm::unique();
    assert_status(server.post("/api/v1/users", &form).await.unwrap(), 201).await;

    let mut twin = SignupForm::unique();
    twin.email = form.email.to_uppercase();
    let response = server.post("/api/v1/users", &twin).await.unwrap();
    let error = error_body(assert_json(response, 409).await);
    assert_eq!(error.code, "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let server = TestServer::start().await.unwrap();

    for path in ["/api/v1/feed", "/api/v1/users", "/api/v1/users/me"] {
        let response = server.get(path).await.unwrap();
        assert_status(response, 401).await;
    }

    let response = server
        .get_auth("/api/v1/feed", "not-a-real-token")
        .await
        .unwrap();
    assert_status(response, 401).await;

    let response = server
        .post("/api/v1/microposts", &json!({ "content": "hi" }))
        .await
        .unwrap();
    assert_status(response, 401).await;
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn test_password_reset_flow() {
    let server = TestServer::start().await.unwrap();
    let (form, _) = activated_session(&server).await;

    let response = server
        .post("/api/v1/password_resets", &json!({ "email": "nobody@example.com" }))
        .await
        .unwrap();
    let error = error_body(assert_json(response, 404).await);
    assert_eq!(error.code, "EMAIL_NOT_FOUND");

    let response = server
        .post("/api/v1/password_resets", &json!({ "email": form.email }))
        .await
        .unwrap();
    assert_json(response, 200).await;
    let token = server.last_mailed_token();

    let body = assert_json(
        server
            .get(&format!(
                "/api/v1/password_resets/{token}/edit?email={}",
                form.email
            ))
            .await
            .unwrap(),
        200,
    )
    .await;
    assert!(body["message"].as_str().unwrap().contains(&form.email));

    let response = server
        .patch(
            &format!("/api/v1/password_resets/{token}"),
            &json!({
                "email": form.email,
                "password": "new-secret",
                "password_confirmation": "different"
            }),
        )
        .await
        .unwrap();
    assert_status(response, 400).await;

    let response = server
        .patch(
            &format!("/api/v1/password_resets/{token}"),
            &json!({
                "email": form.email,
                "password": "new-secret",
                "password_confirmation": "new-secret"
            }),
        )
        .await
        .unwrap();
    let auth: AuthBody = serde_json::from_value(assert_json(response, 200).await).unwrap();
    assert_eq!(auth.user.email, form.email);

    // The link is spent
    let response = server
        .get(&format!(
            "/api/v1/password_resets/{token}/edit?email={}",
            form.email
        ))
        .await
        .unwrap();
    assert_status(response, 400).await;

    let response = server
        .post(
            "/api/v1/sessions",
            &json!({ "email": form.email, "password": "new-secret" }),
        )
        .await
        .unwrap();
    assert_status(response, 200).await;
}

// ============================================================================
// Microposts, follows and the feed
// ============================================================================

#[tokio::test]
async fn test_micropost_lifecycle() {
    let server = TestServer::start().await.unwrap();
    let (_, author) = activated_session(&server).await;
    let (_, other) = activated_session(&server).await;

    let response = server
        .post_auth("/api/v1/microposts", &author.access_token, &json!({ "content": "   " }))
        .await
        .unwrap();
    assert_status(response, 400).await;

    let response = server
        .post_auth(
            "/api/v1/microposts",
            &author.access_token,
            &json!({ "content": "a".repeat(141) }),
        )
        .await
        .unwrap();
    assert_status(response, 400).await;

    let response = server
        .post_auth(
            "/api/v1/microposts",
            &author.access_token,
            &json!({ "content": "a".repeat(140) }),
        )
        .await
        .unwrap();
    let post: MicropostBody = serde_json::from_value(assert_json(response, 201).await).unwrap();
    assert_eq!(post.content.len(), 140);

    let path = format!("/api/v1/microposts/{}", post.id);
    let response = server.delete_auth(&path, &other.access_token).await.unwrap();
    let error = error_body(assert_json(response, 403).await);
    assert_eq!(error.code, "NOT_MICROPOST_AUTHOR");

    let response = server.delete_auth(&path, &author.access_token).await.unwrap();
    assert_status(response, 204).await;

    let response = server.delete_auth(&path, &author.access_token).await.unwrap();
    assert_status(response, 404).await;

    let body = assert_json(
        server
            .get(&format!("/api/v1/users/{}/microposts", author.user.id))
            .await
            .unwrap(),
        200,
    )
    .await;
    let page: PageBody<MicropostBody> = serde_json::from_value(body).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_follow_and_feed() {
    let server = TestServer::start().await.unwrap();
    let (_, a) = activated_session(&server).await;
    let (_, b) = activated_session(&server).await;
    let (_, c) = activated_session(&server).await;

    let mut post_ids = Vec::new();
    for (session, content) in [(&a, "from a"), (&b, "from b"), (&c, "from c")] {
        let response = server
            .post_auth(
                "/api/v1/microposts",
                &session.access_token,
                &json!({ "content": content }),
            )
            .await
            .unwrap();
        let post: MicropostBody = serde_json::from_value(assert_json(response, 201).await).unwrap();
        post_ids.push(post.id);
    }

    let follow = json!({ "followed_id": b.user.id });
    let body = assert_json(
        server
            .post_auth("/api/v1/relationships", &a.access_token, &follow)
            .await
            .unwrap(),
        201,
    )
    .await;
    assert_eq!(body["following"], true);
    assert_eq!(body["followers_count"], 1);

    // Following twice leaves one edge
    let body = assert_json(
        server
            .post_auth("/api/v1/relationships", &a.access_token, &follow)
            .await
            .unwrap(),
        201,
    )
    .await;
    assert_eq!(body["followers_count"], 1);

    let response = server
        .post_auth(
            "/api/v1/relationships",
            &a.access_token,
            &json!({ "followed_id": a.user.id }),
        )
        .await
        .unwrap();
    let error = error_body(assert_json(response, 400).await);
    assert_eq!(error.code, "CANNOT_FOLLOW_SELF");

    let response = server
        .post_auth("/api/v1/relationships", &a.access_token, &json!({}))
        .await
        .unwrap();
    assert_status(response, 400).await;

    let body = assert_json(
        server.get_auth("/api/v1/feed", &a.access_token).await.unwrap(),
        200,
    )
    .await;
    let feed: PageBody<MicropostBody> = serde_json::from_value(body).unwrap();
    let ids: Vec<&str> = feed.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, [post_ids[1].as_str(), post_ids[0].as_str()]);

    let body = assert_json(
        server
            .get_auth(
                &format!("/api/v1/users/{}/followers", b.user.id),
                &c.access_token,
            )
            .await
            .unwrap(),
        200,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], a.user.id.as_str());

    let body = assert_json(
        server
            .get_auth(
                &format!("/api/v1/relationships/{}", b.user.id),
                &a.access_token,
            )
            .await
            .unwrap(),
        200,
    )
    .await;
    assert_eq!(body["following"], true);

    let body = assert_json(
        server
            .delete_auth(
                &format!("/api/v1/relationships/{}", b.user.id),
                &a.access_token,
            )
            .await
            .unwrap(),
        200,
    )
    .await;
    assert_eq!(body["following"], false);

    let body = assert_json(
        server.get_auth("/api/v1/feed", &a.access_token).await.unwrap(),
        200,
    )
    .await;
    let feed: PageBody<MicropostBody> = serde_json::from_value(body).unwrap();
    let ids: Vec<&str> = feed.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, [post_ids[0].as_str()]);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_profile_update_is_owner_only() {
    let server = TestServer::start().await.unwrap();
    let (_, owner) = activated_session(&server).await;
    let (_, other) = activated_session(&server).await;
    let path = format!("/api/v1/users/{}", owner.user.id);

    let response = server
        .patch_auth(&path, &other.access_token, &json!({ "name": "Hijacked" }))
        .await
        .unwrap();
    let error = error_body(assert_json(response, 403).await);
    assert_eq!(error.code, "NOT_ACCOUNT_OWNER");

    let body = assert_json(
        server
            .patch_auth(&path, &owner.access_token, &json!({ "name": "Renamed" }))
            .await
            .unwrap(),
        200,
    )
    .await;
    assert_eq!(body["name"], "Renamed");

    let body = assert_json(server.get(&path).await.unwrap(), 200).await;
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["microposts_count"], 0);
}

#[tokio::test]
async fn test_admin_deletes_user_and_their_posts() {
    let server = TestServer::start().await.unwrap();
    let (_, admin) = activated_session(&server).await;
    let (_, victim) = activated_session(&server).await;

    server
        .store
        .set_admin(user_id(&admin), true)
        .await
        .unwrap();

    for content in ["one", "two"] {
        let response = server
            .post_auth(
                "/api/v1/microposts",
                &victim.access_token,
                &json!({ "content": content }),
            )
            .await
            .unwrap();
        assert_status(response, 201).await;
    }

    let victim_path = format!("/api/v1/users/{}", victim.user.id);
    let admin_path = format!("/api/v1/users/{}", admin.user.id);

    let response = server
        .delete_auth(&admin_path, &victim.access_token)
        .await
        .unwrap();
    let error = error_body(assert_json(response, 403).await);
    assert_eq!(error.code, "NOT_ADMIN");

    let response = server
        .delete_auth(&admin_path, &admin.access_token)
        .await
        .unwrap();
    assert_status(response, 403).await;

    let response = server
        .delete_auth(&victim_path, &admin.access_token)
        .await
        .unwrap();
    assert_status(response, 204).await;

    assert_eq!(server.store.microposts_referencing(user_id(&victim)), 0);
    assert_status(server.get(&victim_path).await.unwrap(), 404).await;
}

#[tokio::test]
async fn test_invalid_path_ids_are_rejected() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/users/not-a-number").await.unwrap();
    let error = error_body(assert_json(response, 400).await);
    assert_eq!(error.code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_rate_limit_refills_at_configured_rate() {
    let server = TestServer::start_with(rate_limited_config(10, 1)).await.unwrap();

    let first = server.get("/api/v1/feed").await.unwrap();
    assert_eq!(first.status().as_u16(), 401);
    let burst_spent = server.get("/api/v1/feed").await.unwrap();
    assert_eq!(burst_spent.status().as_u16(), 429);

    // One token per 100ms at 10 requests per second
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    let refilled = server.get("/api/v1/feed").await.unwrap();
    assert_eq!(refilled.status().as_u16(), 401);

    let health = server.get("/health").await.unwrap();
    assert_eq!(health.status().as_u16(), 200);
}
