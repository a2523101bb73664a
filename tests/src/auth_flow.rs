use crate::helpers::*;

#[tokio::test]
async fn end_to_end_register_login_me() {
    let app = test_app().await;

    // Register
    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("testuser", "test@example.com"),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body = body_json(response).await;
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["is_active"], true);
    assert!(body.get("hashed_password").is_none(), "hash must never appear");

    // Login with the same credentials
    let response = post_form(
        &app,
        "/auth/login",
        "username=testuser&password=SecurePass123",
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // The token resolves to the registered identity
    let response = get(&app, "/auth/me", Some(&token)).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["username"], "testuser");

    // Without a token, the same endpoint rejects
    let response = get(&app, "/auth/me", None).await;
    assert_eq!(response.status(), 401);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn weak_password_reports_every_violation() {
    let app = test_app().await;

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        serde_json::json!({
            "email": "weak@example.com",
            "username": "weakuser",
            "password": "weak",
            "full_name": "Weak User"
        }),
    )
    .await;

    assert_eq!(response.status(), 422);
    let body = body_json(response).await;
    let detail = body["detail"].as_array().expect("detail should be a list");
    assert!(detail.len() >= 3, "short password violates several rules");
}

#[tokio::test]
async fn common_password_is_rejected() {
    let app = test_app().await;

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        serde_json::json!({
            "email": "common@example.com",
            "username": "commonuser",
            "password": "Password123",
            "full_name": null
        }),
    )
    .await;

    assert_eq!(response.status(), 422);
    let body = body_json(response).await;
    let detail = body["detail"].as_array().unwrap();
    assert!(
        detail
            .iter()
            .any(|m| m.as_str().unwrap().contains("too common"))
    );
}

#[tokio::test]
async fn invalid_username_is_rejected() {
    let app = test_app().await;

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("ab", "short@example.com"),
    )
    .await;
    assert_eq!(response.status(), 422);

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("123username", "numeric@example.com"),
    )
    .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn duplicate_username_and_email_are_conflicts() {
    let app = test_app().await;

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("johndoe", "john@example.com"),
    )
    .await;
    assert_eq!(response.status(), 201);

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("johndoe", "different@example.com"),
    )
    .await;
    assert_eq!(response.status(), 400);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Username already registered");

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("janedoe", "john@example.com"),
    )
    .await;
    assert_eq!(response.status(), 400);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
async fn bad_credentials_are_byte_identical() {
    let app = test_app().await;

    send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("realuser", "real@example.com"),
    )
    .await;

    let unknown = post_form(
        &app,
        "/auth/login",
        "username=ghostuser&password=SecurePass123",
    )
    .await;
    let wrong = post_form(
        &app,
        "/auth/login",
        "username=realuser&password=WrongPass999",
    )
    .await;

    assert_eq!(unknown.status(), 401);
    assert_eq!(wrong.status(), 401);

    let unknown_body = body_bytes(unknown).await;
    let wrong_body = body_bytes(wrong).await;
    assert_eq!(
        unknown_body, wrong_body,
        "unknown-user and wrong-password responses must not differ"
    );
}

#[tokio::test]
async fn login_accepts_email_in_username_field() {
    let app = test_app().await;

    send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("emailuser", "mail@example.com"),
    )
    .await;

    let response = post_form(
        &app,
        "/auth/login",
        "username=mail%40example.com&password=SecurePass123",
    )
    .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn logout_is_informational() {
    let app = test_app().await;

    let response = send_json(&app, "POST", "/auth/logout", serde_json::json!({})).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Successfully logged out")
    );
}
