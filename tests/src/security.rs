use crate::helpers::*;
use app_auth::TokenService;
use chrono::{Duration, Utc};

// Requests sent through `oneshot` carry no peer address, so every request
// in a test shares one client key; per-test apps keep the counters
// isolated.

#[tokio::test]
async fn sixth_registration_in_the_window_is_throttled() {
    let app = test_app().await;

    for i in 0..5 {
        let response = send_json(
            &app,
            "POST",
            "/auth/register",
            register_payload(&format!("burst{}", i), &format!("burst{}@example.com", i)),
        )
        .await;
        assert_eq!(response.status(), 201, "registration {} should pass", i + 1);
    }

    let response = send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("burst5", "burst5@example.com"),
    )
    .await;
    assert_eq!(response.status(), 429);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("429 must carry Retry-After")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0);

    let body = body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded")
    );
}

#[tokio::test]
async fn eleventh_login_attempt_is_throttled() {
    let app = test_app().await;

    // Credential correctness is irrelevant to the limiter: all attempts
    // fail authentication, only the eleventh is throttled.
    for i in 0..10 {
        let response = post_form(
            &app,
            "/auth/login",
            "username=nobody&password=BadPass123",
        )
        .await;
        assert_eq!(response.status(), 401, "attempt {} should reach auth", i + 1);
    }

    let response = post_form(&app, "/auth/login", "username=nobody&password=BadPass123").await;
    assert_eq!(response.status(), 429);
}

#[tokio::test]
async fn rate_limited_login_never_reaches_credential_check() {
    // Tiny quota so the limiter trips before a *valid* credential pair is
    // even considered.
    let app = test_app_with(|config| {
        config.security.rate_limiting.login.quota = 2;
    })
    .await;

    send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("limited", "limited@example.com"),
    )
    .await;

    for _ in 0..2 {
        post_form(&app, "/auth/login", "username=limited&password=WrongPass1").await;
    }

    let response = post_form(
        &app,
        "/auth/login",
        "username=limited&password=SecurePass123",
    )
    .await;
    assert_eq!(response.status(), 429, "correct credentials do not bypass the limiter");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = test_app().await;

    send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("sleepy", "sleepy@example.com"),
    )
    .await;

    // Forge a token with the server's own key, issued long enough ago
    // that its TTL has elapsed.
    let tokens = TokenService::new(b"your-secret-key-change-this", 30);
    let stale = tokens
        .issue_at("sleepy", Utc::now() - Duration::minutes(31))
        .unwrap();

    let response = get(&app, "/auth/me", Some(&stale)).await;
    assert_eq!(response.status(), 401);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let app = test_app().await;
    let token = register_and_login(&app, "victim", "victim@example.com").await;

    // Flip part of the signature.
    let mut tampered = token.clone();
    tampered.pop();
    tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

    let response = get(&app, "/auth/me", Some(&tampered)).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn token_signed_with_wrong_key_is_unauthorized() {
    let app = test_app().await;

    send_json(
        &app,
        "POST",
        "/auth/register",
        register_payload("forged", "forged@example.com"),
    )
    .await;

    let other = TokenService::new(b"attacker-controlled-secret-key", 30);
    let forged = other.issue("forged").unwrap();

    let response = get(&app, "/auth/me", Some(&forged)).await;
    assert_eq!(response.status(), 401);
}
