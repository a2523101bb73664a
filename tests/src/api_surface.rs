use crate::helpers::*;
use serde_json::json;

#[tokio::test]
async fn health_reports_database_status() {
    let app = test_app().await;

    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn campaign_lifecycle() {
    let app = test_app().await;
    let token = register_and_login(&app, "organizer", "organizer@example.com").await;

    // Create (starts as draft)
    let response = send_json_with_token(
        &app,
        "POST",
        "/campaigns",
        &token,
        json!({
            "title": "Help Build a Community Centre",
            "description": "We're raising funds to build a new community centre for everyone.",
            "campaign_type": "fundraising",
            "goal_amount": 50000.0
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body = body_json(response).await;
    assert_eq!(body["status"], "draft");
    assert_eq!(body["current_amount"], 0.0);
    let campaign_id = body["id"].as_str().unwrap().to_string();

    // Update to active
    let response = send_json_with_token(
        &app,
        "PUT",
        &format!("/campaigns/{}", campaign_id),
        &token,
        json!({"status": "active"}),
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["status"], "active");

    // Fetch and list
    let response = get(&app, &format!("/campaigns/{}", campaign_id), None).await;
    assert_eq!(response.status(), 200);

    let response = get(&app, "/campaigns?status=active", None).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["campaigns"].as_array().unwrap().len(), 1);

    // My campaigns
    let response = get(&app, "/campaigns/my/campaigns", Some(&token)).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn campaign_requires_authentication_and_ownership() {
    let app = test_app().await;
    let owner = register_and_login(&app, "owner", "owner@example.com").await;
    let other = register_and_login(&app, "other", "other@example.com").await;

    // Anonymous create rejected
    let response = send_json(
        &app,
        "POST",
        "/campaigns",
        json!({
            "title": "Anonymous campaign",
            "description": "This should never be created without a token."
        }),
    )
    .await;
    assert_eq!(response.status(), 401);

    let response = send_json_with_token(
        &app,
        "POST",
        "/campaigns",
        &owner,
        json!({
            "title": "Owned campaign title",
            "description": "A perfectly reasonable campaign description."
        }),
    )
    .await;
    let campaign_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // A different user may not update it
    let response = send_json_with_token(
        &app,
        "PUT",
        &format!("/campaigns/{}", campaign_id),
        &other,
        json!({"title": "Hijacked campaign title"}),
    )
    .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn short_title_or_description_is_rejected() {
    let app = test_app().await;
    let token = register_and_login(&app, "creator", "creator@example.com").await;

    let response = send_json_with_token(
        &app,
        "POST",
        "/campaigns",
        &token,
        json!({
            "title": "Hi",
            "description": "Too short."
        }),
    )
    .await;
    assert_eq!(response.status(), 422);
    let body = body_json(response).await;
    assert_eq!(body["detail"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn donation_flow_with_anonymization() {
    let app = test_app().await;
    let organizer = register_and_login(&app, "fundraiser", "fundraiser@example.com").await;
    let donor = register_and_login(&app, "donor", "donor@example.com").await;

    // Active campaign
    let response = send_json_with_token(
        &app,
        "POST",
        "/campaigns",
        &organizer,
        json!({
            "title": "Village Hall Roof Repair",
            "description": "The hall roof needs replacing before the winter storms arrive."
        }),
    )
    .await;
    let campaign_id = body_json(response).await["id"].as_str().unwrap().to_string();
    send_json_with_token(
        &app,
        "PUT",
        &format!("/campaigns/{}", campaign_id),
        &organizer,
        json!({"status": "active"}),
    )
    .await;

    // Donations to a missing campaign are refused
    let response = send_json_with_token(
        &app,
        "POST",
        "/donations",
        &donor,
        json!({"campaign_id": "nonexistent", "amount": 10.0}),
    )
    .await;
    assert_eq!(response.status(), 404);

    // Anonymous donation
    let response = send_json_with_token(
        &app,
        "POST",
        "/donations",
        &donor,
        json!({
            "campaign_id": campaign_id,
            "amount": 25.0,
            "is_anonymous": true,
            "message": "Good luck!"
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body = body_json(response).await;
    assert_eq!(body["payment_status"], "completed");

    // Public listing withholds the giver id
    let response = get(
        &app,
        &format!("/donations/campaigns/{}", campaign_id),
        None,
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["total_amount"], 25.0);
    let listed = &body["donations"][0];
    assert_eq!(listed["is_anonymous"], true);
    assert!(listed["giver_id"].is_null());

    // The donor's own listing shows it
    let response = get(&app, "/donations/my/donations", Some(&donor)).await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert!(!body["donations"][0]["giver_id"].is_null());

    // A campaign with donations cannot be deleted
    let response = delete(&app, &format!("/campaigns/{}", campaign_id), &organizer).await;
    assert_eq!(response.status(), 400);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Cannot delete campaign with existing donations");
}

#[tokio::test]
async fn zero_amount_donation_is_rejected() {
    let app = test_app().await;
    let token = register_and_login(&app, "cheapskate", "cheap@example.com").await;

    let response = send_json_with_token(
        &app,
        "POST",
        "/donations",
        &token,
        json!({"campaign_id": "whatever", "amount": 0.0}),
    )
    .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn giver_profile_is_created_at_registration() {
    let app = test_app().await;
    let token = register_and_login(&app, "giver", "giver@example.com").await;

    let response = get(&app, "/givers/me", Some(&token)).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["profile_type"], "individual");
    assert_eq!(body["is_public"], true);
    assert_eq!(body["donation_count"], 0);

    // A second explicit profile is refused
    let response = send_json_with_token(
        &app,
        "POST",
        "/givers/profile",
        &token,
        json!({"profile_type": "individual"}),
    )
    .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn private_profiles_are_hidden_from_public_lookup() {
    let app = test_app().await;
    let token = register_and_login(&app, "shyuser", "shy@example.com").await;

    // Find own user id, then hide the profile.
    let response = get(&app, "/auth/me", Some(&token)).await;
    let user_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send_json_with_token(
        &app,
        "PUT",
        "/givers/profile/me",
        &token,
        json!({"is_public": false}),
    )
    .await;
    assert_eq!(response.status(), 200);

    let response = get(&app, &format!("/givers/profile/{}", user_id), None).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn user_profile_update() {
    let app = test_app().await;
    let token = register_and_login(&app, "mutable", "before@example.com").await;

    let response = send_json_with_token(
        &app,
        "PUT",
        "/users/me",
        &token,
        json!({"email": "after@example.com", "full_name": "Renamed User"}),
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["email"], "after@example.com");
    assert_eq!(body["full_name"], "Renamed User");

    let response = send_json_with_token(
        &app,
        "PUT",
        "/users/me",
        &token,
        json!({"email": "not-an-email"}),
    )
    .await;
    assert_eq!(response.status(), 422);
}
