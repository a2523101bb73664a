use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let config = &state.config;
    let cors_config = &config.security.cors;

    // Configure CORS with settings from config
    let cors = CorsLayer::new()
        .allow_origin(
            if cors_config.allowed_origins.contains(&"*".to_string()) {
                tower_http::cors::AllowOrigin::any()
            } else {
                tower_http::cors::AllowOrigin::list(
                    cors_config
                        .allowed_origins
                        .iter()
                        .filter_map(|origin| origin.parse().ok())
                        .collect::<Vec<_>>(),
                )
            },
        )
        .allow_methods(
            cors_config
                .allowed_methods
                .iter()
                .filter_map(|method| method.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_headers(
            cors_config
                .allowed_headers
                .iter()
                .filter_map(|header| header.parse().ok())
                .collect::<Vec<_>>(),
        );

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let body_limit = config.server.body_limit;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Authentication
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout", post(handlers::auth::logout))
        // Campaigns
        .route(
            "/campaigns",
            post(handlers::campaigns::create_campaign).get(handlers::campaigns::list_campaigns),
        )
        .route(
            "/campaigns/my/campaigns",
            get(handlers::campaigns::my_campaigns),
        )
        .route(
            "/campaigns/{campaign_id}",
            get(handlers::campaigns::get_campaign)
                .put(handlers::campaigns::update_campaign)
                .delete(handlers::campaigns::delete_campaign),
        )
        // Donations
        .route("/donations", post(handlers::donations::create_donation))
        .route(
            "/donations/my/donations",
            get(handlers::donations::my_donations),
        )
        .route(
            "/donations/campaigns/{campaign_id}",
            get(handlers::donations::campaign_donations),
        )
        .route(
            "/donations/{donation_id}",
            get(handlers::donations::get_donation),
        )
        // Giver profiles
        .route("/givers/me", get(handlers::givers::get_my_profile))
        .route("/givers/profile", post(handlers::givers::create_profile))
        .route(
            "/givers/profile/me",
            get(handlers::givers::get_my_profile).put(handlers::givers::update_my_profile),
        )
        .route(
            "/givers/profile/{user_id}",
            get(handlers::givers::get_profile_by_user_id),
        )
        // Users
        .route(
            "/users/me",
            get(handlers::users::get_me).put(handlers::users::update_me),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware_stack)
        .with_state(state)
}
