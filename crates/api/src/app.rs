use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_graphql_axum::GraphQLResponse;
use axum::{
    extract::{Request, State},
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::Claims;
use crate::error::AppError;
use crate::gql::AppSchema;
use crate::middleware::jwt::jwt_middleware;
use crate::routes::{auth, functions, token};
use crate::state::AppState;

/// Build the Axum router: auth endpoints, the two function endpoints,
/// GraphQL and health.
///
/// The rate limiter keys on the peer address, so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState, schema: AppSchema) -> anyhow::Result<Router> {
    // Rate limiting: 10 requests per minute per IP on sign-up/sign-in
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(6) // 1 token every 6 seconds = ~10/min
        .burst_size(10)
        .finish()
        .context("invalid rate limiter configuration")?;

    let rate_limited_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .layer(GovernorLayer::new(Arc::new(governor_conf)));

    let router = Router::new()
        // Simple liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/auth/{provider}/authorize", get(auth::authorize))
        .route("/auth/{provider}/callback", get(auth::callback))
        .route("/auth/refresh", post(token::refresh_handler))
        .route("/auth/logout", post(token::logout_handler))
        .merge(rate_limited_routes)
        .route(
            "/functions/v1/tournament-ai-assistant",
            post(functions::tournament_assistant),
        )
        .route("/functions/v1/confirm-payment", post(functions::confirm_payment))
        // GraphQL endpoint with custom handler that includes JWT claims in context
        .route(
            "/graphql",
            post(move |state, req| graphql_handler(state, req, schema)),
        )
        .with_state(state.clone())
        // JWT middleware for authentication
        .layer(middleware::from_fn_with_state(state, jwt_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer({
            let allowed_origins = std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<HeaderValue> = allowed_origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_credentials(true)
        });

    Ok(router)
}

/// Custom GraphQL handler that extracts JWT claims from request extensions
/// and adds them to the GraphQL context
async fn graphql_handler(
    State(state): State<AppState>,
    req: Request,
    schema: AppSchema,
) -> Result<Response, AppError> {
    // Set by the JWT middleware when a valid token was sent
    let claims = req.extensions().get::<Claims>().cloned();

    let (_parts, body) = req.into_parts();
    let body_bytes = axum::body::to_bytes(body, 2 * 1024 * 1024)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read request body: {}", e)))?;

    let gql_request: async_graphql::Request = serde_json::from_slice(&body_bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid GraphQL request: {}", e)))?;

    let mut gql_request = gql_request.data(state);
    if let Some(claims) = claims {
        gql_request = gql_request.data(claims);
    }

    let gql_response = schema.execute(gql_request).await;

    Ok(GraphQLResponse::from(gql_response).into_response())
}

/// Liveness + quick DB check.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    infra::db::ping(&state.db).await?;
    Ok("ok")
}
