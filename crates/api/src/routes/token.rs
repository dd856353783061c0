use axum::{
    extract::State,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use infra::repos::ProfileRepo;

use crate::auth::cookie::{clear_cookie, extract_refresh_token, refresh_cookie};
use crate::auth::refresh;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

fn refresh_token_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_refresh_token)
}

pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let raw_token = refresh_token_from(&headers)
        .ok_or_else(|| AppError::Unauthorized("No refresh token in cookie".to_string()))?;

    let auth_config = state.auth_config();
    let result = refresh::rotate_refresh_token(
        &state.db,
        &raw_token,
        auth_config.refresh_token_expiration_days,
    )
    .await?;

    // Profile drives the role claim, so a changed user type takes effect here.
    let profile = ProfileRepo::new(state.db.clone())
        .get_by_id(result.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Profile not found".to_string()))?;

    let token = state
        .jwt_service()
        .create_token(profile.id, profile.email, profile.user_type)?;

    let cookie_value = refresh_cookie(auth_config, &result.new_raw_token);

    let mut response = Json(RefreshResponse { token }).into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        cookie_value
            .parse()
            .map_err(|_| AppError::Internal("Failed to build cookie header".to_string()))?,
    );

    Ok(response)
}

pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    // The cookie may already be gone; logout still clears it.
    if let Some(raw_token) = refresh_token_from(&headers) {
        if let Err(e) = refresh::revoke_by_token(&state.db, &raw_token).await {
            tracing::warn!("Failed to revoke refresh token family: {}", e);
        }
    }

    let cookie_value = clear_cookie(state.auth_config());

    let mut response = StatusCode::OK.into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        cookie_value
            .parse()
            .map_err(|_| AppError::Internal("Failed to build cookie header".to_string()))?,
    );

    Ok(response)
}
