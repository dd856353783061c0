use axum::{
    extract::{Path, Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use infra::models::ProfileRow;

use crate::auth::cookie::refresh_cookie;
use crate::auth::{refresh, OAuthProvider};
use crate::error::AppError;
use crate::services::accounts::{self, SignInInput, SignUpInput};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

#[derive(Serialize)]
pub struct AuthorizeResponse {
    pub auth_url: String,
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub profile: ProfileRow,
}

/// Issues an access token and starts a refresh-token family for `profile`.
async fn issue_session(state: &AppState, profile: ProfileRow) -> Result<Response, AppError> {
    let token = state.jwt_service().create_token(
        profile.id,
        profile.email.clone(),
        profile.user_type,
    )?;

    let auth_config = state.auth_config();
    let raw_refresh = refresh::create_refresh_token(
        &state.db,
        profile.id,
        auth_config.refresh_token_expiration_days,
    )
    .await?;
    let cookie_value = refresh_cookie(auth_config, &raw_refresh);

    let mut response = Json(AuthResponse { token, profile }).into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        cookie_value
            .parse()
            .map_err(|_| AppError::Internal("Failed to build cookie header".to_string()))?,
    );

    Ok(response)
}

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignUpInput>,
) -> Result<Response, AppError> {
    let profile = accounts::sign_up(&state.db, input).await?;
    issue_session(&state, profile).await
}

pub async fn signin(
    State(state): State<AppState>,
    Json(input): Json<SignInInput>,
) -> Result<Response, AppError> {
    let profile = accounts::sign_in(&state.db, input).await?;
    issue_session(&state, profile).await
}

pub async fn authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let provider: OAuthProvider = provider.parse()?;
    let (auth_url, csrf_token) = state.oauth_service().get_authorize_url(provider)?;

    Ok(Json(AuthorizeResponse {
        auth_url,
        csrf_token,
    }))
}

pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let provider: OAuthProvider = provider.parse()?;

    let oauth_user = state
        .oauth_service()
        .exchange_code_for_user_info(provider, query.code)
        .await?;

    let profile = accounts::find_or_create_oauth_profile(&state.db, provider, oauth_user).await?;
    issue_session(&state, profile).await
}
