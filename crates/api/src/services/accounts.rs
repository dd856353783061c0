use infra::models::ProfileRow;
use infra::repos::{CreateProfileData, ProfileRepo, UserType};
use rand::RngExt;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::oauth::{OAuthProvider, OAuthUserInfo};
use crate::auth::password::PasswordService;
use crate::error::AppError;

const ORGANIZER_CODE_ATTEMPTS: usize = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub in_game_name: Option<String>,
    #[serde(default)]
    pub user_type: Option<UserType>,
    /// Team accounts may link to an organizer with their 4-digit code.
    #[serde(default)]
    pub organizer_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub fn generate_organizer_code() -> String {
    format!("{:04}", rand::rng().random_range(0..10_000u32))
}

pub fn is_valid_organizer_code(code: &str) -> bool {
    code.len() == 4 && code.chars().all(|c| c.is_ascii_digit())
}

async fn unique_organizer_code(repo: &ProfileRepo) -> Result<String, AppError> {
    for _ in 0..ORGANIZER_CODE_ATTEMPTS {
        let code = generate_organizer_code();
        if !repo.organizer_code_exists(&code).await? {
            return Ok(code);
        }
    }
    Err(AppError::Internal(
        "Could not allocate a unique organizer code".to_string(),
    ))
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    Ok(email)
}

/// Creates a password account. Organizers receive a fresh organizer code;
/// teams may link to an existing organizer by code.
pub async fn sign_up(db: &PgPool, input: SignUpInput) -> Result<ProfileRow, AppError> {
    let repo = ProfileRepo::new(db.clone());

    let email = normalize_email(&input.email)?;
    let username = input.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    PasswordService::validate_password_strength(&input.password)?;

    if repo.get_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let user_type = input.user_type.unwrap_or(UserType::Team);
    let (organizer_code, linked_organizer_id) = match user_type {
        UserType::Organizer => (Some(unique_organizer_code(&repo).await?), None),
        UserType::Team => match input.organizer_code.as_deref().map(str::trim) {
            None | Some("") => (None, None),
            Some(code) if !is_valid_organizer_code(code) => {
                return Err(AppError::BadRequest(
                    "Organizer code must be 4 digits".to_string(),
                ))
            }
            Some(code) => {
                let organizer = repo.get_organizer_by_code(code).await?.ok_or_else(|| {
                    AppError::BadRequest("Unknown organizer code".to_string())
                })?;
                (None, Some(organizer.id))
            }
        },
    };

    let profile = repo
        .create(CreateProfileData {
            email,
            in_game_name: input.in_game_name.unwrap_or_default().trim().to_string(),
            username,
            user_type,
            organizer_code,
            linked_organizer_id,
            password_hash: Some(PasswordService::hash_password(&input.password)?),
            oauth_provider: None,
            avatar_url: None,
        })
        .await?;

    tracing::info!(user_id = %profile.id, user_type = user_type.as_str(), "Account created");
    Ok(profile)
}

pub async fn sign_in(db: &PgPool, input: SignInInput) -> Result<ProfileRow, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = normalize_email(&input.email).map_err(|_| invalid())?;
    let profile = ProfileRepo::new(db.clone())
        .get_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let hash = profile.password_hash.as_deref().ok_or_else(invalid)?;
    if !PasswordService::verify_password(&input.password, hash)? {
        return Err(invalid());
    }

    Ok(profile)
}

/// Finds the profile for an OAuth identity by email, creating a team
/// profile on first sign-in.
pub async fn find_or_create_oauth_profile(
    db: &PgPool,
    provider: OAuthProvider,
    info: OAuthUserInfo,
) -> Result<ProfileRow, AppError> {
    let repo = ProfileRepo::new(db.clone());
    let email = normalize_email(&info.email)?;

    if let Some(existing) = repo.get_by_email(&email).await? {
        return Ok(existing);
    }

    let username = info
        .display_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let profile = repo
        .create(CreateProfileData {
            email,
            in_game_name: username.clone(),
            username,
            user_type: UserType::Team,
            organizer_code: None,
            linked_organizer_id: None,
            password_hash: None,
            oauth_provider: Some(provider.as_str().to_string()),
            avatar_url: info.avatar_url,
        })
        .await?;

    tracing::info!(user_id = %profile.id, provider = provider.as_str(), "Account created via OAuth");
    Ok(profile)
}
