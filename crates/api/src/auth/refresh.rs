use chrono::{Duration, Utc};
use infra::repos::refresh_tokens;
use rand::distr::Alphanumeric;
use rand::RngExt;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

const TOKEN_LEN: usize = 64;

pub struct RotateResult {
    pub user_id: Uuid,
    pub new_raw_token: String,
}

pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_raw_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

async fn store_token(
    pool: &PgPool,
    user_id: Uuid,
    family_id: Uuid,
    expiration_days: u64,
) -> Result<String, AppError> {
    let raw_token = generate_raw_token();
    let expires_at = Utc::now() + Duration::days(expiration_days as i64);

    refresh_tokens::create(pool, &hash_token(&raw_token), user_id, family_id, expires_at).await?;

    Ok(raw_token)
}

/// Starts a new token family for a fresh sign-in.
pub async fn create_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    expiration_days: u64,
) -> Result<String, AppError> {
    store_token(pool, user_id, Uuid::new_v4(), expiration_days).await
}

/// Exchanges a live refresh token for a new one in the same family.
///
/// Presenting a token that was already revoked means it leaked; the whole
/// family is revoked and the caller has to sign in again.
pub async fn rotate_refresh_token(
    pool: &PgPool,
    raw_token: &str,
    expiration_days: u64,
) -> Result<RotateResult, AppError> {
    let invalid = || AppError::Unauthorized("Invalid or expired refresh token".to_string());

    let row = refresh_tokens::find_by_hash(pool, &hash_token(raw_token))
        .await?
        .ok_or_else(invalid)?;

    if row.revoked_at.is_some() {
        let revoked = refresh_tokens::revoke_family(pool, row.family_id).await?;
        tracing::warn!(
            family_id = %row.family_id,
            revoked,
            "Refresh token reuse detected, token family revoked"
        );
        return Err(invalid());
    }

    if !row.is_usable(Utc::now()) {
        return Err(invalid());
    }

    refresh_tokens::revoke(pool, row.id).await?;
    let new_raw_token = store_token(pool, row.user_id, row.family_id, expiration_days).await?;

    Ok(RotateResult {
        user_id: row.user_id,
        new_raw_token,
    })
}

pub async fn revoke_by_token(pool: &PgPool, raw_token: &str) -> Result<(), AppError> {
    if let Some(row) = refresh_tokens::find_by_hash(pool, &hash_token(raw_token)).await? {
        refresh_tokens::revoke_family(pool, row.family_id).await?;
    }

    Ok(())
}
