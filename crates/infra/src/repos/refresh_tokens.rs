use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result};
use uuid::Uuid;

use crate::models::RefreshTokenRow;

pub async fn create(
    pool: &PgPool,
    token_hash: &str,
    user_id: Uuid,
    family_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO refresh_tokens (token_hash, user_id, family_id, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(family_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Any token with this hash, revoked or expired ones included. Callers use
/// [`RefreshTokenRow::is_usable`] to tell a live token from a replayed one.
pub async fn find_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<RefreshTokenRow>> {
    sqlx::query_as::<_, RefreshTokenRow>(
        r#"
        SELECT id, token_hash, user_id, family_id, expires_at, revoked_at, created_at
        FROM refresh_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn revoke_family(pool: &PgPool, family_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = NOW() WHERE family_id = $1 AND revoked_at IS NULL",
    )
    .bind(family_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
