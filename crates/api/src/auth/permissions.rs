use infra::models::ProfileRow;
use infra::repos::profiles::get_profile_by_id;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::session::{AuthRequired, Session};
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error(transparent)]
    AuthRequired(#[from] AuthRequired),

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Access denied: only tournament organizers can create tournaments")]
    NotOrganizer,

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        let message = err.to_string();
        match err {
            PermissionError::AuthRequired(_) => AppError::Unauthorized(message),
            PermissionError::ProfileNotFound => AppError::NotFound(message),
            PermissionError::NotOrganizer => AppError::Forbidden(message),
            PermissionError::Db(e) => AppError::Db(e),
        }
    }
}

/// Loads the caller's stored profile and checks it is an organizer. The token
/// role alone is not trusted.
pub async fn require_organizer(
    db: &PgPool,
    session: &Session,
) -> Result<ProfileRow, PermissionError> {
    let identity = session.require_user()?;

    let profile = get_profile_by_id(db, identity.user_id)
        .await?
        .ok_or(PermissionError::ProfileNotFound)?;

    if !profile.is_organizer() {
        tracing::warn!(user_id = %identity.user_id, "Non-organizer attempted an organizer action");
        return Err(PermissionError::NotOrganizer);
    }

    Ok(profile)
}
