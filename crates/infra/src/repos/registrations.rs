use sqlx::{PgExecutor, PgPool, Result};
use uuid::Uuid;

use crate::models::RegistrationRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CreateRegistration {
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub team_members: Vec<String>,
    pub payment_status: PaymentStatus,
}

pub struct RegistrationRepo {
    db: PgPool,
}

impl RegistrationRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<RegistrationRow>> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, tournament_id, user_id, team_name, team_members, payment_status, registered_at
            FROM tournament_registrations
            WHERE user_id = $1
            ORDER BY registered_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Tournaments the user holds a paid seat in.
    pub async fn completed_tournament_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT tournament_id
            FROM tournament_registrations
            WHERE user_id = $1 AND payment_status = 'completed'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }
}

pub async fn create_registration<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateRegistration,
) -> Result<RegistrationRow> {
    let row = sqlx::query_as::<_, RegistrationRow>(
        r#"
        INSERT INTO tournament_registrations (tournament_id, user_id, team_name, team_members, payment_status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, tournament_id, user_id, team_name, team_members, payment_status, registered_at
        "#,
    )
    .bind(data.tournament_id)
    .bind(data.user_id)
    .bind(data.team_name)
    .bind(data.team_members)
    .bind(data.payment_status)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// The user's registration for a tournament that has not failed, if any.
pub async fn find_live_registration<'e>(
    executor: impl PgExecutor<'e>,
    tournament_id: Uuid,
    user_id: Uuid,
) -> Result<Option<RegistrationRow>> {
    let row = sqlx::query_as::<_, RegistrationRow>(
        r#"
        SELECT id, tournament_id, user_id, team_name, team_members, payment_status, registered_at
        FROM tournament_registrations
        WHERE tournament_id = $1 AND user_id = $2 AND payment_status <> 'failed'
        "#,
    )
    .bind(tournament_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_registration_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<RegistrationRow>> {
    let row = sqlx::query_as::<_, RegistrationRow>(
        r#"
        SELECT id, tournament_id, user_id, team_name, team_members, payment_status, registered_at
        FROM tournament_registrations
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Moves a pending registration to completed and stamps the registration time.
/// Returns `None` if the row is not pending.
pub async fn mark_completed<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<RegistrationRow>> {
    let row = sqlx::query_as::<_, RegistrationRow>(
        r#"
        UPDATE tournament_registrations
        SET payment_status = 'completed', registered_at = NOW()
        WHERE id = $1 AND payment_status = 'pending'
        RETURNING id, tournament_id, user_id, team_name, team_members, payment_status, registered_at
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// True when the error comes from the one-live-registration-per-user index.
pub fn is_duplicate_registration(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}
