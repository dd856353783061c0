use std::collections::HashSet;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use infra::models::{RegistrationRow, TournamentRow};
use infra::repos::registrations::{self, CreateRegistration, PaymentStatus, RegistrationRepo};
use infra::repos::tournaments;

use crate::auth::session::{AuthRequired, Session};
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Please sign in to join tournaments")]
    AuthRequired,

    #[error("Tournament not found")]
    TournamentNotFound,

    #[error("Registration not found")]
    RegistrationNotFound,

    #[error("Registration does not belong to this tournament")]
    TournamentMismatch,

    #[error("Access denied: you do not own this registration")]
    NotOwner,

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Already registered for this tournament")]
    AlreadyRegistered,

    #[error("Payment for this registration is already completed")]
    AlreadyCompleted,

    #[error("Payment for this registration has failed")]
    PaymentFailed,

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

impl From<AuthRequired> for RegistrationError {
    fn from(_: AuthRequired) -> Self {
        RegistrationError::AuthRequired
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        let message = err.to_string();
        match err {
            RegistrationError::AuthRequired => AppError::Unauthorized(message),
            RegistrationError::NotOwner => AppError::Forbidden(message),
            RegistrationError::TournamentNotFound | RegistrationError::RegistrationNotFound => {
                AppError::NotFound(message)
            }
            RegistrationError::TournamentMismatch => AppError::BadRequest(message),
            RegistrationError::TournamentFull
            | RegistrationError::AlreadyRegistered
            | RegistrationError::AlreadyCompleted
            | RegistrationError::PaymentFailed => AppError::Conflict(message),
            RegistrationError::Db(e) => AppError::Db(e),
        }
    }
}

/// A registration together with the tournament as it stands after the write.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub registration: RegistrationRow,
    pub tournament: TournamentRow,
}

/// Team details supplied with a registration.
#[derive(Debug, Clone, Default)]
pub struct TeamDetails {
    pub team_name: Option<String>,
    pub team_members: Vec<String>,
}

fn map_insert_error(err: sqlx::Error) -> RegistrationError {
    if registrations::is_duplicate_registration(&err) {
        RegistrationError::AlreadyRegistered
    } else {
        RegistrationError::Db(err)
    }
}

/// Tournaments the caller holds a completed registration for. Anonymous
/// callers have none.
pub async fn registered_tournament_ids(
    pool: &PgPool,
    session: &Session,
) -> Result<HashSet<Uuid>, sqlx::Error> {
    let Some(user_id) = session.user_id() else {
        return Ok(HashSet::new());
    };

    let ids = RegistrationRepo::new(pool.clone())
        .completed_tournament_ids(user_id)
        .await?;
    Ok(ids.into_iter().collect())
}

/// Dashboard "Join": registers the caller with payment marked completed and
/// takes a seat, all in one transaction.
///
/// The tournament row stays locked until commit, so concurrent joins are
/// serialized. A full tournament or an existing live registration aborts the
/// transaction with nothing written.
pub async fn join_tournament(
    pool: &PgPool,
    session: &Session,
    tournament_id: Uuid,
) -> Result<RegistrationOutcome, RegistrationError> {
    let user_id = session.require_user()?.user_id;

    let mut tx = pool.begin().await?;

    let tournament = tournaments::get_tournament_for_update(&mut *tx, tournament_id)
        .await?
        .ok_or(RegistrationError::TournamentNotFound)?;

    if tournament.is_full() {
        return Err(RegistrationError::TournamentFull);
    }

    if registrations::find_live_registration(&mut *tx, tournament_id, user_id)
        .await?
        .is_some()
    {
        return Err(RegistrationError::AlreadyRegistered);
    }

    let registration = registrations::create_registration(
        &mut *tx,
        CreateRegistration {
            tournament_id,
            user_id,
            team_name: None,
            team_members: Vec::new(),
            payment_status: PaymentStatus::Completed,
        },
    )
    .await
    .map_err(map_insert_error)?;

    let tournament = tournaments::increment_players(&mut *tx, tournament_id)
        .await?
        .ok_or(RegistrationError::TournamentFull)?;

    tx.commit().await?;

    tracing::info!(
        %tournament_id,
        %user_id,
        current_players = tournament.current_players,
        "Player joined tournament"
    );

    Ok(RegistrationOutcome {
        registration,
        tournament,
    })
}

/// Assistant registration: records a pending registration awaiting payment.
/// No seat is taken until the payment is confirmed.
pub async fn create_pending_registration(
    pool: &PgPool,
    user_id: Uuid,
    tournament_id: Uuid,
    team: TeamDetails,
) -> Result<RegistrationOutcome, RegistrationError> {
    let mut tx = pool.begin().await?;

    let tournament = tournaments::get_tournament_for_update(&mut *tx, tournament_id)
        .await?
        .ok_or(RegistrationError::TournamentNotFound)?;

    if tournament.is_full() {
        return Err(RegistrationError::TournamentFull);
    }

    if registrations::find_live_registration(&mut *tx, tournament_id, user_id)
        .await?
        .is_some()
    {
        return Err(RegistrationError::AlreadyRegistered);
    }

    let registration = registrations::create_registration(
        &mut *tx,
        CreateRegistration {
            tournament_id,
            user_id,
            team_name: team.team_name,
            team_members: team.team_members,
            payment_status: PaymentStatus::Pending,
        },
    )
    .await
    .map_err(map_insert_error)?;

    tx.commit().await?;

    tracing::info!(%tournament_id, %user_id, registration_id = %registration.id, "Pending registration created");

    Ok(RegistrationOutcome {
        registration,
        tournament,
    })
}

/// Parameters for confirming a pending registration's payment.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentParams {
    pub registration_id: Uuid,
    /// When set, the registration must belong to this tournament.
    pub tournament_id: Option<Uuid>,
    /// When set, the registration must belong to this user.
    pub owner_id: Option<Uuid>,
    pub payment_proof: Option<String>,
}

/// Moves a pending registration to completed and takes a seat, atomically.
///
/// Completed and failed registrations are terminal; confirming them again
/// fails without touching the player count.
pub async fn confirm_payment(
    pool: &PgPool,
    params: ConfirmPaymentParams,
) -> Result<RegistrationOutcome, RegistrationError> {
    let mut tx = pool.begin().await?;

    let registration = registrations::get_registration_for_update(&mut *tx, params.registration_id)
        .await?
        .ok_or(RegistrationError::RegistrationNotFound)?;

    if let Some(owner_id) = params.owner_id {
        if registration.user_id != owner_id {
            return Err(RegistrationError::NotOwner);
        }
    }

    if let Some(tournament_id) = params.tournament_id {
        if registration.tournament_id != tournament_id {
            return Err(RegistrationError::TournamentMismatch);
        }
    }

    match registration.payment_status {
        PaymentStatus::Pending => {}
        PaymentStatus::Completed => return Err(RegistrationError::AlreadyCompleted),
        PaymentStatus::Failed => return Err(RegistrationError::PaymentFailed),
    }

    let tournament = tournaments::get_tournament_for_update(&mut *tx, registration.tournament_id)
        .await?
        .ok_or(RegistrationError::TournamentNotFound)?;

    if tournament.is_full() {
        return Err(RegistrationError::TournamentFull);
    }

    if let Some(proof) = params.payment_proof.as_deref() {
        tracing::info!(registration_id = %registration.id, proof, "Payment proof received");
    }

    let registration = registrations::mark_completed(&mut *tx, registration.id)
        .await?
        .ok_or(RegistrationError::AlreadyCompleted)?;

    let tournament = tournaments::increment_players(&mut *tx, tournament.id)
        .await?
        .ok_or(RegistrationError::TournamentFull)?;

    tx.commit().await?;

    tracing::info!(
        registration_id = %registration.id,
        tournament_id = %tournament.id,
        current_players = tournament.current_players,
        "Payment confirmed"
    );

    Ok(RegistrationOutcome {
        registration,
        tournament,
    })
}
