use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use infra::models::TournamentRow;
use infra::repos::tournaments::{CreateTournamentData, TournamentRepo, TournamentType};

use crate::auth::permissions::{require_organizer, PermissionError};
use crate::auth::session::Session;
use crate::error::AppError;

pub const MIN_PLAYERS: i32 = 2;
pub const MAX_PLAYERS: i32 = 100;
pub const DEFAULT_MAP: &str = "Erangel";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentValidationError {
    #[error("Please select a start date")]
    MissingStartDate,

    #[error("Tournament title is required")]
    MissingTitle,

    #[error("Entry fee cannot be negative")]
    NegativeEntryFee,

    #[error("Prize pool cannot be negative")]
    NegativePrizePool,

    #[error("Max players must be between 2 and 100, got {0}")]
    MaxPlayersOutOfRange(i32),
}

/// Form fields as submitted by an organizer.
#[derive(Debug, Clone)]
pub struct CreateTournamentFields {
    pub title: String,
    pub description: Option<String>,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_players: i32,
    pub tournament_type: TournamentType,
    pub map: Option<String>,
    pub rules: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

impl CreateTournamentFields {
    /// Checks the form and produces insert data. Start dates in the past are
    /// accepted.
    pub fn validate(self, organizer_id: Uuid) -> Result<CreateTournamentData, TournamentValidationError> {
        let start_date = self
            .start_date
            .ok_or(TournamentValidationError::MissingStartDate)?;

        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TournamentValidationError::MissingTitle);
        }
        if self.entry_fee < 0 {
            return Err(TournamentValidationError::NegativeEntryFee);
        }
        if self.prize_pool < 0 {
            return Err(TournamentValidationError::NegativePrizePool);
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(TournamentValidationError::MaxPlayersOutOfRange(
                self.max_players,
            ));
        }

        let map = self
            .map
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MAP.to_string());

        Ok(CreateTournamentData {
            organizer_id,
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            entry_fee: self.entry_fee,
            prize_pool: self.prize_pool,
            max_players: self.max_players,
            tournament_type: self.tournament_type,
            map: Some(map),
            rules: self.rules.filter(|r| !r.trim().is_empty()),
            start_date,
        })
    }
}

#[derive(Debug, Error)]
pub enum CreateTournamentError {
    #[error(transparent)]
    Validation(#[from] TournamentValidationError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

impl From<CreateTournamentError> for AppError {
    fn from(err: CreateTournamentError) -> Self {
        match err {
            CreateTournamentError::Validation(e) => AppError::BadRequest(e.to_string()),
            CreateTournamentError::Permission(e) => e.into(),
            CreateTournamentError::Db(e) => AppError::Db(e),
        }
    }
}

/// Creates a tournament owned by the calling organizer.
///
/// Sign-in is checked first, then the form, then the stored profile's
/// organizer status. Nothing is written unless all three pass.
pub async fn create_tournament(
    pool: &PgPool,
    session: &Session,
    fields: CreateTournamentFields,
) -> Result<TournamentRow, CreateTournamentError> {
    let identity = session.require_user().map_err(PermissionError::from)?;
    let data = fields.validate(identity.user_id)?;

    let organizer = require_organizer(pool, session).await?;

    let tournament = TournamentRepo::new(pool.clone()).create(data).await?;
    tracing::info!(
        tournament_id = %tournament.id,
        organizer_id = %organizer.id,
        "Tournament created"
    );

    Ok(tournament)
}
