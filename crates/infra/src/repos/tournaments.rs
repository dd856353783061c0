use crate::{db::Db, models::TournamentRow};
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "tournament_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Upcoming,
    Active,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "active" => Ok(TournamentStatus::Active),
            "completed" => Ok(TournamentStatus::Completed),
            _ => Err(format!("Unknown tournament status: {}", s)),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, serde::Serialize, serde::Deserialize,
)]
#[sqlx(type_name = "tournament_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    Solo,
    Duo,
    #[default]
    Squad,
}

impl TournamentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentType::Solo => "solo",
            TournamentType::Duo => "duo",
            TournamentType::Squad => "squad",
        }
    }
}

impl FromStr for TournamentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(TournamentType::Solo),
            "duo" => Ok(TournamentType::Duo),
            "squad" => Ok(TournamentType::Squad),
            _ => Err(format!("Unknown tournament type: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTournamentData {
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_players: i32,
    pub tournament_type: TournamentType,
    pub map: Option<String>,
    pub rules: Option<String>,
    pub start_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TournamentRepo {
    pool: Db,
}

impl TournamentRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> SqlxResult<Option<TournamentRow>> {
        get_tournament(&self.pool, id).await
    }

    /// Every tournament, newest first. Filtering and sorting for the
    /// dashboard happen in [`crate::listing`].
    pub async fn list_all(&self) -> SqlxResult<Vec<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT id, title, description, entry_fee, prize_pool, max_players, current_players,
                   start_date, status, organizer_id, tournament_type, map, rules, created_at
            FROM tournaments
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_by_start_date(&self) -> SqlxResult<Vec<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT id, title, description, entry_fee, prize_pool, max_players, current_players,
                   start_date, status, organizer_id, tournament_type, map, rules, created_at
            FROM tournaments
            ORDER BY start_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Upcoming tournaments ordered by start date, soonest first.
    pub async fn list_upcoming(&self, limit: i64) -> SqlxResult<Vec<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT id, title, description, entry_fee, prize_pool, max_players, current_players,
                   start_date, status, organizer_id, tournament_type, map, rules, created_at
            FROM tournaments
            WHERE status = 'upcoming'
            ORDER BY start_date ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(&self, data: CreateTournamentData) -> SqlxResult<TournamentRow> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            INSERT INTO tournaments (organizer_id, title, description, entry_fee, prize_pool,
                                     max_players, tournament_type, map, rules, start_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, description, entry_fee, prize_pool, max_players, current_players,
                      start_date, status, organizer_id, tournament_type, map, rules, created_at
            "#,
        )
        .bind(data.organizer_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.entry_fee)
        .bind(data.prize_pool)
        .bind(data.max_players)
        .bind(data.tournament_type)
        .bind(data.map)
        .bind(data.rules)
        .bind(data.start_date)
        .fetch_one(&self.pool)
        .await
    }
}

pub async fn get_tournament<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(
        r#"
        SELECT id, title, description, entry_fee, prize_pool, max_players, current_players,
               start_date, status, organizer_id, tournament_type, map, rules, created_at
        FROM tournaments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Loads the tournament and holds its row lock until the surrounding
/// transaction ends.
pub async fn get_tournament_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(
        r#"
        SELECT id, title, description, entry_fee, prize_pool, max_players, current_players,
               start_date, status, organizer_id, tournament_type, map, rules, created_at
        FROM tournaments
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Takes one seat. Returns `None` when the tournament is already full.
pub async fn increment_players<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(
        r#"
        UPDATE tournaments
        SET current_players = current_players + 1
        WHERE id = $1 AND current_players < max_players
        RETURNING id, title, description, entry_fee, prize_pool, max_players, current_players,
                  start_date, status, organizer_id, tournament_type, map, rules, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
