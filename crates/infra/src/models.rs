use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::repos::profiles::UserType;
use crate::repos::registrations::PaymentStatus;
use crate::repos::tournaments::{TournamentStatus, TournamentType};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub in_game_name: String,
    pub level: i32,
    pub wins: i32,
    pub total_matches: i32,
    pub earnings: i32,
    pub avatar_url: Option<String>,
    pub user_type: UserType,
    pub organizer_code: Option<String>,
    pub linked_organizer_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub oauth_provider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Percentage of matches won, rounded to the nearest integer.
    pub fn win_rate(&self) -> i32 {
        win_rate(self.wins, self.total_matches)
    }

    pub fn is_organizer(&self) -> bool {
        self.user_type == UserType::Organizer
    }
}

pub fn win_rate(wins: i32, total_matches: i32) -> i32 {
    if total_matches <= 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(total_matches) * 100.0).round() as i32
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TournamentRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_players: i32,
    pub current_players: i32,
    pub start_date: DateTime<Utc>,
    pub status: TournamentStatus,
    pub organizer_id: Uuid,
    pub tournament_type: TournamentType,
    pub map: Option<String>,
    pub rules: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TournamentRow {
    pub fn is_full(&self) -> bool {
        self.current_players >= self.max_players
    }

    pub fn spots_left(&self) -> i32 {
        (self.max_players - self.current_players).max(0)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RegistrationRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub team_members: Vec<String>,
    pub payment_status: PaymentStatus,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRow {
    pub id: Uuid,
    pub token_hash: String,
    pub user_id: Uuid,
    pub family_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRow {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
