use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use infra::listing;
use infra::repos::tournaments as repo;

use super::service::CreateTournamentFields;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum TournamentStatus {
    Upcoming,
    Active,
    Completed,
}

impl From<repo::TournamentStatus> for TournamentStatus {
    fn from(status: repo::TournamentStatus) -> Self {
        match status {
            repo::TournamentStatus::Upcoming => TournamentStatus::Upcoming,
            repo::TournamentStatus::Active => TournamentStatus::Active,
            repo::TournamentStatus::Completed => TournamentStatus::Completed,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TournamentType {
    Solo,
    Duo,
    #[default]
    Squad,
}

impl From<repo::TournamentType> for TournamentType {
    fn from(kind: repo::TournamentType) -> Self {
        match kind {
            repo::TournamentType::Solo => TournamentType::Solo,
            repo::TournamentType::Duo => TournamentType::Duo,
            repo::TournamentType::Squad => TournamentType::Squad,
        }
    }
}

impl From<TournamentType> for repo::TournamentType {
    fn from(kind: TournamentType) -> Self {
        match kind {
            TournamentType::Solo => repo::TournamentType::Solo,
            TournamentType::Duo => repo::TournamentType::Duo,
            TournamentType::Squad => repo::TournamentType::Squad,
        }
    }
}

/// Dashboard ordering.
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TournamentSort {
    #[default]
    StartDate,
    PrizePool,
    EntryFee,
}

impl From<TournamentSort> for listing::SortKey {
    fn from(sort: TournamentSort) -> Self {
        match sort {
            TournamentSort::StartDate => listing::SortKey::StartDate,
            TournamentSort::PrizePool => listing::SortKey::PrizePool,
            TournamentSort::EntryFee => listing::SortKey::EntryFee,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Upcoming,
    Active,
    Completed,
}

impl From<StatusFilter> for listing::StatusFilter {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => listing::StatusFilter::All,
            StatusFilter::Upcoming => listing::StatusFilter::Upcoming,
            StatusFilter::Active => listing::StatusFilter::Active,
            StatusFilter::Completed => listing::StatusFilter::Completed,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Tournament {
    pub id: ID,
    pub title: String,
    pub description: Option<String>,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_players: i32,
    pub current_players: i32,
    pub spots_left: i32,
    pub is_full: bool,
    pub start_date: DateTime<Utc>,
    pub status: TournamentStatus,
    pub organizer_id: ID,
    pub tournament_type: TournamentType,
    pub map: Option<String>,
    pub rules: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<infra::models::TournamentRow> for Tournament {
    fn from(row: infra::models::TournamentRow) -> Self {
        Self {
            spots_left: row.spots_left(),
            is_full: row.is_full(),
            id: row.id.into(),
            title: row.title,
            description: row.description,
            entry_fee: row.entry_fee,
            prize_pool: row.prize_pool,
            max_players: row.max_players,
            current_players: row.current_players,
            start_date: row.start_date,
            status: row.status.into(),
            organizer_id: row.organizer_id.into(),
            tournament_type: row.tournament_type.into(),
            map: row.map,
            rules: row.rules,
            created_at: row.created_at,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct CreateTournamentInput {
    pub title: String,
    pub description: Option<String>,
    #[graphql(default)]
    pub entry_fee: i32,
    #[graphql(default)]
    pub prize_pool: i32,
    #[graphql(default = 100)]
    pub max_players: i32,
    pub tournament_type: Option<TournamentType>,
    /// Defaults to Erangel.
    pub map: Option<String>,
    pub rules: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

impl From<CreateTournamentInput> for CreateTournamentFields {
    fn from(input: CreateTournamentInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            entry_fee: input.entry_fee,
            prize_pool: input.prize_pool,
            max_players: input.max_players,
            tournament_type: input.tournament_type.unwrap_or_default().into(),
            map: input.map,
            rules: input.rules,
            start_date: input.start_date,
        }
    }
}

#[derive(SimpleObject, Clone, Debug, Default)]
pub struct DashboardStats {
    pub total: i32,
    pub upcoming: i32,
    pub active: i32,
    pub registered: i32,
}

impl From<listing::DashboardStats> for DashboardStats {
    fn from(stats: listing::DashboardStats) -> Self {
        let count = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        Self {
            total: count(stats.total),
            upcoming: count(stats.upcoming),
            active: count(stats.active),
            registered: count(stats.registered),
        }
    }
}

/// Filtered tournaments split into the dashboard tabs. Stats cover every
/// tournament regardless of the active filters.
#[derive(SimpleObject, Clone, Debug)]
pub struct Dashboard {
    pub all: Vec<Tournament>,
    pub upcoming: Vec<Tournament>,
    pub active: Vec<Tournament>,
    pub my: Vec<Tournament>,
    pub stats: DashboardStats,
    pub registered_tournament_ids: Vec<ID>,
}
