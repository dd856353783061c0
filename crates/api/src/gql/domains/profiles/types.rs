use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum UserType {
    Organizer,
    Team,
}

impl From<infra::repos::UserType> for UserType {
    fn from(value: infra::repos::UserType) -> Self {
        match value {
            infra::repos::UserType::Organizer => UserType::Organizer,
            infra::repos::UserType::Team => UserType::Team,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Profile {
    pub id: ID,
    pub email: String,
    pub username: String,
    pub in_game_name: String,
    pub level: i32,
    pub wins: i32,
    pub total_matches: i32,
    pub earnings: i32,
    /// Rounded percentage of matches won.
    pub win_rate: i32,
    pub avatar_url: Option<String>,
    pub user_type: UserType,
    /// Shared with teams so they can link to this organizer.
    pub organizer_code: Option<String>,
    pub linked_organizer_id: Option<ID>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::ProfileRow> for Profile {
    fn from(row: infra::models::ProfileRow) -> Self {
        Self {
            win_rate: row.win_rate(),
            id: row.id.into(),
            email: row.email,
            username: row.username,
            in_game_name: row.in_game_name,
            level: row.level,
            wins: row.wins,
            total_matches: row.total_matches,
            earnings: row.earnings,
            avatar_url: row.avatar_url,
            user_type: row.user_type.into(),
            organizer_code: row.organizer_code,
            linked_organizer_id: row.linked_organizer_id.map(Into::into),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub in_game_name: Option<String>,
    pub avatar_url: Option<String>,
}
