use sqlx::{PgExecutor, PgPool, Result};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::ProfileRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Organizer,
    Team,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Organizer => "organizer",
            UserType::Team => "team",
        }
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(UserType::Organizer),
            "team" => Ok(UserType::Team),
            _ => Err(format!("Unknown user type: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateProfileData {
    pub email: String,
    pub username: String,
    pub in_game_name: String,
    pub user_type: UserType,
    pub organizer_code: Option<String>,
    pub linked_organizer_id: Option<Uuid>,
    pub password_hash: Option<String>,
    pub oauth_provider: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileData {
    pub username: Option<String>,
    pub in_game_name: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct ProfileRepo {
    db: PgPool,
}

impl ProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<ProfileRow>> {
        get_profile_by_id(&self.db, id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, username, in_game_name, level, wins, total_matches, earnings,
                   avatar_url, user_type, organizer_code, linked_organizer_id,
                   password_hash, oauth_provider, created_at, updated_at
            FROM profiles
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// Looks up the organizer owning a 4-digit organizer code.
    pub async fn get_organizer_by_code(&self, code: &str) -> Result<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, username, in_game_name, level, wins, total_matches, earnings,
                   avatar_url, user_type, organizer_code, linked_organizer_id,
                   password_hash, oauth_provider, created_at, updated_at
            FROM profiles
            WHERE organizer_code = $1 AND user_type = 'organizer'
            "#,
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    pub async fn organizer_code_exists(&self, code: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE organizer_code = $1)")
                .bind(code)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    pub async fn create(&self, data: CreateProfileData) -> Result<ProfileRow> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (email, username, in_game_name, user_type, organizer_code,
                                  linked_organizer_id, password_hash, oauth_provider, avatar_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, email, username, in_game_name, level, wins, total_matches, earnings,
                      avatar_url, user_type, organizer_code, linked_organizer_id,
                      password_hash, oauth_provider, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.username)
        .bind(data.in_game_name)
        .bind(data.user_type)
        .bind(data.organizer_code)
        .bind(data.linked_organizer_id)
        .bind(data.password_hash)
        .bind(data.oauth_provider)
        .bind(data.avatar_url)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// Applies the provided fields; `None` leaves a column untouched.
    pub async fn update(&self, id: Uuid, data: UpdateProfileData) -> Result<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles SET
                username = COALESCE($2, username),
                in_game_name = COALESCE($3, in_game_name),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, username, in_game_name, level, wins, total_matches, earnings,
                      avatar_url, user_type, organizer_code, linked_organizer_id,
                      password_hash, oauth_provider, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.username)
        .bind(data.in_game_name)
        .bind(data.avatar_url)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}

pub async fn get_profile_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<ProfileRow>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT id, email, username, in_game_name, level, wins, total_matches, earnings,
               avatar_url, user_type, organizer_code, linked_organizer_id,
               password_hash, oauth_provider, created_at, updated_at
        FROM profiles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}
