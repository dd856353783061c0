use async_graphql::{Context, Object, Result};

use crate::auth::Session;
use crate::gql::error::{DomainResultExt, GqlError};
use crate::state::AppState;
use infra::repos::{ProfileRepo, UpdateProfileData};

use super::types::{Profile, UpdateProfileInput};

fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(GqlError::new(format!("{field} cannot be empty")).into()),
        other => Ok(other),
    }
}

#[derive(Default)]
pub struct ProfileQuery;

#[Object]
impl ProfileQuery {
    /// The signed-in profile, or null when anonymous.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let Some(user_id) = Session::from_ctx(ctx).user_id() else {
            return Ok(None);
        };
        let state = ctx.data::<AppState>()?;

        let row = ProfileRepo::new(state.db.clone())
            .get_by_id(user_id)
            .await
            .map_err(GqlError::from)?;

        Ok(row.map(Profile::from))
    }

    /// The signed-in profile; fails when anonymous.
    async fn my_profile(&self, ctx: &Context<'_>) -> Result<Profile> {
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;
        let state = ctx.data::<AppState>()?;

        let row = ProfileRepo::new(state.db.clone())
            .get_by_id(user_id)
            .await
            .map_err(GqlError::from)?
            .ok_or_else(|| GqlError::new("Profile not found"))?;

        Ok(row.into())
    }
}

#[derive(Default)]
pub struct ProfileMutation;

#[Object]
impl ProfileMutation {
    /// Updates the caller's own username, in-game name or avatar. Omitted
    /// fields are left unchanged.
    async fn update_profile(&self, ctx: &Context<'_>, input: UpdateProfileInput) -> Result<Profile> {
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;
        let state = ctx.data::<AppState>()?;

        let data = UpdateProfileData {
            username: non_blank(input.username, "Username")?,
            in_game_name: non_blank(input.in_game_name, "In-game name")?,
            avatar_url: input.avatar_url,
        };

        let row = ProfileRepo::new(state.db.clone())
            .update(user_id, data)
            .await
            .map_err(GqlError::from)?
            .ok_or_else(|| GqlError::new("Profile not found"))?;

        tracing::info!(%user_id, "Profile updated");
        Ok(row.into())
    }
}
