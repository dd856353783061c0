use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::auth::Session;
use crate::gql::error::{DomainResultExt, ResultExt};
use crate::state::AppState;
use infra::repos::RegistrationRepo;

use super::service::{self, ConfirmPaymentParams};
use super::types::{ConfirmPaymentInput, ConfirmPaymentPayload, JoinTournamentPayload, Registration};

#[derive(Default)]
pub struct RegistrationQuery;

#[Object]
impl RegistrationQuery {
    /// Every registration of the caller, newest first.
    async fn my_registrations(&self, ctx: &Context<'_>) -> Result<Vec<Registration>> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;

        let rows = RegistrationRepo::new(state.db.clone())
            .list_by_user(user_id)
            .await
            .gql_err("Database operation failed")?;

        Ok(rows.into_iter().map(Registration::from).collect())
    }

    /// IDs of tournaments the caller has paid for. Empty when anonymous.
    async fn registered_tournament_ids(&self, ctx: &Context<'_>) -> Result<Vec<ID>> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);

        let ids = service::registered_tournament_ids(&state.db, &session)
            .await
            .gql_err("Database operation failed")?;

        Ok(ids.into_iter().map(ID::from).collect())
    }
}

#[derive(Default)]
pub struct RegistrationMutation;

#[Object]
impl RegistrationMutation {
    /// Registers the caller with payment marked completed and takes a seat.
    async fn join_tournament(
        &self,
        ctx: &Context<'_>,
        tournament_id: ID,
    ) -> Result<JoinTournamentPayload> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let tournament_id =
            Uuid::parse_str(tournament_id.as_str()).gql_err("Invalid tournament ID")?;

        let outcome = service::join_tournament(&state.db, &session, tournament_id)
            .await
            .into_gql()?;

        Ok(outcome.into())
    }

    /// Completes a pending registration owned by the caller.
    async fn confirm_payment(
        &self,
        ctx: &Context<'_>,
        input: ConfirmPaymentInput,
    ) -> Result<ConfirmPaymentPayload> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;

        let params = ConfirmPaymentParams {
            registration_id: Uuid::parse_str(input.registration_id.as_str())
                .gql_err("Invalid registration ID")?,
            tournament_id: Some(
                Uuid::parse_str(input.tournament_id.as_str()).gql_err("Invalid tournament ID")?,
            ),
            owner_id: Some(user_id),
            payment_proof: input.payment_proof,
        };

        let outcome = service::confirm_payment(&state.db, params).await.into_gql()?;
        Ok(outcome.into())
    }
}
