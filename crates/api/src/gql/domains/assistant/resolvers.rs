use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::AppError;
use crate::gql::domains::registrations::service::{confirm_payment, ConfirmPaymentParams};
use crate::gql::error::{DomainResultExt, GqlError, ResultExt};
use crate::services::assistant::{AssistantRequest, DEFAULT_CONTEXT};
use crate::services::transcript::{self, ChatMessage as TranscriptMessage};
use crate::state::AppState;
use infra::repos::TournamentRepo;

use super::types::{AssistantPaymentConfirmation, ChatMessage};

const AI_FAILURE: &str = "Failed to get AI response";

#[derive(Default)]
pub struct AssistantQuery;

#[Object]
impl AssistantQuery {
    /// The caller's chat history, starting with the greeting.
    async fn assistant_transcript(&self, ctx: &Context<'_>) -> Result<Vec<ChatMessage>> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;

        Ok(state
            .transcripts()
            .history(user_id)
            .into_iter()
            .map(ChatMessage::from)
            .collect())
    }

    /// Chat input pre-filled when a player picks a tournament to register for.
    async fn registration_intent(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<String> {
        let state = ctx.data::<AppState>()?;
        let tournament_id =
            Uuid::parse_str(tournament_id.as_str()).gql_err("Invalid tournament ID")?;

        let tournament = TournamentRepo::new(state.db.clone())
            .get(tournament_id)
            .await
            .gql_err("Database operation failed")?
            .ok_or_else(|| GqlError::new("Tournament not found"))?;

        Ok(transcript::registration_intent(&tournament))
    }
}

#[derive(Default)]
pub struct AssistantMutation;

#[Object]
impl AssistantMutation {
    /// Sends a chat message to the assistant. Returns the messages appended
    /// to the transcript by this call, the caller's own message first.
    async fn send_assistant_message(
        &self,
        ctx: &Context<'_>,
        message: String,
        context: Option<String>,
    ) -> Result<Vec<ChatMessage>> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;

        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(AppError::BadRequest("Message cannot be empty".into()))
                .into_gql();
        }

        let user_message = TranscriptMessage::user(message.clone());
        state.transcripts().append(user_id, [user_message.clone()]);

        let request = AssistantRequest::Chat {
            message,
            context: context
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        };

        let reply = match state.assistant().handle(&state.db, &session, request).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "Assistant chat failed");
                return Err(AppError::Upstream(AI_FAILURE.into())).into_gql();
            }
        };

        let replies = transcript::reply_messages(&reply);
        state.transcripts().append(user_id, replies.clone());

        Ok(std::iter::once(user_message)
            .chain(replies)
            .map(ChatMessage::from)
            .collect())
    }

    /// "I've Paid": completes the caller's pending registration. No payment
    /// verification takes place.
    async fn confirm_assistant_payment(
        &self,
        ctx: &Context<'_>,
        registration_id: ID,
    ) -> Result<AssistantPaymentConfirmation> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let user_id = session.require_user().into_gql()?.user_id;
        let registration_id =
            Uuid::parse_str(registration_id.as_str()).gql_err("Invalid registration ID")?;

        let outcome = confirm_payment(
            &state.db,
            ConfirmPaymentParams {
                registration_id,
                tournament_id: None,
                owner_id: Some(user_id),
                payment_proof: None,
            },
        )
        .await
        .into_gql()?;

        let success = transcript::registration_success(&outcome.tournament);
        state.transcripts().append(user_id, [success.clone()]);

        Ok(AssistantPaymentConfirmation {
            registration: outcome.registration.into(),
            tournament: outcome.tournament.into(),
            message: success.into(),
        })
    }
}
