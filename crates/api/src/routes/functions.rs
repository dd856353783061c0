//! Function-style endpoints called by the client UI: the tournament assistant
//! and payment confirmation.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::{RegistrationRow, TournamentRow};

use crate::auth::Session;
use crate::error::AppError;
use crate::gql::domains::registrations::service::{self, ConfirmPaymentParams};
use crate::gql::domains::registrations::types::PAYMENT_CONFIRMED_MESSAGE;
use crate::services::assistant::{AssistantPayload, AssistantReply};
use crate::state::AppState;

pub async fn tournament_assistant(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<AssistantPayload>, JsonRejection>,
) -> Result<Json<AssistantReply>, AppError> {
    let Json(payload) = payload?;
    let reply = state
        .assistant()
        .handle_payload(&state.db, &session, payload)
        .await?;

    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub registration_id: Option<Uuid>,
    pub tournament_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub payment_proof: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: &'static str,
    pub registration: RegistrationRow,
    pub tournament: TournamentRow,
}

#[derive(Debug, Serialize)]
struct ConfirmPaymentFailure {
    success: bool,
    error: String,
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(body)) => confirm(&state, &session, body).await,
        Err(rejection) => Err(rejection.into()),
    };

    match result {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => {
            let status = err.status_code();
            let failure = ConfirmPaymentFailure {
                success: false,
                error: err.public_message(),
            };
            (status, Json(failure)).into_response()
        }
    }
}

async fn confirm(
    state: &AppState,
    session: &Session,
    body: ConfirmPaymentRequest,
) -> Result<ConfirmPaymentResponse, AppError> {
    let (Some(registration_id), Some(tournament_id)) = (body.registration_id, body.tournament_id)
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: registrationId and tournamentId".to_string(),
        ));
    };

    let user_id = session.require_user()?.user_id;
    if body.user_id.is_some_and(|claimed| claimed != user_id) {
        return Err(AppError::Forbidden(
            "userId does not match the signed-in user".to_string(),
        ));
    }

    let outcome = service::confirm_payment(
        &state.db,
        ConfirmPaymentParams {
            registration_id,
            tournament_id: Some(tournament_id),
            owner_id: Some(user_id),
            payment_proof: body.payment_proof,
        },
    )
    .await?;

    Ok(ConfirmPaymentResponse {
        success: true,
        message: PAYMENT_CONFIRMED_MESSAGE,
        registration: outcome.registration,
        tournament: outcome.tournament,
    })
}
