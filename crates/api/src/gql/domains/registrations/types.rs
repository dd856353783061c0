use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::gql::domains::tournaments::types::Tournament;

use super::service::RegistrationOutcome;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl From<infra::repos::PaymentStatus> for PaymentStatus {
    fn from(status: infra::repos::PaymentStatus) -> Self {
        match status {
            infra::repos::PaymentStatus::Pending => PaymentStatus::Pending,
            infra::repos::PaymentStatus::Completed => PaymentStatus::Completed,
            infra::repos::PaymentStatus::Failed => PaymentStatus::Failed,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Registration {
    pub id: ID,
    pub tournament_id: ID,
    pub user_id: ID,
    pub team_name: Option<String>,
    pub team_members: Vec<String>,
    pub payment_status: PaymentStatus,
    pub registered_at: DateTime<Utc>,
}

impl From<infra::models::RegistrationRow> for Registration {
    fn from(row: infra::models::RegistrationRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            user_id: row.user_id.into(),
            team_name: row.team_name,
            team_members: row.team_members,
            payment_status: row.payment_status.into(),
            registered_at: row.registered_at,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct JoinTournamentPayload {
    pub registration: Registration,
    /// The tournament with its updated player count.
    pub tournament: Tournament,
}

impl From<RegistrationOutcome> for JoinTournamentPayload {
    fn from(outcome: RegistrationOutcome) -> Self {
        Self {
            registration: outcome.registration.into(),
            tournament: outcome.tournament.into(),
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct ConfirmPaymentInput {
    pub registration_id: ID,
    pub tournament_id: ID,
    pub payment_proof: Option<String>,
}

pub const PAYMENT_CONFIRMED_MESSAGE: &str = "Payment confirmed and registration completed";

#[derive(SimpleObject, Clone, Debug)]
pub struct ConfirmPaymentPayload {
    pub success: bool,
    pub message: String,
    pub registration: Registration,
    pub tournament: Tournament,
}

impl From<RegistrationOutcome> for ConfirmPaymentPayload {
    fn from(outcome: RegistrationOutcome) -> Self {
        Self {
            success: true,
            message: PAYMENT_CONFIRMED_MESSAGE.to_string(),
            registration: outcome.registration.into(),
            tournament: outcome.tournament.into(),
        }
    }
}
