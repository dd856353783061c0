use async_graphql::{Enum, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::gql::domains::registrations::types::Registration;
use crate::gql::domains::tournaments::types::Tournament;
use crate::services::transcript;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum MessageKind {
    Text,
    TournamentList,
    PaymentQr,
    RegistrationSuccess,
}

impl From<transcript::MessageKind> for MessageKind {
    fn from(kind: transcript::MessageKind) -> Self {
        match kind {
            transcript::MessageKind::Text => MessageKind::Text,
            transcript::MessageKind::TournamentList => MessageKind::TournamentList,
            transcript::MessageKind::PaymentQr => MessageKind::PaymentQr,
            transcript::MessageKind::RegistrationSuccess => MessageKind::RegistrationSuccess,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct PaymentPrompt {
    pub tournament: Tournament,
    pub registration: Registration,
    pub qr_code_url: String,
    pub upi_string: String,
}

impl From<transcript::PaymentPrompt> for PaymentPrompt {
    fn from(prompt: transcript::PaymentPrompt) -> Self {
        Self {
            tournament: prompt.tournament.into(),
            registration: prompt.registration.into(),
            qr_code_url: prompt.qr_code_url,
            upi_string: prompt.upi_string,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct ChatMessage {
    pub id: ID,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Set on `TOURNAMENT_LIST` messages.
    pub tournaments: Vec<Tournament>,
    /// Set on `PAYMENT_QR` messages.
    pub payment: Option<PaymentPrompt>,
}

impl From<transcript::ChatMessage> for ChatMessage {
    fn from(msg: transcript::ChatMessage) -> Self {
        Self {
            id: msg.id.into(),
            content: msg.content,
            is_user: msg.is_user,
            timestamp: msg.timestamp,
            kind: msg.kind.into(),
            tournaments: msg.tournaments.into_iter().map(Tournament::from).collect(),
            payment: msg.payment.map(PaymentPrompt::from),
        }
    }
}

/// Result of "I've Paid": the completed registration and the success message
/// appended to the transcript.
#[derive(SimpleObject, Clone, Debug)]
pub struct AssistantPaymentConfirmation {
    pub registration: Registration,
    pub tournament: Tournament,
    pub message: ChatMessage,
}
