use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use infra::models::{RegistrationRow, TournamentRow};

use crate::services::assistant::{AssistantReply, ReplyAction};

pub const GREETING: &str = "Hi! I'm your BGMI tournament assistant. I can help you:\n\n\
🏆 **View tournaments** - Check available tournaments\n\
💳 **Register for tournaments** - Complete registration with payment\n\
📱 **Generate payment QR** - Get UPI payment codes instantly\n\
🎯 **Book slots** - Confirm your tournament spot\n\n\
What would you like to do today?";

/// Oldest messages are dropped past this length.
pub const MAX_MESSAGES_PER_USER: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    TournamentList,
    PaymentQr,
    RegistrationSuccess,
}

/// Payment step attached to a `PaymentQr` message.
#[derive(Debug, Clone)]
pub struct PaymentPrompt {
    pub tournament: TournamentRow,
    pub registration: RegistrationRow,
    pub qr_code_url: String,
    pub upi_string: String,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub tournaments: Vec<TournamentRow>,
    pub payment: Option<PaymentPrompt>,
}

impl ChatMessage {
    fn new(content: impl Into<String>, is_user: bool, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_user,
            timestamp: Utc::now(),
            kind,
            tournaments: Vec::new(),
            payment: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, true, MessageKind::Text)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, false, MessageKind::Text)
    }
}

/// Messages to append for an assistant reply: the text, then a tournament
/// list and a payment prompt when the reply carries them.
pub fn reply_messages(reply: &AssistantReply) -> Vec<ChatMessage> {
    let mut out = Vec::new();

    if let Some(text) = reply.response.as_deref().or(reply.message.as_deref()) {
        out.push(ChatMessage::assistant(text));
    }

    if let Some(tournaments) = reply.tournaments.as_ref().filter(|t| !t.is_empty()) {
        let mut msg = ChatMessage::new("Available Tournaments", false, MessageKind::TournamentList);
        msg.tournaments = tournaments.clone();
        out.push(msg);
    }

    if reply.action == Some(ReplyAction::RegistrationCreated) {
        if let (Some(tournament), Some(registration), Some(qr), Some(upi)) = (
            reply.tournament.as_ref(),
            reply.registration.as_ref(),
            reply.payment_qr.as_ref(),
            reply.upi_string.as_ref(),
        ) {
            let mut msg = ChatMessage::new(
                format!("Payment Required for {}", tournament.title),
                false,
                MessageKind::PaymentQr,
            );
            msg.payment = Some(PaymentPrompt {
                tournament: tournament.clone(),
                registration: registration.clone(),
                qr_code_url: qr.clone(),
                upi_string: upi.clone(),
            });
            out.push(msg);
        }
    }

    out
}

/// Sentence pre-filled in the chat input when a player picks a tournament.
pub fn registration_intent(tournament: &TournamentRow) -> String {
    format!(
        "I want to register for \"{}\" tournament. The entry fee is ₹{}.",
        tournament.title, tournament.entry_fee
    )
}

pub fn registration_success(tournament: &TournamentRow) -> ChatMessage {
    ChatMessage::new(
        format!(
            "🎉 Registration successful! You've been registered for \"{}\". Your slot is confirmed!",
            tournament.title
        ),
        false,
        MessageKind::RegistrationSuccess,
    )
}

/// Per-user assistant transcripts, kept in memory for the life of the process.
#[derive(Clone, Default)]
pub struct TranscriptStore {
    inner: Arc<RwLock<HashMap<Uuid, Vec<ChatMessage>>>>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's transcript, starting with the greeting.
    pub fn history(&self, user_id: Uuid) -> Vec<ChatMessage> {
        if let Some(messages) = self.inner.read().get(&user_id) {
            return messages.clone();
        }
        self.inner
            .write()
            .entry(user_id)
            .or_insert_with(|| vec![ChatMessage::assistant(GREETING)])
            .clone()
    }

    pub fn append(&self, user_id: Uuid, messages: impl IntoIterator<Item = ChatMessage>) {
        let mut guard = self.inner.write();
        let transcript = guard
            .entry(user_id)
            .or_insert_with(|| vec![ChatMessage::assistant(GREETING)]);

        transcript.extend(messages);
        if transcript.len() > MAX_MESSAGES_PER_USER {
            let excess = transcript.len() - MAX_MESSAGES_PER_USER;
            transcript.drain(..excess);
        }
    }
}
