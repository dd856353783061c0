//! Tournament assistant: list, details, register-with-payment-link and
//! free-form chat backed by Gemini.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use infra::models::{RegistrationRow, TournamentRow};
use infra::repos::TournamentRepo;

use crate::auth::session::Session;
use crate::error::AppError;
use crate::gql::domains::registrations::service::{
    create_pending_registration, RegistrationError, TeamDetails,
};
use crate::services::gemini::{GeminiClient, GeminiError};
use crate::services::payment_link::PaymentConfig;

pub const DEFAULT_CONTEXT: &str = "General tournament assistance";
/// Upcoming tournaments shown to the model on each chat turn.
pub const CHAT_SNAPSHOT_SIZE: i64 = 5;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Please sign in to register for tournaments")]
    AuthRequired,

    #[error("userId does not match the signed-in user")]
    UserMismatch,

    #[error("Tournament not found")]
    TournamentNotFound,

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("AI assistant is not configured")]
    NotConfigured,

    #[error("Failed to get AI response")]
    Upstream(#[from] GeminiError),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        let message = err.to_string();
        match err {
            AssistantError::BadRequest(_) => AppError::BadRequest(message),
            AssistantError::AuthRequired => AppError::Unauthorized(message),
            AssistantError::UserMismatch => AppError::Forbidden(message),
            AssistantError::TournamentNotFound => AppError::NotFound(message),
            AssistantError::Registration(e) => e.into(),
            AssistantError::NotConfigured => AppError::Internal(message),
            AssistantError::Upstream(e) => {
                tracing::error!("Gemini request failed: {}", e);
                AppError::Upstream(message)
            }
            AssistantError::Db(e) => AppError::Db(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AssistantAction {
    #[serde(rename = "get_tournaments", alias = "list")]
    List,
    #[serde(rename = "get_tournament_details", alias = "details")]
    Details,
    #[serde(rename = "register_tournament", alias = "register")]
    Register,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailsPayload {
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_members: Vec<String>,
}

/// JSON body of the assistant function.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub action: Option<AssistantAction>,
    #[serde(default)]
    pub tournament_id: Option<Uuid>,
    #[serde(default)]
    pub team_details: Option<TeamDetailsPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantRequest {
    List,
    Details {
        tournament_id: Uuid,
    },
    Register {
        tournament_id: Uuid,
        team_details: TeamDetailsPayload,
    },
    Chat {
        message: String,
        context: String,
    },
}

impl TryFrom<AssistantPayload> for AssistantRequest {
    type Error = AssistantError;

    fn try_from(payload: AssistantPayload) -> Result<Self, Self::Error> {
        let tournament_id = || {
            payload
                .tournament_id
                .ok_or_else(|| AssistantError::BadRequest("tournamentId is required".to_string()))
        };

        match payload.action {
            Some(AssistantAction::List) => Ok(AssistantRequest::List),
            Some(AssistantAction::Details) => Ok(AssistantRequest::Details {
                tournament_id: tournament_id()?,
            }),
            Some(AssistantAction::Register) => Ok(AssistantRequest::Register {
                tournament_id: tournament_id()?,
                team_details: payload.team_details.clone().unwrap_or_default(),
            }),
            None => {
                let message = payload
                    .message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .ok_or_else(|| AssistantError::BadRequest("message is required".to_string()))?
                    .to_string();
                let context = payload
                    .context
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

                Ok(AssistantRequest::Chat { message, context })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyAction {
    TournamentList,
    TournamentDetails,
    RegistrationCreated,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ReplyAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournaments: Option<Vec<TournamentRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament: Option<TournamentRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationRow>,
    #[serde(rename = "paymentQR", skip_serializing_if = "Option::is_none")]
    pub payment_qr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// System prompt for a chat turn: the assistant's role, the snapshot of
/// upcoming tournaments and the caller-supplied context.
pub fn build_system_prompt(snapshot: &[TournamentRow], context: &str) -> String {
    let tournament_context = if snapshot.is_empty() {
        "No upcoming tournaments available.".to_string()
    } else {
        let mut out = String::from("Available upcoming tournaments:\n");
        for t in snapshot {
            let _ = writeln!(
                out,
                "- {} (ID: {})\n  Entry Fee: ₹{}\n  Prize Pool: ₹{}\n  Max Players: {}\n  Current Players: {}\n  Start Date: {}\n  Type: {}",
                t.title,
                t.id,
                t.entry_fee,
                t.prize_pool,
                t.max_players,
                t.current_players,
                t.start_date.format("%Y-%m-%d"),
                t.tournament_type.as_str(),
            );
        }
        out
    };

    format!(
        "You are a BGMI (PUBG Mobile) tournament assistant for this platform. You help players \
with tournament information (details, rules, schedules), registration (collecting team name \
and player names), payment (UPI QR codes, confirmation) and slot availability.\n\n\
When a player wants to register: show the available tournaments, collect team details, \
confirm the entry fee, then generate the payment QR code. The slot is booked once payment \
is confirmed.\n\n\
Current tournament data:\n{}\n\
Be conversational and helpful, confirm details before any payment and give clear \
step-by-step guidance.\n\n\
Context: {}",
        tournament_context, context
    )
}

#[derive(Clone)]
pub struct AssistantService {
    gemini: Option<GeminiClient>,
    payment: PaymentConfig,
}

impl AssistantService {
    pub fn new(gemini: Option<GeminiClient>, payment: PaymentConfig) -> Self {
        Self { gemini, payment }
    }

    /// Entry point for the raw function body. A `userId` in the body must
    /// agree with the signed-in caller.
    pub async fn handle_payload(
        &self,
        db: &PgPool,
        session: &Session,
        payload: AssistantPayload,
    ) -> Result<AssistantReply, AssistantError> {
        if let (Some(claimed), Some(actual)) = (payload.user_id, session.user_id()) {
            if claimed != actual {
                return Err(AssistantError::UserMismatch);
            }
        }

        let request = AssistantRequest::try_from(payload)?;
        self.handle(db, session, request).await
    }

    pub async fn handle(
        &self,
        db: &PgPool,
        session: &Session,
        request: AssistantRequest,
    ) -> Result<AssistantReply, AssistantError> {
        let repo = TournamentRepo::new(db.clone());

        match request {
            AssistantRequest::List => {
                let tournaments = repo.list_by_start_date().await?;
                Ok(AssistantReply {
                    action: Some(ReplyAction::TournamentList),
                    tournaments: Some(tournaments),
                    ..Default::default()
                })
            }
            AssistantRequest::Details { tournament_id } => {
                let tournament = repo
                    .get(tournament_id)
                    .await?
                    .ok_or(AssistantError::TournamentNotFound)?;
                Ok(AssistantReply {
                    action: Some(ReplyAction::TournamentDetails),
                    tournament: Some(tournament),
                    ..Default::default()
                })
            }
            AssistantRequest::Register {
                tournament_id,
                team_details,
            } => {
                let user_id = session
                    .user_id()
                    .ok_or(AssistantError::AuthRequired)?;
                self.register(db, user_id, tournament_id, team_details)
                    .await
            }
            AssistantRequest::Chat { message, context } => {
                self.chat(&repo, &message, &context).await
            }
        }
    }

    async fn register(
        &self,
        db: &PgPool,
        user_id: Uuid,
        tournament_id: Uuid,
        team_details: TeamDetailsPayload,
    ) -> Result<AssistantReply, AssistantError> {
        let outcome = create_pending_registration(
            db,
            user_id,
            tournament_id,
            TeamDetails {
                team_name: team_details.team_name,
                team_members: team_details.team_members,
            },
        )
        .await?;

        let payment = self.payment.payment_request(&outcome.tournament);
        let message = format!(
            "Registration created! Please complete payment of ₹{} using the QR code.",
            outcome.tournament.entry_fee
        );

        Ok(AssistantReply {
            action: Some(ReplyAction::RegistrationCreated),
            registration: Some(outcome.registration),
            tournament: Some(outcome.tournament),
            payment_qr: Some(payment.qr_code_url),
            upi_string: Some(payment.upi_string),
            message: Some(message),
            ..Default::default()
        })
    }

    async fn chat(
        &self,
        repo: &TournamentRepo,
        message: &str,
        context: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let gemini = self.gemini.as_ref().ok_or(AssistantError::NotConfigured)?;

        let snapshot = repo.list_upcoming(CHAT_SNAPSHOT_SIZE).await?;
        let prompt = build_system_prompt(&snapshot, context);
        let response = gemini.generate(&prompt, message).await?;

        Ok(AssistantReply {
            response: Some(response),
            tournaments: Some(snapshot),
            timestamp: Some(Utc::now()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra::repos::{TournamentStatus, TournamentType};
    use serde_json::json;

    fn payload(value: serde_json::Value) -> AssistantPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn message_without_action_is_chat_with_default_context() {
        let req = AssistantRequest::try_from(payload(json!({
            "message": "  which tournaments are open?  ",
            "userId": Uuid::new_v4(),
        })))
        .unwrap();

        assert_eq!(
            req,
            AssistantRequest::Chat {
                message: "which tournaments are open?".into(),
                context: DEFAULT_CONTEXT.into(),
            }
        );
    }

    #[test]
    fn action_names_and_aliases_are_accepted() {
        let id = Uuid::new_v4();
        for name in ["get_tournaments", "list"] {
            assert_eq!(
                AssistantRequest::try_from(payload(json!({ "action": name }))).unwrap(),
                AssistantRequest::List
            );
        }
        for name in ["get_tournament_details", "details"] {
            assert_eq!(
                AssistantRequest::try_from(payload(json!({ "action": name, "tournamentId": id })))
                    .unwrap(),
                AssistantRequest::Details { tournament_id: id }
            );
        }
    }

    #[test]
    fn register_carries_team_details() {
        let id = Uuid::new_v4();
        let req = AssistantRequest::try_from(payload(json!({
            "action": "register_tournament",
            "tournamentId": id,
            "teamDetails": { "teamName": "Night Owls", "teamMembers": ["a", "b"] },
        })))
        .unwrap();

        assert_eq!(
            req,
            AssistantRequest::Register {
                tournament_id: id,
                team_details: TeamDetailsPayload {
                    team_name: Some("Night Owls".into()),
                    team_members: vec!["a".into(), "b".into()],
                },
            }
        );
    }

    #[test]
    fn missing_ids_and_messages_are_rejected() {
        assert!(matches!(
            AssistantRequest::try_from(payload(json!({ "action": "register" }))),
            Err(AssistantError::BadRequest(_))
        ));
        assert!(matches!(
            AssistantRequest::try_from(payload(json!({ "message": "   " }))),
            Err(AssistantError::BadRequest(_))
        ));
    }

    #[test]
    fn unknown_action_fails_to_parse() {
        let parsed: Result<AssistantPayload, _> =
            serde_json::from_value(json!({ "action": "delete_everything" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn prompt_lists_snapshot_and_context() {
        let t = TournamentRow {
            id: Uuid::new_v4(),
            title: "Erangel Showdown".into(),
            description: None,
            entry_fee: 50,
            prize_pool: 5000,
            max_players: 100,
            current_players: 12,
            start_date: Utc::now(),
            status: TournamentStatus::Upcoming,
            organizer_id: Uuid::new_v4(),
            tournament_type: TournamentType::Squad,
            map: None,
            rules: None,
            created_at: Utc::now(),
        };

        let prompt = build_system_prompt(&[t.clone()], "Registration help");
        assert!(prompt.contains(&format!("- Erangel Showdown (ID: {})", t.id)));
        assert!(prompt.contains("Entry Fee: ₹50"));
        assert!(prompt.contains("Current Players: 12"));
        assert!(prompt.contains("Type: squad"));
        assert!(prompt.ends_with("Context: Registration help"));
    }

    #[test]
    fn prompt_without_tournaments_says_so() {
        let prompt = build_system_prompt(&[], DEFAULT_CONTEXT);
        assert!(prompt.contains("No upcoming tournaments available."));
    }

    #[test]
    fn reply_serializes_camel_case_and_skips_empty_fields() {
        let reply = AssistantReply {
            action: Some(ReplyAction::RegistrationCreated),
            payment_qr: Some("https://qr".into()),
            upi_string: Some("upi://pay?pa=x".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&reply).unwrap();

        assert_eq!(value["action"], "registration_created");
        assert_eq!(value["paymentQR"], "https://qr");
        assert_eq!(value["upiString"], "upi://pay?pa=x");
        assert!(value.get("response").is_none());
    }

    #[test]
    fn upstream_failures_become_generic_bad_gateway() {
        let err = AssistantError::Upstream(GeminiError::EmptyResponse);
        match AppError::from(err) {
            AppError::Upstream(msg) => assert_eq!(msg, "Failed to get AI response"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
