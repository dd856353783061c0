use sqlx::PgPool;

use crate::auth::{AuthConfig, JwtService, OAuthService};
use crate::services::{
    AssistantService, GeminiClient, GeminiConfig, PaymentConfig, TranscriptStore,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    auth_config: AuthConfig,
    jwt_service: JwtService,
    oauth_service: OAuthService,
    assistant: AssistantService,
    transcripts: TranscriptStore,
}

impl AppState {
    pub fn new(db: PgPool) -> anyhow::Result<Self> {
        let auth_config = AuthConfig::from_env()?;

        let gemini = GeminiConfig::from_env().map(GeminiClient::new).transpose()?;
        match &gemini {
            Some(client) => tracing::info!("Assistant chat enabled (model {})", client.model()),
            None => tracing::warn!("GEMINI_API_KEY not set, assistant chat is disabled"),
        }

        Ok(Self::with_services(
            db,
            auth_config,
            AssistantService::new(gemini, PaymentConfig::from_env()),
        ))
    }

    /// Builds state from explicit parts instead of the environment.
    pub fn with_services(db: PgPool, auth_config: AuthConfig, assistant: AssistantService) -> Self {
        let jwt_service = JwtService::new(&auth_config);
        let oauth_service = OAuthService::new(auth_config.clone());

        Self {
            db,
            auth_config,
            jwt_service,
            oauth_service,
            assistant,
            transcripts: TranscriptStore::new(),
        }
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn oauth_service(&self) -> &OAuthService {
        &self.oauth_service
    }

    pub fn assistant(&self) -> &AssistantService {
        &self.assistant
    }

    pub fn transcripts(&self) -> &TranscriptStore {
        &self.transcripts
    }
}
