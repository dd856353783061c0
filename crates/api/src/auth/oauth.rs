use oauth2::basic::BasicClient;
use oauth2::{
    AsyncHttpClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, HttpClientError, HttpResponse, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use crate::auth::AuthConfig;
use crate::error::AppError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Bridges oauth2's HTTP abstraction onto our reqwest 0.13 client; oauth2 5
/// only ships an integration for reqwest 0.12.
#[derive(Clone)]
struct OAuth2HttpClient(reqwest::Client);

impl<'c> AsyncHttpClient<'c> for OAuth2HttpClient {
    type Error = HttpClientError<reqwest::Error>;
    type Future =
        Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + Send + Sync + 'c>>;

    fn call(&'c self, request: oauth2::HttpRequest) -> Self::Future {
        Box::pin(async move {
            let mut builder = self
                .0
                .request(request.method().clone(), request.uri().to_string());
            for (name, value) in request.headers() {
                builder = builder.header(name, value);
            }

            let response = builder
                .body(request.into_body())
                .send()
                .await
                .map_err(Box::new)?;

            let mut http_response = axum::http::Response::builder().status(response.status());
            for (name, value) in response.headers() {
                http_response = http_response.header(name, value);
            }
            let body = response.bytes().await.map_err(Box::new)?.to_vec();

            http_response.body(body).map_err(HttpClientError::Http)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            _ => Err(AppError::BadRequest(format!(
                "Unsupported OAuth provider: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Identity returned by a provider after a successful code exchange.
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    pub provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<GoogleUserInfo> for OAuthUserInfo {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider_id: info.id,
            email: info.email,
            display_name: info.name,
            avatar_url: info.picture,
        }
    }
}

#[derive(Clone)]
pub struct OAuthService {
    config: AuthConfig,
    http_client: reqwest::Client,
    oauth2_client: OAuth2HttpClient,
}

impl OAuthService {
    pub fn new(config: AuthConfig) -> Self {
        let http_client = reqwest::Client::new();
        Self {
            config,
            oauth2_client: OAuth2HttpClient(http_client.clone()),
            http_client,
        }
    }

    fn redirect_url(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/auth/{}/callback",
            self.config.redirect_base_url,
            provider.as_str()
        )
    }

    fn google_client(&self) -> Result<GoogleClient, AppError> {
        let invalid = |what: &str, e: oauth2::url::ParseError| {
            AppError::Internal(format!("Invalid {} URL: {}", what, e))
        };

        Ok(
            BasicClient::new(ClientId::new(self.config.google_client_id.clone()))
                .set_client_secret(ClientSecret::new(
                    self.config.google_client_secret.clone(),
                ))
                .set_auth_uri(
                    AuthUrl::new(GOOGLE_AUTH_URL.to_string()).map_err(|e| invalid("auth", e))?,
                )
                .set_token_uri(
                    TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).map_err(|e| invalid("token", e))?,
                )
                .set_redirect_uri(
                    RedirectUrl::new(self.redirect_url(OAuthProvider::Google))
                        .map_err(|e| invalid("redirect", e))?,
                ),
        )
    }

    /// Returns the provider consent URL and the CSRF state to round-trip.
    pub fn get_authorize_url(&self, provider: OAuthProvider) -> Result<(String, String), AppError> {
        match provider {
            OAuthProvider::Google => {
                let (auth_url, csrf_token) = self
                    .google_client()?
                    .authorize_url(CsrfToken::new_random)
                    .add_scope(Scope::new("openid".to_string()))
                    .add_scope(Scope::new("email".to_string()))
                    .add_scope(Scope::new("profile".to_string()))
                    .url();

                Ok((auth_url.to_string(), csrf_token.secret().clone()))
            }
        }
    }

    pub async fn exchange_code_for_user_info(
        &self,
        provider: OAuthProvider,
        code: String,
    ) -> Result<OAuthUserInfo, AppError> {
        match provider {
            OAuthProvider::Google => {
                let token = self
                    .google_client()?
                    .exchange_code(AuthorizationCode::new(code))
                    .request_async(&self.oauth2_client)
                    .await
                    .map_err(|e| AppError::Upstream(format!("Token exchange failed: {}", e)))?;

                let response = self
                    .http_client
                    .get(GOOGLE_USERINFO_URL)
                    .bearer_auth(token.access_token().secret())
                    .send()
                    .await
                    .map_err(|e| AppError::Upstream(format!("Failed to fetch user info: {}", e)))?;

                if !response.status().is_success() {
                    return Err(AppError::Upstream(format!(
                        "Failed to fetch user info: {}",
                        response.status()
                    )));
                }

                let info = response.json::<GoogleUserInfo>().await.map_err(|e| {
                    AppError::Upstream(format!("Failed to parse user info: {}", e))
                })?;

                Ok(info.into())
            }
        }
    }
}
