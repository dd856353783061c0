use std::convert::Infallible;
use std::str::FromStr;

use async_graphql::Context;
use axum::{extract::FromRequestParts, http::request::Parts};
use infra::repos::UserType;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;

/// The signed-in profile behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub user_type: UserType,
}

/// Who is calling. Built per request from verified JWT claims and handed to
/// services explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("You must be logged in to perform this action")]
pub struct AuthRequired;

impl From<AuthRequired> for AppError {
    fn from(err: AuthRequired) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

impl Session {
    /// Claims with a malformed subject or role yield an anonymous session.
    pub fn from_claims(claims: Option<&Claims>) -> Self {
        let Some(claims) = claims else {
            return Session::Anonymous;
        };

        match (
            Uuid::parse_str(&claims.sub),
            UserType::from_str(&claims.role),
        ) {
            (Ok(user_id), Ok(user_type)) => Session::Authenticated(Identity {
                user_id,
                email: claims.email.clone(),
                user_type,
            }),
            _ => {
                tracing::warn!(sub = %claims.sub, "Ignoring claims with malformed subject or role");
                Session::Anonymous
            }
        }
    }

    pub fn from_ctx(ctx: &Context<'_>) -> Self {
        Self::from_claims(ctx.data_opt::<Claims>())
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|i| i.user_id)
    }

    pub fn require_user(&self) -> Result<&Identity, AuthRequired> {
        self.identity().ok_or(AuthRequired)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::from_claims(parts.extensions.get::<Claims>()))
    }
}
