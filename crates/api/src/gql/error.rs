use async_graphql::ErrorExtensions;

use crate::error::AppError;

/// Error adapter for resolvers that touch the store or parse IDs directly.
///
/// async-graphql converts anything `Display` via `?`, so this type only has
/// to render a client-safe message: database details are logged and
/// replaced, ID parse failures are reported as such.
#[derive(Debug)]
pub enum GqlError {
    Sqlx(sqlx::Error),
    Uuid(uuid::Error),
    Custom(String),
}

impl GqlError {
    pub fn new(msg: impl Into<String>) -> Self {
        GqlError::Custom(msg.into())
    }
}

impl std::fmt::Display for GqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GqlError::Sqlx(e) => {
                tracing::error!("Database error: {e}");
                write!(f, "Internal database error")
            }
            GqlError::Uuid(e) => write!(f, "Invalid ID: {e}"),
            GqlError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GqlError {}

impl From<sqlx::Error> for GqlError {
    fn from(e: sqlx::Error) -> Self {
        GqlError::Sqlx(e)
    }
}

impl From<uuid::Error> for GqlError {
    fn from(e: uuid::Error) -> Self {
        GqlError::Uuid(e)
    }
}

/// `Result<T, E: Display>` → `async_graphql::Result<T>` with a context prefix.
///
/// Usage: `Uuid::parse_str(id).gql_err("Invalid tournament ID")?`
pub trait ResultExt<T> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| async_graphql::Error::new(format!("{context}: {e}")))
    }
}

/// Renders domain errors through [`AppError`]: the client-safe message plus
/// a machine-readable `code` extension.
pub trait DomainResultExt<T> {
    fn into_gql(self) -> std::result::Result<T, async_graphql::Error>;
}

impl<T, E: Into<AppError>> DomainResultExt<T> for std::result::Result<T, E> {
    fn into_gql(self) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| {
            let err: AppError = e.into();
            let code = error_code(&err);
            async_graphql::Error::new(err.public_message())
                .extend_with(|_, ext| ext.set("code", code.to_string()))
        })
    }
}

fn error_code(err: &AppError) -> &'static str {
    match err {
        AppError::Unauthorized(_) => "UNAUTHENTICATED",
        AppError::Forbidden(_) => "FORBIDDEN",
        AppError::BadRequest(_) => "BAD_REQUEST",
        AppError::NotFound(_) => "NOT_FOUND",
        AppError::Conflict(_) => "CONFLICT",
        AppError::Upstream(_) => "UPSTREAM",
        AppError::Db(_) | AppError::Internal(_) | AppError::Anyhow(_) => "INTERNAL",
    }
}
