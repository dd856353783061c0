pub mod config;
pub mod cookie;
pub mod jwt;
pub mod oauth;
pub mod password;
pub mod permissions;
pub mod refresh;
pub mod session;

pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
pub use oauth::{OAuthProvider, OAuthService};
pub use session::{Identity, Session};
