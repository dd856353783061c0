pub mod auth;
pub mod functions;
pub mod token;
