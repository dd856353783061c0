pub mod profiles;
pub mod refresh_tokens;
pub mod registrations;
pub mod tournaments;

pub use profiles::{CreateProfileData, ProfileRepo, UpdateProfileData, UserType};
pub use registrations::{CreateRegistration, PaymentStatus, RegistrationRepo};
pub use tournaments::{CreateTournamentData, TournamentRepo, TournamentStatus, TournamentType};
