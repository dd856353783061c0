pub mod accounts;
pub mod assistant;
pub mod gemini;
pub mod payment_link;
pub mod transcript;

pub use assistant::{AssistantRequest, AssistantService};
pub use gemini::{GeminiClient, GeminiConfig};
pub use payment_link::PaymentConfig;
pub use transcript::TranscriptStore;
