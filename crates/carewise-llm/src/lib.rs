pub mod config;
pub mod error;
pub mod mistral;
pub mod traits;
pub mod types;

pub use config::MistralConfig;
pub use error::CompletionError;
pub use mistral::MistralClient;
pub use traits::CompletionClient;
pub use types::{ChatMessage, Role};
