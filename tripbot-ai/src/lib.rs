pub mod client;
pub mod memory;
pub mod models;
pub mod provider;

// Re-export public APIs
pub use client::{AiClient, DEFAULT_PERSONA};
pub use memory::InMemoryChatHistory;
pub use models::ProviderConfig;
pub use provider::GeminiProvider;
