// File: tripbot-common/src/traits/mod.rs
pub mod api;
pub mod diagnostics;
pub mod repository_traits;

pub use api::{
    CompletionService, MessagingTransport, PlacesApi, TranslationService, VisionService,
    WebSearchApi,
};
pub use diagnostics::Diagnostics;
pub use repository_traits::ChatHistoryRepository;
