// File: src/services/mod.rs

pub mod concurrent;
pub mod diagnostics;
pub mod dispatcher;
pub mod event_service;
pub mod formatter;
pub mod hotel_finder;
pub mod intent;
pub mod language;
pub mod place_resolver;
pub mod plan_service;
pub mod region;
pub mod search_enricher;

pub use concurrent::join_successes;
pub use diagnostics::{DiagnosticRecord, RecordingDiagnostics, TracingDiagnostics};
pub use dispatcher::{Collaborators, Dispatcher, DispatcherSettings};
pub use event_service::{DeliveryOutcome, EventService};
pub use formatter::{FormatterSettings, MessageFormatter};
pub use hotel_finder::HotelFinder;
pub use intent::{classify, extract_numbered_list, Intent};
pub use language::LanguageNormalizer;
pub use place_resolver::PlaceResolver;
pub use plan_service::PlanService;
pub use search_enricher::SearchEnricher;
