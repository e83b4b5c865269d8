//! tripbot-server/src/context.rs
//!
//! Builds every client and service once at startup and hands out the shared
//! pieces the HTTP layer needs.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tripbot_ai::{GeminiProvider, InMemoryChatHistory, ProviderConfig};
use tripbot_common::traits::{ChatHistoryRepository, Diagnostics, MessagingTransport};
use tripbot_core::platforms::google::{
    GoogleCustomSearchClient, GooglePlacesClient, GoogleTranslateClient, GoogleVisionClient,
};
use tripbot_core::platforms::line::LineMessagingClient;
use tripbot_core::repositories::PostgresChatHistoryRepository;
use tripbot_core::services::{
    Collaborators, Dispatcher, DispatcherSettings, EventService, PlanService, TracingDiagnostics,
};
use tripbot_core::{AppConfig, Database, Error};

/// Outbound HTTP calls give up after this long.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AppContext {
    pub config: AppConfig,
    /// Present only when chat history lives in Postgres.
    pub db: Option<Database>,
    pub event_service: Arc<EventService>,
    pub plan_service: PlanService,
}

impl AppContext {
    pub async fn new(config: AppConfig, run_migrations: bool) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        // 1) Chat history
        let (db, history): (Option<Database>, Arc<dyn ChatHistoryRepository>) = match &config.database_url {
            Some(url) => {
                let db = Database::new(url).await?;
                if run_migrations {
                    db.migrate().await?;
                } else {
                    info!("Skipping migrations.");
                }
                let repo = PostgresChatHistoryRepository::new(db.pool().clone(), config.chat_history_limit);
                (Some(db), Arc::new(repo))
            }
            None => {
                info!("No DATABASE_URL; chat history is kept in memory.");
                (None, Arc::new(InMemoryChatHistory::new(config.chat_history_limit)))
            }
        };

        // 2) Remote collaborators
        let provider_config = ProviderConfig::new(config.gemini_api_key.clone(), config.gemini_model.clone());
        let transport: Arc<dyn MessagingTransport> =
            Arc::new(LineMessagingClient::new(http.clone(), &config.line_channel_access_token));
        let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);

        let collaborators = Collaborators {
            completion: Arc::new(GeminiProvider::with_client(provider_config, http.clone())),
            history,
            translator: Arc::new(GoogleTranslateClient::new(http.clone(), &config.translate_api_key)),
            places: Arc::new(GooglePlacesClient::new(http.clone(), &config.places_api_key)),
            search: Arc::new(GoogleCustomSearchClient::new(
                http.clone(),
                &config.search_api_key,
                &config.search_engine_id,
            )),
            vision: Arc::new(GoogleVisionClient::new(http, &config.vision_api_key)),
            transport: transport.clone(),
            diagnostics,
        };

        // 3) Services
        let dispatcher = Arc::new(Dispatcher::new(DispatcherSettings::from_config(&config), collaborators));
        let event_service = Arc::new(EventService::new(dispatcher.clone(), transport.clone()));
        let plan_service = PlanService::new(dispatcher, transport);

        info!("Application context ready (model={})", config.gemini_model);
        Ok(Self { config, db, event_service, plan_service })
    }
}
