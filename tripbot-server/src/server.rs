//! tripbot-server/src/server.rs
//!
//! HTTP surface: the LINE webhook, the trip-plan form endpoint and a health check.

use std::sync::Arc;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use tripbot_common::models::{InboundEvent, PlanRequest};
use tripbot_core::platforms::line::{verify_signature, WebhookBody, WebhookEvent};
use tripbot_core::services::{EventService, PlanService};
use tripbot_core::{AppConfig, Error};

use crate::context::AppContext;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub channel_secret: Arc<str>,
    pub events: Arc<EventService>,
    pub plans: PlanService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/plan", post(handle_plan))
        .route("/health", get(health))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn run_server(config: AppConfig, run_migrations: bool) -> Result<(), Error> {
    let ctx = AppContext::new(config, run_migrations).await?;
    let state = AppState {
        channel_secret: Arc::from(ctx.config.line_channel_secret.as_str()),
        events: ctx.event_service.clone(),
        plans: ctx.plan_service.clone(),
    };

    let listener = TcpListener::bind(ctx.config.bind_addr).await?;
    info!("Webhook server listening on http://{}", ctx.config.bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = &ctx.db {
        db.pool().close().await;
    }
    info!("Webhook server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested.");
}

/// Acknowledges right away; the events are answered in a background task.
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if !verify_signature(&state.channel_secret, signature, &body) {
        warn!("Rejected webhook delivery with a bad signature");
        return StatusCode::UNAUTHORIZED;
    }

    let delivery: WebhookBody = match serde_json::from_slice(&body) {
        Ok(d) => d,
        Err(e) => {
            warn!("Malformed webhook body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let kinds: Vec<&str> = delivery.events.iter().map(WebhookEvent::kind).collect();
    let events: Vec<InboundEvent> = delivery
        .events
        .into_iter()
        .filter_map(WebhookEvent::into_inbound)
        .collect();
    debug!("webhook: {} event(s) {:?}, {} answerable", kinds.len(), kinds, events.len());

    if !events.is_empty() {
        let service = state.events.clone();
        tokio::spawn(async move {
            service.handle_batch(events).await;
        });
    }
    StatusCode::OK
}

async fn handle_plan(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let request: PlanRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return rejected(format!("malformed plan request: {}", e)),
    };

    match state.plans.submit(request) {
        Ok(request_id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "accepted", "requestId": request_id })),
        ),
        Err(e) => rejected(e.to_string()),
    }
}

fn rejected(reason: String) -> (StatusCode, Json<Value>) {
    debug!("plan rejected: {}", reason);
    (StatusCode::BAD_REQUEST, Json(json!({ "status": "rejected", "error": reason })))
}

async fn health() -> &'static str {
    "ok"
}
