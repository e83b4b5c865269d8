// File: src/services/plan_service.rs

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use tripbot_common::models::{PlanRequest, DEFAULT_LANG};
use tripbot_common::traits::MessagingTransport;
use crate::Error;
use super::dispatcher::Dispatcher;
use super::event_service::{push_error_notice, DeliveryOutcome};

/// Accepts trip-plan forms and pushes the resulting replies in the background.
#[derive(Clone)]
pub struct PlanService {
    dispatcher: Arc<Dispatcher>,
    transport: Arc<dyn MessagingTransport>,
}

impl PlanService {
    pub fn new(dispatcher: Arc<Dispatcher>, transport: Arc<dyn MessagingTransport>) -> Self {
        Self { dispatcher, transport }
    }

    /// Validates the form and schedules delivery. Returns the request id
    /// without waiting for the replies.
    pub fn submit(&self, request: PlanRequest) -> Result<Uuid, Error> {
        request.validate()?;
        let request_id = Uuid::new_v4();
        info!("plan {} accepted for {} => {}", request_id, request.user_id, request.destination);

        let this = self.clone();
        tokio::spawn(async move {
            this.deliver(request_id, &request).await;
        });
        Ok(request_id)
    }

    /// Builds the replies for `request` and pushes them to its user.
    pub async fn deliver(&self, request_id: Uuid, request: &PlanRequest) -> DeliveryOutcome {
        let messages = self.dispatcher.dispatch_plan(request).await;
        match self.transport.push(&request.user_id, &messages).await {
            Ok(()) => {
                info!("plan {} delivered ({} message(s))", request_id, messages.len());
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!("plan {} push failed: {}", request_id, e);
                push_error_notice(&self.dispatcher, self.transport.as_ref(), &request.user_id, DEFAULT_LANG).await
            }
        }
    }
}
