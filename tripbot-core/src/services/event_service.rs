// File: src/services/event_service.rs

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use tripbot_common::models::{InboundEvent, InboundPayload};
use tripbot_common::traits::MessagingTransport;
use super::dispatcher::Dispatcher;

/// Requested duration of the loading animation while a reply is prepared.
pub const LOADING_SECONDS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The prepared replies went out.
    Delivered,
    /// Sending failed, but the generic error notice reached the user.
    FallbackDelivered,
    /// Both attempts failed; nothing reached the user.
    Dropped,
}

/// Handles webhook events one after another and delivers their replies.
pub struct EventService {
    dispatcher: Arc<Dispatcher>,
    transport: Arc<dyn MessagingTransport>,
}

impl EventService {
    pub fn new(dispatcher: Arc<Dispatcher>, transport: Arc<dyn MessagingTransport>) -> Self {
        Self { dispatcher, transport }
    }

    /// Processes `events` sequentially, in delivery order.
    pub async fn handle_batch(&self, events: Vec<InboundEvent>) -> Vec<DeliveryOutcome> {
        info!("handling {} event(s)", events.len());
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.handle_event(event).await);
        }
        outcomes
    }

    /// 1) start the loading animation (best effort)
    /// 2) detect the reply language, so error replies can use it too
    /// 3) dispatch on its own task so a panic still gets the generic reply
    /// 4) reply, falling back to a pushed error notice
    pub async fn handle_event(&self, event: InboundEvent) -> DeliveryOutcome {
        let InboundEvent { user_id, reply_token, payload } = event;

        if matches!(payload, InboundPayload::Text { .. } | InboundPayload::Image { .. }) {
            if let Err(e) = self.transport.start_loading(&user_id, LOADING_SECONDS).await {
                debug!("loading indicator for {} failed: {}", user_id, e);
            }
        }

        let lang = self.dispatcher.reply_language(&payload).await;

        let dispatcher = self.dispatcher.clone();
        let task_user = user_id.clone();
        let task_lang = lang.clone();
        let handle = tokio::spawn(async move { dispatcher.dispatch_in(&task_user, &payload, &task_lang).await });
        let messages = match handle.await {
            Ok(messages) => messages,
            Err(e) => {
                error!("dispatch for {} aborted: {}", user_id, e);
                self.dispatcher.generic_error(&lang).await
            }
        };

        match self.transport.reply(&reply_token, &messages).await {
            Ok(()) => {
                debug!("replied to {} with {} message(s)", user_id, messages.len());
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!("reply to {} failed: {}", user_id, e);
                push_error_notice(&self.dispatcher, self.transport.as_ref(), &user_id, &lang).await
            }
        }
    }
}

/// Second and last attempt to tell the user something went wrong.
pub(crate) async fn push_error_notice(
    dispatcher: &Dispatcher,
    transport: &dyn MessagingTransport,
    user_id: &str,
    lang: &str,
) -> DeliveryOutcome {
    let notice = dispatcher.generic_error(lang).await;
    match transport.push(user_id, &notice).await {
        Ok(()) => DeliveryOutcome::FallbackDelivered,
        Err(e) => {
            warn!("error notice to {} failed too, giving up: {}", user_id, e);
            DeliveryOutcome::Dropped
        }
    }
}
