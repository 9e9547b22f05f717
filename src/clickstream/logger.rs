use std::sync::Arc;

use super::context::RequestContext;
use crate::database::enums::EventName;
use crate::database::models::NewClickstreamEvent;
use crate::database::repositories::ClickstreamRepository;

/// Context label stored on every event
pub const EVENT_CONTEXT: &str = "Learning Platform";

/// Origin label stored on every event
pub const EVENT_ORIGIN: &str = "web";

/// Writes clickstream events; failures are logged and swallowed
#[derive(Clone)]
pub struct ClickstreamLogger {
    repository: Arc<dyn ClickstreamRepository>,
}

impl ClickstreamLogger {
    pub fn new(repository: Arc<dyn ClickstreamRepository>) -> Self {
        Self { repository }
    }

    /// Record one event. `user_id` overrides the session's user when given.
    pub fn log(
        &self,
        ctx: &RequestContext,
        event_name: EventName,
        component: &str,
        description: impl Into<String>,
        user_id: Option<i64>,
    ) {
        let event = build_event(ctx, event_name, component, description.into(), user_id);

        if let Err(e) = self.repository.insert(event) {
            tracing::warn!(event = %event_name, error = %e, "Failed to record clickstream event");
        }
    }
}

fn build_event(
    ctx: &RequestContext,
    event_name: EventName,
    component: &str,
    description: String,
    user_id: Option<i64>,
) -> NewClickstreamEvent {
    NewClickstreamEvent {
        user_id: user_id.or(ctx.user_id),
        event_context: EVENT_CONTEXT.to_string(),
        component: component.to_string(),
        event_name,
        description,
        origin: EVENT_ORIGIN.to_string(),
        ip_address: ctx.ip_address.clone(),
        user_agent: ctx.user_agent.clone(),
        url: ctx.url.clone(),
        referrer: ctx.referrer.clone(),
        session_id: ctx.session_id.clone(),
    }
}
