use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::enums::EventName;

/// A single tracked user interaction
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::clickstream_events)]
pub struct ClickstreamEvent {
    pub id: i64,
    pub user_id: Option<i64>,
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    pub event_context: String,
    pub component: String,
    pub event_name: EventName,
    pub description: String,
    pub origin: String,
    pub ip_address: String,
    pub user_agent: String,
    pub url: String,
    pub referrer: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::clickstream_events)]
pub struct NewClickstreamEvent {
    pub user_id: Option<i64>,
    pub event_context: String,
    pub component: String,
    pub event_name: EventName,
    pub description: String,
    pub origin: String,
    pub ip_address: String,
    pub user_agent: String,
    pub url: String,
    pub referrer: Option<String>,
    pub session_id: String,
}
