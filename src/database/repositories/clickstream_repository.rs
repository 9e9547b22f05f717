use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::EventName;
use crate::database::models::{ClickstreamEvent, NewClickstreamEvent};
use crate::database::schema::clickstream_events;
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::sync::Arc;

/// Clickstream repository trait - append-only event log
#[cfg_attr(test, mockall::automock)]
pub trait ClickstreamRepository: Send + Sync {
    fn insert(&self, event: NewClickstreamEvent) -> Result<ClickstreamEvent, DatabaseError>;

    /// Most recent events, newest first
    fn recent(&self, limit: i64) -> Result<Vec<ClickstreamEvent>, DatabaseError>;

    fn count(&self) -> Result<i64, DatabaseError>;

    /// Event totals grouped by event name
    fn counts_by_event_name(&self) -> Result<Vec<(EventName, i64)>, DatabaseError>;
}

/// Concrete implementation of ClickstreamRepository
pub struct ClickstreamRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl ClickstreamRepositoryImpl {
    /// Create new clickstream repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl ClickstreamRepository for ClickstreamRepositoryImpl {
    fn insert(&self, event: NewClickstreamEvent) -> Result<ClickstreamEvent, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(clickstream_events::table)
            .values(&event)
            .get_result::<ClickstreamEvent>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn recent(&self, limit: i64) -> Result<Vec<ClickstreamEvent>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        clickstream_events::table
            .order((clickstream_events::occurred_at.desc(), clickstream_events::id.desc()))
            .limit(limit)
            .load::<ClickstreamEvent>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn count(&self) -> Result<i64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        clickstream_events::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn counts_by_event_name(&self) -> Result<Vec<(EventName, i64)>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        clickstream_events::table
            .group_by(clickstream_events::event_name)
            .select((clickstream_events::event_name, count_star()))
            .order(clickstream_events::event_name.asc())
            .load::<(EventName, i64)>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
