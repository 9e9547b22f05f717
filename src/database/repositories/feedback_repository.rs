use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::DoubtStatus;
use crate::database::models::{Doubt, DoubtChanges, Feedback, NewDoubt, NewFeedback};
use crate::database::schema::{doubts, feedback};
use diesel::prelude::*;
use std::sync::Arc;

/// Feedback repository trait - lesson feedback and student doubts
#[cfg_attr(test, mockall::automock)]
pub trait FeedbackRepository: Send + Sync {
    fn insert_feedback(&self, new_feedback: NewFeedback) -> Result<Feedback, DatabaseError>;

    /// Feedback of a course, newest first
    fn feedback_for_course(&self, course_id: i64) -> Result<Vec<Feedback>, DatabaseError>;

    fn insert_doubt(&self, new_doubt: NewDoubt) -> Result<Doubt, DatabaseError>;

    /// Doubts of a course, newest first, optionally restricted to one status
    fn doubts_for_course(
        &self,
        course_id: i64,
        status: Option<DoubtStatus>,
    ) -> Result<Vec<Doubt>, DatabaseError>;

    fn find_doubt(&self, doubt_id: i64) -> Result<Option<Doubt>, DatabaseError>;

    fn update_doubt(&self, doubt_id: i64, changes: DoubtChanges) -> Result<Doubt, DatabaseError>;
}

/// Concrete implementation of FeedbackRepository
pub struct FeedbackRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl FeedbackRepositoryImpl {
    /// Create new feedback repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl FeedbackRepository for FeedbackRepositoryImpl {
    fn insert_feedback(&self, new_feedback: NewFeedback) -> Result<Feedback, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(feedback::table)
            .values(&new_feedback)
            .get_result::<Feedback>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn feedback_for_course(&self, course_id: i64) -> Result<Vec<Feedback>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        feedback::table
            .filter(feedback::course_id.eq(course_id))
            .order(feedback::created_at.desc())
            .load::<Feedback>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn insert_doubt(&self, new_doubt: NewDoubt) -> Result<Doubt, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(doubts::table)
            .values(&new_doubt)
            .get_result::<Doubt>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn doubts_for_course(
        &self,
        course_id: i64,
        status: Option<DoubtStatus>,
    ) -> Result<Vec<Doubt>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let mut query = doubts::table
            .filter(doubts::course_id.eq(course_id))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(doubts::status.eq(status));
        }

        query
            .order(doubts::created_at.desc())
            .load::<Doubt>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_doubt(&self, doubt_id: i64) -> Result<Option<Doubt>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        doubts::table
            .find(doubt_id)
            .first::<Doubt>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn update_doubt(&self, doubt_id: i64, changes: DoubtChanges) -> Result<Doubt, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(doubts::table.find(doubt_id))
            .set(&changes)
            .get_result::<Doubt>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
