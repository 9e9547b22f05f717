use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{
    NewUserProgress, NewVideoAnalytics, UserProgress, VideoAnalytics,
};
use crate::database::schema::{contents, user_progress, video_analytics};
use diesel::prelude::*;
use std::sync::Arc;

/// Progress repository trait - per-user content completion and video playback
#[cfg_attr(test, mockall::automock)]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress row for (user, content), creating an empty one if missing
    fn get_or_create(&self, user_id: i64, content_id: i64) -> Result<UserProgress, DatabaseError>;

    /// Persist every mutable column of a progress row
    fn save(&self, progress: &UserProgress) -> Result<UserProgress, DatabaseError>;

    fn for_user(&self, user_id: i64) -> Result<Vec<UserProgress>, DatabaseError>;

    /// Progress rows of a user restricted to one course
    fn for_user_in_course(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<UserProgress>, DatabaseError>;

    /// Number of completed progress rows across all users
    fn count_completed(&self) -> Result<i64, DatabaseError>;

    /// Fetch or create video analytics; the flag is true when the row was created
    fn video_get_or_create(
        &self,
        user_id: i64,
        content_id: i64,
        current_position: i32,
    ) -> Result<(VideoAnalytics, bool), DatabaseError>;

    fn save_video(&self, analytics: &VideoAnalytics) -> Result<VideoAnalytics, DatabaseError>;
}

/// Concrete implementation of ProgressRepository
pub struct ProgressRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl ProgressRepositoryImpl {
    /// Create new progress repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl ProgressRepository for ProgressRepositoryImpl {
    fn get_or_create(&self, user_id: i64, content_id: i64) -> Result<UserProgress, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        // Insert-if-absent keeps concurrent first visits from colliding on the unique key
        diesel::insert_into(user_progress::table)
            .values(&NewUserProgress { user_id, content_id })
            .on_conflict((user_progress::user_id, user_progress::content_id))
            .do_nothing()
            .execute(&mut conn)?;

        user_progress::table
            .filter(user_progress::user_id.eq(user_id))
            .filter(user_progress::content_id.eq(content_id))
            .first::<UserProgress>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn save(&self, progress: &UserProgress) -> Result<UserProgress, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(user_progress::table.find(progress.id))
            .set(progress)
            .get_result::<UserProgress>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn for_user(&self, user_id: i64) -> Result<Vec<UserProgress>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        user_progress::table
            .filter(user_progress::user_id.eq(user_id))
            .order(user_progress::id.asc())
            .load::<UserProgress>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn for_user_in_course(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<UserProgress>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        user_progress::table
            .inner_join(contents::table)
            .filter(user_progress::user_id.eq(user_id))
            .filter(contents::course_id.eq(course_id))
            .select(UserProgress::as_select())
            .load::<UserProgress>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn count_completed(&self) -> Result<i64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        user_progress::table
            .filter(user_progress::completed.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn video_get_or_create(
        &self,
        user_id: i64,
        content_id: i64,
        current_position: i32,
    ) -> Result<(VideoAnalytics, bool), DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let inserted = diesel::insert_into(video_analytics::table)
            .values(&NewVideoAnalytics {
                user_id,
                content_id,
                current_position,
            })
            .on_conflict((video_analytics::user_id, video_analytics::content_id))
            .do_nothing()
            .execute(&mut conn)?;

        let analytics = video_analytics::table
            .filter(video_analytics::user_id.eq(user_id))
            .filter(video_analytics::content_id.eq(content_id))
            .first::<VideoAnalytics>(&mut conn)?;

        Ok((analytics, inserted > 0))
    }

    fn save_video(&self, analytics: &VideoAnalytics) -> Result<VideoAnalytics, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(video_analytics::table.find(analytics.id))
            .set(analytics)
            .get_result::<VideoAnalytics>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
