use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::QuizStatus;
use crate::database::models::{
    LiveQuiz, NewLiveQuiz, NewQuizAnalytics, NewQuizQuestion, NewTeacherProfile, QuestionChanges,
    QuizAnalytics, QuizQuestion, TeacherProfile,
};
use crate::database::schema::{live_quizzes, quiz_analytics, quiz_questions, teacher_profiles};
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use std::sync::Arc;

/// Live quiz repository trait - teachers, quizzes, their questions and cached analytics
#[cfg_attr(test, mockall::automock)]
pub trait LiveQuizRepository: Send + Sync {
    // ---- teachers ----

    fn find_teacher_by_email(&self, email: &str) -> Result<Option<TeacherProfile>, DatabaseError>;

    fn insert_teacher(&self, teacher: NewTeacherProfile) -> Result<TeacherProfile, DatabaseError>;

    // ---- quizzes ----

    /// Insert a quiz; fails with a unique violation if the code is taken
    fn insert_quiz(&self, quiz: NewLiveQuiz) -> Result<LiveQuiz, DatabaseError>;

    fn find_quiz(&self, quiz_id: i64) -> Result<Option<LiveQuiz>, DatabaseError>;

    /// Lookup by join code, case-insensitive
    fn find_quiz_by_code(&self, code: &str) -> Result<Option<LiveQuiz>, DatabaseError>;

    /// Quizzes owned by a teacher, newest first
    fn quizzes_for_teacher(&self, teacher_id: i64) -> Result<Vec<LiveQuiz>, DatabaseError>;

    /// All quizzes currently in the active state
    fn active_quizzes(&self) -> Result<Vec<LiveQuiz>, DatabaseError>;

    /// Move a draft quiz to active. Returns None if the quiz was not a draft.
    fn start_quiz(&self, quiz_id: i64, at: DateTime<Utc>) -> Result<Option<LiveQuiz>, DatabaseError>;

    /// Move an active quiz to ended. Returns None if the quiz was not active.
    fn end_quiz(&self, quiz_id: i64, at: DateTime<Utc>) -> Result<Option<LiveQuiz>, DatabaseError>;

    // ---- questions ----

    fn insert_questions(
        &self,
        questions: Vec<NewQuizQuestion>,
    ) -> Result<Vec<QuizQuestion>, DatabaseError>;

    /// Questions of a quiz in display order
    fn questions_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>, DatabaseError>;

    fn find_question(&self, question_id: i64) -> Result<Option<QuizQuestion>, DatabaseError>;

    fn update_question(
        &self,
        question_id: i64,
        changes: QuestionChanges,
    ) -> Result<QuizQuestion, DatabaseError>;

    fn delete_question(&self, question_id: i64) -> Result<bool, DatabaseError>;

    /// Position to use for the next appended question
    fn next_question_position(&self, quiz_id: i64) -> Result<i32, DatabaseError>;

    // ---- analytics ----

    /// Insert or replace the analytics row of a quiz
    fn upsert_analytics(&self, analytics: NewQuizAnalytics) -> Result<QuizAnalytics, DatabaseError>;
}

/// Concrete implementation of LiveQuizRepository
pub struct LiveQuizRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl LiveQuizRepositoryImpl {
    /// Create new live quiz repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl LiveQuizRepository for LiveQuizRepositoryImpl {
    fn find_teacher_by_email(&self, email: &str) -> Result<Option<TeacherProfile>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        teacher_profiles::table
            .filter(teacher_profiles::email.eq(email))
            .first::<TeacherProfile>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_teacher(&self, teacher: NewTeacherProfile) -> Result<TeacherProfile, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(teacher_profiles::table)
            .values(&teacher)
            .get_result::<TeacherProfile>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn insert_quiz(&self, quiz: NewLiveQuiz) -> Result<LiveQuiz, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(live_quizzes::table)
            .values(&quiz)
            .get_result::<LiveQuiz>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_quiz(&self, quiz_id: i64) -> Result<Option<LiveQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        live_quizzes::table
            .find(quiz_id)
            .first::<LiveQuiz>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_quiz_by_code(&self, code: &str) -> Result<Option<LiveQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        // Codes are stored upper-case
        live_quizzes::table
            .filter(live_quizzes::quiz_code.eq(code.trim().to_uppercase()))
            .first::<LiveQuiz>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn quizzes_for_teacher(&self, teacher_id: i64) -> Result<Vec<LiveQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        live_quizzes::table
            .filter(live_quizzes::teacher_id.eq(teacher_id))
            .order(live_quizzes::created_at.desc())
            .load::<LiveQuiz>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn active_quizzes(&self) -> Result<Vec<LiveQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        live_quizzes::table
            .filter(live_quizzes::status.eq(QuizStatus::Active))
            .load::<LiveQuiz>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn start_quiz(&self, quiz_id: i64, at: DateTime<Utc>) -> Result<Option<LiveQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(
            live_quizzes::table
                .filter(live_quizzes::id.eq(quiz_id))
                .filter(live_quizzes::status.eq(QuizStatus::Draft)),
        )
        .set((
            live_quizzes::status.eq(QuizStatus::Active),
            live_quizzes::started_at.eq(Some(at)),
        ))
        .get_result::<LiveQuiz>(&mut conn)
        .optional()
        .map_err(DatabaseError::from)
    }

    fn end_quiz(&self, quiz_id: i64, at: DateTime<Utc>) -> Result<Option<LiveQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(
            live_quizzes::table
                .filter(live_quizzes::id.eq(quiz_id))
                .filter(live_quizzes::status.eq(QuizStatus::Active)),
        )
        .set((
            live_quizzes::status.eq(QuizStatus::Ended),
            live_quizzes::ended_at.eq(Some(at)),
        ))
        .get_result::<LiveQuiz>(&mut conn)
        .optional()
        .map_err(DatabaseError::from)
    }

    fn insert_questions(
        &self,
        questions: Vec<NewQuizQuestion>,
    ) -> Result<Vec<QuizQuestion>, DatabaseError> {
        if questions.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = (self.get_conn)()?;

        diesel::insert_into(quiz_questions::table)
            .values(&questions)
            .get_results::<QuizQuestion>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn questions_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_questions::table
            .filter(quiz_questions::quiz_id.eq(quiz_id))
            .order((quiz_questions::position.asc(), quiz_questions::id.asc()))
            .load::<QuizQuestion>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_question(&self, question_id: i64) -> Result<Option<QuizQuestion>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_questions::table
            .find(question_id)
            .first::<QuizQuestion>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn update_question(
        &self,
        question_id: i64,
        changes: QuestionChanges,
    ) -> Result<QuizQuestion, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(quiz_questions::table.find(question_id))
            .set(&changes)
            .get_result::<QuizQuestion>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn delete_question(&self, question_id: i64) -> Result<bool, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let deleted = diesel::delete(quiz_questions::table.find(question_id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn next_question_position(&self, quiz_id: i64) -> Result<i32, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let current: Option<i32> = quiz_questions::table
            .filter(quiz_questions::quiz_id.eq(quiz_id))
            .select(max(quiz_questions::position))
            .first(&mut conn)?;

        Ok(current.map_or(0, |p| p + 1))
    }

    fn upsert_analytics(&self, analytics: NewQuizAnalytics) -> Result<QuizAnalytics, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(quiz_analytics::table)
            .values(&analytics)
            .on_conflict(quiz_analytics::quiz_id)
            .do_update()
            .set((&analytics, quiz_analytics::generated_at.eq(diesel::dsl::now)))
            .get_result::<QuizAnalytics>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
