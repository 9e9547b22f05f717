use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{
    NewQuizAnswer, NewQuizParticipant, NewStudentAnalysis, NewSubjectiveAnswer, QuizAnswer,
    QuizParticipant, StudentAnalysis, SubjectiveAnswer,
};
use crate::database::schema::{
    quiz_answers, quiz_participants, student_analyses, subjective_answers,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use std::sync::Arc;

/// Everything written when a participant submits a live quiz
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub participant_id: i64,
    pub answers: Vec<NewQuizAnswer>,
    pub subjective_answers: Vec<NewSubjectiveAnswer>,
    pub score: i32,
    pub total_questions: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Participant repository trait - quiz participants, their answers and analyses
#[cfg_attr(test, mockall::automock)]
pub trait ParticipantRepository: Send + Sync {
    fn find_participant(&self, participant_id: i64) -> Result<Option<QuizParticipant>, DatabaseError>;

    fn find_participant_by_email(
        &self,
        quiz_id: i64,
        email: &str,
    ) -> Result<Option<QuizParticipant>, DatabaseError>;

    fn insert_participant(
        &self,
        participant: NewQuizParticipant,
    ) -> Result<QuizParticipant, DatabaseError>;

    fn participants_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizParticipant>, DatabaseError>;

    /// Atomically store answers and the final score.
    ///
    /// Returns None (and writes nothing) when the participant had already submitted.
    fn record_submission(
        &self,
        submission: SubmissionRecord,
    ) -> Result<Option<QuizParticipant>, DatabaseError>;

    fn answers_for_participant(&self, participant_id: i64) -> Result<Vec<QuizAnswer>, DatabaseError>;

    /// Objective answers of every participant of a quiz
    fn answers_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizAnswer>, DatabaseError>;

    fn subjective_answers_for_quiz(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<SubjectiveAnswer>, DatabaseError>;

    fn find_analysis(&self, participant_id: i64) -> Result<Option<StudentAnalysis>, DatabaseError>;

    /// Store an analysis, keeping the existing one if another request won the race
    fn insert_analysis(&self, analysis: NewStudentAnalysis) -> Result<StudentAnalysis, DatabaseError>;
}

/// Concrete implementation of ParticipantRepository
pub struct ParticipantRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl ParticipantRepositoryImpl {
    /// Create new participant repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl ParticipantRepository for ParticipantRepositoryImpl {
    fn find_participant(&self, participant_id: i64) -> Result<Option<QuizParticipant>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_participants::table
            .find(participant_id)
            .first::<QuizParticipant>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_participant_by_email(
        &self,
        quiz_id: i64,
        email: &str,
    ) -> Result<Option<QuizParticipant>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_participants::table
            .filter(quiz_participants::quiz_id.eq(quiz_id))
            .filter(quiz_participants::student_email.eq(email))
            .first::<QuizParticipant>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_participant(
        &self,
        participant: NewQuizParticipant,
    ) -> Result<QuizParticipant, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(quiz_participants::table)
            .values(&participant)
            .get_result::<QuizParticipant>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn participants_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizParticipant>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_participants::table
            .filter(quiz_participants::quiz_id.eq(quiz_id))
            .order(quiz_participants::joined_at.asc())
            .load::<QuizParticipant>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn record_submission(
        &self,
        submission: SubmissionRecord,
    ) -> Result<Option<QuizParticipant>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            // Claim the submission first; a concurrent submit loses here
            let claimed = diesel::update(
                quiz_participants::table
                    .filter(quiz_participants::id.eq(submission.participant_id))
                    .filter(quiz_participants::submitted_at.is_null()),
            )
            .set((
                quiz_participants::submitted_at.eq(Some(submission.submitted_at)),
                quiz_participants::score.eq(submission.score),
                quiz_participants::total_questions.eq(submission.total_questions),
            ))
            .get_result::<QuizParticipant>(conn)
            .optional()?;

            let Some(participant) = claimed else {
                return Ok(None);
            };

            if !submission.answers.is_empty() {
                diesel::insert_into(quiz_answers::table)
                    .values(&submission.answers)
                    .on_conflict((quiz_answers::participant_id, quiz_answers::question_id))
                    .do_update()
                    .set((
                        quiz_answers::selected_answer.eq(excluded(quiz_answers::selected_answer)),
                        quiz_answers::is_correct.eq(excluded(quiz_answers::is_correct)),
                    ))
                    .execute(conn)?;
            }

            if !submission.subjective_answers.is_empty() {
                diesel::insert_into(subjective_answers::table)
                    .values(&submission.subjective_answers)
                    .on_conflict((
                        subjective_answers::participant_id,
                        subjective_answers::question_id,
                    ))
                    .do_update()
                    .set(subjective_answers::answer_text.eq(excluded(subjective_answers::answer_text)))
                    .execute(conn)?;
            }

            Ok(Some(participant))
        })
    }

    fn answers_for_participant(&self, participant_id: i64) -> Result<Vec<QuizAnswer>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_answers::table
            .filter(quiz_answers::participant_id.eq(participant_id))
            .order(quiz_answers::question_id.asc())
            .load::<QuizAnswer>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn answers_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizAnswer>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        quiz_answers::table
            .inner_join(quiz_participants::table)
            .filter(quiz_participants::quiz_id.eq(quiz_id))
            .select(QuizAnswer::as_select())
            .load::<QuizAnswer>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn subjective_answers_for_quiz(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<SubjectiveAnswer>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        subjective_answers::table
            .inner_join(quiz_participants::table)
            .filter(quiz_participants::quiz_id.eq(quiz_id))
            .select(SubjectiveAnswer::as_select())
            .order(subjective_answers::answered_at.asc())
            .load::<SubjectiveAnswer>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_analysis(&self, participant_id: i64) -> Result<Option<StudentAnalysis>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        student_analyses::table
            .filter(student_analyses::participant_id.eq(participant_id))
            .first::<StudentAnalysis>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_analysis(&self, analysis: NewStudentAnalysis) -> Result<StudentAnalysis, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(student_analyses::table)
            .values(&analysis)
            .on_conflict(student_analyses::participant_id)
            .do_nothing()
            .execute(&mut conn)?;

        student_analyses::table
            .filter(student_analyses::participant_id.eq(analysis.participant_id))
            .first::<StudentAnalysis>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
