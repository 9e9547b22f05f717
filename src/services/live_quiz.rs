//! Live quizzes: teacher authoring, the join/answer flow and post-quiz insights

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use utoipa::ToSchema;

use super::analytics::compute_quiz_analytics;
use super::codes::insert_with_unique_code;
use super::validation::{
    validate_length, validate_optional_length, EMAIL_MAX, PERSON_NAME_MAX, QUESTION_OPTION_MAX,
    TITLE_MAX, TOPIC_MAX,
};
use crate::database::enums::{
    AnswerChoice, ApprovalStatus, GenerationMethod, QuestionType, QuizStatus,
};
use crate::database::models::{
    LiveQuiz, NewLiveQuiz, NewQuizAnswer, NewQuizParticipant, NewQuizQuestion,
    NewStudentAnalysis, NewSubjectiveAnswer, QuestionChanges, QuizAnalytics, QuizParticipant,
    QuizQuestion, StudentAnalysis,
};
use crate::database::repositories::{
    LiveQuizRepository, ParticipantRepository, SubmissionRecord,
};
use crate::error::AppError;
use crate::llm::{LlmService, MistakeRecord, WrongAnswer};
use crate::websocket::{topics, Broadcaster, WsMessage};
use crate::wordcloud::{word_frequencies, WordCount};

pub const DEFAULT_TIME_LIMIT: i32 = 30;
pub const MAX_GENERATED_QUESTIONS: usize = 10;

/// Entries returned per word cloud
pub const WORD_CLOUD_LIMIT: usize = 50;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Minutes, 30 when omitted
    pub time_limit: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QuestionDraft {
    pub question_text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub option_a: String,
    #[serde(default)]
    pub option_b: String,
    #[serde(default)]
    pub option_c: String,
    #[serde(default)]
    pub option_d: String,
    /// Letter for MCQ, letter or "true"/"false" for true/false
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateQuestionsRequest {
    pub text: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_num_questions() -> usize {
    5
}

fn default_topic() -> String {
    "General".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QuestionEdit {
    pub question_text: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub topic: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct JoinQuizRequest {
    pub quiz_code: String,
    pub student_name: String,
    pub student_email: String,
}

/// Answers keyed by question id: a letter for objective questions, free text otherwise
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    pub answers: BTreeMap<i64, String>,
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizDetail {
    pub quiz: LiveQuiz,
    pub questions: Vec<QuizQuestion>,
    pub participant_count: usize,
}

/// A question as shown to a participant
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantQuestion {
    pub id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub order: i32,
}

impl From<&QuizQuestion> for ParticipantQuestion {
    fn from(q: &QuizQuestion) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            question_type: q.question_type,
            option_a: q.option_a.clone(),
            option_b: q.option_b.clone(),
            option_c: q.option_c.clone(),
            option_d: q.option_d.clone(),
            order: q.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantQuiz {
    pub quiz_code: String,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub questions: Vec<ParticipantQuestion>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JoinOutcome {
    pub quiz_code: String,
    pub quiz_title: String,
    pub participant: QuizParticipant,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResult {
    pub participant_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionReview {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub selected_answer: Option<AnswerChoice>,
    /// Free-text answer for subjective questions
    pub answer_text: Option<String>,
    pub correct_answer: Option<AnswerChoice>,
    pub correct_answer_text: Option<String>,
    /// None for subjective questions
    pub is_correct: Option<bool>,
    pub explanation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantResults {
    pub quiz_title: String,
    pub participant: QuizParticipant,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub review: Vec<QuestionReview>,
    pub analysis: StudentAnalysis,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherResults {
    pub quiz: LiveQuiz,
    pub participants: Vec<QuizParticipant>,
    pub submitted_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizInsights {
    pub quiz_id: i64,
    pub mistake_count: usize,
    pub mistake_analysis: String,
    pub remedial_content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PersonalizedHelp {
    pub participant: QuizParticipant,
    pub help: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WordCloudSource {
    Llm,
    Frequency,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionWordCloud {
    pub question_id: i64,
    pub question_text: String,
    pub answer_count: usize,
    pub source: WordCloudSource,
    pub words: Vec<WordCount>,
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Parse a true/false answer into its option letter (A = True, B = False)
pub fn parse_true_false(value: &str) -> Option<AnswerChoice> {
    match value.trim().to_ascii_lowercase().as_str() {
        "a" | "true" | "t" => Some(AnswerChoice::A),
        "b" | "false" | "f" => Some(AnswerChoice::B),
        _ => None,
    }
}

fn parse_answer(question_type: QuestionType, value: &str) -> Option<AnswerChoice> {
    match question_type {
        QuestionType::TrueFalse => parse_true_false(value),
        QuestionType::Mcq => AnswerChoice::parse_lenient(value),
        QuestionType::Subjective => None,
    }
}

/// Validate a teacher-written question. Manual questions are approved on creation.
pub fn build_manual_question(
    quiz_id: i64,
    position: i32,
    draft: QuestionDraft,
) -> Result<NewQuizQuestion, AppError> {
    let question_text = draft.question_text.trim().to_string();
    if question_text.is_empty() {
        return Err(AppError::bad_request("Question text is required"));
    }

    let (options, correct_answer) = match draft.question_type {
        QuestionType::Mcq => {
            let options = [
                draft.option_a.trim(),
                draft.option_b.trim(),
                draft.option_c.trim(),
                draft.option_d.trim(),
            ];
            if options.iter().any(|o| o.is_empty()) {
                return Err(AppError::bad_request(
                    "Multiple choice questions need four options",
                ));
            }
            let answer = draft
                .correct_answer
                .as_deref()
                .and_then(AnswerChoice::parse_lenient)
                .ok_or_else(|| AppError::bad_request("Correct answer must be A, B, C or D"))?;
            (options.map(str::to_string), Some(answer))
        }
        QuestionType::TrueFalse => {
            let answer = draft
                .correct_answer
                .as_deref()
                .and_then(parse_true_false)
                .ok_or_else(|| AppError::bad_request("Correct answer must be True or False"))?;
            (
                [
                    "True".to_string(),
                    "False".to_string(),
                    String::new(),
                    String::new(),
                ],
                Some(answer),
            )
        }
        QuestionType::Subjective => (Default::default(), None),
    };

    let [option_a, option_b, option_c, option_d] = options;
    for option in [&option_a, &option_b, &option_c, &option_d] {
        validate_length("Option", option, QUESTION_OPTION_MAX)?;
    }
    validate_length("Topic", draft.topic.trim(), TOPIC_MAX)?;

    Ok(NewQuizQuestion {
        quiz_id,
        question_text,
        question_type: draft.question_type,
        option_a,
        option_b,
        option_c,
        option_d,
        correct_answer,
        explanation: draft.explanation.trim().to_string(),
        topic: draft.topic.trim().to_string(),
        generation_method: GenerationMethod::Manual,
        approval_status: ApprovalStatus::Approved,
        source_text: String::new(),
        position,
    })
}

/// Grade a submission against the approved questions of a quiz.
///
/// Objective questions count towards the total whether answered or not.
/// Unparseable letters are treated as unanswered.
pub fn grade_submission(
    participant_id: i64,
    questions: &[QuizQuestion],
    answers: &BTreeMap<i64, String>,
    submitted_at: DateTime<Utc>,
) -> SubmissionRecord {
    let mut record = SubmissionRecord {
        participant_id,
        answers: Vec::new(),
        subjective_answers: Vec::new(),
        score: 0,
        total_questions: 0,
        submitted_at,
    };

    for question in questions.iter().filter(|q| q.is_approved()) {
        let given = answers.get(&question.id).map(|s| s.trim());

        if !question.question_type.is_objective() {
            if let Some(text) = given.filter(|t| !t.is_empty()) {
                record.subjective_answers.push(NewSubjectiveAnswer {
                    participant_id,
                    question_id: question.id,
                    answer_text: text.to_string(),
                });
            }
            continue;
        }

        record.total_questions += 1;

        let Some(selected) = given.and_then(|v| parse_answer(question.question_type, v)) else {
            continue;
        };

        let is_correct = question.correct_answer == Some(selected);
        if is_correct {
            record.score += 1;
        }
        record.answers.push(NewQuizAnswer {
            participant_id,
            question_id: question.id,
            selected_answer: selected,
            is_correct,
        });
    }

    record
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct LiveQuizService {
    quizzes: Arc<dyn LiveQuizRepository>,
    participants: Arc<dyn ParticipantRepository>,
    llm: LlmService,
    broadcaster: Broadcaster,
}

impl LiveQuizService {
    pub fn new(
        quizzes: Arc<dyn LiveQuizRepository>,
        participants: Arc<dyn ParticipantRepository>,
        llm: LlmService,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            quizzes,
            participants,
            llm,
            broadcaster,
        }
    }

    fn owned_quiz(&self, teacher_id: i64, quiz_id: i64) -> Result<LiveQuiz, AppError> {
        let quiz = self
            .quizzes
            .find_quiz(quiz_id)?
            .ok_or_else(|| AppError::not_found(format!("Quiz {} not found", quiz_id)))?;

        if quiz.teacher_id != teacher_id {
            return Err(AppError::Forbidden("You do not own this quiz".to_string()));
        }
        Ok(quiz)
    }

    fn owned_question(&self, teacher_id: i64, question_id: i64) -> Result<QuizQuestion, AppError> {
        let question = self
            .quizzes
            .find_question(question_id)?
            .ok_or_else(|| AppError::not_found(format!("Question {} not found", question_id)))?;

        self.owned_quiz(teacher_id, question.quiz_id)?;
        Ok(question)
    }

    fn quiz_by_code(&self, code: &str) -> Result<LiveQuiz, AppError> {
        self.quizzes
            .find_quiz_by_code(code)?
            .ok_or_else(|| AppError::not_found(format!("No quiz with code {}", code.trim())))
    }

    fn quiz_participant(
        &self,
        quiz: &LiveQuiz,
        participant_id: Option<i64>,
    ) -> Result<QuizParticipant, AppError> {
        participant_id
            .map(|id| self.participants.find_participant(id))
            .transpose()?
            .flatten()
            .filter(|p| p.quiz_id == quiz.id)
            .ok_or_else(|| AppError::Unauthorized("Join the quiz first".to_string()))
    }

    // ---- teacher authoring ----

    pub fn create_quiz(&self, teacher_id: i64, request: CreateQuizRequest) -> Result<LiveQuiz, AppError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::bad_request("Quiz title is required"));
        }
        validate_length("Quiz title", &title, TITLE_MAX)?;

        let time_limit = request.time_limit.unwrap_or(DEFAULT_TIME_LIMIT);
        if time_limit <= 0 {
            return Err(AppError::bad_request("Time limit must be positive"));
        }

        let quiz = insert_with_unique_code(|quiz_code| {
            self.quizzes.insert_quiz(NewLiveQuiz {
                teacher_id,
                title: title.clone(),
                description: request.description.trim().to_string(),
                quiz_code,
                status: QuizStatus::Draft,
                time_limit,
            })
        })?;

        tracing::info!(quiz_id = quiz.id, code = %quiz.quiz_code, "Created live quiz");
        Ok(quiz)
    }

    pub fn list_quizzes(&self, teacher_id: i64) -> Result<Vec<LiveQuiz>, AppError> {
        Ok(self.quizzes.quizzes_for_teacher(teacher_id)?)
    }

    pub fn quiz_detail(&self, teacher_id: i64, quiz_id: i64) -> Result<QuizDetail, AppError> {
        let quiz = self.owned_quiz(teacher_id, quiz_id)?;
        let questions = self.quizzes.questions_for_quiz(quiz_id)?;
        let participant_count = self.participants.participants_for_quiz(quiz_id)?.len();

        Ok(QuizDetail {
            quiz,
            questions,
            participant_count,
        })
    }

    pub fn add_question(
        &self,
        teacher_id: i64,
        quiz_id: i64,
        draft: QuestionDraft,
    ) -> Result<QuizQuestion, AppError> {
        self.owned_quiz(teacher_id, quiz_id)?;
        let position = self.quizzes.next_question_position(quiz_id)?;
        let question = build_manual_question(quiz_id, position, draft)?;

        self.quizzes
            .insert_questions(vec![question])?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Question insert returned no row".to_string()))
    }

    /// Generate questions from source text. They wait for teacher approval.
    pub async fn generate_questions(
        &self,
        teacher_id: i64,
        quiz_id: i64,
        request: GenerateQuestionsRequest,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        self.owned_quiz(teacher_id, quiz_id)?;

        if request.text.trim().is_empty() {
            return Err(AppError::bad_request("Source text is required"));
        }
        if !(1..=MAX_GENERATED_QUESTIONS).contains(&request.num_questions) {
            return Err(AppError::bad_request(format!(
                "num_questions must be between 1 and {}",
                MAX_GENERATED_QUESTIONS
            )));
        }

        let topic = match request.topic.trim() {
            "" => default_topic(),
            t => t.to_string(),
        };

        let generated = self
            .llm
            .generate_questions_from_text(&request.text, request.num_questions, &topic)
            .await;

        let start = self.quizzes.next_question_position(quiz_id)?;
        let rows = generated
            .into_iter()
            .enumerate()
            .map(|(i, q)| NewQuizQuestion {
                quiz_id,
                question_text: q.question_text,
                question_type: QuestionType::Mcq,
                option_a: q.option_a,
                option_b: q.option_b,
                option_c: q.option_c,
                option_d: q.option_d,
                correct_answer: Some(q.correct_answer),
                explanation: q.explanation,
                topic: q.topic,
                generation_method: GenerationMethod::LlmText,
                approval_status: ApprovalStatus::Pending,
                source_text: request.text.clone(),
                position: start + i as i32,
            })
            .collect();

        let questions = self.quizzes.insert_questions(rows)?;
        tracing::info!(quiz_id, count = questions.len(), "Stored generated questions for review");
        Ok(questions)
    }

    pub fn edit_question(
        &self,
        teacher_id: i64,
        question_id: i64,
        edit: QuestionEdit,
    ) -> Result<QuizQuestion, AppError> {
        let question = self.owned_question(teacher_id, question_id)?;

        let correct_answer = match edit.correct_answer.as_deref() {
            None => None,
            Some(value) => Some(parse_answer(question.question_type, value).ok_or_else(|| {
                AppError::bad_request(format!("Invalid correct answer: {}", value))
            })?),
        };

        if edit
            .question_text
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(AppError::bad_request("Question text cannot be empty"));
        }
        for option in [&edit.option_a, &edit.option_b, &edit.option_c, &edit.option_d] {
            validate_optional_length("Option", option.as_deref(), QUESTION_OPTION_MAX)?;
        }
        validate_optional_length("Topic", edit.topic.as_deref(), TOPIC_MAX)?;

        let changes = QuestionChanges {
            question_text: edit.question_text.map(|t| t.trim().to_string()),
            option_a: edit.option_a,
            option_b: edit.option_b,
            option_c: edit.option_c,
            option_d: edit.option_d,
            correct_answer,
            explanation: edit.explanation,
            topic: edit.topic,
            approval_status: None,
            position: edit.order,
        };

        if changes.is_empty() {
            return Ok(question);
        }

        Ok(self.quizzes.update_question(question_id, changes)?)
    }

    pub fn set_approval(
        &self,
        teacher_id: i64,
        question_id: i64,
        status: ApprovalStatus,
    ) -> Result<QuizQuestion, AppError> {
        self.owned_question(teacher_id, question_id)?;

        Ok(self.quizzes.update_question(
            question_id,
            QuestionChanges {
                approval_status: Some(status),
                ..Default::default()
            },
        )?)
    }

    pub fn delete_question(&self, teacher_id: i64, question_id: i64) -> Result<(), AppError> {
        self.owned_question(teacher_id, question_id)?;

        if self.quizzes.delete_question(question_id)? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Question {} not found", question_id)))
        }
    }

    // ---- lifecycle ----

    pub fn start_quiz(&self, teacher_id: i64, quiz_id: i64) -> Result<LiveQuiz, AppError> {
        let quiz = self.owned_quiz(teacher_id, quiz_id)?;
        if quiz.status != QuizStatus::Draft {
            return Err(AppError::Conflict(format!("Quiz is already {}", quiz.status)));
        }

        let approved = self
            .quizzes
            .questions_for_quiz(quiz_id)?
            .iter()
            .filter(|q| q.is_approved())
            .count();
        if approved == 0 {
            return Err(AppError::bad_request(
                "Approve at least one question before starting the quiz",
            ));
        }

        let started = self
            .quizzes
            .start_quiz(quiz_id, Utc::now())?
            .ok_or_else(|| AppError::Conflict("Quiz is no longer a draft".to_string()))?;

        tracing::info!(quiz_id, code = %started.quiz_code, "Live quiz started");

        if let Some(started_at) = started.started_at {
            self.broadcaster.broadcast(
                &topics::quiz(&started.quiz_code),
                WsMessage::QuizStarted {
                    quiz_code: started.quiz_code.clone(),
                    started_at,
                    time_limit: started.time_limit,
                },
            );
        }

        Ok(started)
    }

    pub fn end_quiz(&self, teacher_id: i64, quiz_id: i64) -> Result<LiveQuiz, AppError> {
        let quiz = self.owned_quiz(teacher_id, quiz_id)?;
        if quiz.status != QuizStatus::Active {
            return Err(AppError::Conflict(format!("Quiz is {}", quiz.status)));
        }

        self.close_quiz(&quiz, Utc::now())?
            .ok_or_else(|| AppError::Conflict("Quiz already ended".to_string()))
    }

    /// End an active quiz, refresh its analytics and notify subscribers.
    /// Returns None when another caller ended it first.
    fn close_quiz(&self, quiz: &LiveQuiz, now: DateTime<Utc>) -> Result<Option<LiveQuiz>, AppError> {
        let Some(ended) = self.quizzes.end_quiz(quiz.id, now)? else {
            return Ok(None);
        };

        if let Err(e) = self.refresh_analytics(ended.id) {
            tracing::warn!(quiz_id = ended.id, error = %e, "Failed to refresh quiz analytics");
        }

        self.broadcaster.broadcast(
            &topics::quiz(&ended.quiz_code),
            WsMessage::QuizEnded {
                quiz_code: ended.quiz_code.clone(),
                ended_at: ended.ended_at.unwrap_or(now),
            },
        );

        tracing::info!(quiz_id = ended.id, code = %ended.quiz_code, "Live quiz ended");
        Ok(Some(ended))
    }

    /// End every active quiz whose time limit has elapsed
    pub fn end_expired_quizzes(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let mut ended = 0;
        for quiz in self.quizzes.active_quizzes()? {
            if quiz.is_expired(now) && self.close_quiz(&quiz, now)?.is_some() {
                ended += 1;
            }
        }
        Ok(ended)
    }

    // ---- participants ----

    pub fn join(&self, request: JoinQuizRequest) -> Result<JoinOutcome, AppError> {
        let name = request.student_name.trim();
        let email = request.student_email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() {
            return Err(AppError::bad_request("Name and email are required"));
        }
        validate_length("Name", name, PERSON_NAME_MAX)?;
        validate_length("Email", &email, EMAIL_MAX)?;

        let quiz = self.quiz_by_code(&request.quiz_code)?;
        if quiz.status != QuizStatus::Active {
            return Err(AppError::bad_request("This quiz is not active"));
        }
        if quiz.is_expired(Utc::now()) {
            return Err(AppError::bad_request("Time limit exceeded"));
        }

        let participant = match self.participants.find_participant_by_email(quiz.id, &email)? {
            Some(existing) if existing.has_submitted() => {
                return Err(AppError::Conflict(
                    "You have already submitted this quiz".to_string(),
                ));
            }
            Some(existing) => existing,
            None => self.participants.insert_participant(NewQuizParticipant {
                quiz_id: quiz.id,
                student_name: name.to_string(),
                student_email: email,
            })?,
        };

        let participant_count = self.participants.participants_for_quiz(quiz.id)?.len();
        self.broadcaster.broadcast(
            &topics::quiz(&quiz.quiz_code),
            WsMessage::ParticipantJoined {
                quiz_code: quiz.quiz_code.clone(),
                participant_id: participant.id,
                student_name: participant.student_name.clone(),
                participant_count,
            },
        );

        Ok(JoinOutcome {
            quiz_code: quiz.quiz_code,
            quiz_title: quiz.title,
            participant,
        })
    }

    /// Approved questions in order, without answers or explanations
    pub fn questions_for_participant(
        &self,
        code: &str,
        participant_id: Option<i64>,
    ) -> Result<ParticipantQuiz, AppError> {
        let quiz = self.quiz_by_code(code)?;
        self.quiz_participant(&quiz, participant_id)?;

        if quiz.status != QuizStatus::Active {
            return Err(AppError::bad_request("This quiz is not active"));
        }

        let questions = self
            .quizzes
            .questions_for_quiz(quiz.id)?
            .iter()
            .filter(|q| q.is_approved())
            .map(ParticipantQuestion::from)
            .collect();

        Ok(ParticipantQuiz {
            deadline: quiz.deadline(),
            quiz_code: quiz.quiz_code,
            title: quiz.title,
            description: quiz.description,
            time_limit: quiz.time_limit,
            started_at: quiz.started_at,
            questions,
        })
    }

    pub fn submit(
        &self,
        code: &str,
        participant_id: Option<i64>,
        request: SubmitAnswersRequest,
    ) -> Result<SubmissionResult, AppError> {
        let quiz = self.quiz_by_code(code)?;
        let participant = self.quiz_participant(&quiz, participant_id)?;

        if quiz.status != QuizStatus::Active {
            return Err(AppError::bad_request("This quiz is not active"));
        }
        let now = Utc::now();
        if quiz.is_expired(now) {
            return Err(AppError::bad_request("Time limit exceeded"));
        }
        if participant.has_submitted() {
            return Err(AppError::Conflict("Quiz already submitted".to_string()));
        }

        let questions = self.quizzes.questions_for_quiz(quiz.id)?;
        let record = grade_submission(participant.id, &questions, &request.answers, now);

        let submitted = self
            .participants
            .record_submission(record)?
            .ok_or_else(|| AppError::Conflict("Quiz already submitted".to_string()))?;

        let submitted_count = self
            .participants
            .participants_for_quiz(quiz.id)?
            .iter()
            .filter(|p| p.has_submitted())
            .count();

        tracing::info!(
            quiz_id = quiz.id,
            participant_id = submitted.id,
            score = submitted.score,
            total = submitted.total_questions,
            "Quiz submission recorded"
        );

        self.broadcaster.broadcast(
            &topics::quiz(&quiz.quiz_code),
            WsMessage::SubmissionReceived {
                quiz_code: quiz.quiz_code.clone(),
                participant_id: submitted.id,
                student_name: submitted.student_name.clone(),
                score: submitted.score,
                total_questions: submitted.total_questions,
                submitted_count,
            },
        );

        Ok(SubmissionResult {
            participant_id: submitted.id,
            score: submitted.score,
            total_questions: submitted.total_questions,
            percentage: submitted.percentage(),
        })
    }

    /// Score, per-question review and the (cached) performance analysis
    pub async fn participant_results(
        &self,
        code: &str,
        participant_id: Option<i64>,
    ) -> Result<ParticipantResults, AppError> {
        let quiz = self.quiz_by_code(code)?;
        let participant = self.quiz_participant(&quiz, participant_id)?;
        if !participant.has_submitted() {
            return Err(AppError::bad_request("Submit the quiz to see results"));
        }

        let questions: Vec<QuizQuestion> = self
            .quizzes
            .questions_for_quiz(quiz.id)?
            .into_iter()
            .filter(|q| q.is_approved())
            .collect();
        let answers: HashMap<i64, AnswerChoice> = self
            .participants
            .answers_for_participant(participant.id)?
            .into_iter()
            .map(|a| (a.question_id, a.selected_answer))
            .collect();
        let written: HashMap<i64, String> = self
            .participants
            .subjective_answers_for_quiz(quiz.id)?
            .into_iter()
            .filter(|a| a.participant_id == participant.id)
            .map(|a| (a.question_id, a.answer_text))
            .collect();

        let review = questions
            .iter()
            .map(|q| {
                let selected = answers.get(&q.id).copied();
                QuestionReview {
                    question_id: q.id,
                    question_text: q.question_text.clone(),
                    question_type: q.question_type,
                    selected_answer: selected,
                    answer_text: written.get(&q.id).cloned(),
                    correct_answer: q.correct_answer,
                    correct_answer_text: q.correct_answer.map(|c| q.option_text(c).to_string()),
                    is_correct: q
                        .question_type
                        .is_objective()
                        .then(|| selected.is_some() && selected == q.correct_answer),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        let analysis = match self.participants.find_analysis(participant.id)? {
            Some(cached) => cached,
            None => self.generate_analysis(&quiz, &participant, &questions, &answers).await?,
        };

        Ok(ParticipantResults {
            quiz_title: quiz.title,
            score: participant.score,
            total_questions: participant.total_questions,
            percentage: participant.percentage(),
            participant,
            review,
            analysis,
        })
    }

    async fn generate_analysis(
        &self,
        quiz: &LiveQuiz,
        participant: &QuizParticipant,
        questions: &[QuizQuestion],
        answers: &HashMap<i64, AnswerChoice>,
    ) -> Result<StudentAnalysis, AppError> {
        let mut wrong = Vec::new();
        let mut correct_count = 0;

        for question in questions.iter().filter(|q| q.question_type.is_objective()) {
            let (Some(&selected), Some(correct)) = (answers.get(&question.id), question.correct_answer)
            else {
                continue;
            };
            if selected == correct {
                correct_count += 1;
            } else {
                wrong.push(WrongAnswer {
                    question: question.question_text.clone(),
                    selected,
                    correct,
                    topic: question.topic_or_default().to_string(),
                });
            }
        }

        let performance = self
            .llm
            .analyze_student_performance(
                &participant.student_name,
                participant.score,
                participant.total_questions,
                &wrong,
                correct_count,
            )
            .await;

        let practice_topic = performance
            .weak_topics
            .first()
            .cloned()
            .unwrap_or_else(|| quiz.title.clone());
        let practice = self
            .llm
            .generate_bloom_taxonomy_questions(&practice_topic, &performance.reading_material)
            .await;

        let stored = self.participants.insert_analysis(NewStudentAnalysis {
            participant_id: participant.id,
            weak_topics: serde_json::to_value(&performance.weak_topics).unwrap_or_default(),
            strong_topics: serde_json::to_value(&performance.strong_topics).unwrap_or_default(),
            recommendations: performance.recommendations,
            reading_material: performance.reading_material,
            practice_questions: serde_json::to_value(&practice).unwrap_or_default(),
        })?;

        Ok(stored)
    }

    // ---- teacher reporting ----

    pub fn teacher_results(&self, teacher_id: i64, quiz_id: i64) -> Result<TeacherResults, AppError> {
        let quiz = self.owned_quiz(teacher_id, quiz_id)?;
        let participants = self.participants.participants_for_quiz(quiz_id)?;
        let submitted_count = participants.iter().filter(|p| p.has_submitted()).count();

        Ok(TeacherResults {
            quiz,
            participants,
            submitted_count,
        })
    }

    /// Recompute and store the analytics row of a quiz
    pub fn refresh_analytics(&self, quiz_id: i64) -> Result<QuizAnalytics, AppError> {
        let participants = self.participants.participants_for_quiz(quiz_id)?;
        let questions = self.quizzes.questions_for_quiz(quiz_id)?;
        let answers = self.participants.answers_for_quiz(quiz_id)?;

        let report = compute_quiz_analytics(&participants, &questions, &answers);
        Ok(self.quizzes.upsert_analytics(report.into_record(quiz_id))?)
    }

    pub fn quiz_analytics(&self, teacher_id: i64, quiz_id: i64) -> Result<QuizAnalytics, AppError> {
        self.owned_quiz(teacher_id, quiz_id)?;
        self.refresh_analytics(quiz_id)
    }

    fn mistakes(
        &self,
        quiz_id: i64,
        only_participant: Option<i64>,
    ) -> Result<Vec<MistakeRecord>, AppError> {
        let questions: HashMap<i64, QuizQuestion> = self
            .quizzes
            .questions_for_quiz(quiz_id)?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();
        let names: HashMap<i64, String> = self
            .participants
            .participants_for_quiz(quiz_id)?
            .into_iter()
            .map(|p| (p.id, p.student_name))
            .collect();

        let mistakes = self
            .participants
            .answers_for_quiz(quiz_id)?
            .into_iter()
            .filter(|a| !a.is_correct)
            .filter(|a| only_participant.map_or(true, |id| a.participant_id == id))
            .filter_map(|a| {
                let question = questions.get(&a.question_id)?;
                Some(MistakeRecord {
                    student: names.get(&a.participant_id).cloned().unwrap_or_default(),
                    question: question.question_text.clone(),
                    selected_text: question.option_text(a.selected_answer).to_string(),
                    correct_text: question
                        .correct_answer
                        .map(|c| question.option_text(c).to_string())
                        .unwrap_or_default(),
                })
            })
            .collect();

        Ok(mistakes)
    }

    /// Class-wide mistake analysis followed by remedial material built on it
    pub async fn insights(&self, teacher_id: i64, quiz_id: i64) -> Result<QuizInsights, AppError> {
        let quiz = self.owned_quiz(teacher_id, quiz_id)?;
        let mistakes = self.mistakes(quiz_id, None)?;

        let mistake_analysis = self.llm.generate_mistake_analysis(&quiz.title, &mistakes).await;
        let remedial_content = self
            .llm
            .generate_remedial_content(&quiz.title, &mistake_analysis)
            .await;

        Ok(QuizInsights {
            quiz_id,
            mistake_count: mistakes.len(),
            mistake_analysis,
            remedial_content,
        })
    }

    pub async fn personalized_help(
        &self,
        teacher_id: i64,
        participant_id: i64,
    ) -> Result<PersonalizedHelp, AppError> {
        let participant = self
            .participants
            .find_participant(participant_id)?
            .ok_or_else(|| AppError::not_found(format!("Participant {} not found", participant_id)))?;
        self.owned_quiz(teacher_id, participant.quiz_id)?;

        let mistakes = self.mistakes(participant.quiz_id, Some(participant.id))?;
        let help = self
            .llm
            .generate_personalized_help(
                &participant.student_name,
                participant.score,
                participant.total_questions,
                &mistakes,
            )
            .await;

        Ok(PersonalizedHelp { participant, help })
    }

    /// Key terms per subjective question
    pub async fn word_cloud(
        &self,
        teacher_id: i64,
        quiz_id: i64,
    ) -> Result<Vec<QuestionWordCloud>, AppError> {
        self.owned_quiz(teacher_id, quiz_id)?;

        let mut by_question: HashMap<i64, Vec<String>> = HashMap::new();
        for answer in self.participants.subjective_answers_for_quiz(quiz_id)? {
            by_question
                .entry(answer.question_id)
                .or_default()
                .push(answer.answer_text);
        }

        let mut clouds = Vec::new();
        for question in self
            .quizzes
            .questions_for_quiz(quiz_id)?
            .into_iter()
            .filter(|q| q.is_approved() && !q.question_type.is_objective())
        {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            let keywords = self
                .llm
                .extract_keywords(question.topic_or_default(), &answers)
                .await;

            let mentioned = keyword_counts(&keywords, &answers);

            let (source, words) = if mentioned.is_empty() {
                (
                    WordCloudSource::Frequency,
                    word_frequencies(answers.iter().map(String::as_str), WORD_CLOUD_LIMIT),
                )
            } else {
                (WordCloudSource::Llm, mentioned)
            };

            clouds.push(QuestionWordCloud {
                question_id: question.id,
                question_text: question.question_text,
                answer_count: answers.len(),
                source,
                words,
            });
        }

        Ok(clouds)
    }
}

/// How many answers mention each keyword, most mentioned first.
/// Keywords no answer mentions are dropped.
fn keyword_counts(keywords: &[String], answers: &[String]) -> Vec<WordCount> {
    let lowered: Vec<String> = answers.iter().map(|a| a.to_lowercase()).collect();

    let mut counts: Vec<WordCount> = keywords
        .iter()
        .map(|keyword| {
            let needle = keyword.to_lowercase();
            WordCount {
                count: lowered.iter().filter(|a| a.contains(&needle)).count(),
                word: keyword.clone(),
            }
        })
        .filter(|c| c.count > 0)
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    counts.truncate(WORD_CLOUD_LIMIT);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::database::connection::unique_violation;
    use crate::database::models::SubjectiveAnswer;
    use crate::database::repositories::{MockLiveQuizRepository, MockParticipantRepository};
    use crate::llm::FallbackChain;
    use chrono::Duration;

    fn offline_llm() -> LlmService {
        LlmService::new(FallbackChain::new(Vec::new()), &LlmConfig::default())
    }

    fn service(
        quizzes: MockLiveQuizRepository,
        participants: MockParticipantRepository,
    ) -> LiveQuizService {
        LiveQuizService::new(
            Arc::new(quizzes),
            Arc::new(participants),
            offline_llm(),
            Broadcaster::new(),
        )
    }

    fn quiz(status: QuizStatus) -> LiveQuiz {
        LiveQuiz {
            id: 1,
            teacher_id: 7,
            title: "Cell Biology".to_string(),
            description: String::new(),
            quiz_code: "AB12CD".to_string(),
            status,
            created_at: Utc::now(),
            started_at: (status != QuizStatus::Draft).then(Utc::now),
            ended_at: None,
            time_limit: 30,
        }
    }

    fn question(id: i64, question_type: QuestionType, approval: ApprovalStatus) -> QuizQuestion {
        QuizQuestion {
            id,
            quiz_id: 1,
            question_text: format!("Question {}", id),
            question_type,
            option_a: "True".to_string(),
            option_b: "False".to_string(),
            option_c: "Maybe".to_string(),
            option_d: "Never".to_string(),
            correct_answer: question_type.is_objective().then_some(AnswerChoice::A),
            explanation: "Because".to_string(),
            topic: "Cells".to_string(),
            generation_method: GenerationMethod::Manual,
            approval_status: approval,
            source_text: String::new(),
            position: id as i32,
            created_at: Utc::now(),
        }
    }

    fn participant(id: i64, submitted: bool) -> QuizParticipant {
        QuizParticipant {
            id,
            quiz_id: 1,
            student_name: "Asha".to_string(),
            student_email: "asha@example.com".to_string(),
            joined_at: Utc::now(),
            submitted_at: submitted.then(Utc::now),
            score: 0,
            total_questions: 0,
        }
    }

    #[test]
    fn test_manual_mcq_requires_four_options() {
        let draft = QuestionDraft {
            question_text: "Powerhouse of the cell?".to_string(),
            question_type: QuestionType::Mcq,
            option_a: "Mitochondria".to_string(),
            option_b: "Nucleus".to_string(),
            option_c: "".to_string(),
            option_d: "Ribosome".to_string(),
            correct_answer: Some("A".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_manual_question(1, 0, draft),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_manual_true_false_fills_options() {
        let draft = QuestionDraft {
            question_text: "Plants photosynthesize".to_string(),
            question_type: QuestionType::TrueFalse,
            correct_answer: Some("false".to_string()),
            ..Default::default()
        };
        let question = build_manual_question(1, 3, draft).unwrap();

        assert_eq!(question.option_a, "True");
        assert_eq!(question.option_b, "False");
        assert_eq!(question.correct_answer, Some(AnswerChoice::B));
        assert_eq!(question.approval_status, ApprovalStatus::Approved);
        assert_eq!(question.position, 3);
    }

    #[test]
    fn test_manual_subjective_has_no_answer() {
        let draft = QuestionDraft {
            question_text: "Describe osmosis".to_string(),
            question_type: QuestionType::Subjective,
            option_a: "ignored".to_string(),
            ..Default::default()
        };
        let question = build_manual_question(1, 0, draft).unwrap();
        assert_eq!(question.correct_answer, None);
        assert!(question.option_a.is_empty());
    }

    #[test]
    fn test_grade_submission() {
        let questions = vec![
            question(1, QuestionType::Mcq, ApprovalStatus::Approved),
            question(2, QuestionType::TrueFalse, ApprovalStatus::Approved),
            question(3, QuestionType::Mcq, ApprovalStatus::Approved),
            question(4, QuestionType::Subjective, ApprovalStatus::Approved),
            question(5, QuestionType::Mcq, ApprovalStatus::Pending),
        ];
        let answers = BTreeMap::from([
            (1, "a".to_string()),
            (2, "False".to_string()),
            (4, "Water crosses a membrane".to_string()),
            (5, "A".to_string()),
        ]);

        let record = grade_submission(9, &questions, &answers, Utc::now());

        assert_eq!(record.score, 1);
        assert_eq!(record.total_questions, 3);
        assert_eq!(record.answers.len(), 2);
        assert!(!record.answers[1].is_correct);
        assert_eq!(record.subjective_answers.len(), 1);
        assert_eq!(record.subjective_answers[0].question_id, 4);
    }

    #[test]
    fn test_create_quiz_retries_code() {
        let mut quizzes = MockLiveQuizRepository::new();
        let mut calls = 0;
        quizzes.expect_insert_quiz().times(2).returning(move |new| {
            calls += 1;
            if calls == 1 {
                return Err(unique_violation());
            }
            assert_eq!(new.status, QuizStatus::Draft);
            assert_eq!(new.time_limit, DEFAULT_TIME_LIMIT);
            Ok(LiveQuiz {
                quiz_code: new.quiz_code,
                ..quiz(QuizStatus::Draft)
            })
        });

        let created = service(quizzes, MockParticipantRepository::new())
            .create_quiz(
                7,
                CreateQuizRequest {
                    title: "Cells".to_string(),
                    description: String::new(),
                    time_limit: None,
                },
            )
            .unwrap();
        assert_eq!(created.quiz_code.len(), 6);
    }

    #[test]
    fn test_other_teacher_is_forbidden() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz()
            .returning(|_| Ok(Some(quiz(QuizStatus::Draft))));

        let result = service(quizzes, MockParticipantRepository::new()).quiz_detail(99, 1);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_start_requires_approved_question() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz()
            .returning(|_| Ok(Some(quiz(QuizStatus::Draft))));
        quizzes.expect_questions_for_quiz().returning(|_| {
            Ok(vec![question(1, QuestionType::Mcq, ApprovalStatus::Pending)])
        });
        quizzes.expect_start_quiz().never();

        let result = service(quizzes, MockParticipantRepository::new()).start_quiz(7, 1);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_join_rejects_submitted_participant() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz_by_code()
            .returning(|_| Ok(Some(quiz(QuizStatus::Active))));

        let mut participants = MockParticipantRepository::new();
        participants
            .expect_find_participant_by_email()
            .withf(|_, email| email == "asha@example.com")
            .returning(|_, _| Ok(Some(participant(3, true))));
        participants.expect_insert_participant().never();

        let result = service(quizzes, participants).join(JoinQuizRequest {
            quiz_code: "ab12cd".to_string(),
            student_name: "Asha".to_string(),
            student_email: " Asha@Example.com ".to_string(),
        });
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_join_draft_quiz_is_rejected() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz_by_code()
            .returning(|_| Ok(Some(quiz(QuizStatus::Draft))));

        let result = service(quizzes, MockParticipantRepository::new()).join(JoinQuizRequest {
            quiz_code: "AB12CD".to_string(),
            student_name: "Asha".to_string(),
            student_email: "asha@example.com".to_string(),
        });
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_submit_after_time_limit_is_rejected() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes.expect_find_quiz_by_code().returning(|_| {
            Ok(Some(LiveQuiz {
                started_at: Some(Utc::now() - Duration::minutes(45)),
                ..quiz(QuizStatus::Active)
            }))
        });

        let mut participants = MockParticipantRepository::new();
        participants
            .expect_find_participant()
            .returning(|id| Ok(Some(participant(id, false))));
        participants.expect_record_submission().never();

        let result = service(quizzes, participants).submit(
            "AB12CD",
            Some(3),
            SubmitAnswersRequest::default(),
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_submit_without_joining_is_unauthorized() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz_by_code()
            .returning(|_| Ok(Some(quiz(QuizStatus::Active))));

        let result = service(quizzes, MockParticipantRepository::new()).submit(
            "AB12CD",
            None,
            SubmitAnswersRequest::default(),
        );
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_submit_records_score() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz_by_code()
            .returning(|_| Ok(Some(quiz(QuizStatus::Active))));
        quizzes.expect_questions_for_quiz().returning(|_| {
            Ok(vec![
                question(1, QuestionType::Mcq, ApprovalStatus::Approved),
                question(2, QuestionType::Mcq, ApprovalStatus::Approved),
            ])
        });

        let mut participants = MockParticipantRepository::new();
        participants
            .expect_find_participant()
            .returning(|id| Ok(Some(participant(id, false))));
        participants
            .expect_record_submission()
            .withf(|record| record.score == 1 && record.total_questions == 2)
            .returning(|record| {
                Ok(Some(QuizParticipant {
                    score: record.score,
                    total_questions: record.total_questions,
                    ..participant(record.participant_id, true)
                }))
            });
        participants
            .expect_participants_for_quiz()
            .returning(|_| Ok(vec![participant(3, true), participant(4, false)]));

        let result = service(quizzes, participants)
            .submit(
                "AB12CD",
                Some(3),
                SubmitAnswersRequest {
                    answers: BTreeMap::from([(1, "A".to_string()), (2, "C".to_string())]),
                },
            )
            .unwrap();

        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn test_end_expired_quizzes_only_ends_elapsed() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes.expect_active_quizzes().returning(|| {
            Ok(vec![
                LiveQuiz {
                    id: 1,
                    started_at: Some(Utc::now() - Duration::minutes(31)),
                    ..quiz(QuizStatus::Active)
                },
                LiveQuiz {
                    id: 2,
                    started_at: Some(Utc::now() - Duration::minutes(5)),
                    ..quiz(QuizStatus::Active)
                },
            ])
        });
        quizzes
            .expect_end_quiz()
            .withf(|id, _| *id == 1)
            .times(1)
            .returning(|id, at| {
                Ok(Some(LiveQuiz {
                    id,
                    ended_at: Some(at),
                    ..quiz(QuizStatus::Ended)
                }))
            });
        quizzes.expect_questions_for_quiz().returning(|_| Ok(Vec::new()));
        quizzes.expect_upsert_analytics().returning(|new| {
            Ok(QuizAnalytics {
                id: 1,
                quiz_id: new.quiz_id,
                total_participants: new.total_participants,
                average_score: new.average_score,
                completion_rate: new.completion_rate,
                difficult_questions: new.difficult_questions,
                common_mistakes: new.common_mistakes,
                topic_performance: new.topic_performance,
                generated_at: Utc::now(),
            })
        });

        let mut participants = MockParticipantRepository::new();
        participants.expect_participants_for_quiz().returning(|_| Ok(Vec::new()));
        participants.expect_answers_for_quiz().returning(|_| Ok(Vec::new()));

        let ended = service(quizzes, participants)
            .end_expired_quizzes(Utc::now())
            .unwrap();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_keyword_counts() {
        let keywords = vec!["membrane".to_string(), "water".to_string()];
        let answers = vec![
            "Water moves across a membrane".to_string(),
            "water diffuses".to_string(),
        ];

        let counts = keyword_counts(&keywords, &answers);
        assert_eq!(counts[0].word, "water");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].count, 1);
    }

    #[test]
    fn test_keyword_counts_drop_unmentioned_keywords() {
        let keywords = vec!["osmosis".to_string(), "water".to_string()];
        let answers = vec!["water diffuses".to_string()];

        let counts = keyword_counts(&keywords, &answers);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].word, "water");
    }

    #[test]
    fn test_empty_edit_returns_question_unchanged() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_question()
            .returning(|id| Ok(Some(question(id, QuestionType::Mcq, ApprovalStatus::Approved))));
        quizzes
            .expect_find_quiz()
            .returning(|_| Ok(Some(quiz(QuizStatus::Draft))));
        quizzes.expect_update_question().never();

        let edited = service(quizzes, MockParticipantRepository::new())
            .edit_question(7, 2, QuestionEdit::default())
            .unwrap();
        assert_eq!(edited.id, 2);
        assert_eq!(edited.question_text, "Question 2");
    }

    #[tokio::test]
    async fn test_word_cloud_skips_unapproved_questions() {
        let mut quizzes = MockLiveQuizRepository::new();
        quizzes
            .expect_find_quiz()
            .returning(|_| Ok(Some(quiz(QuizStatus::Ended))));
        quizzes.expect_questions_for_quiz().returning(|_| {
            Ok(vec![
                question(1, QuestionType::Subjective, ApprovalStatus::Approved),
                question(2, QuestionType::Subjective, ApprovalStatus::Pending),
            ])
        });

        let mut participants = MockParticipantRepository::new();
        participants.expect_subjective_answers_for_quiz().returning(|_| {
            Ok(vec![SubjectiveAnswer {
                id: 1,
                participant_id: 3,
                question_id: 1,
                answer_text: "Water crosses the membrane".to_string(),
                answered_at: Utc::now(),
            }])
        });

        let clouds = service(quizzes, participants)
            .word_cloud(7, 1)
            .await
            .unwrap();

        assert_eq!(clouds.len(), 1);
        assert_eq!(clouds[0].question_id, 1);
        assert_eq!(clouds[0].source, WordCloudSource::Frequency);
    }
}
