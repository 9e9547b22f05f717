//! Instant classroom polls

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use utoipa::ToSchema;

use super::codes::insert_with_unique_code;
use super::validation::{
    validate_length, validate_optional_length, EMAIL_MAX, PERSON_NAME_MAX, POLL_OPTION_MAX,
};
use crate::database::enums::{PollStatus, PollType};
use crate::database::models::{
    NewPoll, NewPollAnalytics, NewPollResponse, Poll, PollAnalytics, PollOption, PollResponse,
};
use crate::database::repositories::PollRepository;
use crate::error::AppError;
use crate::websocket::{topics, Broadcaster, WsMessage};
use crate::wordcloud::{word_frequencies, WordCount};

pub const MIN_POLL_OPTIONS: usize = 2;
pub const POLL_WORD_CLOUD_LIMIT: usize = 50;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePollRequest {
    pub question: String,
    pub poll_type: PollType,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PollAnswerRequest {
    #[serde(default)]
    pub option_ids: Vec<i64>,
    pub text: Option<String>,
    pub name: Option<String>,
    /// Identifies the respondent; the session is used when absent
    pub email: Option<String>,
}

/// Tally of one option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OptionCount {
    pub option_id: i64,
    pub option_text: String,
    pub count: usize,
    /// Share of respondents who picked this option
    pub percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PollView {
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PollTally {
    pub total_respondents: usize,
    pub total_responses: usize,
    pub option_counts: Vec<OptionCount>,
    pub word_cloud: Vec<WordCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PollResults {
    pub poll: Poll,
    #[serde(flatten)]
    pub tally: PollTally,
    pub text_responses: Vec<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Count responses per option and words across open-text answers.
/// Multiple choice respondents count once per option picked.
pub fn tally_responses(options: &[PollOption], responses: &[PollResponse]) -> PollTally {
    let respondents: HashSet<&str> = responses.iter().map(|r| r.respondent_key.as_str()).collect();
    let total_respondents = respondents.len();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for option_id in responses.iter().filter_map(|r| r.option_id) {
        *counts.entry(option_id).or_insert(0) += 1;
    }

    let option_counts = options
        .iter()
        .map(|option| {
            let count = counts.get(&option.id).copied().unwrap_or(0);
            let percentage = if total_respondents > 0 {
                round2(count as f64 / total_respondents as f64 * 100.0)
            } else {
                0.0
            };
            OptionCount {
                option_id: option.id,
                option_text: option.option_text.clone(),
                count,
                percentage,
            }
        })
        .collect();

    let word_cloud = word_frequencies(
        responses.iter().filter_map(|r| r.text_response.as_deref()),
        POLL_WORD_CLOUD_LIMIT,
    );

    PollTally {
        total_respondents,
        total_responses: responses.len(),
        option_counts,
        word_cloud,
    }
}

/// Validate an answer against the poll type and turn it into response rows
pub fn build_responses(
    poll: &Poll,
    options: &[PollOption],
    answer: &PollAnswerRequest,
    respondent_key: &str,
) -> Result<Vec<NewPollResponse>, AppError> {
    let name = answer
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    validate_optional_length("Name", name.as_deref(), PERSON_NAME_MAX)?;

    let row = |option_id: Option<i64>, text_response: Option<String>| NewPollResponse {
        poll_id: poll.id,
        option_id,
        text_response,
        respondent_key: respondent_key.to_string(),
        respondent_name: name.clone(),
    };

    if poll.poll_type == PollType::OpenText {
        let text = answer
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::bad_request("A text answer is required"))?;
        return Ok(vec![row(None, Some(text.to_string()))]);
    }

    let valid: HashSet<i64> = options.iter().map(|o| o.id).collect();
    let chosen: BTreeSet<i64> = answer.option_ids.iter().copied().collect();

    if let Some(unknown) = chosen.iter().find(|id| !valid.contains(id)) {
        return Err(AppError::bad_request(format!(
            "Option {} does not belong to this poll",
            unknown
        )));
    }

    match poll.poll_type {
        PollType::SingleChoice if answer.option_ids.len() != 1 => {
            Err(AppError::bad_request("Choose exactly one option"))
        }
        PollType::MultipleChoice if chosen.is_empty() => {
            Err(AppError::bad_request("Choose at least one option"))
        }
        _ => Ok(chosen.into_iter().map(|id| row(Some(id), None)).collect()),
    }
}

#[derive(Clone)]
pub struct PollService {
    polls: Arc<dyn PollRepository>,
    broadcaster: Broadcaster,
}

impl PollService {
    pub fn new(polls: Arc<dyn PollRepository>, broadcaster: Broadcaster) -> Self {
        Self { polls, broadcaster }
    }

    fn owned_poll(&self, teacher_id: i64, poll_id: i64) -> Result<Poll, AppError> {
        let poll = self
            .polls
            .find_poll(poll_id)?
            .ok_or_else(|| AppError::not_found(format!("Poll {} not found", poll_id)))?;

        if poll.teacher_id != teacher_id {
            return Err(AppError::Forbidden("You do not own this poll".to_string()));
        }
        Ok(poll)
    }

    fn poll_by_code(&self, code: &str) -> Result<Poll, AppError> {
        self.polls
            .find_poll_by_code(code)?
            .ok_or_else(|| AppError::not_found(format!("No poll with code {}", code.trim())))
    }

    pub fn create_poll(&self, teacher_id: i64, request: CreatePollRequest) -> Result<PollView, AppError> {
        let question = request.question.trim().to_string();
        if question.is_empty() {
            return Err(AppError::bad_request("Poll question is required"));
        }

        let options: Vec<String> = if request.poll_type.has_options() {
            request
                .options
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        for option in &options {
            validate_length("Poll option", option, POLL_OPTION_MAX)?;
        }
        if request.poll_type.has_options() && options.len() < MIN_POLL_OPTIONS {
            return Err(AppError::bad_request(format!(
                "Choice polls need at least {} options",
                MIN_POLL_OPTIONS
            )));
        }

        let (poll, options) = insert_with_unique_code(|poll_code| {
            self.polls.insert_poll(
                NewPoll {
                    teacher_id,
                    question: question.clone(),
                    poll_type: request.poll_type,
                    poll_code,
                    status: PollStatus::Active,
                },
                options.clone(),
            )
        })?;

        tracing::info!(poll_id = poll.id, code = %poll.poll_code, "Created poll");
        Ok(PollView { poll, options })
    }

    pub fn list_polls(&self, teacher_id: i64) -> Result<Vec<Poll>, AppError> {
        Ok(self.polls.polls_for_teacher(teacher_id)?)
    }

    pub fn close_poll(&self, teacher_id: i64, poll_id: i64) -> Result<Poll, AppError> {
        self.owned_poll(teacher_id, poll_id)?;

        let closed = self
            .polls
            .close_poll(poll_id, Utc::now())?
            .ok_or_else(|| AppError::Conflict("Poll is already closed".to_string()))?;

        if let Err(e) = self.refresh_analytics(&closed) {
            tracing::warn!(poll_id, error = %e, "Failed to store poll analytics");
        }

        self.broadcaster.broadcast(
            &topics::poll(&closed.poll_code),
            WsMessage::PollClosed {
                poll_code: closed.poll_code.clone(),
                closed_at: closed.closed_at.unwrap_or_else(Utc::now),
            },
        );

        Ok(closed)
    }

    pub fn delete_poll(&self, teacher_id: i64, poll_id: i64) -> Result<(), AppError> {
        self.owned_poll(teacher_id, poll_id)?;

        if self.polls.delete_poll(poll_id)? {
            tracing::info!(poll_id, "Deleted poll");
            Ok(())
        } else {
            Err(AppError::not_found(format!("Poll {} not found", poll_id)))
        }
    }

    /// Public view of a poll for respondents
    pub fn poll_for_code(&self, code: &str) -> Result<PollView, AppError> {
        let poll = self.poll_by_code(code)?;
        let options = self.polls.options_for_poll(poll.id)?;
        Ok(PollView { poll, options })
    }

    /// Record one respondent's answer. `session_key` identifies anonymous respondents.
    pub fn respond(
        &self,
        code: &str,
        answer: PollAnswerRequest,
        session_key: Option<&str>,
    ) -> Result<PollTally, AppError> {
        let poll = self.poll_by_code(code)?;
        if poll.status != PollStatus::Active {
            return Err(AppError::bad_request("This poll is closed"));
        }

        let respondent_key = answer
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .or_else(|| session_key.filter(|k| !k.is_empty()).map(str::to_string))
            .ok_or_else(|| AppError::bad_request("An email is required to answer this poll"))?;
        validate_length("Email", &respondent_key, EMAIL_MAX)?;

        if self.polls.has_responded(poll.id, &respondent_key)? {
            return Err(AppError::Conflict("You have already answered this poll".to_string()));
        }

        let options = self.polls.options_for_poll(poll.id)?;
        let rows = build_responses(&poll, &options, &answer, &respondent_key)?;

        if !self.polls.insert_responses(rows)? {
            return Err(AppError::Conflict("You have already answered this poll".to_string()));
        }

        let responses = self.polls.responses_for_poll(poll.id)?;
        let tally = tally_responses(&options, &responses);

        self.broadcaster.broadcast(
            &topics::poll(&poll.poll_code),
            WsMessage::PollResponseRecorded {
                poll_code: poll.poll_code.clone(),
                total_respondents: tally.total_respondents,
                option_counts: tally.option_counts.clone(),
            },
        );

        Ok(tally)
    }

    fn refresh_analytics(&self, poll: &Poll) -> Result<(PollAnalytics, PollTally, Vec<PollResponse>), AppError> {
        let options = self.polls.options_for_poll(poll.id)?;
        let responses = self.polls.responses_for_poll(poll.id)?;
        let tally = tally_responses(&options, &responses);

        let analytics = self.polls.upsert_analytics(NewPollAnalytics {
            poll_id: poll.id,
            total_responses: i32::try_from(tally.total_responses).unwrap_or(i32::MAX),
            option_counts: serde_json::to_value(&tally.option_counts).unwrap_or_default(),
            word_cloud: serde_json::to_value(&tally.word_cloud).unwrap_or_default(),
        })?;

        Ok((analytics, tally, responses))
    }

    /// Current tallies, also stored as the poll's analytics row
    pub fn results(&self, teacher_id: i64, poll_id: i64) -> Result<PollResults, AppError> {
        let poll = self.owned_poll(teacher_id, poll_id)?;
        let (_, tally, responses) = self.refresh_analytics(&poll)?;

        let text_responses = responses
            .into_iter()
            .filter_map(|r| r.text_response)
            .collect();

        Ok(PollResults {
            poll,
            tally,
            text_responses,
        })
    }
}
