use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::PollStatus;
use crate::database::models::{
    NewPoll, NewPollAnalytics, NewPollOption, NewPollResponse, Poll, PollAnalytics, PollOption,
    PollResponse,
};
use crate::database::schema::{
    poll_analytics, poll_options, poll_respondents, poll_responses, polls,
};
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use std::sync::Arc;

/// Poll repository trait - polls, options, responses and cached results
#[cfg_attr(test, mockall::automock)]
pub trait PollRepository: Send + Sync {
    /// Insert a poll and its options in one transaction
    fn insert_poll(
        &self,
        poll: NewPoll,
        options: Vec<String>,
    ) -> Result<(Poll, Vec<PollOption>), DatabaseError>;

    fn find_poll(&self, poll_id: i64) -> Result<Option<Poll>, DatabaseError>;

    /// Lookup by poll code, case-insensitive
    fn find_poll_by_code(&self, code: &str) -> Result<Option<Poll>, DatabaseError>;

    /// Polls owned by a teacher, newest first
    fn polls_for_teacher(&self, teacher_id: i64) -> Result<Vec<Poll>, DatabaseError>;

    fn options_for_poll(&self, poll_id: i64) -> Result<Vec<PollOption>, DatabaseError>;

    /// Close an active poll. Returns None if it was already closed.
    fn close_poll(&self, poll_id: i64, at: DateTime<Utc>) -> Result<Option<Poll>, DatabaseError>;

    fn delete_poll(&self, poll_id: i64) -> Result<bool, DatabaseError>;

    fn has_responded(&self, poll_id: i64, respondent_key: &str) -> Result<bool, DatabaseError>;

    /// Store all rows of one submission. Returns false if the respondent already answered.
    fn insert_responses(&self, responses: Vec<NewPollResponse>) -> Result<bool, DatabaseError>;

    fn responses_for_poll(&self, poll_id: i64) -> Result<Vec<PollResponse>, DatabaseError>;

    fn upsert_analytics(&self, analytics: NewPollAnalytics) -> Result<PollAnalytics, DatabaseError>;
}

/// Concrete implementation of PollRepository
pub struct PollRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl PollRepositoryImpl {
    /// Create new poll repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl PollRepository for PollRepositoryImpl {
    fn insert_poll(
        &self,
        poll: NewPoll,
        options: Vec<String>,
    ) -> Result<(Poll, Vec<PollOption>), DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            let poll = diesel::insert_into(polls::table)
                .values(&poll)
                .get_result::<Poll>(conn)?;

            let new_options: Vec<NewPollOption> = options
                .into_iter()
                .enumerate()
                .map(|(index, option_text)| NewPollOption {
                    poll_id: poll.id,
                    option_text,
                    position: index as i32,
                })
                .collect();

            let options = if new_options.is_empty() {
                Vec::new()
            } else {
                diesel::insert_into(poll_options::table)
                    .values(&new_options)
                    .get_results::<PollOption>(conn)?
            };

            Ok((poll, options))
        })
    }

    fn find_poll(&self, poll_id: i64) -> Result<Option<Poll>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        polls::table
            .find(poll_id)
            .first::<Poll>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_poll_by_code(&self, code: &str) -> Result<Option<Poll>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        polls::table
            .filter(polls::poll_code.eq(code.trim().to_uppercase()))
            .first::<Poll>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn polls_for_teacher(&self, teacher_id: i64) -> Result<Vec<Poll>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        polls::table
            .filter(polls::teacher_id.eq(teacher_id))
            .order(polls::created_at.desc())
            .load::<Poll>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn options_for_poll(&self, poll_id: i64) -> Result<Vec<PollOption>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        poll_options::table
            .filter(poll_options::poll_id.eq(poll_id))
            .order((poll_options::position.asc(), poll_options::id.asc()))
            .load::<PollOption>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn close_poll(&self, poll_id: i64, at: DateTime<Utc>) -> Result<Option<Poll>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(
            polls::table
                .filter(polls::id.eq(poll_id))
                .filter(polls::status.eq(PollStatus::Active)),
        )
        .set((polls::status.eq(PollStatus::Closed), polls::closed_at.eq(Some(at))))
        .get_result::<Poll>(&mut conn)
        .optional()
        .map_err(DatabaseError::from)
    }

    fn delete_poll(&self, poll_id: i64) -> Result<bool, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let deleted = diesel::delete(polls::table.find(poll_id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn has_responded(&self, poll_id: i64, respondent_key: &str) -> Result<bool, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::select(exists(
            poll_respondents::table.find((poll_id, respondent_key)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(DatabaseError::from)
    }

    fn insert_responses(&self, responses: Vec<NewPollResponse>) -> Result<bool, DatabaseError> {
        let Some(first) = responses.first() else {
            return Ok(true);
        };
        let poll_id = first.poll_id;
        let respondent_key = first.respondent_key.clone();

        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            // A concurrent claim for the same key blocks here until the other commits
            let claimed = diesel::insert_into(poll_respondents::table)
                .values((
                    poll_respondents::poll_id.eq(poll_id),
                    poll_respondents::respondent_key.eq(&respondent_key),
                ))
                .on_conflict_do_nothing()
                .execute(conn)?;

            if claimed == 0 {
                return Ok(false);
            }

            diesel::insert_into(poll_responses::table)
                .values(&responses)
                .execute(conn)?;

            Ok(true)
        })
    }

    fn responses_for_poll(&self, poll_id: i64) -> Result<Vec<PollResponse>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        poll_responses::table
            .filter(poll_responses::poll_id.eq(poll_id))
            .order(poll_responses::created_at.asc())
            .load::<PollResponse>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn upsert_analytics(&self, analytics: NewPollAnalytics) -> Result<PollAnalytics, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(poll_analytics::table)
            .values(&analytics)
            .on_conflict(poll_analytics::poll_id)
            .do_update()
            .set((&analytics, poll_analytics::generated_at.eq(diesel::dsl::now)))
            .get_result::<PollAnalytics>(&mut conn)
            .map_err(DatabaseError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::enums::PollType;
    use crate::database::models::{NewTeacherProfile, NewUser};
    use crate::database::repositories::Repositories;
    use crate::database::{establish_connection_pool, run_migrations};
    use std::thread;

    #[test]
    fn test_concurrent_submissions_keep_one_per_respondent() {
        // Requires a live database; skipped when DATABASE_URL is absent
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };

        let pool = establish_connection_pool(&url, 4).expect("pool");
        run_migrations(&pool).expect("migrations");
        let repos = Repositories::from_pool(&pool);

        let tag = uuid::Uuid::new_v4().simple().to_string();
        let user = repos
            .users
            .insert(NewUser {
                username: format!("poll-{}", &tag[..12]),
                email: format!("{}@example.com", &tag[..12]),
                password_hash: String::new(),
                password_salt: String::new(),
            })
            .expect("user");
        let teacher = repos
            .live_quizzes
            .insert_teacher(NewTeacherProfile {
                user_id: user.id,
                email: user.email.clone(),
            })
            .expect("teacher");
        let (poll, options) = repos
            .polls
            .insert_poll(
                NewPoll {
                    teacher_id: teacher.id,
                    question: "Favourite organelle?".to_string(),
                    poll_type: PollType::SingleChoice,
                    poll_code: tag[..8].to_uppercase(),
                    status: PollStatus::Active,
                },
                vec!["Nucleus".to_string(), "Ribosome".to_string()],
            )
            .expect("poll");

        let handles: Vec<_> = options
            .iter()
            .map(|option| {
                let polls = repos.polls.clone();
                let row = NewPollResponse {
                    poll_id: poll.id,
                    option_id: Some(option.id),
                    text_response: None,
                    respondent_key: "asha@example.com".to_string(),
                    respondent_name: None,
                };
                thread::spawn(move || polls.insert_responses(vec![row]).expect("insert"))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .filter(|&stored| stored)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(repos.polls.responses_for_poll(poll.id).unwrap().len(), 1);
        assert!(repos.polls.has_responded(poll.id, "asha@example.com").unwrap());

        repos.polls.delete_poll(poll.id).unwrap();
    }
}
