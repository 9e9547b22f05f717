//! Course feedback and student doubts

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::database::enums::{Clarity, DoubtStatus, Engagement};
use crate::database::models::{Doubt, DoubtChanges, Feedback, NewDoubt, NewFeedback};
use crate::database::repositories::{CourseRepository, FeedbackRepository};
use crate::error::AppError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub course_id: i64,
    pub content_id: Option<i64>,
    pub rating: Option<i16>,
    pub clarity: Option<Clarity>,
    pub engagement: Option<Engagement>,
    pub instructor_rating: Option<i16>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub anonymous: bool,
    /// Free-form client details (browser, device)
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DoubtRequest {
    pub course_id: i64,
    pub content_id: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DoubtUpdate {
    pub status: DoubtStatus,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FeedbackSummary {
    pub count: usize,
    pub average_rating: Option<f64>,
    pub average_instructor_rating: Option<f64>,
    /// Every clarity level with its count, zero included
    pub clarity: BTreeMap<String, usize>,
    pub engagement: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseFeedback {
    pub course_id: i64,
    pub summary: FeedbackSummary,
    pub feedback: Vec<Feedback>,
}

fn check_rating(field: &str, rating: Option<i16>) -> Result<(), AppError> {
    match rating {
        Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => Err(AppError::bad_request(format!(
            "{} must be between {} and {}",
            field, MIN_RATING, MAX_RATING
        ))),
        _ => Ok(()),
    }
}

fn average(values: impl Iterator<Item = i16>) -> Option<f64> {
    let (sum, n) = values.fold((0i64, 0usize), |(sum, n), v| (sum + i64::from(v), n + 1));
    (n > 0).then(|| ((sum as f64 / n as f64) * 100.0).round() / 100.0)
}

/// Averages and clarity/engagement distributions over a course's feedback
pub fn summarize_feedback(entries: &[Feedback]) -> FeedbackSummary {
    let mut clarity: BTreeMap<String, usize> =
        Clarity::all().iter().map(|c| (c.as_str().to_string(), 0)).collect();
    let mut engagement: BTreeMap<String, usize> =
        Engagement::all().iter().map(|e| (e.as_str().to_string(), 0)).collect();

    for entry in entries {
        if let Some(c) = entry.clarity {
            *clarity.entry(c.as_str().to_string()).or_insert(0) += 1;
        }
        if let Some(e) = entry.engagement {
            *engagement.entry(e.as_str().to_string()).or_insert(0) += 1;
        }
    }

    FeedbackSummary {
        count: entries.len(),
        average_rating: average(entries.iter().filter_map(|f| f.rating)),
        average_instructor_rating: average(entries.iter().filter_map(|f| f.instructor_rating)),
        clarity,
        engagement,
    }
}

#[derive(Clone)]
pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl FeedbackService {
    pub fn new(feedback: Arc<dyn FeedbackRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { feedback, courses }
    }

    fn ensure_course(&self, course_id: i64, content_id: Option<i64>) -> Result<(), AppError> {
        if self.courses.find_course(course_id)?.is_none() {
            return Err(AppError::not_found(format!("Course {} not found", course_id)));
        }

        if let Some(content_id) = content_id {
            match self.courses.find_content(content_id)? {
                Some(content) if content.course_id == course_id => {}
                Some(_) => {
                    return Err(AppError::bad_request(format!(
                        "Content {} is not part of course {}",
                        content_id, course_id
                    )))
                }
                None => return Err(AppError::not_found(format!("Content {} not found", content_id))),
            }
        }
        Ok(())
    }

    /// Store feedback. Anonymous feedback is not linked to the student.
    pub fn submit_feedback(
        &self,
        student_id: Option<i64>,
        request: FeedbackRequest,
    ) -> Result<Feedback, AppError> {
        check_rating("rating", request.rating)?;
        check_rating("instructor_rating", request.instructor_rating)?;
        self.ensure_course(request.course_id, request.content_id)?;

        let stored = self.feedback.insert_feedback(NewFeedback {
            student_id: student_id.filter(|_| !request.anonymous),
            anonymous: request.anonymous,
            course_id: request.course_id,
            content_id: request.content_id,
            rating: request.rating,
            clarity: request.clarity,
            engagement: request.engagement,
            instructor_rating: request.instructor_rating,
            comment: request.comment.trim().to_string(),
            metadata: request
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        })?;

        tracing::debug!(feedback_id = stored.id, course_id = stored.course_id, "Feedback stored");
        Ok(stored)
    }

    pub fn course_feedback(&self, course_id: i64) -> Result<CourseFeedback, AppError> {
        self.ensure_course(course_id, None)?;
        let feedback = self.feedback.feedback_for_course(course_id)?;

        Ok(CourseFeedback {
            course_id,
            summary: summarize_feedback(&feedback),
            feedback,
        })
    }

    pub fn raise_doubt(&self, student_id: Option<i64>, request: DoubtRequest) -> Result<Doubt, AppError> {
        let body = request.text.trim();
        if body.is_empty() {
            return Err(AppError::bad_request("Doubt text is required"));
        }
        self.ensure_course(request.course_id, request.content_id)?;

        Ok(self.feedback.insert_doubt(NewDoubt {
            student_id: student_id.filter(|_| !request.anonymous),
            anonymous: request.anonymous,
            course_id: request.course_id,
            content_id: request.content_id,
            body: body.to_string(),
        })?)
    }

    /// Doubts of a course, optionally filtered by a status string
    pub fn course_doubts(&self, course_id: i64, status: Option<&str>) -> Result<Vec<Doubt>, AppError> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(
                DoubtStatus::from_str(s)
                    .ok_or_else(|| AppError::bad_request(format!("Unknown doubt status: {}", s)))?,
            ),
            None => None,
        };

        Ok(self.feedback.doubts_for_course(course_id, status)?)
    }

    /// Change a doubt's status. Marking it answered stamps `resolved_at`.
    pub fn update_doubt(
        &self,
        doubt_id: i64,
        handler_user_id: Option<i64>,
        update: DoubtUpdate,
    ) -> Result<Doubt, AppError> {
        if self.feedback.find_doubt(doubt_id)?.is_none() {
            return Err(AppError::not_found(format!("Doubt {} not found", doubt_id)));
        }

        let changes = DoubtChanges {
            status: update.status,
            teacher_id: handler_user_id,
            resolution: update.resolution.map(|r| r.trim().to_string()),
            resolved_at: (update.status == DoubtStatus::Answered).then(Utc::now),
        };

        let doubt = self.feedback.update_doubt(doubt_id, changes)?;
        tracing::info!(doubt_id, status = %doubt.status, "Doubt updated");
        Ok(doubt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Course;
    use crate::database::repositories::{MockCourseRepository, MockFeedbackRepository};

    fn entry(rating: Option<i16>, clarity: Option<Clarity>, engagement: Option<Engagement>) -> Feedback {
        Feedback {
            id: 1,
            student_id: None,
            anonymous: true,
            course_id: 1,
            content_id: None,
            rating,
            clarity,
            engagement,
            instructor_rating: rating,
            comment: String::new(),
            created_at: Utc::now(),
            metadata: serde_json::json!({}),
        }
    }

    fn courses_with_course() -> MockCourseRepository {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_course().returning(|id| {
            Ok(Some(Course {
                id,
                title: "Web Development Fundamentals".to_string(),
                description: String::new(),
                created_at: Utc::now(),
            }))
        });
        courses
    }

    fn doubt(status: DoubtStatus) -> Doubt {
        Doubt {
            id: 5,
            student_id: Some(2),
            anonymous: false,
            course_id: 1,
            content_id: None,
            body: "What is a closure?".to_string(),
            created_at: Utc::now(),
            status,
            teacher_id: None,
            resolution: String::new(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_summary() {
        let entries = vec![
            entry(Some(5), Some(Clarity::Easy), Some(Engagement::Engaging)),
            entry(Some(4), Some(Clarity::Easy), None),
            entry(None, Some(Clarity::Difficult), Some(Engagement::Boring)),
        ];
        let summary = summarize_feedback(&entries);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.average_rating, Some(4.5));
        assert_eq!(summary.clarity["easy"], 2);
        assert_eq!(summary.clarity["moderate"], 0);
        assert_eq!(summary.engagement["boring"], 1);
    }

    #[test]
    fn test_summary_without_ratings() {
        let summary = summarize_feedback(&[]);
        assert_eq!(summary.average_rating, None);
        assert_eq!(summary.clarity.len(), 3);
    }

    #[test]
    fn test_rating_out_of_range() {
        let svc = FeedbackService::new(
            Arc::new(MockFeedbackRepository::new()),
            Arc::new(MockCourseRepository::new()),
        );
        let result = svc.submit_feedback(
            Some(1),
            FeedbackRequest {
                course_id: 1,
                rating: Some(6),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_anonymous_feedback_drops_student() {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_insert_feedback()
            .withf(|f| f.student_id.is_none() && f.anonymous && f.metadata.is_object())
            .returning(|f| {
                Ok(Feedback {
                    rating: f.rating,
                    ..entry(f.rating, None, None)
                })
            });

        let svc = FeedbackService::new(Arc::new(repo), Arc::new(courses_with_course()));
        let stored = svc
            .submit_feedback(
                Some(3),
                FeedbackRequest {
                    course_id: 1,
                    rating: Some(4),
                    anonymous: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(stored.rating, Some(4));
    }

    #[test]
    fn test_blank_doubt_rejected() {
        let svc = FeedbackService::new(
            Arc::new(MockFeedbackRepository::new()),
            Arc::new(MockCourseRepository::new()),
        );
        let result = svc.raise_doubt(
            Some(1),
            DoubtRequest {
                course_id: 1,
                text: "  ".to_string(),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_unknown_status_filter() {
        let svc = FeedbackService::new(
            Arc::new(MockFeedbackRepository::new()),
            Arc::new(MockCourseRepository::new()),
        );
        assert!(matches!(
            svc.course_doubts(1, Some("closed")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_answering_sets_resolved_at() {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_find_doubt()
            .returning(|_| Ok(Some(doubt(DoubtStatus::Unanswered))));
        repo.expect_update_doubt()
            .withf(|_, changes| {
                changes.status == DoubtStatus::Answered
                    && changes.resolved_at.is_some()
                    && changes.teacher_id == Some(9)
            })
            .returning(|_, changes| {
                Ok(Doubt {
                    status: changes.status,
                    resolved_at: changes.resolved_at,
                    teacher_id: changes.teacher_id,
                    ..doubt(DoubtStatus::Unanswered)
                })
            });

        let svc = FeedbackService::new(Arc::new(repo), Arc::new(MockCourseRepository::new()));
        let updated = svc
            .update_doubt(
                5,
                Some(9),
                DoubtUpdate {
                    status: DoubtStatus::Answered,
                    resolution: Some("See lesson 3".to_string()),
                },
            )
            .unwrap();
        assert!(updated.resolved_at.is_some());
    }
}
