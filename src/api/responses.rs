use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::SessionData;
use crate::database::models::{TeacherProfile, User};

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Request to register a new account
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Defaults to `{username}@demo.com`
    #[serde(default)]
    pub email: String,
}

/// Demo login: unknown usernames are created on the fly
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TeacherLoginRequest {
    pub email: String,
}

/// Response after a learner login or registration
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: User,
    /// True when the account was created by this request
    pub created: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherLoginResponse {
    pub teacher: TeacherProfile,
    pub user: User,
}

/// What the current session is authenticated as
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub admin_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    /// Codes of live quizzes joined in this session
    pub joined_quizzes: Vec<String>,
}

impl From<&SessionData> for MeResponse {
    fn from(data: &SessionData) -> Self {
        let mut joined_quizzes: Vec<String> = data.participants.keys().cloned().collect();
        joined_quizzes.sort();

        Self {
            authenticated: data.user_id.is_some(),
            user_id: data.user_id,
            username: data.username.clone(),
            email: data.email.clone(),
            admin_authenticated: data.admin_authenticated,
            teacher_id: data.teacher_id,
            joined_quizzes,
        }
    }
}

// ============================================================================
// Learning
// ============================================================================

/// Video player event
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackVideoRequest {
    pub content_id: i64,
    /// One of `play`, `pause`, `complete`
    pub event_type: String,
    /// Player position in seconds; players report fractions
    #[serde(default)]
    pub current_time: f64,
}

impl TrackVideoRequest {
    /// Position rounded to whole seconds, never negative
    pub fn position_seconds(&self) -> i32 {
        if self.current_time.is_finite() {
            self.current_time.round().clamp(0.0, i32::MAX as f64) as i32
        } else {
            0
        }
    }
}

/// Answer to a course quiz
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_me_response_from_anonymous_session() {
        let me = MeResponse::from(&SessionData::default());
        assert!(!me.authenticated);
        assert!(me.joined_quizzes.is_empty());

        let json = serde_json::to_value(&me).unwrap();
        assert!(json.get("user_id").is_none());
        assert_eq!(json["admin_authenticated"], false);
    }

    #[test]
    fn test_me_response_lists_joined_quizzes_sorted() {
        let data = SessionData {
            user_id: Some(3),
            username: Some("alice".into()),
            participants: HashMap::from([("ZZ1111".to_string(), 9), ("AB1234".to_string(), 4)]),
            ..Default::default()
        };

        let me = MeResponse::from(&data);
        assert!(me.authenticated);
        assert_eq!(me.joined_quizzes, vec!["AB1234", "ZZ1111"]);
    }

    #[test]
    fn test_track_video_defaults_current_time() {
        let req: TrackVideoRequest =
            serde_json::from_str(r#"{"content_id": 5, "event_type": "play"}"#).unwrap();
        assert_eq!(req.position_seconds(), 0);
        assert_eq!(req.event_type, "play");
    }

    #[test]
    fn test_track_video_accepts_fractional_position() {
        let req: TrackVideoRequest = serde_json::from_str(
            r#"{"content_id": 1, "event_type": "play", "current_time": 12.5}"#,
        )
        .unwrap();
        assert_eq!(req.position_seconds(), 13);

        let req: TrackVideoRequest = serde_json::from_str(
            r#"{"content_id": 1, "event_type": "pause", "current_time": -3.2}"#,
        )
        .unwrap();
        assert_eq!(req.position_seconds(), 0);
    }
}
