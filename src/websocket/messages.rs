use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::polls::OptionCount;

/// Messages pushed to WebSocket subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A student joined a live quiz
    ParticipantJoined {
        quiz_code: String,
        participant_id: i64,
        student_name: String,
        participant_count: usize,
    },
    QuizStarted {
        quiz_code: String,
        started_at: DateTime<Utc>,
        /// Minutes
        time_limit: i32,
    },
    QuizEnded {
        quiz_code: String,
        ended_at: DateTime<Utc>,
    },
    /// A participant handed in their answers
    SubmissionReceived {
        quiz_code: String,
        participant_id: i64,
        student_name: String,
        score: i32,
        total_questions: i32,
        submitted_count: usize,
    },
    /// Running tallies after a poll response
    PollResponseRecorded {
        poll_code: String,
        total_respondents: usize,
        option_counts: Vec<OptionCount>,
    },
    PollClosed {
        poll_code: String,
        closed_at: DateTime<Utc>,
    },
    /// Subscription confirmation
    Subscribed {
        channel: String,
        code: String,
    },
    /// Unsubscription confirmation
    Unsubscribed {
        channel: String,
        code: String,
    },
    /// Error message
    Error {
        message: String,
    },
    /// Heartbeat/Ping
    Ping {
        timestamp: DateTime<Utc>,
    },
    /// Pong response
    Pong {
        timestamp: DateTime<Utc>,
    },
}

/// Client subscription request
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe { channel: String, code: String },
    Unsubscribe { channel: String, code: String },
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"subscribe","channel":"quiz","code":"ab12cd"}"#)
                .unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { ref channel, .. } if channel == "quiz"));

        let ping: ClientMessage = serde_json::from_str(r#"{"action":"ping"}"#).unwrap();
        assert!(matches!(ping, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_tagging() {
        let json = serde_json::to_value(WsMessage::QuizEnded {
            quiz_code: "AB12CD".to_string(),
            ended_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["type"], "quiz_ended");
        assert_eq!(json["quiz_code"], "AB12CD");
    }
}
