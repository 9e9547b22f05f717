text_enum! {
    /// Kind of course content
    pub enum ContentType {
        Video => "video",
        Text => "text",
        Quiz => "quiz",
    }
}

impl ContentType {
    /// Title-cased label used as the clickstream component ("Video Content")
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Video => "Video",
            ContentType::Text => "Text",
            ContentType::Quiz => "Quiz",
        }
    }
}

text_enum! {
    /// Clickstream event names
    pub enum EventName {
        PageView => "page_view",
        Click => "click",
        VideoPlay => "video_play",
        VideoPause => "video_pause",
        VideoComplete => "video_complete",
        QuizAttempt => "quiz_attempt",
        QuizSubmit => "quiz_submit",
        TextRead => "text_read",
        Login => "login",
        Logout => "logout",
        Registration => "registration",
    }
}

text_enum! {
    /// Multiple choice answer letter
    pub enum AnswerChoice {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
    }
}

impl AnswerChoice {
    /// Parse a letter leniently (`" b "` -> `B`)
    pub fn parse_lenient(s: &str) -> Option<Self> {
        AnswerChoice::from_str(&s.trim().to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_round_trip() {
        for ct in ContentType::all() {
            assert_eq!(ContentType::from_str(ct.as_str()), Some(*ct));
        }
        assert_eq!(ContentType::from_str("audio"), None);
    }

    #[test]
    fn test_content_type_label() {
        assert_eq!(ContentType::Video.label(), "Video");
        assert_eq!(ContentType::Text.label(), "Text");
    }

    #[test]
    fn test_event_name_as_str() {
        assert_eq!(EventName::PageView.as_str(), "page_view");
        assert_eq!(EventName::VideoComplete.as_str(), "video_complete");
        assert_eq!(EventName::all().len(), 11);
    }

    #[test]
    fn test_answer_choice_lenient_parse() {
        assert_eq!(AnswerChoice::parse_lenient(" b "), Some(AnswerChoice::B));
        assert_eq!(AnswerChoice::parse_lenient("D"), Some(AnswerChoice::D));
        assert_eq!(AnswerChoice::parse_lenient("E"), None);
    }

    #[test]
    fn test_serde_uses_database_strings() {
        let json = serde_json::to_string(&EventName::QuizSubmit).unwrap();
        assert_eq!(json, "\"quiz_submit\"");
        let parsed: ContentType = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(parsed, ContentType::Video);
    }
}
