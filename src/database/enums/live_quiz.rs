text_enum! {
    /// Live quiz lifecycle: draft -> active -> ended
    pub enum QuizStatus {
        Draft => "draft",
        Active => "active",
        Ended => "ended",
    }
}

text_enum! {
    pub enum QuestionType {
        Mcq => "mcq",
        TrueFalse => "true_false",
        /// Free-text answer, not auto-graded
        Subjective => "subjective",
    }
}

impl Default for QuestionType {
    fn default() -> Self {
        QuestionType::Mcq
    }
}

impl QuestionType {
    /// Whether answers to this question type are graded automatically
    pub fn is_objective(&self) -> bool {
        !matches!(self, QuestionType::Subjective)
    }
}

text_enum! {
    /// How a question was produced
    pub enum GenerationMethod {
        Manual => "manual",
        LlmText => "llm_text",
    }
}

text_enum! {
    /// Teacher review state of a question. Only approved questions reach students.
    pub enum ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_status_from_str() {
        assert_eq!(QuizStatus::from_str("draft"), Some(QuizStatus::Draft));
        assert_eq!(QuizStatus::from_str("active"), Some(QuizStatus::Active));
        assert_eq!(QuizStatus::from_str("paused"), None);
    }

    #[test]
    fn test_question_type_objective() {
        assert!(QuestionType::Mcq.is_objective());
        assert!(QuestionType::TrueFalse.is_objective());
        assert!(!QuestionType::Subjective.is_objective());
    }

    #[test]
    fn test_generation_method_as_str() {
        assert_eq!(GenerationMethod::LlmText.as_str(), "llm_text");
        assert_eq!(ApprovalStatus::Pending.to_string(), "pending");
    }
}
