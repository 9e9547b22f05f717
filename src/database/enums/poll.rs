text_enum! {
    pub enum PollType {
        SingleChoice => "single_choice",
        MultipleChoice => "multiple_choice",
        OpenText => "open_text",
    }
}

impl PollType {
    /// Open text polls carry no options
    pub fn has_options(&self) -> bool {
        !matches!(self, PollType::OpenText)
    }
}

text_enum! {
    pub enum PollStatus {
        Active => "active",
        Closed => "closed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_type_has_options() {
        assert!(PollType::SingleChoice.has_options());
        assert!(PollType::MultipleChoice.has_options());
        assert!(!PollType::OpenText.has_options());
    }

    #[test]
    fn test_poll_status_round_trip() {
        for status in PollStatus::all() {
            assert_eq!(PollStatus::from_str(status.as_str()), Some(*status));
        }
    }
}
