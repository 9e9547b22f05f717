text_enum! {
    /// Perceived clarity of a lesson
    pub enum Clarity {
        Easy => "easy",
        Moderate => "moderate",
        Difficult => "difficult",
    }
}

text_enum! {
    pub enum Engagement {
        Boring => "boring",
        Okay => "okay",
        Engaging => "engaging",
    }
}

text_enum! {
    pub enum DoubtStatus {
        Unanswered => "unanswered",
        InProgress => "in_progress",
        Answered => "answered",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubt_status_strings() {
        assert_eq!(DoubtStatus::InProgress.as_str(), "in_progress");
        assert_eq!(DoubtStatus::from_str("answered"), Some(DoubtStatus::Answered));
        assert_eq!(DoubtStatus::from_str("closed"), None);
    }

    #[test]
    fn test_clarity_and_engagement_all() {
        assert_eq!(Clarity::all().len(), 3);
        assert_eq!(Engagement::all(), &[Engagement::Boring, Engagement::Okay, Engagement::Engaging]);
    }
}
