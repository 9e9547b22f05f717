//! Live quiz statistics

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use crate::database::models::{NewQuizAnalytics, QuizAnswer, QuizParticipant, QuizQuestion};

/// Questions answered correctly by fewer than this share of attempts are difficult
pub const DIFFICULT_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DifficultQuestion {
    pub question_id: i64,
    pub question_text: String,
    pub attempts: usize,
    pub correct: usize,
    /// Percentage of attempts answered correctly
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopicPerformance {
    pub correct: usize,
    pub attempted: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuizAnalyticsReport {
    pub total_participants: usize,
    /// Mean percentage score of submitted participants
    pub average_score: f64,
    /// Share of joined participants who submitted, as a percentage
    pub completion_rate: f64,
    pub difficult_questions: Vec<DifficultQuestion>,
    /// Wrong option text -> times chosen
    pub common_mistakes: BTreeMap<String, usize>,
    pub topic_performance: BTreeMap<String, TopicPerformance>,
}

impl QuizAnalyticsReport {
    pub fn into_record(self, quiz_id: i64) -> NewQuizAnalytics {
        NewQuizAnalytics {
            quiz_id,
            total_participants: i32::try_from(self.total_participants).unwrap_or(i32::MAX),
            average_score: self.average_score,
            completion_rate: self.completion_rate,
            difficult_questions: serde_json::to_value(&self.difficult_questions).unwrap_or_default(),
            common_mistakes: serde_json::to_value(&self.common_mistakes).unwrap_or_default(),
            topic_performance: serde_json::to_value(&self.topic_performance).unwrap_or_default(),
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Aggregate statistics over every participant and objective answer of a quiz
pub fn compute_quiz_analytics(
    participants: &[QuizParticipant],
    questions: &[QuizQuestion],
    answers: &[QuizAnswer],
) -> QuizAnalyticsReport {
    let submitted: Vec<&QuizParticipant> =
        participants.iter().filter(|p| p.has_submitted()).collect();

    let scored: Vec<f64> = submitted
        .iter()
        .filter(|p| p.total_questions > 0)
        .map(|p| p.percentage())
        .collect();
    let average_score = if scored.is_empty() {
        0.0
    } else {
        scored.iter().sum::<f64>() / scored.len() as f64
    };

    let by_id: HashMap<i64, &QuizQuestion> = questions.iter().map(|q| (q.id, q)).collect();

    // (attempts, correct) per question
    let mut per_question: HashMap<i64, (usize, usize)> = HashMap::new();
    let mut common_mistakes: BTreeMap<String, usize> = BTreeMap::new();
    let mut topic_performance: BTreeMap<String, TopicPerformance> = BTreeMap::new();

    for answer in answers {
        let Some(question) = by_id.get(&answer.question_id) else {
            continue;
        };

        let entry = per_question.entry(question.id).or_default();
        entry.0 += 1;

        let topic = topic_performance
            .entry(question.topic_or_default().to_string())
            .or_default();
        topic.attempted += 1;

        if answer.is_correct {
            entry.1 += 1;
            topic.correct += 1;
        } else {
            let chosen = question.option_text(answer.selected_answer).trim();
            let label = if chosen.is_empty() {
                answer.selected_answer.as_str().to_string()
            } else {
                chosen.to_string()
            };
            *common_mistakes.entry(label).or_insert(0) += 1;
        }
    }

    for topic in topic_performance.values_mut() {
        topic.success_rate = percentage(topic.correct, topic.attempted);
    }

    let mut difficult_questions: Vec<DifficultQuestion> = questions
        .iter()
        .filter_map(|q| {
            let (attempts, correct) = per_question.get(&q.id).copied()?;
            let success_rate = percentage(correct, attempts);
            (success_rate < DIFFICULT_THRESHOLD).then(|| DifficultQuestion {
                question_id: q.id,
                question_text: q.question_text.clone(),
                attempts,
                correct,
                success_rate,
            })
        })
        .collect();
    difficult_questions.sort_by(|a, b| a.success_rate.total_cmp(&b.success_rate));

    QuizAnalyticsReport {
        total_participants: participants.len(),
        average_score,
        completion_rate: percentage(submitted.len(), participants.len()),
        difficult_questions,
        common_mistakes,
        topic_performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::enums::{
        AnswerChoice, ApprovalStatus, GenerationMethod, QuestionType,
    };
    use chrono::Utc;

    fn participant(id: i64, score: i32, total: i32, submitted: bool) -> QuizParticipant {
        QuizParticipant {
            id,
            quiz_id: 1,
            student_name: format!("student {}", id),
            student_email: format!("s{}@example.com", id),
            joined_at: Utc::now(),
            submitted_at: submitted.then(Utc::now),
            score,
            total_questions: total,
        }
    }

    fn question(id: i64, topic: &str) -> QuizQuestion {
        QuizQuestion {
            id,
            quiz_id: 1,
            question_text: format!("question {}", id),
            question_type: QuestionType::Mcq,
            option_a: "Mitochondria".to_string(),
            option_b: "Nucleus".to_string(),
            option_c: "Chloroplast".to_string(),
            option_d: "Ribosome".to_string(),
            correct_answer: Some(AnswerChoice::C),
            explanation: String::new(),
            topic: topic.to_string(),
            generation_method: GenerationMethod::Manual,
            approval_status: ApprovalStatus::Approved,
            source_text: String::new(),
            position: id as i32,
            created_at: Utc::now(),
        }
    }

    fn answer(participant_id: i64, question_id: i64, selected: AnswerChoice) -> QuizAnswer {
        QuizAnswer {
            id: participant_id * 100 + question_id,
            participant_id,
            question_id,
            selected_answer: selected,
            is_correct: selected == AnswerChoice::C,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn test_scores_and_completion() {
        let participants = vec![
            participant(1, 2, 2, true),
            participant(2, 1, 2, true),
            participant(3, 0, 0, false),
            participant(4, 0, 0, true),
        ];

        let report = compute_quiz_analytics(&participants, &[], &[]);
        assert_eq!(report.total_participants, 4);
        assert_eq!(report.completion_rate, 75.0);
        // Submitted with zero objective questions is left out of the mean
        assert_eq!(report.average_score, 75.0);
    }

    #[test]
    fn test_difficult_questions_and_mistakes() {
        let questions = vec![question(1, "Cells"), question(2, ""), question(3, "Cells")];
        let answers = vec![
            answer(1, 1, AnswerChoice::C),
            answer(2, 1, AnswerChoice::A),
            answer(1, 2, AnswerChoice::A),
            answer(2, 2, AnswerChoice::B),
            answer(3, 2, AnswerChoice::A),
            answer(1, 3, AnswerChoice::C),
            answer(2, 3, AnswerChoice::C),
        ];

        let report = compute_quiz_analytics(&[], &questions, &answers);

        // q1 is exactly 50% so it is not difficult
        assert_eq!(report.difficult_questions.len(), 1);
        assert_eq!(report.difficult_questions[0].question_id, 2);
        assert_eq!(report.difficult_questions[0].success_rate, 0.0);

        assert_eq!(report.common_mistakes.get("Mitochondria"), Some(&3));
        assert_eq!(report.common_mistakes.get("Nucleus"), Some(&1));

        let cells = &report.topic_performance["Cells"];
        assert_eq!((cells.correct, cells.attempted), (3, 4));
        assert_eq!(cells.success_rate, 75.0);
        assert_eq!(report.topic_performance["General"].attempted, 3);
    }

    #[test]
    fn test_difficult_questions_sorted_ascending() {
        let questions = vec![question(1, "A"), question(2, "B")];
        let answers = vec![
            answer(1, 1, AnswerChoice::C),
            answer(2, 1, AnswerChoice::A),
            answer(3, 1, AnswerChoice::A),
            answer(1, 2, AnswerChoice::A),
        ];

        let report = compute_quiz_analytics(&[], &questions, &answers);
        let ids: Vec<i64> = report.difficult_questions.iter().map(|d| d.question_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_into_record_serializes_json_columns() {
        let report = compute_quiz_analytics(&[participant(1, 1, 1, true)], &[], &[]);
        let record = report.into_record(9);

        assert_eq!(record.quiz_id, 9);
        assert_eq!(record.total_participants, 1);
        assert!(record.difficult_questions.is_array());
        assert!(record.common_mistakes.is_object());
    }
}
