use serde::{Deserialize, Serialize};

use super::chain::FallbackChain;
use super::parser::{self, BloomQuestion, GeneratedQuestion, PerformanceAnalysis};
use super::{prompts, templates, LlmError};
use crate::config::LlmConfig;
use crate::database::enums::AnswerChoice;

/// An objective question a participant got wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrongAnswer {
    pub question: String,
    pub selected: AnswerChoice,
    pub correct: AnswerChoice,
    pub topic: String,
}

/// A wrong answer with option texts resolved, for teacher-facing analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeRecord {
    pub student: String,
    pub question: String,
    pub selected_text: String,
    pub correct_text: String,
}

/// LLM-backed content generation. Every operation returns usable content even
/// when all providers fail.
#[derive(Clone)]
pub struct LlmService {
    chain: FallbackChain,
    max_tokens: u32,
    temperature: f32,
}

impl LlmService {
    pub fn new(chain: FallbackChain, config: &LlmConfig) -> Self {
        Self {
            chain,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(FallbackChain::from_config(config), config)
    }

    /// Multiple choice questions about `topic` grounded in `text`, at most
    /// `num_questions` of them
    pub async fn generate_questions_from_text(
        &self,
        text: &str,
        num_questions: usize,
        topic: &str,
    ) -> Vec<GeneratedQuestion> {
        let request = prompts::question_generation(text, num_questions, topic)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature);

        let result = self
            .chain
            .complete_parsed(&request, |completion| {
                let questions = parser::parse_generated_questions(completion, topic);
                (!questions.is_empty()).then_some(questions)
            })
            .await;

        let mut questions = match result {
            Ok(questions) => questions,
            Err(LlmError::InvalidResponse(_)) => {
                tracing::warn!(topic = %topic, "No parseable questions in LLM output, using generic templates");
                templates::fallback_questions("", 3, topic)
            }
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Question generation failed, using templates");
                templates::fallback_questions(text, num_questions, topic)
            }
        };

        questions.truncate(num_questions);
        questions
    }

    pub async fn analyze_student_performance(
        &self,
        student_name: &str,
        score: i32,
        total: i32,
        wrong_answers: &[WrongAnswer],
        correct_count: usize,
    ) -> PerformanceAnalysis {
        tracing::info!(student = %student_name, "Analyzing student performance");

        let request =
            prompts::student_analysis(student_name, score, total, wrong_answers, correct_count);

        match self
            .chain
            .complete_parsed(&request, parser::parse_student_analysis)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(student = %student_name, error = %e, "Using fallback performance analysis");
                templates::fallback_analysis(wrong_answers, correct_count)
            }
        }
    }

    /// Three practice questions at increasing Bloom's taxonomy levels
    pub async fn generate_bloom_taxonomy_questions(
        &self,
        topic: &str,
        reading_material: &str,
    ) -> Vec<BloomQuestion> {
        let request = prompts::bloom_questions(topic, reading_material);

        match self
            .chain
            .complete_parsed(&request, |completion| {
                let questions = parser::parse_bloom_questions(completion, topic);
                (!questions.is_empty()).then_some(questions)
            })
            .await
        {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Using fallback Bloom's taxonomy questions");
                templates::fallback_bloom_questions(topic)
            }
        }
    }

    /// Key terms across open-text answers. Empty when no provider answered,
    /// in which case callers count word frequencies locally.
    pub async fn extract_keywords(&self, topic: &str, answers: &[String]) -> Vec<String> {
        if answers.is_empty() {
            return Vec::new();
        }

        let request = prompts::keyword_extraction(topic, answers);

        match self
            .chain
            .complete_parsed(&request, |completion| {
                let keywords = parser::parse_keywords(completion);
                (!keywords.is_empty()).then_some(keywords)
            })
            .await
        {
            Ok(keywords) => keywords,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Keyword extraction failed");
                Vec::new()
            }
        }
    }

    pub async fn generate_mistake_analysis(
        &self,
        quiz_title: &str,
        mistakes: &[MistakeRecord],
    ) -> String {
        let request = prompts::mistake_analysis(quiz_title, mistakes);

        match self.chain.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(quiz = %quiz_title, error = %e, "Using fallback mistake analysis");
                templates::fallback_mistake_analysis(quiz_title, mistakes)
            }
        }
    }

    pub async fn generate_remedial_content(&self, quiz_title: &str, mistake_analysis: &str) -> String {
        let request = prompts::remedial_content(quiz_title, mistake_analysis);

        match self.chain.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(quiz = %quiz_title, error = %e, "Using fallback remedial content");
                templates::fallback_remedial_content(quiz_title)
            }
        }
    }

    pub async fn generate_personalized_help(
        &self,
        student_name: &str,
        score: i32,
        total: i32,
        mistakes: &[MistakeRecord],
    ) -> String {
        let request = prompts::personalized_help(student_name, score, total, mistakes);

        match self.chain.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(student = %student_name, error = %e, "Using fallback personalized help");
                templates::fallback_personalized_help(student_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmProvider, MockLlmProvider};
    use std::sync::Arc;

    fn service_replying(reply: Option<&'static str>) -> LlmService {
        let mut mock = MockLlmProvider::new();
        mock.expect_name().return_const("mock".to_string());
        mock.expect_complete().returning(move |_| match reply {
            Some(text) => Ok(text.to_string()),
            None => Err(LlmError::RequestFailed("connection refused".to_string())),
        });

        let providers: Vec<Arc<dyn LlmProvider>> = vec![Arc::new(mock)];
        LlmService::new(FallbackChain::new(providers), &LlmConfig::default())
    }

    const SOURCE: &str = "Photosynthesis lets plants turn sunlight, water and carbon dioxide into glucose.";

    #[tokio::test]
    async fn test_generated_questions_are_capped() {
        let service = service_replying(Some(
            "Q1: a?\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: D\nQ2: b?\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: B",
        ));

        let questions = service.generate_questions_from_text(SOURCE, 1, "Biology").await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, AnswerChoice::D);
    }

    #[tokio::test]
    async fn test_unparseable_output_uses_generic_templates() {
        let service = service_replying(Some("I'd love to help!"));

        let questions = service.generate_questions_from_text(SOURCE, 5, "Biology").await;
        assert_eq!(questions.len(), 3);
        assert_eq!(
            questions[0].question_text,
            "What is the main concept discussed in Biology?"
        );
    }

    #[tokio::test]
    async fn test_provider_failure_uses_text_aware_templates() {
        let service = service_replying(None);

        let questions = service.generate_questions_from_text(SOURCE, 4, "Biology").await;
        assert_eq!(questions.len(), 4);
        assert_eq!(
            questions[0].question_text,
            "What is the main focus of the text about Biology?"
        );
    }

    #[tokio::test]
    async fn test_analysis_falls_back_to_wrong_topics() {
        let service = service_replying(None);
        let wrong = vec![WrongAnswer {
            question: "What is ATP?".to_string(),
            selected: AnswerChoice::B,
            correct: AnswerChoice::A,
            topic: "Energy".to_string(),
        }];

        let analysis = service
            .analyze_student_performance("Asha", 1, 2, &wrong, 1)
            .await;
        assert_eq!(analysis.weak_topics, vec!["Energy"]);
        assert_eq!(analysis.strong_topics, vec!["Basic Concepts"]);
    }

    #[tokio::test]
    async fn test_keywords_empty_on_failure() {
        let service = service_replying(None);
        let keywords = service
            .extract_keywords("Energy", &["light makes sugar".to_string()])
            .await;
        assert!(keywords.is_empty());
    }

    #[tokio::test]
    async fn test_keywords_parsed() {
        let service = service_replying(Some("sunlight, glucose, chlorophyll"));
        let keywords = service
            .extract_keywords("Energy", &["light makes sugar".to_string()])
            .await;
        assert_eq!(keywords, vec!["sunlight", "glucose", "chlorophyll"]);
    }

    #[tokio::test]
    async fn test_text_operations_pass_through_completion() {
        let service = service_replying(Some("  Focus on the Calvin cycle.  "));
        let text = service.generate_remedial_content("Plants", "analysis").await;
        assert_eq!(text, "Focus on the Calvin cycle.");
    }

    #[tokio::test]
    async fn test_personalized_help_fallback_names_student() {
        let service = service_replying(None);
        let text = service.generate_personalized_help("Ravi", 0, 3, &[]).await;
        assert!(text.starts_with("PERSONAL MESSAGE:\nHi Ravi!"));
    }
}
