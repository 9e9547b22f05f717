//! Deterministic content used when no provider produced a usable answer

use super::parser::{BloomQuestion, GeneratedQuestion, PerformanceAnalysis};
use super::service::{MistakeRecord, WrongAnswer};
use crate::database::enums::AnswerChoice;

/// Source text shorter than this gets the generic question set
const TEXT_AWARE_MIN_CHARS: usize = 50;

fn question(
    topic: &str,
    text: String,
    options: [&str; 4],
    explanation: &str,
) -> GeneratedQuestion {
    let [a, b, c, d] = options;
    GeneratedQuestion {
        question_text: text,
        option_a: a.to_string(),
        option_b: b.to_string(),
        option_c: c.to_string(),
        option_d: d.to_string(),
        correct_answer: AnswerChoice::A,
        explanation: explanation.to_string(),
        topic: topic.to_string(),
    }
}

/// Template questions about `topic`; five when `text` is substantial, else three.
/// At most `num_questions` are returned.
pub fn fallback_questions(text: &str, num_questions: usize, topic: &str) -> Vec<GeneratedQuestion> {
    let mut questions = if text.chars().count() > TEXT_AWARE_MIN_CHARS {
        vec![
            question(
                topic,
                format!("What is the main focus of the text about {}?", topic),
                [
                    "Basic concepts and definitions",
                    "Advanced theoretical applications",
                    "Historical development only",
                    "Future research directions",
                ],
                "Educational texts typically start with basic concepts and definitions.",
            ),
            question(
                topic,
                format!("Which approach is most effective for understanding {}?", topic),
                [
                    "Step-by-step learning with practice",
                    "Memorizing all formulas",
                    "Reading advanced papers first",
                    "Skipping fundamental concepts",
                ],
                "Step-by-step learning with practice builds solid understanding.",
            ),
            question(
                topic,
                format!("What is a key characteristic of {}?", topic),
                [
                    "It builds on foundational principles",
                    "It requires no prior knowledge",
                    "It is purely theoretical",
                    "It has no practical applications",
                ],
                "Most academic subjects build on foundational principles.",
            ),
            question(
                topic,
                format!("When studying {}, what should be prioritized?", topic),
                [
                    "Understanding core concepts first",
                    "Memorizing complex formulas",
                    "Learning advanced topics only",
                    "Focusing on exceptions",
                ],
                "Core concepts provide the foundation for advanced understanding.",
            ),
            question(
                topic,
                format!("What makes {} important to study?", topic),
                [
                    "It provides fundamental knowledge",
                    "It is easy to master",
                    "It requires no practice",
                    "It has no real-world relevance",
                ],
                "Academic subjects typically provide fundamental knowledge.",
            ),
        ]
    } else {
        vec![
            question(
                topic,
                format!("What is the main concept discussed in {}?", topic),
                [
                    "Basic principles and fundamentals",
                    "Advanced techniques only",
                    "Historical background",
                    "Future predictions",
                ],
                "The main concept typically covers basic principles and fundamentals.",
            ),
            question(
                topic,
                format!("Which of the following is most important when learning {}?", topic),
                [
                    "Understanding core concepts",
                    "Memorizing details",
                    "Speed of completion",
                    "Advanced tools",
                ],
                "Understanding core concepts is fundamental to learning any topic.",
            ),
            question(
                topic,
                format!("What approach is recommended for mastering {}?", topic),
                [
                    "Practice and application",
                    "Reading only",
                    "Watching videos only",
                    "Theoretical study only",
                ],
                "Practice and application help reinforce learning.",
            ),
        ]
    };

    questions.truncate(num_questions);
    questions
}

/// Analysis built from the topics of wrong answers alone
pub fn fallback_analysis(wrong_answers: &[WrongAnswer], correct_count: usize) -> PerformanceAnalysis {
    let mut weak_topics: Vec<String> = Vec::new();
    for wrong in wrong_answers {
        if !weak_topics.contains(&wrong.topic) {
            weak_topics.push(wrong.topic.clone());
        }
    }
    weak_topics.truncate(3);

    let joined = weak_topics.join(", ");
    PerformanceAnalysis {
        recommendations: format!(
            "Focus on reviewing the topics where you had incorrect answers. Practice more questions in these areas: {}.",
            joined
        ),
        reading_material: format!(
            "Review materials related to: {}. Practice additional exercises and seek clarification on concepts you found challenging.",
            joined
        ),
        weak_topics,
        strong_topics: if correct_count > 0 {
            vec!["Basic Concepts".to_string()]
        } else {
            Vec::new()
        },
    }
}

fn bloom(level: &str, topic: &str, text: String, options: [&str; 4]) -> BloomQuestion {
    let [a, b, c, d] = options;
    BloomQuestion {
        level: level.to_string(),
        question_text: text,
        option_a: a.to_string(),
        option_b: b.to_string(),
        option_c: c.to_string(),
        option_d: d.to_string(),
        correct_answer: AnswerChoice::A,
        topic: topic.to_string(),
    }
}

pub fn fallback_bloom_questions(topic: &str) -> Vec<BloomQuestion> {
    vec![
        bloom(
            "Knowledge",
            topic,
            format!("What is the definition of {}?", topic),
            [
                "A fundamental concept in the subject area",
                "An advanced technique",
                "A historical reference",
                "A future prediction",
            ],
        ),
        bloom(
            "Comprehension",
            topic,
            format!("How would you explain {} to someone new to the subject?", topic),
            [
                "By providing examples and analogies",
                "By giving complex formulas",
                "By showing advanced applications",
                "By discussing history only",
            ],
        ),
        bloom(
            "Application",
            topic,
            format!("In what situation would you apply knowledge of {}?", topic),
            [
                "When solving practical problems",
                "Only in theoretical discussions",
                "Never in real situations",
                "Only in advanced research",
            ],
        ),
    ]
}

/// Number of distinct students behind a list of mistakes
pub fn distinct_students(mistakes: &[MistakeRecord]) -> usize {
    let mut students: Vec<&str> = mistakes.iter().map(|m| m.student.as_str()).collect();
    students.sort_unstable();
    students.dedup();
    students.len()
}

pub fn fallback_mistake_analysis(quiz_title: &str, mistakes: &[MistakeRecord]) -> String {
    format!(
        "COMMON PATTERNS:
- Students made {} mistakes across {} participants
- Most common mistake patterns need further analysis

LEARNING GAPS:
- Concepts related to {} need reinforcement
- Students show confusion in multiple choice selection

TEACHING RECOMMENDATIONS:
- Review the topics covered in this quiz
- Provide additional practice exercises
- Consider different teaching approaches for difficult concepts

STUDENT SUPPORT:
- Offer remedial sessions for students who scored low
- Provide additional resources and practice materials",
        mistakes.len(),
        distinct_students(mistakes),
        quiz_title
    )
}

pub fn fallback_remedial_content(quiz_title: &str) -> String {
    format!(
        "UNDERSTANDING YOUR MISTAKES:
Learning from mistakes is a natural part of the educational process. The errors made in this {title} quiz provide valuable opportunities to strengthen your understanding.

KEY CONCEPTS TO REVIEW:
- Review the fundamental concepts of {title}
- Focus on areas where you had difficulty
- Make sure you understand the reasoning behind correct answers

STUDY STRATEGIES:
- Review your notes and textbook materials
- Practice similar questions to reinforce learning
- Ask questions when concepts are unclear

PRACTICE RECOMMENDATIONS:
- Work through additional practice problems
- Focus extra attention on challenging topics
- Seek help from teachers or tutors when needed

MOTIVATION & ENCOURAGEMENT:
Remember that making mistakes is how we learn and grow. Each error is a step toward better understanding. Keep practicing and stay positive about your learning journey!",
        title = quiz_title
    )
}

pub fn fallback_personalized_help(student_name: &str) -> String {
    format!(
        "PERSONAL MESSAGE:
Hi {}! I've reviewed your quiz performance and want to help you improve your understanding.

YOUR SPECIFIC MISTAKES:
You made some errors that are actually common learning opportunities. Let's review them together to strengthen your knowledge.

CONCEPTS TO FOCUS ON:
Based on your quiz results, focus on reviewing the core concepts and practicing similar problems.

NEXT STEPS:
- Review the topics where you had difficulty
- Practice additional questions in these areas
- Don't hesitate to ask for help when needed

ENCOURAGEMENT:
You're on the right track! Every mistake is a step toward better understanding. Keep practicing and stay positive about your learning journey.",
        student_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrong(topic: &str) -> WrongAnswer {
        WrongAnswer {
            question: "q".to_string(),
            selected: AnswerChoice::B,
            correct: AnswerChoice::A,
            topic: topic.to_string(),
        }
    }

    #[test]
    fn test_fallback_question_sets() {
        let long_text = "Photosynthesis converts light energy into chemical energy in plants.";
        assert_eq!(fallback_questions(long_text, 10, "Biology").len(), 5);
        assert_eq!(fallback_questions("short", 10, "Biology").len(), 3);
        assert_eq!(fallback_questions(long_text, 2, "Biology").len(), 2);

        let q = &fallback_questions("", 1, "Cells")[0];
        assert_eq!(q.question_text, "What is the main concept discussed in Cells?");
        assert_eq!(q.correct_answer, AnswerChoice::A);
    }

    #[test]
    fn test_fallback_analysis_topics() {
        let wrongs = vec![wrong("Cells"), wrong("Energy"), wrong("Cells"), wrong("DNA"), wrong("Ions")];
        let analysis = fallback_analysis(&wrongs, 2);

        assert_eq!(analysis.weak_topics, vec!["Cells", "Energy", "DNA"]);
        assert_eq!(analysis.strong_topics, vec!["Basic Concepts"]);
        assert!(analysis.recommendations.ends_with("in these areas: Cells, Energy, DNA."));

        assert!(fallback_analysis(&wrongs, 0).strong_topics.is_empty());
    }

    #[test]
    fn test_fallback_mistake_analysis_counts_students() {
        let mistakes = vec![
            MistakeRecord {
                student: "Asha".to_string(),
                question: "q1".to_string(),
                selected_text: "x".to_string(),
                correct_text: "y".to_string(),
            },
            MistakeRecord {
                student: "Asha".to_string(),
                question: "q2".to_string(),
                selected_text: "x".to_string(),
                correct_text: "y".to_string(),
            },
        ];

        let text = fallback_mistake_analysis("Cells", &mistakes);
        assert!(text.contains("Students made 2 mistakes across 1 participants"));
        assert!(text.contains("Concepts related to Cells need reinforcement"));
    }

    #[test]
    fn test_fallback_bloom_levels() {
        let levels: Vec<_> = fallback_bloom_questions("DNA").into_iter().map(|q| q.level).collect();
        assert_eq!(levels, vec!["Knowledge", "Comprehension", "Application"]);
    }
}
