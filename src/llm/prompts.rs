//! Prompt builders for every LLM operation

use super::service::{MistakeRecord, WrongAnswer};
use super::{truncate_chars, ChatRequest};

pub const QUESTION_SOURCE_CHARS: usize = 1000;
pub const BLOOM_CONTEXT_CHARS: usize = 500;
pub const KEYWORD_ANSWER_CHARS: usize = 300;
pub const KEYWORD_MAX_ANSWERS: usize = 20;
pub const ANALYSIS_MAX_WRONG: usize = 5;
pub const MISTAKE_MAX_RECORDS: usize = 10;
pub const REMEDIAL_ANALYSIS_CHARS: usize = 1000;

fn score_line(score: i32, total: i32) -> String {
    let percentage = if total > 0 {
        f64::from(score) / f64::from(total) * 100.0
    } else {
        0.0
    };
    format!("{}/{} ({:.1}%)", score, total, percentage)
}

pub fn question_generation(text: &str, num_questions: usize, topic: &str) -> ChatRequest {
    let user = format!(
        "Create {n} multiple choice quiz questions about {topic}.

Text content: {text}

Please format each question exactly like this:

Q1: What is the main concept in {topic}?
A) First option
B) Second option
C) Third option
D) Fourth option
Answer: A
Explanation: Brief explanation of why A is correct and why other options are wrong.

Q2: Which statement about {topic} is correct?
A) First option
B) Second option
C) Third option
D) Fourth option
Answer: B
Explanation: Brief explanation of why B is correct and what makes it the best choice.

Generate {n} questions now with detailed explanations:",
        n = num_questions,
        topic = topic,
        text = truncate_chars(text, QUESTION_SOURCE_CHARS),
    );

    ChatRequest::new(
        "You are a quiz generator. Create clear, educational multiple choice questions based on the given text.",
        user,
    )
}

pub fn student_analysis(
    student_name: &str,
    score: i32,
    total: i32,
    wrong_answers: &[WrongAnswer],
    correct_count: usize,
) -> ChatRequest {
    let wrong_lines = wrong_answers
        .iter()
        .take(ANALYSIS_MAX_WRONG)
        .map(|w| format!("- {} (Student chose: {}, Correct: {})", w.question, w.selected, w.correct))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Analyze this student's quiz performance and provide personalized learning recommendations:

Student: {name}
Score: {score}

Wrong Answers:
{wrong}

Correct Answers: {correct} questions answered correctly

Please provide a detailed analysis in this exact format:

WEAK_TOPICS: topic1, topic2, topic3
STRONG_TOPICS: topic1, topic2, topic3
RECOMMENDATIONS: Specific study recommendations based on mistakes
READING_MATERIAL: Suggested topics and materials to focus on for improvement",
        name = student_name,
        score = score_line(score, total),
        wrong = wrong_lines,
        correct = correct_count,
    );

    ChatRequest::new(
        "You are an educational analyst. Analyze student quiz performance and provide personalized learning recommendations.",
        user,
    )
    .max_tokens(800)
    .timeout_secs(15)
}

pub fn bloom_questions(topic: &str, reading_material: &str) -> ChatRequest {
    let user = format!(
        "Generate 3 educational questions about {topic} based on Bloom's Taxonomy levels:

Topic: {topic}
Context: {context}

Create questions at these levels:
1. Knowledge/Remembering: Tests recall of facts
2. Understanding/Comprehension: Tests understanding of concepts
3. Application: Tests ability to apply knowledge

Format each question exactly like this:

Level: Knowledge
Q: What is the definition of [concept]?
A) Option A
B) Option B
C) Option C
D) Option D
Correct: A

Level: Understanding
Q: How does [concept] work?
A) Option A
B) Option B
C) Option C
D) Option D
Correct: B

Level: Application
Q: When would you use [concept]?
A) Option A
B) Option B
C) Option C
D) Option D
Correct: C",
        topic = topic,
        context = truncate_chars(reading_material, BLOOM_CONTEXT_CHARS),
    );

    ChatRequest::new(
        "You are an educational expert. Create questions based on Bloom's Taxonomy levels to help students learn effectively.",
        user,
    )
    .timeout_secs(15)
}

pub fn keyword_extraction(topic: &str, answers: &[String]) -> ChatRequest {
    let sample = answers
        .iter()
        .take(KEYWORD_MAX_ANSWERS)
        .map(|a| format!("- {}", truncate_chars(a, KEYWORD_ANSWER_CHARS)))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Extract the most important keywords and key phrases (single or multi-word) that represent core ideas and terminology from the following student answers about {topic}.

Return them as a comma-separated list, most important first, 15-30 items total. Avoid common stopwords. Group similar terms as one phrase.

Answers:
{sample}
",
        topic = topic,
        sample = sample,
    );

    ChatRequest::new(
        "You are an NLP assistant that extracts keywords and keyphrases.",
        user,
    )
    .max_tokens(500)
    .temperature(0.3)
    .timeout_secs(15)
}

pub fn mistake_analysis(quiz_title: &str, mistakes: &[MistakeRecord]) -> ChatRequest {
    let summary = mistakes
        .iter()
        .take(MISTAKE_MAX_RECORDS)
        .map(|m| {
            format!(
                "Student {}: Question '{}' - Selected '{}' instead of '{}'",
                m.student, m.question, m.selected_text, m.correct_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "As an educational analyst, analyze the common mistakes students made in this quiz and provide insights for the teacher.

Quiz: {title}
Total Students: {students}
Total Mistakes: {total}

Student Mistakes:
{summary}

Please provide a comprehensive analysis in this format:

COMMON PATTERNS:
- List the most common types of mistakes
- Identify conceptual misunderstandings
- Note any recurring wrong answer choices

LEARNING GAPS:
- What concepts do students struggle with most?
- Which topics need more emphasis in teaching?

TEACHING RECOMMENDATIONS:
- Specific suggestions for addressing these mistakes
- Teaching strategies to prevent similar errors
- Areas to focus on in future lessons

STUDENT SUPPORT:
- How can students be helped to overcome these specific mistakes?
- What additional practice or resources would be beneficial?

Provide detailed, actionable insights for the teacher.",
        title = quiz_title,
        students = super::templates::distinct_students(mistakes),
        total = mistakes.len(),
        summary = summary,
    );

    ChatRequest::new(
        "You are an educational analyst helping teachers understand student learning patterns and mistakes.",
        user,
    )
    .max_tokens(1200)
}

pub fn remedial_content(quiz_title: &str, mistake_analysis: &str) -> ChatRequest {
    let user = format!(
        "Based on the mistake analysis from a quiz about {title}, create educational content to help students learn and improve.

Teacher's Mistake Analysis:
{analysis}

Create comprehensive learning content for students that includes:

UNDERSTANDING YOUR MISTAKES:
- Explain common misconceptions in simple terms
- Help students understand why certain answers were wrong
- Build confidence by showing mistakes are part of learning

KEY CONCEPTS TO REVIEW:
- List the most important concepts students should focus on
- Provide clear, simple explanations of difficult topics
- Use examples and analogies to make concepts clearer

STUDY STRATEGIES:
- Specific study techniques for this subject
- How to approach similar questions in the future
- Tips for better understanding and retention

PRACTICE RECOMMENDATIONS:
- What types of practice would be most helpful
- Areas to focus extra attention on
- How to build stronger foundations

MOTIVATION & ENCOURAGEMENT:
- Positive messaging about learning from mistakes
- Encouragement to keep practicing and improving
- Growth mindset reminders

Write this in an encouraging, supportive tone that helps students see mistakes as learning opportunities.",
        title = quiz_title,
        analysis = truncate_chars(mistake_analysis, REMEDIAL_ANALYSIS_CHARS),
    );

    ChatRequest::new(
        "You are a supportive educational tutor creating helpful learning content for students who made mistakes on a quiz.",
        user,
    )
    .max_tokens(1500)
}

pub fn personalized_help(
    student_name: &str,
    score: i32,
    total: i32,
    mistakes: &[MistakeRecord],
) -> ChatRequest {
    let details = mistakes
        .iter()
        .map(|m| {
            format!(
                "Question: {}\nYour answer: {}\nCorrect answer: {}",
                m.question, m.selected_text, m.correct_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Create personalized learning content for a student who needs help improving their understanding.

Student: {name}
Quiz Score: {score}

Specific Mistakes Made:
{details}

Create encouraging, personalized content that includes:

PERSONAL MESSAGE:
- Address the student by name
- Acknowledge their effort and progress
- Encourage them about their learning journey

YOUR SPECIFIC MISTAKES:
- Explain each mistake in simple, clear terms
- Help them understand why their chosen answers were incorrect
- Show them the reasoning behind the correct answers

CONCEPTS TO FOCUS ON:
- Identify the key concepts they need to review
- Provide clear explanations of these concepts
- Suggest specific study approaches

NEXT STEPS:
- Concrete actions they can take to improve
- Study strategies tailored to their mistakes
- Resources or practice they should focus on

ENCOURAGEMENT:
- Motivational message about growth and learning
- Remind them that mistakes lead to better understanding
- Boost their confidence for future learning

Write in a warm, supportive, and encouraging tone as if you're a caring tutor speaking directly to {name}.",
        name = student_name,
        score = score_line(score, total),
        details = details,
    );

    ChatRequest::new(
        format!(
            "You are a caring, supportive tutor creating personalized learning content for {}. Be encouraging and helpful.",
            student_name
        ),
        user,
    )
    .max_tokens(1200)
    .temperature(0.8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::enums::AnswerChoice;

    #[test]
    fn test_question_prompt_truncates_source() {
        let text = "x".repeat(5000);
        let req = question_generation(&text, 3, "Loops");

        assert!(req.user.starts_with("Create 3 multiple choice quiz questions about Loops."));
        assert!(req.user.contains(&"x".repeat(QUESTION_SOURCE_CHARS)));
        assert!(!req.user.contains(&"x".repeat(QUESTION_SOURCE_CHARS + 1)));
        assert_eq!(req.max_tokens, 1000);
    }

    #[test]
    fn test_keyword_prompt_limits_answers() {
        let answers: Vec<String> = (0..30).map(|i| format!("answer-{}", i)).collect();
        let req = keyword_extraction("Energy", &answers);

        assert!(req.user.contains("- answer-19"));
        assert!(!req.user.contains("- answer-20"));
        assert_eq!(req.temperature, 0.3);
    }

    #[test]
    fn test_analysis_prompt_shows_score_and_first_five_mistakes() {
        let wrong: Vec<WrongAnswer> = (0..7)
            .map(|i| WrongAnswer {
                question: format!("question {}", i),
                selected: AnswerChoice::C,
                correct: AnswerChoice::A,
                topic: "General".to_string(),
            })
            .collect();

        let req = student_analysis("Asha", 3, 10, &wrong, 3);
        assert!(req.user.contains("Score: 3/10 (30.0%)"));
        assert!(req.user.contains("- question 4 (Student chose: C, Correct: A)"));
        assert!(!req.user.contains("question 5"));
        assert_eq!(req.max_tokens, 800);
    }

    #[test]
    fn test_score_line_with_no_questions() {
        assert_eq!(score_line(0, 0), "0/0 (0.0%)");
    }
}
