//! Parsers turning free-text completions into structured data
//!
//! Models do not follow the requested layout reliably, so every parser is
//! line-oriented and tolerant: unknown lines are skipped and incomplete
//! records are dropped rather than failing the whole response.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::enums::AnswerChoice;

/// Upper bound on keywords kept from one completion
pub const MAX_KEYWORDS: usize = 40;

/// Multiple choice question produced by generation or by a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerChoice,
    pub explanation: String,
    pub topic: String,
}

impl GeneratedQuestion {
    fn empty(question_text: String, topic: &str) -> Self {
        Self {
            question_text,
            option_a: String::new(),
            option_b: String::new(),
            option_c: String::new(),
            option_d: String::new(),
            correct_answer: AnswerChoice::A,
            explanation: String::new(),
            topic: topic.to_string(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.question_text.is_empty()
            && !self.option_a.is_empty()
            && !self.option_b.is_empty()
            && !self.option_c.is_empty()
            && !self.option_d.is_empty()
    }

    fn set_option(&mut self, choice: AnswerChoice, text: &str) {
        let slot = match choice {
            AnswerChoice::A => &mut self.option_a,
            AnswerChoice::B => &mut self.option_b,
            AnswerChoice::C => &mut self.option_c,
            AnswerChoice::D => &mut self.option_d,
        };
        *slot = text.trim().to_string();
    }
}

/// Weak/strong topics and study advice for one participant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PerformanceAnalysis {
    pub weak_topics: Vec<String>,
    pub strong_topics: Vec<String>,
    pub recommendations: String,
    pub reading_material: String,
}

/// Practice question tagged with its Bloom's taxonomy level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BloomQuestion {
    pub level: String,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerChoice,
    pub topic: String,
}

impl BloomQuestion {
    fn new(topic: &str) -> Self {
        Self {
            level: "Knowledge".to_string(),
            question_text: String::new(),
            option_a: String::new(),
            option_b: String::new(),
            option_c: String::new(),
            option_d: String::new(),
            correct_answer: AnswerChoice::A,
            topic: topic.to_string(),
        }
    }
}

/// `A) text` style option line
fn option_line(line: &str) -> Option<(AnswerChoice, &str)> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    if chars.next()? != ')' {
        return None;
    }
    let choice = AnswerChoice::from_str(&letter.to_string())?;
    Some((choice, &line[2..]))
}

/// `A) one B) two C) three D) four` on a single line
fn inline_options(line: &str) -> Option<[&str; 4]> {
    let a = line.find("A)")?;
    let b = a + line[a..].find("B)")?;
    let c = b + line[b..].find("C)")?;
    let d = c + line[c..].find("D)")?;

    Some([
        line[a + 2..b].trim(),
        line[b + 2..c].trim(),
        line[c + 2..d].trim(),
        line[d + 2..].trim(),
    ])
}

/// Value after the first `:` of a `Key: value` line
fn after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, v)| v.trim()).unwrap_or("")
}

/// Parse `Q1: ...` / `A) ...` / `Answer: B` / `Explanation: ...` blocks.
///
/// Questions missing any of the four options are dropped. An empty vector
/// means nothing usable was found.
pub fn parse_generated_questions(text: &str, topic: &str) -> Vec<GeneratedQuestion> {
    let mut questions = Vec::new();
    let mut current: Option<GeneratedQuestion> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('Q') && line.contains(':') {
            if let Some(done) = current.take() {
                questions.push(done);
            }
            let question_text = after_colon(line).to_string();
            current = Some(GeneratedQuestion::empty(question_text, topic));
            continue;
        }

        let Some(question) = current.as_mut() else {
            continue;
        };

        if line.contains("A)") && line.contains("B)") {
            if let Some(options) = inline_options(line) {
                for (choice, option) in AnswerChoice::all().iter().zip(options) {
                    question.set_option(*choice, option);
                }
            }
        } else if let Some((choice, option)) = option_line(line) {
            question.set_option(choice, option);
        } else if line.starts_with("Answer:") || line.starts_with("Correct:") {
            if let Some(choice) = AnswerChoice::parse_lenient(after_colon(line)) {
                question.correct_answer = choice;
            }
        } else if line.starts_with("Explanation:") {
            question.explanation = after_colon(line).to_string();
        }
    }

    if let Some(done) = current.take() {
        questions.push(done);
    }

    questions.retain(GeneratedQuestion::is_complete);
    questions
}

#[derive(Clone, Copy)]
enum AnalysisSection {
    Weak,
    Strong,
    Recommendations,
    Reading,
}

fn split_topics(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn append_text(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(line);
}

/// Parse `WEAK_TOPICS:` / `STRONG_TOPICS:` / `RECOMMENDATIONS:` /
/// `READING_MATERIAL:` sections. Lines following a header continue it.
///
/// Returns `None` when no section header appears at all.
pub fn parse_student_analysis(text: &str) -> Option<PerformanceAnalysis> {
    let mut analysis = PerformanceAnalysis::default();
    let mut section: Option<AnalysisSection> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix("WEAK_TOPICS:") {
            section = Some(AnalysisSection::Weak);
            analysis.weak_topics = split_topics(rest).collect();
        } else if let Some(rest) = line.strip_prefix("STRONG_TOPICS:") {
            section = Some(AnalysisSection::Strong);
            analysis.strong_topics = split_topics(rest).collect();
        } else if let Some(rest) = line.strip_prefix("RECOMMENDATIONS:") {
            section = Some(AnalysisSection::Recommendations);
            analysis.recommendations = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("READING_MATERIAL:") {
            section = Some(AnalysisSection::Reading);
            analysis.reading_material = rest.trim().to_string();
        } else {
            match section {
                Some(AnalysisSection::Weak) => analysis.weak_topics.extend(split_topics(line)),
                Some(AnalysisSection::Strong) => analysis.strong_topics.extend(split_topics(line)),
                Some(AnalysisSection::Recommendations) => {
                    append_text(&mut analysis.recommendations, line)
                }
                Some(AnalysisSection::Reading) => append_text(&mut analysis.reading_material, line),
                None => {}
            }
        }
    }

    section.map(|_| analysis)
}

/// Parse Bloom's taxonomy blocks.
///
/// Blocks are separated by `---` lines, or start with a `Level:` line once the
/// current block already holds a question.
pub fn parse_bloom_questions(text: &str, topic: &str) -> Vec<BloomQuestion> {
    let mut questions = Vec::new();
    let mut current = BloomQuestion::new(topic);

    let flush = |current: &mut BloomQuestion, questions: &mut Vec<BloomQuestion>| {
        let done = std::mem::replace(current, BloomQuestion::new(topic));
        if !done.question_text.is_empty() {
            questions.push(done);
        }
    };

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("---") {
            flush(&mut current, &mut questions);
        } else if let Some(level) = line.strip_prefix("Level:") {
            if !current.question_text.is_empty() {
                flush(&mut current, &mut questions);
            }
            current.level = level.trim().to_string();
        } else if let Some(question) = line.strip_prefix("Q:") {
            current.question_text = question.trim().to_string();
        } else if let Some(answer) = line.strip_prefix("Correct:") {
            if let Some(choice) = AnswerChoice::parse_lenient(answer) {
                current.correct_answer = choice;
            }
        } else if let Some((choice, option)) = option_line(line) {
            let option = option.trim().to_string();
            match choice {
                AnswerChoice::A => current.option_a = option,
                AnswerChoice::B => current.option_b = option,
                AnswerChoice::C => current.option_c = option,
                AnswerChoice::D => current.option_d = option,
            }
        }
    }
    flush(&mut current, &mut questions);

    questions
}

/// Comma or newline separated keyword list
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(|k| k.trim().trim_start_matches(['-', '*']).trim())
        .filter(|k| k.chars().count() > 1)
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separate_option_lines() {
        let text = "\
Q1: What do plants absorb for photosynthesis?
A) Oxygen
B) Carbon dioxide
C) Nitrogen
D) Helium
Answer: B
Explanation: Plants take in CO2 through their stomata.

Q2: Where does photosynthesis happen?
A) Mitochondria
B) Nucleus
C) Chloroplast
D) Ribosome
Correct: c";

        let questions = parse_generated_questions(text, "Biology");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].option_b, "Carbon dioxide");
        assert_eq!(questions[0].correct_answer, AnswerChoice::B);
        assert_eq!(questions[0].explanation, "Plants take in CO2 through their stomata.");
        assert_eq!(questions[1].correct_answer, AnswerChoice::C);
        assert_eq!(questions[1].topic, "Biology");
    }

    #[test]
    fn test_parse_inline_options() {
        let text = "Q1: Pick the noble gas\nA) Helium B) Iron C) Sodium D) Carbon\nAnswer: A";
        let questions = parse_generated_questions(text, "Chemistry");

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].option_a, "Helium");
        assert_eq!(questions[0].option_c, "Sodium");
        assert_eq!(questions[0].option_d, "Carbon");
    }

    #[test]
    fn test_incomplete_questions_dropped() {
        let text = "Q1: Missing options\nA) one\nB) two\nAnswer: A\nQ2: Complete\nA) 1\nB) 2\nC) 3\nD) 4";
        let questions = parse_generated_questions(text, "");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "Complete");
        // Answer defaults to A when none is given
        assert_eq!(questions[0].correct_answer, AnswerChoice::A);
    }

    #[test]
    fn test_unstructured_text_yields_nothing() {
        assert!(parse_generated_questions("Sorry, I cannot help with that.", "x").is_empty());
    }

    #[test]
    fn test_parse_student_analysis_with_continuations() {
        let text = "\
WEAK_TOPICS: Light reactions, Calvin cycle
Stomata
STRONG_TOPICS: Chlorophyll
RECOMMENDATIONS: Review the light reactions.
Draw the cycle from memory.
READING_MATERIAL: Chapter 8";

        let analysis = parse_student_analysis(text).unwrap();
        assert_eq!(analysis.weak_topics, vec!["Light reactions", "Calvin cycle", "Stomata"]);
        assert_eq!(analysis.strong_topics, vec!["Chlorophyll"]);
        assert_eq!(
            analysis.recommendations,
            "Review the light reactions. Draw the cycle from memory."
        );
        assert_eq!(analysis.reading_material, "Chapter 8");
    }

    #[test]
    fn test_parse_student_analysis_without_sections() {
        assert!(parse_student_analysis("Great job overall!").is_none());
    }

    #[test]
    fn test_parse_bloom_level_started_blocks() {
        let text = "\
Level: Knowledge
Q: What is osmosis?
A) Diffusion of water
B) Cell division
C) Respiration
D) Digestion
Correct: A

Level: Application
Q: When would osmosis matter in cooking?
A) Boiling
B) Salting vegetables
C) Freezing
D) Grilling
Correct: B";

        let questions = parse_bloom_questions(text, "Osmosis");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].level, "Knowledge");
        assert_eq!(questions[1].level, "Application");
        assert_eq!(questions[1].correct_answer, AnswerChoice::B);
        assert_eq!(questions[1].option_b, "Salting vegetables");
    }

    #[test]
    fn test_parse_bloom_dash_separated() {
        let text = "Q: First?\nA) a\nCorrect: D\n---\nLevel: Understanding\nQ: Second?\n---\nno question here";
        let questions = parse_bloom_questions(text, "T");

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].level, "Knowledge");
        assert_eq!(questions[0].correct_answer, AnswerChoice::D);
        assert_eq!(questions[1].level, "Understanding");
    }

    #[test]
    fn test_parse_keywords() {
        let keywords = parse_keywords("photosynthesis, light energy\n- chlorophyll, a, ,glucose");
        assert_eq!(
            keywords,
            vec!["photosynthesis", "light energy", "chlorophyll", "glucose"]
        );

        let many = (0..60).map(|i| format!("kw{}", i)).collect::<Vec<_>>().join(",");
        assert_eq!(parse_keywords(&many).len(), MAX_KEYWORDS);
    }
}
