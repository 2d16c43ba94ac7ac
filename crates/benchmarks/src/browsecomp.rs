//! BrowseComp+: comprehension across the sections of a longer document.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

use crate::benchmark::{filler, pick, word_overlap, Benchmark, Evaluation, TestCase};

/// Rough size of one section in tokens.
const TOKENS_PER_SECTION: usize = 30;
const MIN_SECTIONS: usize = 3;
const DETAILS_PER_SECTION: usize = 3;

/// A reply is correct above this score.
const CORRECT_THRESHOLD: f64 = 0.7;

/// Words longer than this count as key terms.
const KEY_TERM_MIN_CHARS: usize = 5;

const SECTIONS: [(&str, &str); 6] = [
    ("Introduction", "This document provides comprehensive information about the topic. It covers various aspects and details."),
    ("Background", "The historical context is important for understanding the current state of affairs."),
    ("Methodology", "The approach used involves systematic analysis and careful consideration of all factors."),
    ("Results", "The findings indicate significant progress in the field with measurable improvements."),
    ("Discussion", "These results have important implications for future research and development."),
    ("Conclusion", "In summary, the work demonstrates clear advancement in the domain."),
];

/// Question and the phrase that locates its answer section.
const QUESTIONS: [(&str, &str); 4] = [
    ("What is the main topic?", "the topic"),
    ("What does the methodology involve?", "systematic analysis"),
    ("What do the results indicate?", "significant progress"),
    ("What are the implications?", "future research"),
];

const DETAIL_FILLER: [&str; 5] = [
    "Additional details are provided in this section.",
    "More information follows in the subsequent paragraphs.",
    "Further explanations clarify the concepts discussed.",
    "The section continues with relevant information.",
    "Additional context is included for completeness.",
];

/// Sections are drawn in random order; the expected answer is the text of
/// the section the question points at, or a section fact when that section
/// was not drawn.
pub struct BrowseComp;

impl Benchmark for BrowseComp {
    fn name(&self) -> &str {
        "browsecomp"
    }

    fn description(&self) -> &str {
        "Tests ability to browse and comprehend information across long documents"
    }

    fn generate_test_case(&self, context_length: usize, rng: &mut StdRng) -> TestCase {
        let num_sections = (context_length / TOKENS_PER_SECTION).clamp(MIN_SECTIONS, SECTIONS.len());

        let mut sections: Vec<(&str, &str)> = SECTIONS.to_vec();
        sections.shuffle(rng);
        sections.truncate(num_sections);

        let mut facts = Vec::with_capacity(sections.len());
        let parts: Vec<String> = sections
            .iter()
            .enumerate()
            .map(|(i, (title, content))| {
                let fact = format!(
                    "Section {} contains important information about {}.",
                    i + 1,
                    title.to_lowercase()
                );
                let details = filler(&DETAIL_FILLER, DETAILS_PER_SECTION, rng).join(" ");
                let text = format!("{title}\n{content} {fact} {details}");
                facts.push(fact);
                text
            })
            .collect();

        let (question, locator) = *pick(&QUESTIONS, rng);
        let expected_answer = sections
            .iter()
            .find(|(_, content)| content.to_lowercase().contains(locator))
            .map(|(_, content)| content.to_string())
            .unwrap_or_else(|| pick(&facts, rng).clone());

        let mut metadata = Map::new();
        metadata.insert("num_sections".into(), sections.len().into());
        metadata.insert(
            "sections".into(),
            Value::Array(sections.iter().map(|(title, _)| Value::from(*title)).collect()),
        );

        TestCase {
            context: parts.join("\n\n"),
            question: question.into(),
            expected_answer,
            metadata,
        }
    }

    /// Best of plain word overlap and a discounted key-term hit rate.
    fn evaluate(&self, response: &str, expected: &str) -> Evaluation {
        let response_lower = response.trim().to_lowercase();
        let expected_lower = expected.trim().to_lowercase();

        let overlap = word_overlap(&response_lower, &expected_lower);

        let mut key_terms: Vec<&str> = expected_lower
            .split_whitespace()
            .filter(|w| w.chars().count() >= KEY_TERM_MIN_CHARS)
            .collect();
        key_terms.sort_unstable();
        key_terms.dedup();
        let term_score = if key_terms.is_empty() {
            0.0
        } else {
            let found = key_terms.iter().filter(|t| response_lower.contains(*t)).count();
            found as f64 / key_terms.len() as f64
        };

        let score = overlap.max(term_score * 0.8);
        Evaluation::new(score > CORRECT_THRESHOLD, score)
            .with_detail("word_overlap", overlap)
            .with_detail("term_score", term_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn section_count_follows_length() {
        let mut rng = StdRng::seed_from_u64(5);
        let long = BrowseComp.generate_test_case(1000, &mut rng);
        assert_eq!(long.metadata["num_sections"], 6);
        assert_eq!(long.context.split("\n\n").count(), 6);

        let short = BrowseComp.generate_test_case(10, &mut rng);
        assert_eq!(short.metadata["num_sections"], MIN_SECTIONS);
        assert_eq!(short.context.split("\n\n").count(), 3);
    }

    #[test]
    fn expected_answer_appears_in_the_document() {
        let mut rng = StdRng::seed_from_u64(9);
        for length in [10, 100, 1000] {
            let case = BrowseComp.generate_test_case(length, &mut rng);
            assert!(
                case.context.contains(&case.expected_answer),
                "{:?} not in document",
                case.expected_answer
            );
            assert!(QUESTIONS.iter().any(|(q, _)| *q == case.question));
        }
    }

    #[test]
    fn all_sections_drawn_answer_from_the_located_section() {
        let mut rng = StdRng::seed_from_u64(2);
        let case = BrowseComp.generate_test_case(1000, &mut rng);
        let (_, locator) = QUESTIONS.iter().find(|(q, _)| *q == case.question).unwrap();
        assert!(case.expected_answer.to_lowercase().contains(locator));
    }

    #[test]
    fn evaluate_combines_overlap_and_key_terms() {
        let expected = SECTIONS[2].1;

        let verbatim = BrowseComp.evaluate(expected, expected);
        assert!(verbatim.correct);
        assert_eq!(verbatim.score, 1.0);

        let gist = BrowseComp.evaluate(
            "Systematic analysis with careful consideration of factors",
            expected,
        );
        assert!(gist.score > 0.0 && gist.score < 1.0);
        assert!(!gist.correct);

        let miss = BrowseComp.evaluate("no idea", expected);
        assert_eq!(miss.score, 0.0);
        assert!(!miss.correct);
    }
}
