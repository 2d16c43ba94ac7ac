//! Needle in a haystack: find one planted code in a long run of filler.

use rand::Rng;
use rand::rngs::StdRng;
use serde_json::Map;

use crate::benchmark::{pick, Benchmark, Evaluation, Placement, TestCase};

const QUESTION: &str = "What is the special code mentioned in the text?";
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 8;

/// Rough size of one haystack sentence in tokens.
const TOKENS_PER_SENTENCE: usize = 50;
const MIN_SENTENCES: usize = 10;

const HAYSTACK: [&str; 10] = [
    "This is a sample sentence for context generation.",
    "The weather today is quite pleasant and sunny.",
    "Machine learning models require extensive training data.",
    "Rust is a systems programming language with a strict borrow checker.",
    "Context windows are crucial for language models.",
    "Natural language processing enables many applications.",
    "Deep learning has revolutionized artificial intelligence.",
    "Data structures are fundamental to computer science.",
    "Algorithms help solve complex computational problems.",
    "Software engineering practices improve code quality.",
];

pub struct NeedleInHaystack {
    placement: Placement,
}

impl NeedleInHaystack {
    /// Needle at a random position.
    pub fn new() -> Self {
        Self::with_placement(Placement::Random)
    }

    pub fn with_placement(placement: Placement) -> Self {
        Self { placement }
    }

    fn code(rng: &mut StdRng) -> String {
        (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for NeedleInHaystack {
    fn default() -> Self {
        Self::new()
    }
}

impl Benchmark for NeedleInHaystack {
    fn name(&self) -> &str {
        "needle_in_haystack"
    }

    fn description(&self) -> &str {
        "Tests ability to find specific information in very long contexts"
    }

    fn generate_test_case(&self, context_length: usize, rng: &mut StdRng) -> TestCase {
        let code = Self::code(rng);
        let needle = format!("The special code is: {code}");

        let num_sentences = (context_length / TOKENS_PER_SENTENCE).max(MIN_SENTENCES);
        let needle_at = self.placement.resolve(num_sentences, rng);

        let context = (0..num_sentences)
            .map(|i| {
                if i == needle_at {
                    needle.clone()
                } else {
                    pick(&HAYSTACK, rng).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut metadata = Map::new();
        metadata.insert("needle".into(), needle.into());
        metadata.insert("needle_position".into(), self.placement.as_str().into());
        metadata.insert("num_sentences".into(), num_sentences.into());

        TestCase {
            context,
            question: QUESTION.into(),
            expected_answer: code,
            metadata,
        }
    }

    /// Full code anywhere in the reply scores 1.0; any of its characters
    /// scores 0.5.
    fn evaluate(&self, response: &str, expected: &str) -> Evaluation {
        let response = response.to_uppercase();
        let expected = expected.to_uppercase();

        let exact = response.contains(&expected);
        let any_char = expected.chars().any(|c| response.contains(c));

        let score = if exact {
            1.0
        } else if any_char {
            0.5
        } else {
            0.0
        };

        Evaluation::new(exact, score).with_detail("partial_match", any_char && !exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn code_is_eight_uppercase_alphanumerics() {
        let case = NeedleInHaystack::new().generate_test_case(1000, &mut rng());
        assert_eq!(case.expected_answer.len(), CODE_LEN);
        assert!(case
            .expected_answer
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(case.question, QUESTION);
        assert_eq!(
            case.context.matches("The special code is:").count(),
            1,
            "exactly one needle"
        );
    }

    #[test]
    fn sentence_count_scales_with_length() {
        let bench = NeedleInHaystack::new();
        let case = bench.generate_test_case(1000, &mut rng());
        assert_eq!(case.metadata["num_sentences"], 20);

        let small = bench.generate_test_case(10, &mut rng());
        assert_eq!(small.metadata["num_sentences"], MIN_SENTENCES);
    }

    #[test]
    fn placement_controls_needle_position() {
        let start = NeedleInHaystack::with_placement(Placement::Start)
            .generate_test_case(600, &mut rng());
        assert!(start.context.starts_with("The special code is: "));
        assert_eq!(start.metadata["needle_position"], "start");

        let end = NeedleInHaystack::with_placement(Placement::End)
            .generate_test_case(600, &mut rng());
        assert!(end.context.ends_with(&end.expected_answer));
    }

    #[test]
    fn evaluate_scores_exact_partial_and_miss() {
        let bench = NeedleInHaystack::new();

        let hit = bench.evaluate("The code is ab12cd34.", "AB12CD34");
        assert!(hit.correct);
        assert_eq!(hit.score, 1.0);
        assert_eq!(hit.details["partial_match"], false);

        let partial = bench.evaluate("maybe AB99", "AB12CD34");
        assert!(!partial.correct);
        assert_eq!(partial.score, 0.5);
        assert_eq!(partial.details["partial_match"], true);

        let miss = bench.evaluate("???", "AB12CD34");
        assert_eq!(miss.score, 0.0);
    }
}
