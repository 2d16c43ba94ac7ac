//! OOLONG: recall a single fact, or relate two facts, planted in long
//! filler.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::benchmark::{filler, graded_match, pick, Benchmark, Evaluation, Placement, TestCase};

/// Rough size of one filler sentence in tokens.
const TOKENS_PER_FILLER: usize = 10;

struct Fact {
    statement: &'static str,
    answer: &'static str,
    question: &'static str,
}

const FACTS: [Fact; 10] = [
    Fact { statement: "The capital of France is", answer: "Paris", question: "What is the capital of France?" },
    Fact { statement: "The largest planet in our solar system is", answer: "Jupiter", question: "What is the largest planet in our solar system?" },
    Fact { statement: "The speed of light is approximately", answer: "300,000 km/s", question: "What is the speed of light approximately?" },
    Fact { statement: "The author of '1984' is", answer: "George Orwell", question: "Who is the author of '1984'?" },
    Fact { statement: "The chemical symbol for gold is", answer: "Au", question: "What is the chemical symbol for gold?" },
    Fact { statement: "The tallest mountain on Earth is", answer: "Mount Everest", question: "What is the tallest mountain on Earth?" },
    Fact { statement: "The smallest country in the world is", answer: "Vatican City", question: "What is the smallest country in the world?" },
    Fact { statement: "The longest river in the world is", answer: "the Nile", question: "What is the longest river in the world?" },
    Fact { statement: "The first person to walk on the moon was", answer: "Neil Armstrong", question: "Who was the first person to walk on the moon?" },
    Fact { statement: "The Rust programming language was started by", answer: "Graydon Hoare", question: "Who started the Rust programming language?" },
];

const FACT_FILLER: [&str; 10] = [
    "This is contextual information that serves as padding.",
    "The following paragraphs contain various details.",
    "Additional context is provided here for length.",
    "More information follows in subsequent sentences.",
    "These sentences add to the overall context length.",
    "Further details are included in this section.",
    "Additional padding text is inserted here.",
    "More contextual information follows.",
    "This paragraph contains supplementary details.",
    "Further information is provided in this section.",
];

/// Single-fact recall at a chosen position.
pub struct Oolong {
    placement: Placement,
}

impl Oolong {
    pub fn new() -> Self {
        Self::with_placement(Placement::Random)
    }

    pub fn with_placement(placement: Placement) -> Self {
        Self { placement }
    }
}

impl Default for Oolong {
    fn default() -> Self {
        Self::new()
    }
}

impl Benchmark for Oolong {
    fn name(&self) -> &str {
        "oolong"
    }

    fn description(&self) -> &str {
        "Tests ability to handle information at various positions in long contexts"
    }

    fn generate_test_case(&self, context_length: usize, rng: &mut StdRng) -> TestCase {
        const FACT_TOKENS: usize = 20;
        const MIN_FILLER: usize = 5;

        let fact = pick(&FACTS, rng);
        let num_filler = (context_length.saturating_sub(FACT_TOKENS) / TOKENS_PER_FILLER).max(MIN_FILLER);
        let fact_at = self.placement.resolve(num_filler + 1, rng);

        let mut parts = filler(&FACT_FILLER, num_filler, rng);
        parts.insert(fact_at, format!("{} {}.", fact.statement, fact.answer));

        let mut metadata = Map::new();
        metadata.insert("fact_position".into(), self.placement.as_str().into());
        metadata.insert("num_sentences".into(), parts.len().into());

        TestCase {
            context: parts.join(" "),
            question: fact.question.into(),
            expected_answer: fact.answer.into(),
            metadata,
        }
    }

    fn evaluate(&self, response: &str, expected: &str) -> Evaluation {
        graded_match(response, expected, true)
    }
}

struct Pair {
    person: &'static str,
    role: &'static str,
    /// As stated in the document
    relation: &'static str,
    /// As asked in the question
    ask: &'static str,
    detail: &'static str,
}

const PAIRS: [Pair; 10] = [
    Pair { person: "Alice", role: "engineer", relation: "works at", ask: "work at", detail: "TechCorp" },
    Pair { person: "Bob", role: "doctor", relation: "specializes in", ask: "specialize in", detail: "cardiology" },
    Pair { person: "Charlie", role: "teacher", relation: "teaches", ask: "teach", detail: "mathematics" },
    Pair { person: "Diana", role: "artist", relation: "creates", ask: "create", detail: "digital art" },
    Pair { person: "Eve", role: "scientist", relation: "researches", ask: "research", detail: "quantum physics" },
    Pair { person: "Frank", role: "chef", relation: "cooks", ask: "cook", detail: "Italian cuisine" },
    Pair { person: "Grace", role: "writer", relation: "writes", ask: "write", detail: "science fiction" },
    Pair { person: "Henry", role: "musician", relation: "plays", ask: "play", detail: "jazz piano" },
    Pair { person: "Iris", role: "designer", relation: "designs", ask: "design", detail: "user interfaces" },
    Pair { person: "Jack", role: "analyst", relation: "analyzes", ask: "analyze", detail: "financial data" },
];

const PAIR_FILLER: [&str; 10] = [
    "This paragraph contains additional contextual information.",
    "More details are provided in the following sections.",
    "The document continues with further explanations.",
    "Additional context is included for completeness.",
    "This section provides supplementary information.",
    "Further details follow in subsequent paragraphs.",
    "More contextual data is presented here.",
    "The text continues with additional information.",
    "This paragraph adds to the overall context.",
    "Further explanations are provided below.",
];

/// How many filler sentences sit between the two halves of a pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairSeparation {
    Close,
    Medium,
    #[default]
    Far,
    Random,
}

impl PairSeparation {
    fn sentences(self, rng: &mut StdRng) -> usize {
        match self {
            PairSeparation::Close => 2,
            PairSeparation::Medium => 10,
            PairSeparation::Far => 30,
            PairSeparation::Random => rng.random_range(2..=30),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PairSeparation::Close => "close",
            PairSeparation::Medium => "medium",
            PairSeparation::Far => "far",
            PairSeparation::Random => "random",
        }
    }
}

/// Two related facts about one person, split apart by filler.
pub struct OolongPairs {
    separation: PairSeparation,
}

impl OolongPairs {
    pub fn new() -> Self {
        Self::with_separation(PairSeparation::Far)
    }

    pub fn with_separation(separation: PairSeparation) -> Self {
        Self { separation }
    }
}

impl Default for OolongPairs {
    fn default() -> Self {
        Self::new()
    }
}

impl Benchmark for OolongPairs {
    fn name(&self) -> &str {
        "oolong_pairs"
    }

    fn description(&self) -> &str {
        "Tests ability to find and relate pairs of information across long contexts"
    }

    fn generate_test_case(&self, context_length: usize, rng: &mut StdRng) -> TestCase {
        const PAIR_TOKENS: usize = 30;

        let pair = pick(&PAIRS, rng);
        let separation = self.separation.sentences(rng);
        let num_filler = (context_length.saturating_sub(PAIR_TOKENS) / TOKENS_PER_FILLER).max(separation);

        let mut parts = vec![format!("{} is {} {}.", pair.person, article(pair.role), pair.role)];
        parts.extend(filler(&PAIR_FILLER, separation, rng));
        parts.push(format!("{} {} {}.", pair.person, pair.relation, pair.detail));
        parts.extend(filler(&PAIR_FILLER, num_filler - separation, rng));

        let mut metadata = Map::new();
        metadata.insert("person".into(), pair.person.into());
        metadata.insert("pair_separation".into(), self.separation.as_str().into());
        metadata.insert("separation_distance".into(), separation.into());
        metadata.insert("num_sentences".into(), parts.len().into());

        TestCase {
            context: parts.join(" "),
            question: format!("What does {} {}?", pair.person, pair.ask),
            expected_answer: pair.detail.into(),
            metadata,
        }
    }

    fn evaluate(&self, response: &str, expected: &str) -> Evaluation {
        graded_match(response, expected, false)
    }
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
