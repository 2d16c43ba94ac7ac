//! CodeQA: answer a question about a code snippet buried in documentation
//! prose.

use rand::rngs::StdRng;
use serde_json::Map;

use crate::benchmark::{estimate_tokens, filler, graded_match, pick, Benchmark, Evaluation, TestCase};

const TOKENS_PER_FILLER: usize = 10;
const MIN_FILLER: usize = 5;

struct Snippet {
    code: &'static str,
    question: &'static str,
    answer: &'static str,
}

const SNIPPETS: [Snippet; 4] = [
    Snippet {
        code: "\
fn fibonacci(n: u64) -> u64 {
    if n <= 1 {
        return n;
    }
    fibonacci(n - 1) + fibonacci(n - 2)
}",
        question: "What does this function calculate?",
        answer: "Fibonacci numbers",
    },
    Snippet {
        code: "\
fn quicksort(items: Vec<i32>) -> Vec<i32> {
    if items.len() <= 1 {
        return items;
    }
    let pivot = items[items.len() / 2];
    let left = items.iter().copied().filter(|x| *x < pivot).collect();
    let middle = items.iter().copied().filter(|x| *x == pivot);
    let right = items.iter().copied().filter(|x| *x > pivot).collect();
    let mut sorted = quicksort(left);
    sorted.extend(middle);
    sorted.extend(quicksort(right));
    sorted
}",
        question: "What sorting algorithm is this?",
        answer: "Quicksort",
    },
    Snippet {
        code: "\
struct Node<T> {
    data: T,
    next: Option<Box<Node<T>>>,
}

struct LinkedList<T> {
    head: Option<Box<Node<T>>>,
}",
        question: "What data structure does this implement?",
        answer: "Linked list",
    },
    Snippet {
        code: "\
fn binary_search(items: &[i32], target: i32) -> Option<usize> {
    let (mut low, mut high) = (0, items.len());
    while low < high {
        let mid = (low + high) / 2;
        match items[mid].cmp(&target) {
            std::cmp::Ordering::Equal => return Some(mid),
            std::cmp::Ordering::Less => low = mid + 1,
            std::cmp::Ordering::Greater => high = mid,
        }
    }
    None
}",
        question: "What is the time complexity of this algorithm?",
        answer: "O(log n)",
    },
];

const DOC_FILLER: [&str; 10] = [
    "This code implements a common algorithm.",
    "The function is well-documented and follows best practices.",
    "Error handling is included for edge cases.",
    "The implementation is efficient and readable.",
    "This code can be used in various applications.",
    "The algorithm has been tested extensively.",
    "Performance optimizations have been applied.",
    "The code follows standard coding conventions.",
    "Additional helper functions may be needed.",
    "This implementation is suitable for production use.",
];

/// The same block of prose is placed before and after the snippet.
pub struct CodeQa;

impl Benchmark for CodeQa {
    fn name(&self) -> &str {
        "codeqa"
    }

    fn description(&self) -> &str {
        "Tests ability to understand and answer questions about code in long contexts"
    }

    fn generate_test_case(&self, context_length: usize, rng: &mut StdRng) -> TestCase {
        let snippet = pick(&SNIPPETS, rng);
        let code_tokens = estimate_tokens(snippet.code);
        let num_filler = (context_length.saturating_sub(code_tokens) / TOKENS_PER_FILLER).max(MIN_FILLER);
        let prose = filler(&DOC_FILLER, num_filler, rng).join(" ");

        let mut metadata = Map::new();
        metadata.insert("code_tokens".into(), code_tokens.into());
        metadata.insert("num_filler".into(), num_filler.into());

        TestCase {
            context: format!("{prose}\n\nHere is the code:\n\n{}\n\n{prose}", snippet.code),
            question: snippet.question.into(),
            expected_answer: snippet.answer.into(),
            metadata,
        }
    }

    fn evaluate(&self, response: &str, expected: &str) -> Evaluation {
        graded_match(response, expected, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn snippet_sits_between_matching_prose() {
        let case = CodeQa.generate_test_case(800, &mut StdRng::seed_from_u64(11));
        let snippet = SNIPPETS
            .iter()
            .find(|s| s.answer == case.expected_answer)
            .unwrap();
        assert_eq!(case.question, snippet.question);

        let (before, rest) = case.context.split_once("\n\nHere is the code:\n\n").unwrap();
        let (code, after) = rest.rsplit_once("\n\n").unwrap();
        assert_eq!(code, snippet.code);
        assert_eq!(before, after);
        assert_eq!(
            case.metadata["num_filler"],
            (800 - estimate_tokens(snippet.code)) / TOKENS_PER_FILLER
        );
    }

    #[test]
    fn short_contexts_keep_minimum_prose() {
        let case = CodeQa.generate_test_case(0, &mut StdRng::seed_from_u64(1));
        assert_eq!(case.metadata["num_filler"], MIN_FILLER);
    }

    #[test]
    fn evaluate_finds_answer_in_reply() {
        assert_eq!(CodeQa.evaluate("O(log n)", "O(log n)").score, 1.0);
        assert_eq!(CodeQa.evaluate("It runs in O(log n) time.", "O(log n)").score, 0.8);
        assert_eq!(CodeQa.evaluate("a linked structure", "Linked list").score, 0.5);
        assert_eq!(CodeQa.evaluate("bubble sort", "Quicksort").score, 0.0);
    }
}
