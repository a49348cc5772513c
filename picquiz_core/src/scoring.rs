//! Keyword-overlap scoring for spoken or typed answers

use std::collections::HashSet;

/// Punctuation ignored when comparing answers
const STRIPPED_PUNCTUATION: [char; 4] = ['.', ',', '?', '!'];

/// Tokens must be longer than this to count as keywords
const MIN_KEYWORD_LEN: usize = 3;

/// Lowercase and strip punctuation
pub fn normalize_answer(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect()
}

/// Tokens of a short answer must be at least this long to count
const MIN_SHORT_ANSWER_LEN: usize = 3;

/// Similarity of `user_answer` to `correct_answer`, in `[0, 1]`
///
/// An exact match after normalization scores 1. Otherwise the score is the
/// number of keywords (tokens longer than three characters) of the correct
/// answer found anywhere in the user's answer, divided by the total token
/// count of the correct answer. A correct answer with no keyword at all is
/// scored on its tokens of three characters only, over the number of those
/// tokens; shorter words never earn credit.
pub fn score_answer(user_answer: &str, correct_answer: &str) -> f64 {
    if user_answer.is_empty() || correct_answer.is_empty() {
        return 0.0;
    }

    let user = normalize_answer(user_answer);
    let correct = normalize_answer(correct_answer);
    if user == correct {
        return 1.0;
    }

    let correct_tokens: Vec<&str> = correct.split_whitespace().collect();
    if correct_tokens.is_empty() {
        return 0.0;
    }
    let user_tokens: HashSet<&str> = user.split_whitespace().collect();

    let (counted, total) = if correct_tokens.iter().any(|t| token_len(t) > MIN_KEYWORD_LEN) {
        let keywords: Vec<&str> = correct_tokens
            .iter()
            .copied()
            .filter(|t| token_len(t) > MIN_KEYWORD_LEN)
            .collect();
        (keywords, correct_tokens.len())
    } else {
        let short: Vec<&str> = correct_tokens
            .iter()
            .copied()
            .filter(|t| token_len(t) >= MIN_SHORT_ANSWER_LEN)
            .collect();
        let total = short.len();
        (short, total)
    };
    if total == 0 {
        return 0.0;
    }

    let matched = counted.iter().filter(|t| user_tokens.contains(*t)).count();
    (matched as f64 / total as f64).clamp(0.0, 1.0)
}

fn token_len(token: &str) -> usize {
    token.chars().count()
}

/// Score plus a short message for the learner
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerGrade {
    pub score: f64,
    pub passed: bool,
    pub feedback: String,
}

/// Score an answer and phrase feedback against a pass threshold
pub fn grade_answer(user_answer: &str, correct_answer: &str, threshold: f64) -> AnswerGrade {
    let score = score_answer(user_answer, correct_answer);
    let passed = score >= threshold;

    let feedback = if score >= 1.0 {
        "Perfect! ✓".to_string()
    } else if passed {
        format!("Close enough! ✓ ({}% match)", (score * 100.0).round() as i32)
    } else if user_answer.trim().is_empty() {
        format!("No answer. Expected: '{}'", correct_answer)
    } else {
        format!("Not quite. Expected: '{}'", correct_answer)
    };

    AnswerGrade { score, passed, feedback }
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyo3::pyfunction]
#[pyo3(name = "score_answer")]
pub fn py_score_answer(user_answer: &str, correct_answer: &str) -> f64 {
    score_answer(user_answer, correct_answer)
}
