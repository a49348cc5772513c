//! Random question selection for a quiz round

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::quiz_data::{Question, QuizEntry};

/// Default number of questions asked about one picture
pub const DEFAULT_QUESTION_COUNT: usize = 3;

/// Questions picked for one picture
#[cfg_attr(feature = "python", pyo3::pyclass(get_all))]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub questions: Vec<Question>,
    pub image_path: String,
    pub theme_word: String,
}

/// Pick a random entry and up to `count` of its questions
pub fn select_random_questions(entries: &[QuizEntry], count: usize) -> Selection {
    select_with_rng(entries, count, &mut rand::thread_rng())
}

/// Same as [`select_random_questions`] with a caller-supplied RNG
pub fn select_with_rng<R: Rng + ?Sized>(
    entries: &[QuizEntry],
    count: usize,
    rng: &mut R,
) -> Selection {
    let Some(entry) = entries.choose(rng) else {
        return Selection::default();
    };

    let mut questions = entry.questions.clone();
    if questions.len() > count {
        questions.shuffle(rng);
        questions.truncate(count);
    }

    Selection {
        questions,
        image_path: entry.image_path.clone(),
        theme_word: entry.theme_word.clone(),
    }
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyo3::pyfunction]
#[pyo3(name = "select_random_questions")]
pub fn py_select_random_questions(entries: Vec<QuizEntry>, count: Option<usize>) -> Selection {
    select_random_questions(&entries, count.unwrap_or(DEFAULT_QUESTION_COUNT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn entry(theme: &str, n: usize) -> QuizEntry {
        QuizEntry {
            category: "Animals".to_string(),
            theme_word: theme.to_string(),
            image_path: format!("Animals/{}.jpg", theme),
            description: String::new(),
            questions: (1..=n)
                .map(|i| Question {
                    text: format!("Q{}", i),
                    answer: format!("A{}", i),
                    category: "Animals".to_string(),
                    theme_word: theme.to_string(),
                    ordinal: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_entries() {
        assert_eq!(select_random_questions(&[], 3), Selection::default());
    }

    #[test]
    fn test_few_questions_returned_in_order() {
        let entries = vec![entry("Cat", 2)];
        let selection = select_random_questions(&entries, 3);
        assert_eq!(selection.questions, entries[0].questions);
        assert_eq!(selection.image_path, "Animals/Cat.jpg");
        assert_eq!(selection.theme_word, "Cat");
    }

    #[test]
    fn test_exact_count_of_distinct_questions() {
        let entries = vec![entry("Cat", 10), entry("Dog", 7)];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let selection = select_with_rng(&entries, 3, &mut rng);
            assert_eq!(selection.questions.len(), 3);
            let distinct: HashSet<_> = selection.questions.iter().map(|q| q.text.clone()).collect();
            assert_eq!(distinct.len(), 3);
            assert!(selection.questions.iter().all(|q| q.theme_word == selection.theme_word));
        }
    }

    #[test]
    fn test_never_more_than_available() {
        let entries = vec![entry("Cat", 1), entry("Dog", 0), entry("Cow", 5)];
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let selection = select_with_rng(&entries, 4, &mut rng);
            let available = entries
                .iter()
                .find(|e| e.theme_word == selection.theme_word)
                .map(|e| e.questions.len())
                .unwrap();
            assert_eq!(selection.questions.len(), available.min(4));
        }
    }
}
