//! Quiz session state and the ordered answer log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz_data::Question;
use crate::questions::Selection;
use crate::scoring::score_answer;

/// How the learner is taking the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    #[default]
    Learn,
    Train,
    Compete,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Learn => "learn",
            QuizMode::Train => "train",
            QuizMode::Compete => "compete",
        }
    }
}

impl std::str::FromStr for QuizMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "learn" => Ok(QuizMode::Learn),
            "train" => Ok(QuizMode::Train),
            "compete" => Ok(QuizMode::Compete),
            other => Err(format!("unknown quiz mode: {}", other)),
        }
    }
}

/// One answered question; never changed once logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswerRecord {
    pub question_index: usize,
    pub question_text: String,
    pub user_answer_text: String,
    pub correct_answer_text: String,
    pub score: f64,
    pub answered_at: DateTime<Utc>,
}

/// State of one quiz run
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    selected_categories: Vec<String>,
    mode: QuizMode,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<UserAnswerRecord>,
    image_path: String,
    theme_word: String,
    quiz_images: Vec<String>,
    complete: bool,
}

impl QuizSession {
    pub fn new(mode: QuizMode) -> Self {
        Self { mode, ..Self::default() }
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.selected_categories = categories;
    }

    pub fn selected_categories(&self) -> &[String] {
        &self.selected_categories
    }

    pub fn set_mode(&mut self, mode: QuizMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    /// Start a fresh question list; clears answers and completion
    pub fn set_questions(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.current_index = 0;
        self.answers.clear();
        self.complete = false;
    }

    pub fn set_current_image(
        &mut self,
        image_path: impl Into<String>,
        theme_word: impl Into<String>,
    ) {
        self.image_path = image_path.into();
        self.theme_word = theme_word.into();
    }

    /// Load a selector result: its questions and picture
    pub fn start_round(&mut self, selection: Selection) {
        self.set_current_image(selection.image_path, selection.theme_word);
        self.set_questions(selection.questions);
    }

    pub fn set_quiz_images(&mut self, images: Vec<String>) {
        self.quiz_images = images;
    }

    pub fn quiz_images(&self) -> &[String] {
        &self.quiz_images
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn theme_word(&self) -> &str {
        &self.theme_word
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Advance; returns false and marks the quiz complete at the last question
    pub fn next_question(&mut self) -> bool {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            true
        } else {
            self.complete = true;
            false
        }
    }

    /// Log an already-scored answer for the current question
    pub fn add_user_answer(
        &mut self,
        answer: impl Into<String>,
        score: f64,
    ) -> Option<&UserAnswerRecord> {
        let question = self.questions.get(self.current_index)?;
        self.answers.push(UserAnswerRecord {
            question_index: self.current_index,
            question_text: question.text.clone(),
            user_answer_text: answer.into(),
            correct_answer_text: question.answer.clone(),
            score,
            answered_at: Utc::now(),
        });
        self.answers.last()
    }

    /// Score `answer` against the current question and log it
    pub fn submit_answer(&mut self, answer: &str) -> Option<&UserAnswerRecord> {
        let score = score_answer(answer, &self.current_question()?.answer);
        self.add_user_answer(answer, score)
    }

    pub fn answers(&self) -> &[UserAnswerRecord] {
        &self.answers
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Percentage of questions already passed
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.current_index as f64 / self.questions.len() as f64 * 100.0
    }

    /// Mean answer score as a rounded percentage
    pub fn score(&self) -> u32 {
        if self.answers.is_empty() {
            return 0;
        }
        let total: f64 = self.answers.iter().map(|a| a.score).sum();
        (total / self.answers.len() as f64 * 100.0).round() as u32
    }

    /// Clear everything but the category and mode choice
    pub fn reset(&mut self) {
        self.questions.clear();
        self.current_index = 0;
        self.answers.clear();
        self.image_path.clear();
        self.theme_word.clear();
        self.complete = false;
        self.quiz_images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, answer: &str) -> Question {
        Question {
            text: text.to_string(),
            answer: answer.to_string(),
            category: "Animals".to_string(),
            theme_word: "Cat".to_string(),
            ordinal: None,
        }
    }

    fn session() -> QuizSession {
        let mut session = QuizSession::new(QuizMode::Train);
        session.set_questions(vec![
            question("What is this?", "A cat."),
            question("What colour is it?", "It is black."),
        ]);
        session
    }

    #[test]
    fn test_walk_through_questions() {
        let mut session = session();
        assert_eq!(session.progress(), 0.0);
        assert_eq!(session.current_question().unwrap().text, "What is this?");

        assert!(session.next_question());
        assert_eq!(session.progress(), 50.0);
        assert!(!session.is_complete());

        assert!(!session.next_question());
        assert!(session.is_complete());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_submit_answer_scores_and_logs() {
        let mut session = session();
        let record = session.submit_answer("a cat").unwrap().clone();
        assert_eq!(record.question_index, 0);
        assert_eq!(record.correct_answer_text, "A cat.");
        assert_eq!(record.score, 1.0);

        session.next_question();
        session.add_user_answer("white", 0.0);
        assert_eq!(session.answers().len(), 2);
        assert_eq!(session.score(), 50);
    }

    #[test]
    fn test_no_question_no_answer() {
        let mut session = QuizSession::default();
        assert!(session.submit_answer("anything").is_none());
        assert_eq!(session.score(), 0);
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn test_set_questions_and_reset_clear_state() {
        let mut session = session();
        session.submit_answer("a cat");
        session.next_question();
        session.next_question();
        session.set_current_image("Animals/Cat.jpg", "Cat");

        session.set_questions(vec![question("Q?", "A.")]);
        assert!(session.answers().is_empty());
        assert!(!session.is_complete());
        assert_eq!(session.current_index(), 0);

        session.reset();
        assert!(session.questions().is_empty());
        assert_eq!(session.image_path(), "");
        assert_eq!(session.mode(), QuizMode::Train);
    }

    #[test]
    fn test_quiz_mode_parsing() {
        assert_eq!("Compete".parse::<QuizMode>(), Ok(QuizMode::Compete));
        assert!("race".parse::<QuizMode>().is_err());
    }
}
