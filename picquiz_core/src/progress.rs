//! Progress tracking - answer history storage and statistics

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::QuizResult;
use crate::session::{QuizMode, UserAnswerRecord};

/// Where an answer was given
#[derive(Debug, Clone, Default)]
pub struct AttemptContext {
    pub category: String,
    pub theme_word: String,
    pub mode: QuizMode,
}

/// Aggregate statistics over all stored answers
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptStats {
    pub total_attempts: i64,
    pub passed_count: i64,
    pub failed_count: i64,
    pub average_score: f64,
    pub accuracy_percent: f64,
}

/// A question the learner keeps missing
#[derive(Debug, Clone, PartialEq)]
pub struct WeakQuestion {
    pub question: String,
    pub correct_answer: String,
    pub attempts: i64,
    pub average_score: f64,
}

/// SQLite-backed answer history
pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    /// Open (and initialize) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> QuizResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> QuizResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> QuizResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL DEFAULT '',
                theme_word TEXT NOT NULL DEFAULT '',
                mode TEXT NOT NULL,
                question_index INTEGER NOT NULL,
                question TEXT NOT NULL,
                user_answer TEXT,
                correct_answer TEXT NOT NULL,
                score REAL NOT NULL,
                answered_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Save one answered question
    pub fn save_answer(
        &self,
        record: &UserAnswerRecord,
        context: &AttemptContext,
    ) -> QuizResult<i64> {
        self.conn.execute(
            "INSERT INTO attempts (category, theme_word, mode, question_index, question,
                                   user_answer, correct_answer, score, answered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                context.category,
                context.theme_word,
                context.mode.as_str(),
                record.question_index as i64,
                record.question_text,
                record.user_answer_text,
                record.correct_answer_text,
                record.score,
                record.answered_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Saved attempt {} for '{}'", id, record.question_text);
        Ok(id)
    }

    /// Overall statistics; an answer passes when its score reaches `pass_threshold`
    pub fn stats(&self, pass_threshold: f64) -> QuizResult<AttemptStats> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*), SUM(CASE WHEN score >= ?1 THEN 1 ELSE 0 END), AVG(score)
             FROM attempts",
        )?;

        let stats = stmt.query_row(params![pass_threshold], |row| {
            let total: i64 = row.get(0)?;
            let passed: i64 = row.get::<_, Option<i64>>(1)?.unwrap_or(0);
            let average: f64 = row.get::<_, Option<f64>>(2)?.unwrap_or(0.0);
            let accuracy = if total > 0 { (passed as f64 / total as f64) * 100.0 } else { 0.0 };

            Ok(AttemptStats {
                total_attempts: total,
                passed_count: passed,
                failed_count: total - passed,
                average_score: average,
                accuracy_percent: accuracy,
            })
        })?;

        Ok(stats)
    }

    /// Questions with the lowest average score first
    pub fn weakest_questions(&self, limit: usize) -> QuizResult<Vec<WeakQuestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT question, correct_answer, COUNT(*) AS attempts, AVG(score) AS avg_score
             FROM attempts
             GROUP BY question, correct_answer
             ORDER BY avg_score ASC, attempts DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(WeakQuestion {
                question: row.get(0)?,
                correct_answer: row.get(1)?,
                attempts: row.get(2)?,
                average_score: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
