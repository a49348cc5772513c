//! Quiz and speech settings stored as a JSON file

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::QuizResult;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    // Data
    pub image_base_path: String,
    pub csv_base_path: String,
    pub json_data_path: String,

    // Quiz
    pub questions_per_quiz: usize,
    pub pass_threshold: f64,

    // Meta
    pub log_level: String,

    pub speech: SpeechConfig,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            image_base_path: "/data/images/".to_string(),
            csv_base_path: "/data/csv/".to_string(),
            json_data_path: "/data/quiz_data.json".to_string(),
            questions_per_quiz: crate::questions::DEFAULT_QUESTION_COUNT,
            pass_threshold: 0.6,
            log_level: "info".to_string(),
            speech: SpeechConfig::default(),
        }
    }
}

/// Speech engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub lang: String,
    pub preferred_vendor: String,
    pub preferred_locales: Vec<String>,
    pub rate: f32,
    pub pitch: f32,

    pub voice_load_attempts: u32,
    pub voice_retry_delay_ms: u64,
    pub init_delay_ms: u64,
    pub warmup_timeout_ms: u64,
    pub handoff_delay_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            preferred_vendor: "Microsoft".to_string(),
            preferred_locales: vec!["en-US".to_string(), "en-GB".to_string()],
            rate: 0.85,
            pitch: 1.0,
            voice_load_attempts: 3,
            voice_retry_delay_ms: 100,
            init_delay_ms: 100,
            warmup_timeout_ms: 1000,
            handoff_delay_ms: 200,
        }
    }
}

impl SpeechConfig {
    /// All delays zeroed, warm-up bounded by `warmup_timeout`
    pub fn immediate(warmup_timeout: Duration) -> Self {
        Self {
            voice_retry_delay_ms: 0,
            init_delay_ms: 0,
            warmup_timeout_ms: warmup_timeout.as_millis() as u64,
            handoff_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn voice_retry_delay(&self) -> Duration {
        Duration::from_millis(self.voice_retry_delay_ms)
    }

    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }

    pub fn warmup_timeout(&self) -> Duration {
        Duration::from_millis(self.warmup_timeout_ms)
    }

    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }
}

impl QuizConfig {
    /// Load config from `path`; missing or corrupt files fall back to defaults
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path).map(|content| serde_json::from_str(&content)) {
            Ok(Ok(config)) => config,
            Ok(Err(e)) => {
                tracing::warn!("Config file {} is invalid, using defaults: {}", path.display(), e);
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read config file {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save(&self, path: &Path) -> QuizResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuizConfig::default();
        assert_eq!(config.questions_per_quiz, 3);
        assert_eq!(config.csv_base_path, "/data/csv/");
        assert_eq!(config.speech.rate, 0.85);
        assert_eq!(config.speech.voice_load_attempts, 3);
        assert_eq!(config.speech.warmup_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: QuizConfig =
            serde_json::from_str(r#"{"questions_per_quiz": 5, "speech": {"rate": 1.0}}"#).unwrap();
        assert_eq!(config.questions_per_quiz, 5);
        assert_eq!(config.speech.rate, 1.0);
        assert_eq!(config.speech.lang, "en-US");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");
        assert_eq!(QuizConfig::load(&path), QuizConfig::default());

        let mut config = QuizConfig::default();
        config.pass_threshold = 0.8;
        config.save(&path).unwrap();
        assert_eq!(QuizConfig::load(&path).pass_threshold, 0.8);

        std::fs::write(&path, "{ not valid json").unwrap();
        assert_eq!(QuizConfig::load(&path), QuizConfig::default());
    }
}
