//! Host speech capabilities the controllers drive
//!
//! A host (browser bridge, desktop TTS daemon, test mock) implements these
//! traits. Platform callbacks are delivered as channel messages rather than
//! registered handlers.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::error::SpeechError;

/// A synthesis voice offered by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
    pub default: bool,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self { name: name.into(), lang: lang.into(), default: false }
    }
}

/// A synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<VoiceInfo>,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// How an utterance left the engine without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceOutcome {
    Completed,
    Cancelled,
}

/// Text-to-speech capability
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Voices currently known; may be empty until the platform populates them
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Signals each time the voice list changes, if the platform reports it
    fn voices_changed(&self) -> Option<broadcast::Receiver<()>> {
        None
    }

    fn is_speaking(&self) -> bool;

    /// Whether utterances are queued but not yet started
    fn is_pending(&self) -> bool {
        false
    }

    /// Speak and wait until the utterance ends, is cancelled or fails
    async fn speak(&self, utterance: Utterance) -> Result<UtteranceOutcome, SpeechError>;

    fn cancel(&self) -> Result<(), SpeechError>;

    fn pause(&self) -> Result<(), SpeechError>;

    fn resume(&self) -> Result<(), SpeechError>;

    fn is_paused(&self) -> Result<bool, SpeechError>;
}

/// Recognition settings passed on start
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOptions {
    pub continuous: bool,
    pub interim_results: bool,
    pub lang: String,
    pub max_alternatives: u32,
}

/// One recognized chunk, best alternative only
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionSegment {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionSegment {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self { transcript: text.into(), is_final: true }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self { transcript: text.into(), is_final: false }
    }
}

/// Messages a recognition session delivers
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Results from `result_index` onward are new or changed
    Result {
        result_index: usize,
        results: Vec<RecognitionSegment>,
    },
    /// Platform error code such as `no-speech`, `aborted` or `network`
    Error(String),
    End,
}

/// Speech-to-text capability
pub trait RecognitionEngine: Send + Sync {
    /// Begin capturing; events for this session arrive on the returned channel
    fn start(
        &self,
        options: &RecognitionOptions,
    ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, SpeechError>;

    /// Finish gracefully; the session still delivers its final results and `End`
    fn stop(&self) -> Result<(), SpeechError>;

    /// Discard the session immediately
    fn abort(&self) -> Result<(), SpeechError>;
}
