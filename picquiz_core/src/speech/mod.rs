//! Speech I/O orchestration
//!
//! Two controllers wrap the host's speech capabilities:
//! - [`SpeechSynthesisController`]: voice selection, warm-up, cancel-then-speak
//! - [`SpeechRecognitionController`]: one capture session at a time, transcript accumulation
//!
//! Both publish [`SpeechEvent`]s on a shared [`SpeechEventBus`].

pub mod events;
pub mod platform;
pub mod recognition;
pub mod synthesis;

pub use events::{SpeechEvent, SpeechEventBus};
pub use platform::{
    RecognitionEngine, RecognitionEvent, RecognitionOptions, RecognitionSegment, SynthesisEngine,
    Utterance, UtteranceOutcome, VoiceInfo,
};
pub use recognition::{RecognitionState, SpeechRecognitionController};
pub use synthesis::{select_voice, SpeechSynthesisController, SynthesisState};
