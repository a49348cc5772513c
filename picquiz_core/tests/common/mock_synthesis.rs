//! Mock synthesis engine for testing
//!
//! Records every utterance and can simulate late voice lists, hanging
//! warm-ups and engine errors.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use picquiz_core::speech::{SynthesisEngine, Utterance, UtteranceOutcome, VoiceInfo};
use picquiz_core::SpeechError;
use tokio::sync::broadcast;

pub struct MockSynth {
    voices: Mutex<Vec<VoiceInfo>>,
    /// Number of `voices()` calls that still return an empty list
    empty_voice_polls: AtomicUsize,
    pub voice_polls: AtomicUsize,
    pub spoken: Mutex<Vec<Utterance>>,
    pub cancels: AtomicUsize,
    /// Warm-up utterances never finish
    pub hang_warmup: AtomicBool,
    /// Warm-up utterances fail
    pub fail_warmup: AtomicBool,
    /// Real utterances fail with this error code
    pub fail_with: Mutex<Option<String>>,
    pub speaking: AtomicBool,
    pub paused: AtomicBool,
    voices_changed: broadcast::Sender<()>,
}

impl MockSynth {
    pub fn new(voices: Vec<VoiceInfo>) -> Self {
        let (voices_changed, _) = broadcast::channel(4);
        Self {
            voices: Mutex::new(voices),
            empty_voice_polls: AtomicUsize::new(0),
            voice_polls: AtomicUsize::new(0),
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
            hang_warmup: AtomicBool::new(false),
            fail_warmup: AtomicBool::new(false),
            fail_with: Mutex::new(None),
            speaking: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            voices_changed,
        }
    }

    /// Voices only show up after `polls` empty answers
    pub fn with_late_voices(voices: Vec<VoiceInfo>, polls: usize) -> Self {
        let mock = Self::new(voices);
        mock.empty_voice_polls.store(polls, Ordering::SeqCst);
        mock
    }

    pub fn set_voices(&self, voices: Vec<VoiceInfo>) {
        *self.voices.lock().unwrap() = voices;
        let _ = self.voices_changed.send(());
    }

    /// Utterances spoken at audible volume
    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.volume > 0.0)
            .map(|u| u.text.clone())
            .collect()
    }

    pub fn warmups(&self) -> usize {
        self.spoken.lock().unwrap().iter().filter(|u| u.volume == 0.0).count()
    }

    pub fn last_utterance(&self) -> Option<Utterance> {
        self.spoken.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SynthesisEngine for MockSynth {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.voice_polls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.empty_voice_polls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.empty_voice_polls.store(remaining - 1, Ordering::SeqCst);
            return Vec::new();
        }
        self.voices.lock().unwrap().clone()
    }

    fn voices_changed(&self) -> Option<broadcast::Receiver<()>> {
        Some(self.voices_changed.subscribe())
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    async fn speak(&self, utterance: Utterance) -> Result<UtteranceOutcome, SpeechError> {
        let warmup = utterance.volume == 0.0;
        self.spoken.lock().unwrap().push(utterance);

        if warmup {
            if self.hang_warmup.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail_warmup.load(Ordering::SeqCst) {
                return Err(SpeechError::Synthesis("synthesis-failed".to_string()));
            }
            return Ok(UtteranceOutcome::Completed);
        }

        let failure = self.fail_with.lock().unwrap().clone();
        if let Some(code) = failure {
            return Err(SpeechError::Synthesis(code));
        }
        Ok(UtteranceOutcome::Completed)
    }

    fn cancel(&self) -> Result<(), SpeechError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) -> Result<(), SpeechError> {
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&self) -> Result<(), SpeechError> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_paused(&self) -> Result<bool, SpeechError> {
        Ok(self.paused.load(Ordering::SeqCst))
    }
}
