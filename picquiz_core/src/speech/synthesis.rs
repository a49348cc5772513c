//! Text-to-speech lifecycle: voice discovery, warm-up and cancellation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::events::{SpeechEvent, SpeechEventBus};
use super::platform::{SynthesisEngine, Utterance, UtteranceOutcome, VoiceInfo};
use crate::config::SpeechConfig;
use crate::error::SpeechError;

/// Text spoken silently to wake the engine
const WARMUP_TEXT: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisState {
    Uninitialized,
    Initializing,
    Ready,
    /// No synthesis capability; every call is a no-op
    Unsupported,
}

struct SynthesisInner {
    engine: Option<Arc<dyn SynthesisEngine>>,
    config: SpeechConfig,
    events: SpeechEventBus,
    state: Mutex<SynthesisState>,
    voices: Mutex<Vec<VoiceInfo>>,
    selected_voice: Mutex<Option<VoiceInfo>>,
    init_lock: tokio::sync::Mutex<()>,
}

/// Handle to the synthesis controller; clones share one engine
#[derive(Clone)]
pub struct SpeechSynthesisController {
    inner: Arc<SynthesisInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pick a voice: preferred vendor in a preferred locale, then any preferred
/// locale, then whatever comes first
pub fn select_voice(voices: &[VoiceInfo], config: &SpeechConfig) -> Option<VoiceInfo> {
    let in_locale = |voice: &VoiceInfo| {
        let lang = voice.lang.replace('_', "-");
        config.preferred_locales.iter().any(|locale| lang.contains(locale.as_str()))
    };

    voices
        .iter()
        .find(|v| v.name.contains(config.preferred_vendor.as_str()) && in_locale(v))
        .or_else(|| voices.iter().find(|v| in_locale(v)))
        .or_else(|| voices.first())
        .cloned()
}

impl SpeechSynthesisController {
    /// Create an uninitialized controller; `engine` is `None` when the host has no synthesis
    pub fn new(
        engine: Option<Arc<dyn SynthesisEngine>>,
        config: SpeechConfig,
        events: SpeechEventBus,
    ) -> Self {
        Self {
            inner: Arc::new(SynthesisInner {
                engine,
                config,
                events,
                state: Mutex::new(SynthesisState::Uninitialized),
                voices: Mutex::new(Vec::new()),
                selected_voice: Mutex::new(None),
                init_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn state(&self) -> SynthesisState {
        *lock(&self.inner.state)
    }

    pub fn voices(&self) -> Vec<VoiceInfo> {
        lock(&self.inner.voices).clone()
    }

    pub fn selected_voice(&self) -> Option<VoiceInfo> {
        lock(&self.inner.selected_voice).clone()
    }

    /// Host finished loading; initialize after the configured settle delay
    pub fn on_host_ready(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.inner.config.init_delay()).await;
            this.initialize().await;
        })
    }

    /// Discover voices and become ready; later calls are no-ops
    pub async fn initialize(&self) {
        let _guard = self.inner.init_lock.lock().await;
        if self.state() != SynthesisState::Uninitialized {
            return;
        }
        *lock(&self.inner.state) = SynthesisState::Initializing;
        info!("Initializing speech synthesis");

        let Some(engine) = self.inner.engine.clone() else {
            error!("Speech synthesis is not supported on this platform");
            *lock(&self.inner.state) = SynthesisState::Unsupported;
            return;
        };

        self.load_voices().await;

        if let Some(rx) = engine.voices_changed() {
            debug!("Listening for voice list changes");
            spawn_voice_listener(Arc::downgrade(&self.inner), rx);
        }

        *lock(&self.inner.state) = SynthesisState::Ready;
        info!("Speech synthesis ready");
    }

    /// Poll the platform voice list, then re-run voice selection
    pub async fn load_voices(&self) {
        let Some(engine) = self.inner.engine.as_ref() else {
            return;
        };

        let attempts = self.inner.config.voice_load_attempts.max(1);
        let mut voices = Vec::new();
        for attempt in 1..=attempts {
            voices = engine.voices();
            debug!("Loaded {} voices (attempt {}/{})", voices.len(), attempt, attempts);
            if !voices.is_empty() {
                break;
            }
            if attempt < attempts {
                tokio::time::sleep(self.inner.config.voice_retry_delay()).await;
            }
        }

        let selected = select_voice(&voices, &self.inner.config);
        match &selected {
            Some(voice) => info!("Selected voice: {} ({})", voice.name, voice.lang),
            None => warn!("No suitable voice found, using platform default"),
        }

        *lock(&self.inner.voices) = voices;
        *lock(&self.inner.selected_voice) = selected;
    }

    /// Speak `text`, cancelling anything already in flight
    ///
    /// Resolves without speaking when synthesis is unsupported; fails only on
    /// an error reported by the engine for the real utterance.
    pub async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.initialize().await;

        let Some(engine) = self.inner.engine.clone() else {
            warn!("Speech synthesis not available, skipping");
            return Ok(());
        };

        self.warm_up(engine.as_ref()).await;
        self.cancel();

        let config = &self.inner.config;
        let utterance = Utterance {
            text: text.to_string(),
            voice: self.selected_voice(),
            lang: config.lang.clone(),
            rate: config.rate,
            pitch: config.pitch,
            volume: 1.0,
        };
        debug!("Speaking: {:.50}", text);

        match engine.speak(utterance).await {
            Ok(UtteranceOutcome::Completed) => {
                debug!("Speech synthesis completed");
                self.inner.events.broadcast(SpeechEvent::SynthesisEnded);
                Ok(())
            }
            Ok(UtteranceOutcome::Cancelled) => {
                debug!("Speech synthesis cancelled");
                Ok(())
            }
            Err(e) => {
                error!("Speech synthesis error: {}", e);
                Err(e)
            }
        }
    }

    /// Silent throwaway utterance for engines that drop the first request
    async fn warm_up(&self, engine: &dyn SynthesisEngine) {
        if engine.is_speaking() || engine.is_pending() {
            debug!("Speech engine already active, skipping warm-up");
            return;
        }

        if let Err(e) = engine.cancel() {
            debug!("Cancel before warm-up failed: {}", e);
        }

        let warmup = Utterance {
            text: WARMUP_TEXT.to_string(),
            voice: None,
            lang: self.inner.config.lang.clone(),
            rate: 1.0,
            pitch: 1.0,
            volume: 0.0,
        };

        match tokio::time::timeout(self.inner.config.warmup_timeout(), engine.speak(warmup)).await {
            Ok(Ok(_)) => debug!("Speech engine warm-up complete"),
            Ok(Err(e)) => debug!("Speech engine warm-up failed: {}", e),
            Err(_) => debug!("Speech engine warm-up timed out, continuing"),
        }

        if let Err(e) = engine.cancel() {
            debug!("Cancel after warm-up failed: {}", e);
        }
    }

    /// Stop any ongoing speech and signal that synthesis ended
    pub fn cancel(&self) {
        let Some(engine) = self.inner.engine.as_ref() else {
            return;
        };
        match engine.cancel() {
            Ok(()) => self.inner.events.broadcast(SpeechEvent::SynthesisEnded),
            Err(e) => warn!("Error cancelling speech: {}", e),
        }
    }

    pub fn pause(&self) {
        if let Some(engine) = self.inner.engine.as_ref() {
            if let Err(e) = engine.pause() {
                warn!("Error pausing speech: {}", e);
            }
        }
    }

    pub fn resume(&self) {
        if let Some(engine) = self.inner.engine.as_ref() {
            if let Err(e) = engine.resume() {
                warn!("Error resuming speech: {}", e);
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        let Some(engine) = self.inner.engine.as_ref() else {
            return false;
        };
        engine.is_paused().unwrap_or_else(|e| {
            warn!("Error checking pause state: {}", e);
            false
        })
    }
}

fn spawn_voice_listener(inner: Weak<SynthesisInner>, mut rx: tokio::sync::broadcast::Receiver<()>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    let Some(strong) = inner.upgrade() else { break };
                    debug!("Voice list changed");
                    SpeechSynthesisController { inner: strong }.load_voices().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<VoiceInfo> {
        vec![
            VoiceInfo::new("Google Deutsch", "de-DE"),
            VoiceInfo::new("Google UK English Female", "en-GB"),
            VoiceInfo::new("Microsoft Zira - English (United States)", "en-US"),
            VoiceInfo::new("Microsoft Hedda", "de-DE"),
        ]
    }

    #[test]
    fn test_prefers_vendor_in_locale() {
        let voice = select_voice(&voices(), &SpeechConfig::default()).unwrap();
        assert_eq!(voice.name, "Microsoft Zira - English (United States)");
    }

    #[test]
    fn test_falls_back_to_locale_then_first() {
        let mut list = voices();
        list.remove(2);
        let voice = select_voice(&list, &SpeechConfig::default()).unwrap();
        assert_eq!(voice.name, "Google UK English Female");

        let list = vec![VoiceInfo::new("Anna", "de-DE"), VoiceInfo::new("Kyoko", "ja_JP")];
        assert_eq!(select_voice(&list, &SpeechConfig::default()).unwrap().name, "Anna");
        assert!(select_voice(&[], &SpeechConfig::default()).is_none());
    }

    #[test]
    fn test_underscore_locales_match() {
        let list = vec![VoiceInfo::new("Anna", "de_DE"), VoiceInfo::new("Daniel", "en_GB")];
        assert_eq!(select_voice(&list, &SpeechConfig::default()).unwrap().name, "Daniel");
    }

    #[tokio::test]
    async fn test_unsupported_speak_resolves() {
        let controller =
            SpeechSynthesisController::new(None, SpeechConfig::default(), SpeechEventBus::new());
        assert_eq!(controller.state(), SynthesisState::Uninitialized);

        controller.speak("hello").await.unwrap();
        assert_eq!(controller.state(), SynthesisState::Unsupported);

        controller.cancel();
        controller.pause();
        controller.resume();
        assert!(!controller.is_paused());
    }
}
