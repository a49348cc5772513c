//! Speech-to-text lifecycle: start/stop/abort and transcript accumulation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::events::{SpeechEvent, SpeechEventBus};
use super::platform::{RecognitionEngine, RecognitionEvent, RecognitionOptions};
use super::synthesis::SpeechSynthesisController;
use crate::config::SpeechConfig;
use crate::error::SpeechError;

/// Error codes that end a session without failing the caller
const NON_FATAL_ERRORS: [&str; 2] = ["no-speech", "aborted"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    Uninitialized,
    Ready,
    Listening,
    /// Last session failed with a fatal platform error; `start` may be retried
    Error,
    /// No recognition capability; `start` always fails
    Unsupported,
}

#[derive(Debug)]
struct Status {
    state: RecognitionState,
    /// Incremented on every start so stale sessions cannot change the state
    session: u64,
}

struct RecognitionInner {
    engine: Option<Arc<dyn RecognitionEngine>>,
    synthesis: Option<SpeechSynthesisController>,
    config: SpeechConfig,
    events: SpeechEventBus,
    status: Mutex<Status>,
}

/// Handle to the recognition controller; clones share one engine
#[derive(Clone)]
pub struct SpeechRecognitionController {
    inner: Arc<RecognitionInner>,
}

impl SpeechRecognitionController {
    /// `synthesis` is cancelled before every capture so the microphone does not hear it
    pub fn new(
        engine: Option<Arc<dyn RecognitionEngine>>,
        synthesis: Option<SpeechSynthesisController>,
        config: SpeechConfig,
        events: SpeechEventBus,
    ) -> Self {
        Self {
            inner: Arc::new(RecognitionInner {
                engine,
                synthesis,
                config,
                events,
                status: Mutex::new(Status { state: RecognitionState::Uninitialized, session: 0 }),
            }),
        }
    }

    fn status(&self) -> MutexGuard<'_, Status> {
        self.inner.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> RecognitionState {
        self.status().state
    }

    pub fn is_listening(&self) -> bool {
        self.state() == RecognitionState::Listening
    }

    /// Resolve platform support; later calls are no-ops
    pub fn initialize(&self) {
        let mut status = self.status();
        if status.state != RecognitionState::Uninitialized {
            return;
        }
        status.state = if self.inner.engine.is_some() {
            info!("Speech recognition initialized");
            RecognitionState::Ready
        } else {
            error!("Speech recognition not supported on this platform");
            RecognitionState::Unsupported
        };
    }

    /// Capture speech until the session ends and return the final transcript
    ///
    /// A session already listening is stopped first; it still resolves with
    /// whatever it had accumulated.
    pub async fn start(&self) -> Result<String, SpeechError> {
        self.initialize();

        let engine = match (&self.inner.engine, self.state()) {
            (Some(engine), state) if state != RecognitionState::Unsupported => Arc::clone(engine),
            _ => {
                error!("{}", SpeechError::Unsupported);
                return Err(SpeechError::Unsupported);
            }
        };

        if self.is_listening() {
            warn!("Speech recognition is already active, stopping previous session");
            self.stop();
        }

        if let Some(synthesis) = &self.inner.synthesis {
            synthesis.cancel();
            tokio::time::sleep(self.inner.config.handoff_delay()).await;
        }

        let options = RecognitionOptions {
            continuous: true,
            interim_results: true,
            lang: self.inner.config.lang.clone(),
            max_alternatives: 1,
        };

        let rx = engine.start(&options).map_err(|e| {
            error!("Error starting speech recognition: {}", e);
            self.status().state = RecognitionState::Error;
            SpeechError::StartFailed(e.to_string())
        })?;

        let session = {
            let mut status = self.status();
            status.session += 1;
            status.state = RecognitionState::Listening;
            status.session
        };
        info!("Speech recognition started (session {})", session);
        self.inner.events.broadcast(SpeechEvent::RecognitionStarted);

        self.run_session(session, rx).await
    }

    async fn run_session(
        &self,
        session: u64,
        mut rx: mpsc::UnboundedReceiver<RecognitionEvent>,
    ) -> Result<String, SpeechError> {
        let mut final_transcript = String::new();

        while let Some(event) = rx.recv().await {
            match event {
                RecognitionEvent::Result { result_index, results } => {
                    let mut interim = String::new();
                    for segment in results.iter().skip(result_index) {
                        if segment.is_final {
                            final_transcript.push_str(&segment.transcript);
                            debug!("Final transcript updated: {}", final_transcript);
                        } else {
                            interim.push_str(&segment.transcript);
                        }
                    }
                    self.inner.events.broadcast(SpeechEvent::RecognitionProgress {
                        final_transcript: final_transcript.clone(),
                        interim_transcript: interim,
                    });
                }
                RecognitionEvent::Error(code) if NON_FATAL_ERRORS.contains(&code.as_str()) => {
                    info!("Speech recognition ended without result: {}", code);
                    self.finish(session, RecognitionState::Ready, &final_transcript);
                    return Ok(String::new());
                }
                RecognitionEvent::Error(code) => {
                    error!("Speech recognition error: {}", code);
                    self.finish(session, RecognitionState::Error, &final_transcript);
                    return Err(SpeechError::Recognition(code));
                }
                RecognitionEvent::End => break,
            }
        }

        info!("Speech recognition ended (session {})", session);
        self.finish(session, RecognitionState::Ready, &final_transcript);
        Ok(final_transcript)
    }

    fn finish(&self, session: u64, state: RecognitionState, transcript: &str) {
        {
            let mut status = self.status();
            if status.session == session {
                status.state = state;
            }
        }
        self.inner.events.broadcast(SpeechEvent::RecognitionEnded {
            transcript: transcript.to_string(),
        });
    }

    /// Ask the engine to finish; the pending `start` still gets the transcript
    pub fn stop(&self) {
        let Some(engine) = self.take_listening() else {
            return;
        };
        debug!("Stopping speech recognition");
        if let Err(e) = engine.stop() {
            warn!("Error stopping speech recognition: {}", e);
        }
    }

    /// Drop the current session immediately
    pub fn abort(&self) {
        let Some(engine) = self.take_listening() else {
            return;
        };
        debug!("Aborting speech recognition");
        if let Err(e) = engine.abort() {
            warn!("Error aborting speech recognition: {}", e);
        }
    }

    /// Leave the listening state, returning the engine if there was a session
    fn take_listening(&self) -> Option<Arc<dyn RecognitionEngine>> {
        let engine = self.inner.engine.as_ref()?;
        let mut status = self.status();
        if status.state != RecognitionState::Listening {
            return None;
        }
        status.state = RecognitionState::Ready;
        Some(Arc::clone(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_start_rejects() {
        let controller = SpeechRecognitionController::new(
            None,
            None,
            SpeechConfig::default(),
            SpeechEventBus::new(),
        );
        assert_eq!(controller.state(), RecognitionState::Uninitialized);

        assert_eq!(controller.start().await, Err(SpeechError::Unsupported));
        assert_eq!(controller.state(), RecognitionState::Unsupported);

        controller.stop();
        controller.abort();
        assert!(!controller.is_listening());
    }
}
