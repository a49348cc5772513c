//! Speech notifications published to the surrounding UI

use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast channel capacity for speech events
const CHANNEL_CAPACITY: usize = 64;

/// Lifecycle notifications from the speech controllers
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    /// An utterance finished or was cancelled
    SynthesisEnded,
    RecognitionStarted,
    RecognitionProgress {
        final_transcript: String,
        interim_transcript: String,
    },
    RecognitionEnded {
        transcript: String,
    },
}

/// Shared publisher for [`SpeechEvent`]s
#[derive(Debug, Clone)]
pub struct SpeechEventBus {
    sender: broadcast::Sender<SpeechEvent>,
}

impl SpeechEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to all current subscribers
    pub fn broadcast(&self, event: SpeechEvent) {
        if self.sender.receiver_count() > 0 {
            debug!(?event, "Broadcasting speech event");
            let _ = self.sender.send(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SpeechEventBus {
    fn default() -> Self {
        Self::new()
    }
}
