//! Shared test helpers

#![allow(dead_code)]

pub mod mock_recognition;
pub mod mock_synthesis;

use std::time::Duration;

use picquiz_core::speech::{SpeechEvent, VoiceInfo};
use picquiz_core::SpeechConfig;
use tokio::sync::broadcast;

pub use mock_recognition::MockRecognizer;
pub use mock_synthesis::MockSynth;

/// Speech settings with no artificial delays
pub fn fast_config() -> SpeechConfig {
    SpeechConfig::immediate(Duration::from_millis(50))
}

pub fn english_voices() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo::new("Google Deutsch", "de-DE"),
        VoiceInfo::new("Google US English", "en-US"),
        VoiceInfo::new("Microsoft David - English (United States)", "en-US"),
    ]
}

/// Everything already published on `rx`
pub fn drain(rx: &mut broadcast::Receiver<SpeechEvent>) -> Vec<SpeechEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wait until `condition` holds, failing the test after about a second
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
