//! Mock recognition engine for testing
//!
//! Each `start` opens a channel the test can push results into.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use picquiz_core::speech::{
    RecognitionEngine, RecognitionEvent, RecognitionOptions, RecognitionSegment,
};
use picquiz_core::SpeechError;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct MockRecognizer {
    current: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
    pub options: Mutex<Vec<RecognitionOptions>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub aborts: AtomicUsize,
    pub fail_start: AtomicBool,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event into the current session
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        match self.current.lock().unwrap().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn emit_results(&self, result_index: usize, results: Vec<RecognitionSegment>) -> bool {
        self.emit(RecognitionEvent::Result { result_index, results })
    }

    /// Wait until `start` has been called `count` times
    pub async fn wait_for_starts(&self, count: usize) {
        for _ in 0..200 {
            if self.starts.load(Ordering::SeqCst) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("recognition was not started {} times", count);
    }
}

impl RecognitionEngine for MockRecognizer {
    fn start(
        &self,
        options: &RecognitionOptions,
    ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, SpeechError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(SpeechError::Platform("not-allowed".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.current.lock().unwrap() = Some(tx);
        self.options.lock().unwrap().push(options.clone());
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(rx)
    }

    fn stop(&self) -> Result<(), SpeechError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.current.lock().unwrap().take() {
            let _ = tx.send(RecognitionEvent::End);
        }
        Ok(())
    }

    fn abort(&self) -> Result<(), SpeechError> {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.current.lock().unwrap().take() {
            let _ = tx.send(RecognitionEvent::Error("aborted".to_string()));
            let _ = tx.send(RecognitionEvent::End);
        }
        Ok(())
    }
}
