//! Scripted recognizer for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{RecognitionFuture, SpeechRecognizer, TranscriptionError};

/// A hand-rolled [`SpeechRecognizer`] that replays queued results in order.
///
/// Once the queue is empty every further session listens forever, which is
/// how tests keep a session open.
#[derive(Default)]
pub struct ScriptedRecognizer {
    responses: Mutex<VecDeque<Result<String, TranscriptionError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then(Ok(text.into()))
    }

    pub fn then_error(self, error: TranscriptionError) -> Self {
        self.then(Err(error))
    }

    fn then(self, response: Result<String, TranscriptionError>) -> Self {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(response);
        }
        self
    }

    /// Wait this long before answering each session.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of sessions started against this recognizer.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn recognize(&self) -> RecognitionFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        let delay = self.delay;
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match next {
                Some(result) => result,
                None => std::future::pending().await,
            }
        })
    }
}
