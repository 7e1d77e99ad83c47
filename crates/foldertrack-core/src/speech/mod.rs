//! Dictation into the query field.
//!
//! A [`TranscriptionBridge`] owns at most one listening session at a time.
//! Each session runs on its own task and reports exactly one
//! [`TranscriptionEvent`] unless it is stopped first. Results carry the id of
//! the session that produced them so late arrivals from a stopped session
//! can be told apart and dropped.

pub mod command;
pub mod scripted;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::Notice;

pub use command::CommandRecognizer;
pub use scripted::ScriptedRecognizer;

/// Shown to the operator for any failed dictation.
pub const RECOGNITION_FAILED: &str = "Speech recognition failed. Please try again.";

pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(30);

pub type RecognitionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, TranscriptionError>> + Send + 'a>>;

/// A speech-to-text engine that listens once and returns the final text.
pub trait SpeechRecognizer: Send + Sync {
    fn recognize(&self) -> RecognitionFuture<'_>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("speech engine error: {0}")]
    Engine(String),
    #[error("no speech detected")]
    NoSpeech,
    #[error("no result after {0:?}")]
    Timeout(Duration),
    #[error("no speech recognizer configured")]
    Unavailable,
}

impl TranscriptionError {
    pub fn notice(&self) -> Notice {
        Notice::error(RECOGNITION_FAILED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

/// What a call to [`TranscriptionBridge::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started(u64),
    Stopped(u64),
}

/// Final result of one listening session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionEvent {
    pub session: u64,
    pub result: Result<String, TranscriptionError>,
}

struct ActiveSession {
    id: u64,
    cancel: CancellationToken,
}

pub struct TranscriptionBridge {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    events: mpsc::UnboundedSender<TranscriptionEvent>,
    timeout: Option<Duration>,
    next_session: u64,
    active: Option<ActiveSession>,
}

impl TranscriptionBridge {
    /// `timeout` of `None` lets a session listen until it is stopped.
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        events: mpsc::UnboundedSender<TranscriptionEvent>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            recognizer,
            events,
            timeout,
            next_session: 1,
            active: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn state(&self) -> ListenState {
        if self.active.is_some() {
            ListenState::Listening
        } else {
            ListenState::Idle
        }
    }

    pub fn is_listening(&self) -> bool {
        self.active.is_some()
    }

    /// Start listening when idle, stop when listening.
    ///
    /// Must be called from within a tokio runtime.
    pub fn toggle(&mut self) -> Result<ToggleOutcome, TranscriptionError> {
        if let Some(id) = self.stop() {
            return Ok(ToggleOutcome::Stopped(id));
        }
        let recognizer = self
            .recognizer
            .clone()
            .ok_or(TranscriptionError::Unavailable)?;

        let id = self.next_session;
        self.next_session += 1;
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let events = self.events.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = task_cancel.cancelled() => return,
                r = recognizer.recognize() => r,
                _ = expire(timeout) => Err(TranscriptionError::Timeout(timeout.unwrap_or_default())),
            };
            let _ = events.send(TranscriptionEvent {
                session: id,
                result,
            });
        });

        tracing::debug!(session = id, "listening started");
        self.active = Some(ActiveSession { id, cancel });
        Ok(ToggleOutcome::Started(id))
    }

    /// Cancel the current session, if any. Always leaves the bridge idle.
    pub fn stop(&mut self) -> Option<u64> {
        let session = self.active.take()?;
        session.cancel.cancel();
        tracing::debug!(session = session.id, "listening stopped");
        Some(session.id)
    }

    /// Settle a session result.
    ///
    /// Returns `None` for results of sessions that are no longer current.
    /// A successful transcript is trimmed; a blank one becomes
    /// [`TranscriptionError::NoSpeech`].
    pub fn accept(&mut self, event: TranscriptionEvent) -> Option<Result<String, TranscriptionError>> {
        match &self.active {
            Some(active) if active.id == event.session => {}
            _ => {
                tracing::debug!(session = event.session, "dropping stale transcription result");
                return None;
            }
        }
        self.active = None;
        let result = event.result.and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(TranscriptionError::NoSpeech)
            } else {
                Ok(text.to_string())
            }
        });
        if let Err(e) = &result {
            tracing::warn!(session = event.session, error = %e, "transcription failed");
        }
        Some(result)
    }
}

impl Drop for TranscriptionBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn expire(timeout: Option<Duration>) {
    match timeout {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(
        recognizer: ScriptedRecognizer,
        timeout: Option<Duration>,
    ) -> (
        TranscriptionBridge,
        Arc<ScriptedRecognizer>,
        mpsc::UnboundedReceiver<TranscriptionEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let recognizer = Arc::new(recognizer);
        let bridge = TranscriptionBridge::new(
            Some(recognizer.clone() as Arc<dyn SpeechRecognizer>),
            tx,
            timeout,
        );
        (bridge, recognizer, rx)
    }

    #[tokio::test]
    async fn transcript_is_trimmed_and_bridge_returns_idle() {
        let (mut bridge, _rec, mut rx) =
            bridge(ScriptedRecognizer::new().then_text("  HN-204 \n"), None);

        assert_eq!(bridge.toggle(), Ok(ToggleOutcome::Started(1)));
        assert_eq!(bridge.state(), ListenState::Listening);

        let event = rx.recv().await.unwrap();
        assert_eq!(bridge.accept(event), Some(Ok("HN-204".to_string())));
        assert_eq!(bridge.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn engine_failure_returns_to_idle_with_error() {
        let (mut bridge, _rec, mut rx) = bridge(
            ScriptedRecognizer::new().then_error(TranscriptionError::Engine("mic busy".into())),
            None,
        );
        bridge.toggle().unwrap();

        let event = rx.recv().await.unwrap();
        let result = bridge.accept(event).unwrap();

        assert_eq!(result, Err(TranscriptionError::Engine("mic busy".into())));
        assert_eq!(result.unwrap_err().notice(), Notice::error(RECOGNITION_FAILED));
        assert!(!bridge.is_listening());
    }

    #[tokio::test]
    async fn blank_transcript_is_no_speech() {
        let (mut bridge, _rec, mut rx) = bridge(ScriptedRecognizer::new().then_text("   "), None);
        bridge.toggle().unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(bridge.accept(event), Some(Err(TranscriptionError::NoSpeech)));
    }

    #[tokio::test]
    async fn toggle_while_listening_stops_without_second_session() {
        let (mut bridge, rec, _rx) = bridge(ScriptedRecognizer::new(), None);

        assert_eq!(bridge.toggle(), Ok(ToggleOutcome::Started(1)));
        tokio::task::yield_now().await;
        assert_eq!(bridge.toggle(), Ok(ToggleOutcome::Stopped(1)));
        tokio::task::yield_now().await;

        assert_eq!(bridge.state(), ListenState::Idle);
        assert_eq!(rec.call_count(), 1);
    }

    #[tokio::test]
    async fn stale_result_from_stopped_session_is_dropped() {
        let (mut bridge, _rec, _rx) = bridge(ScriptedRecognizer::new(), None);
        bridge.toggle().unwrap();
        bridge.stop();
        bridge.toggle().unwrap();

        let late = TranscriptionEvent {
            session: 1,
            result: Ok("old words".into()),
        };
        assert_eq!(bridge.accept(late), None);
        // The current session is untouched by the stale result.
        assert!(bridge.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_session_times_out() {
        let (mut bridge, _rec, mut rx) =
            bridge(ScriptedRecognizer::new(), Some(DEFAULT_LISTEN_TIMEOUT));
        bridge.toggle().unwrap();

        let event = rx.recv().await.unwrap();

        assert_eq!(
            bridge.accept(event),
            Some(Err(TranscriptionError::Timeout(DEFAULT_LISTEN_TIMEOUT)))
        );
        assert_eq!(bridge.state(), ListenState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_session_never_delivers_its_late_transcript() {
        let (mut bridge, _rec, mut rx) = bridge(
            ScriptedRecognizer::new()
                .then_text("HN-310")
                .with_delay(Duration::from_secs(5)),
            None,
        );
        bridge.toggle().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(bridge.toggle(), Ok(ToggleOutcome::Stopped(1)));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(bridge.state(), ListenState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_beats_a_slower_engine() {
        let (mut bridge, _rec, mut rx) = bridge(
            ScriptedRecognizer::new()
                .then_text("too late")
                .with_delay(Duration::from_secs(60)),
            Some(Duration::from_secs(3)),
        );
        bridge.toggle().unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(
            bridge.accept(event),
            Some(Err(TranscriptionError::Timeout(Duration::from_secs(3))))
        );
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_no_op() {
        let (mut bridge, rec, _rx) = bridge(ScriptedRecognizer::new(), None);
        assert_eq!(bridge.stop(), None);
        assert_eq!(bridge.state(), ListenState::Idle);
        assert_eq!(rec.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_recognizer_reports_unavailable() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut bridge = TranscriptionBridge::new(None, tx, None);
        assert_eq!(bridge.toggle(), Err(TranscriptionError::Unavailable));
        assert_eq!(bridge.state(), ListenState::Idle);
    }
}
