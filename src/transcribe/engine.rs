//! Continuous transcription engine.
//!
//! Streaming recognizers end runs spontaneously (silence timeouts); the
//! engine's job is to keep recognition alive anyway. Restart is gated on an
//! explicit state machine: `stop()` moves to `Stopped` and every restart
//! path re-checks the state (including after the backoff sleep), so a stop
//! racing a restart can never resurrect the engine.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::recognizer::{RecognizerEvent, SpeechRecognizer, TranscribeError};
use crate::session::TranscriptEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Restarting,
    Stopped,
}

/// Transcript output from one recognizer result batch: committed entries
/// plus the transient interim text (never persisted).
#[derive(Debug, Clone)]
pub struct TranscriptUpdate {
    pub entries: Vec<TranscriptEntry>,
    pub interim: String,
}

pub struct TranscriptionEngine {
    recognizer: Arc<dyn SpeechRecognizer>,
    restart_backoff: Duration,
    state: Arc<Mutex<EngineState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TranscriptionEngine {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, restart_backoff: Duration) -> Self {
        Self {
            recognizer,
            restart_backoff,
            state: Arc::new(Mutex::new(EngineState::Idle)),
            task: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> EngineState {
        *self.state.lock().await
    }

    /// Begin continuous recognition. Final segments are delivered as
    /// transcript entries on `updates`; interim text rides along transiently.
    ///
    /// Fails only when the first run cannot start at all; the caller
    /// downgrades the session to capture-only in that case.
    pub async fn start(
        &self,
        updates: mpsc::Sender<TranscriptUpdate>,
    ) -> Result<(), TranscribeError> {
        let rx = match self.recognizer.begin_run().await {
            Ok(rx) => rx,
            Err(e) => {
                *self.state.lock().await = EngineState::Stopped;
                return Err(e);
            }
        };

        *self.state.lock().await = EngineState::Running;

        let recognizer = Arc::clone(&self.recognizer);
        let state = Arc::clone(&self.state);
        let backoff = self.restart_backoff;
        let handle = tokio::spawn(drive(recognizer, state, backoff, rx, updates));
        *self.task.lock().await = Some(handle);

        Ok(())
    }

    /// Stop recognition and permanently suppress auto-restart.
    pub async fn stop(&self) {
        *self.state.lock().await = EngineState::Stopped;
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for TranscriptionEngine {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.try_lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

async fn drive(
    recognizer: Arc<dyn SpeechRecognizer>,
    state: Arc<Mutex<EngineState>>,
    backoff: Duration,
    mut rx: mpsc::Receiver<RecognizerEvent>,
    updates: mpsc::Sender<TranscriptUpdate>,
) {
    'runs: loop {
        // Pump one recognition run to its end.
        loop {
            match rx.recv().await {
                Some(RecognizerEvent::Results(segments)) => {
                    let mut entries = Vec::new();
                    let mut interim = String::new();
                    for segment in segments {
                        if segment.is_final {
                            entries.push(TranscriptEntry::final_utterance(
                                segment.text,
                                segment.confidence,
                            ));
                        } else {
                            if !interim.is_empty() {
                                interim.push(' ');
                            }
                            interim.push_str(&segment.text);
                        }
                    }
                    if entries.is_empty() && interim.is_empty() {
                        continue;
                    }
                    if updates.send(TranscriptUpdate { entries, interim }).await.is_err() {
                        // Session side is gone; nothing left to transcribe for.
                        *state.lock().await = EngineState::Stopped;
                        return;
                    }
                }
                Some(RecognizerEvent::Error(e)) if e.is_terminal() => {
                    warn!("Speech recognition permanently unavailable: {e}");
                    *state.lock().await = EngineState::Stopped;
                    return;
                }
                Some(RecognizerEvent::Error(e)) => {
                    warn!("Recognizer error, continuing: {e}");
                }
                Some(RecognizerEvent::Ended) | None => break,
            }
        }

        // Between runs: restart with backoff until a run starts or stop wins.
        loop {
            {
                let mut st = state.lock().await;
                if *st == EngineState::Stopped {
                    return;
                }
                *st = EngineState::Restarting;
            }

            debug!("Recognizer run ended, restarting in {:?}", backoff);
            sleep(backoff).await;

            if *state.lock().await == EngineState::Stopped {
                return;
            }

            match recognizer.begin_run().await {
                Ok(new_rx) => {
                    rx = new_rx;
                    *state.lock().await = EngineState::Running;
                    continue 'runs;
                }
                Err(e) if e.is_terminal() => {
                    warn!("Speech recognition permanently unavailable: {e}");
                    *state.lock().await = EngineState::Stopped;
                    return;
                }
                Err(e) => {
                    warn!("Recognizer restart failed, retrying: {e}");
                }
            }
        }
    }
}
