//! Speech recognizer port and the simulated default backend.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TranscribeError {
    /// No speech recognition backend exists on this host.
    #[error("speech recognition not supported on this host")]
    Unsupported,

    /// Microphone access for recognition was denied. Retrying cannot succeed.
    #[error("microphone access denied for speech recognition")]
    PermissionDenied,

    /// Transient recognizer fault.
    #[error("recognizer fault: {0}")]
    Fault(String),
}

impl TranscribeError {
    /// Terminal errors must never be retried; the session continues without
    /// transcription instead.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unsupported | Self::PermissionDenied)
    }
}

/// One recognized speech segment. Interim segments are revisions in flight;
/// final segments are committed utterances.
#[derive(Debug, Clone)]
pub struct RecognizedSegment {
    pub text: String,
    pub confidence: Option<f32>,
    pub is_final: bool,
}

impl RecognizedSegment {
    pub fn final_text(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: Some(confidence),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            is_final: false,
        }
    }
}

#[derive(Debug)]
pub enum RecognizerEvent {
    /// One result batch; may mix final and interim segments.
    Results(Vec<RecognizedSegment>),
    /// A recognizer fault. Terminal errors end the run permanently.
    Error(TranscribeError),
    /// The run ended on its own, the way silence detection does.
    Ended,
}

/// Continuous-mode speech recognizer.
///
/// Each `begin_run` starts one recognition run; events arrive on the
/// returned channel until the run ends or errors. Runs end spontaneously;
/// keeping recognition alive across runs is the engine's job, not the
/// recognizer's.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn begin_run(&self) -> Result<mpsc::Receiver<RecognizerEvent>, TranscribeError>;
}

/// Deterministic recognizer used when no real speech backend is wired in.
/// Replays a canned script (interim preview first, committed line after),
/// then ends the run the way silence detection would.
pub struct SimulatedRecognizer {
    cadence: Duration,
    script: Vec<String>,
}

const SCRIPT: &[&str] = &[
    "Let's get started with the quarterly roadmap review.",
    "The capture pipeline milestone is on track for next week.",
    "We need to follow up on the transcription accuracy numbers.",
    "Sarah will schedule the design review before Friday.",
];

impl SimulatedRecognizer {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence,
            script: SCRIPT.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_script(cadence: Duration, script: Vec<String>) -> Self {
        Self { cadence, script }
    }
}

#[async_trait]
impl SpeechRecognizer for SimulatedRecognizer {
    async fn begin_run(&self) -> Result<mpsc::Receiver<RecognizerEvent>, TranscribeError> {
        let (tx, rx) = mpsc::channel(8);
        let cadence = self.cadence;
        let script = self.script.clone();

        tokio::spawn(async move {
            for (i, line) in script.iter().enumerate() {
                let preview: String = line.chars().take(line.len() / 2).collect();
                let interim = RecognizerEvent::Results(vec![RecognizedSegment::interim(preview)]);
                if tx.send(interim).await.is_err() {
                    return;
                }
                tokio::time::sleep(cadence).await;

                let confidence = 0.86 + (i % 10) as f32 * 0.01;
                let committed = RecognizerEvent::Results(vec![RecognizedSegment::final_text(
                    line.clone(),
                    confidence,
                )]);
                if tx.send(committed).await.is_err() {
                    return;
                }
                tokio::time::sleep(cadence).await;
            }
            let _ = tx.send(RecognizerEvent::Ended).await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_run_ends_after_script() {
        let recognizer = SimulatedRecognizer::with_script(
            Duration::from_millis(1),
            vec!["hello world".to_string()],
        );

        let mut rx = recognizer.begin_run().await.unwrap();
        let mut finals = Vec::new();
        let mut ended = false;
        while let Some(event) = rx.recv().await {
            match event {
                RecognizerEvent::Results(segments) => {
                    finals.extend(segments.into_iter().filter(|s| s.is_final));
                }
                RecognizerEvent::Ended => {
                    ended = true;
                    break;
                }
                RecognizerEvent::Error(e) => panic!("unexpected error: {e}"),
            }
        }

        assert!(ended);
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].text, "hello world");
        assert!(finals[0].confidence.unwrap() > 0.8);
    }

    #[test]
    fn test_terminal_classification() {
        assert!(TranscribeError::Unsupported.is_terminal());
        assert!(TranscribeError::PermissionDenied.is_terminal());
        assert!(!TranscribeError::Fault("network blip".into()).is_terminal());
    }
}
