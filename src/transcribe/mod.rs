//! Live speech-to-text pipeline.
//!
//! A [`SpeechRecognizer`] produces one continuous run of interim/final
//! result batches per `begin_run`; the [`TranscriptionEngine`] keeps runs
//! going for the lifetime of a session, restarting after spontaneous ends.

pub mod engine;
pub mod recognizer;

pub use engine::{EngineState, TranscriptUpdate, TranscriptionEngine};
pub use recognizer::{
    RecognizedSegment, RecognizerEvent, SimulatedRecognizer, SpeechRecognizer, TranscribeError,
};
