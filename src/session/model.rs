//! Capture session data model.
//!
//! A session's identity (id, platform, url, start time) is fixed at
//! creation; its accumulating state (phase, participants, chunks,
//! transcript) lives behind one lock so every mutation happens in a single
//! turn. Appends are accepted only while the session is `Active`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(format!("session-{}", Uuid::new_v4().simple()))
    }

    /// Wrap an externally-supplied id (API path parameter, CLI arg).
    /// Unknown ids simply fail lookup.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phase of the one-directional session lifecycle:
/// `Initializing → Active → Stopping → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Initializing,
    Active,
    Stopping,
    Closed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Stopping => "stopping",
            Self::Closed => "closed",
        }
    }
}

/// One committed utterance. Entries are immutable once created and only
/// final recognizer results produce them; interim text is never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub speaker: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub confidence: f32,
    pub is_final: bool,
}

/// Speaker attribution is best-effort until diarization exists.
const DEFAULT_SPEAKER: &str = "Current Speaker";

/// Confidence used when the recognizer does not report one.
const DEFAULT_CONFIDENCE: f32 = 0.9;

impl TranscriptEntry {
    pub fn final_utterance(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            id: format!("entry-{}", Uuid::new_v4().simple()),
            speaker: DEFAULT_SPEAKER.to_string(),
            text: text.into(),
            timestamp: Utc::now(),
            confidence: confidence.unwrap_or(DEFAULT_CONFIDENCE),
            is_final: true,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    is_recording: bool,
    is_transcribing: bool,
    participants: Vec<String>,
    recording_chunks: Vec<Vec<u8>>,
    transcript: Vec<TranscriptEntry>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Initializing,
            is_recording: false,
            is_transcribing: false,
            participants: Vec::new(),
            recording_chunks: Vec::new(),
            transcript: Vec::new(),
        }
    }
}

pub struct CaptureSession {
    pub id: SessionId,
    pub platform: Platform,
    pub meeting_url: String,
    pub started_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl CaptureSession {
    pub fn new(platform: Platform, meeting_url: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            platform,
            meeting_url: meeting_url.into(),
            started_at: Utc::now(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    /// `Initializing → Active` once resources are attached. The booleans
    /// record which subsystems attached successfully and stay set until
    /// teardown.
    pub async fn activate(&self, recording: bool, transcribing: bool) {
        let mut state = self.state.lock().await;
        state.phase = SessionPhase::Active;
        state.is_recording = recording;
        state.is_transcribing = transcribing;
    }

    /// `Active → Stopping`. Returns false if the session is not `Active`,
    /// which makes a racing second stop a no-op.
    pub async fn try_begin_stop(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.phase != SessionPhase::Active {
            return false;
        }
        state.phase = SessionPhase::Stopping;
        true
    }

    /// Append a participant. Dropped unless the session is `Active`.
    pub async fn push_participant(&self, name: String) -> bool {
        let mut state = self.state.lock().await;
        if state.phase != SessionPhase::Active {
            return false;
        }
        state.participants.push(name);
        true
    }

    /// Append committed transcript entries in arrival order. Dropped unless
    /// the session is `Active`.
    pub async fn push_entries(&self, entries: Vec<TranscriptEntry>) -> bool {
        let mut state = self.state.lock().await;
        if state.phase != SessionPhase::Active {
            return false;
        }
        state.transcript.extend(entries);
        true
    }

    /// Append a recording chunk. Chunks are consumed only at finalize, and
    /// the sink flushes its last chunk during `Stopping`, so both phases
    /// accept appends.
    pub async fn push_chunk(&self, chunk: Vec<u8>) -> bool {
        let mut state = self.state.lock().await;
        if state.phase != SessionPhase::Active && state.phase != SessionPhase::Stopping {
            return false;
        }
        state.recording_chunks.push(chunk);
        true
    }

    /// `Stopping → Closed`: take the buffered chunks (consumed only here)
    /// and a copy of the transcript for final processing.
    pub async fn finalize(&self) -> (Vec<Vec<u8>>, Vec<TranscriptEntry>) {
        let mut state = self.state.lock().await;
        state.phase = SessionPhase::Closed;
        state.is_recording = false;
        state.is_transcribing = false;
        (
            std::mem::take(&mut state.recording_chunks),
            state.transcript.clone(),
        )
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            id: self.id.clone(),
            platform: self.platform,
            meeting_url: self.meeting_url.clone(),
            started_at: self.started_at,
            phase: state.phase,
            is_recording: state.is_recording,
            is_transcribing: state.is_transcribing,
            participants: state.participants.clone(),
            transcript_entries: state.transcript.clone(),
            chunk_count: state.recording_chunks.len(),
            recorded_bytes: state.recording_chunks.iter().map(Vec::len).sum(),
        }
    }
}

/// Point-in-time view of a session, safe to hand to the UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub platform: Platform,
    pub meeting_url: String,
    pub started_at: DateTime<Utc>,
    pub phase: SessionPhase,
    pub is_recording: bool,
    pub is_transcribing: bool,
    pub participants: Vec<String>,
    pub transcript_entries: Vec<TranscriptEntry>,
    pub chunk_count: usize,
    pub recorded_bytes: usize,
}
