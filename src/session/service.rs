//! Capture session orchestration.
//!
//! One `CaptureService` instance per process, constructed with its backends
//! injected, never a global singleton. Each `start_capture` acquires fresh
//! device handles from the gateway, so concurrent sessions are supported
//! and every session releases exactly the resources it acquired.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::model::{CaptureSession, SessionId, SessionSnapshot};
use super::registry::{ActiveSession, SessionRegistry, SessionResources, StopOutcome};
use crate::error::CaptureError;
use crate::events::EventBus;
use crate::media::{MediaAcquisition, MediaGateway};
use crate::platform::{self, Platform, PlatformIntegration};
use crate::recording::{Recording, RecordingSink};
use crate::summary::{self, Summarizer};
use crate::transcribe::{SpeechRecognizer, TranscriptUpdate, TranscriptionEngine};

#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    /// Recording chunk cadence.
    pub chunk_interval: Duration,
    /// Backoff before restarting a recognizer run that ended on its own.
    pub restart_backoff: Duration,
    /// Bounded wait for device permission prompts.
    pub prompt_timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            chunk_interval: Duration::from_secs(1),
            restart_backoff: Duration::from_millis(100),
            prompt_timeout: Duration::from_secs(30),
        }
    }
}

pub struct CaptureService {
    acquisition: MediaAcquisition,
    recognizer: Arc<dyn SpeechRecognizer>,
    registry: Arc<SessionRegistry>,
    events: Arc<EventBus>,
    summarizer: Option<Arc<dyn Summarizer>>,
    settings: CaptureSettings,
    /// Ids of sessions this service has closed; a stop on one of these is
    /// an idempotent no-op rather than `SessionNotFound`.
    closed: Mutex<HashSet<SessionId>>,
}

impl CaptureService {
    pub fn new(
        gateway: Arc<dyn MediaGateway>,
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            acquisition: MediaAcquisition::new(gateway, settings.prompt_timeout),
            recognizer,
            registry: Arc::new(SessionRegistry::new()),
            events: Arc::new(EventBus::new()),
            summarizer: None,
            settings,
            closed: Mutex::new(HashSet::new()),
        }
    }

    /// Attach an optional post-capture summarizer. Its failures are logged
    /// and never affect session teardown.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Subscription point for transcript/participant/recording events.
    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    /// The platform integrations shown to the UI at startup.
    pub fn platform_integrations(&self) -> Vec<PlatformIntegration> {
        platform::integrations()
    }

    /// Start a capture session for a meeting. Acquires media, attaches the
    /// transcription engine and recording sink, and begins the participant
    /// feed. On any acquisition failure every partially-acquired resource is
    /// released and no session becomes visible.
    pub async fn start_capture(
        &self,
        platform: Platform,
        meeting_url: &str,
    ) -> Result<SessionId, CaptureError> {
        let session = Arc::new(CaptureSession::new(platform, meeting_url));
        let id = session.id.clone();
        info!("Starting {} capture session {}", platform, id);

        if let Some(meta) = platform::extract_meeting_metadata(meeting_url) {
            debug!(
                "Meeting metadata: platform={} meeting_id={}",
                meta.platform, meta.meeting_id
            );
        }

        // The acquisition wait is the cancellable part: abandoning it here
        // releases whatever was acquired via the stream's drop path.
        let stream = self.acquisition.acquire().await?;

        // Once media is in hand the session must always reach the registry,
        // so wiring runs in its own task: a caller that gives up mid-await
        // leaves a stoppable session behind, never orphaned resources.
        let wiring = tokio::spawn(wire_session(
            session,
            stream,
            self.recognizer.clone(),
            self.registry.clone(),
            self.events.clone(),
            self.settings,
        ));
        wiring
            .await
            .map_err(|e| CaptureError::RecorderFault(format!("session wiring failed: {e}")))?;

        info!("Capture session {} active", id);
        Ok(id)
    }

    /// Stop a capture session and finalize its recording.
    ///
    /// Idempotent: stopping a session that is already stopping or was
    /// already closed is a success no-op. Only ids this service never
    /// created fail with `SessionNotFound`.
    pub async fn stop_capture(&self, id: &SessionId) -> Result<(), CaptureError> {
        match self.registry.begin_stop(id).await {
            StopOutcome::Detached { session, resources } => {
                self.teardown(session, resources).await;
                Ok(())
            }
            StopOutcome::AlreadyStopping => {
                debug!("Session {} already stopping, ignoring", id);
                Ok(())
            }
            StopOutcome::NotFound => {
                if self.closed.lock().await.contains(id) {
                    debug!("Session {} already closed, ignoring", id);
                    Ok(())
                } else {
                    Err(CaptureError::SessionNotFound(id.clone()))
                }
            }
        }
    }

    /// A snapshot of one session still in the registry.
    pub async fn active_session(&self, id: &SessionId) -> Option<SessionSnapshot> {
        match self.registry.get(id).await {
            Some(session) => Some(session.snapshot().await),
            None => None,
        }
    }

    /// Snapshots of every session still in the registry.
    pub async fn active_sessions(&self) -> Vec<SessionSnapshot> {
        let mut snapshots = Vec::new();
        for session in self.registry.list().await {
            snapshots.push(session.snapshot().await);
        }
        snapshots
    }

    /// Stop every active session. Used at service shutdown.
    pub async fn shutdown(&self) {
        for session in self.registry.list().await {
            if let Err(e) = self.stop_capture(&session.id).await {
                warn!("Failed to stop session {} at shutdown: {}", session.id, e);
            }
        }
    }

    /// Release every resource the session acquired, consolidate its chunks
    /// into the final recording, and hand the artifact to subscribers. Runs
    /// exactly once per session (the registry guarantees single detach).
    async fn teardown(&self, session: Arc<CaptureSession>, resources: SessionResources) {
        let id = session.id.clone();
        info!("Stopping capture session {}", id);

        // Stop producers first so the pumps see closed channels and drain.
        resources.engine.stop().await;
        resources.sink.stop().await;
        resources.feed.abort();
        for pump in resources.pumps {
            let _ = pump.await;
        }

        // Every device handle back to the OS, no matter how we got here.
        resources.stream.lock().await.release();

        let (chunks, transcript) = session.finalize().await;
        let recording = Recording::assemble(chunks);
        self.registry.remove(&id).await;
        self.closed.lock().await.insert(id.clone());

        info!(
            "Capture session {} closed: {} chunks, {} bytes, {} transcript entries",
            id,
            recording.chunk_count,
            recording.len(),
            transcript.len()
        );

        self.events
            .recording_complete(&id, &recording, &transcript)
            .await;
        self.events.drop_session(&id).await;

        if let Some(summarizer) = &self.summarizer {
            if !transcript.is_empty() {
                let summarizer = summarizer.clone();
                let title = format!("{} meeting", session.platform.display_name());
                let text = summary::transcript_text(&transcript);
                tokio::spawn(async move {
                    match summarizer.summarize(&text, &title).await {
                        Ok(result) => info!(
                            "Summary ready for {}: {} topics, {} action items",
                            id,
                            result.topics.len(),
                            result.action_items.len()
                        ),
                        Err(e) => warn!("Post-capture summarization failed for {}: {}", id, e),
                    }
                });
            }
        }
    }
}

/// Attach engine, sink, feed, and pumps to an acquired stream and register
/// the session. Runs detached from the caller so it always completes.
async fn wire_session(
    session: Arc<CaptureSession>,
    stream: crate::media::CombinedStream,
    recognizer: Arc<dyn SpeechRecognizer>,
    registry: Arc<SessionRegistry>,
    events: Arc<EventBus>,
    settings: CaptureSettings,
) {
    let stream = Arc::new(Mutex::new(stream));

    // A terminal recognizer failure downgrades the session to capture-only;
    // it is not a reason to abort the meeting recording.
    let engine = TranscriptionEngine::new(recognizer, settings.restart_backoff);
    let (update_tx, update_rx) = mpsc::channel(32);
    let transcribing = match engine.start(update_tx).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Session {} continues without transcription: {}",
                session.id, e
            );
            false
        }
    };

    let (chunk_tx, chunk_rx) = mpsc::channel(32);
    let sink = RecordingSink::start(stream.clone(), settings.chunk_interval, chunk_tx);

    let (join_tx, join_rx) = mpsc::channel(8);
    let feed = platform::spawn_participant_feed(session.platform, join_tx);

    session.activate(true, transcribing).await;

    let pumps = vec![
        spawn_transcript_pump(session.clone(), events.clone(), update_rx),
        spawn_chunk_pump(session.clone(), chunk_rx),
        spawn_participant_pump(session.clone(), events, join_rx),
    ];

    registry
        .insert(ActiveSession {
            session,
            resources: Some(SessionResources {
                stream,
                engine,
                sink,
                feed,
                pumps,
            }),
        })
        .await;
}

fn spawn_transcript_pump(
    session: Arc<CaptureSession>,
    events: Arc<EventBus>,
    mut updates: mpsc::Receiver<TranscriptUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            let final_text = update
                .entries
                .iter()
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            if !update.entries.is_empty() && !session.push_entries(update.entries).await {
                debug!("Dropping transcript update for inactive session {}", session.id);
                continue;
            }

            events
                .transcript_update(&session.id, &final_text, &update.interim)
                .await;
        }
    })
}

fn spawn_chunk_pump(
    session: Arc<CaptureSession>,
    mut chunks: mpsc::Receiver<Vec<u8>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(chunk) = chunks.recv().await {
            if !session.push_chunk(chunk).await {
                debug!("Dropping chunk for inactive session {}", session.id);
            }
        }
    })
}

fn spawn_participant_pump(
    session: Arc<CaptureSession>,
    events: Arc<EventBus>,
    mut joins: mpsc::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(name) = joins.recv().await {
            if session.push_participant(name.clone()).await {
                events.participant_join(&session.id, &name).await;
            }
        }
    })
}
