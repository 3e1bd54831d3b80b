//! In-memory session registry.
//!
//! The registry map is the only state shared across concurrent session
//! operations. Every read-modify-write happens while the map lock is held;
//! in particular `begin_stop` flips the session phase and detaches the
//! resources in one lock turn, so two racing stops can never both tear down.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::model::{CaptureSession, SessionId};
use crate::media::CombinedStream;
use crate::recording::RecordingSink;
use crate::transcribe::TranscriptionEngine;

/// Everything a session must give back at teardown.
pub struct SessionResources {
    pub stream: Arc<Mutex<CombinedStream>>,
    pub engine: TranscriptionEngine,
    pub sink: RecordingSink,
    /// Simulated participant feed; aborted at teardown.
    pub feed: JoinHandle<()>,
    /// Channel pumps; drain on their own once the producers stop.
    pub pumps: Vec<JoinHandle<()>>,
}

pub struct ActiveSession {
    pub session: Arc<CaptureSession>,
    pub resources: Option<SessionResources>,
}

pub enum StopOutcome {
    /// The id was never in the registry.
    NotFound,
    /// Another stop already owns the teardown (or it is underway).
    AlreadyStopping,
    /// This caller won the transition and owns the detached resources.
    Detached {
        session: Arc<CaptureSession>,
        resources: SessionResources,
    },
}

#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<SessionId, ActiveSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entry: ActiveSession) {
        let id = entry.session.id.clone();
        self.inner.lock().await.insert(id, entry);
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<CaptureSession>> {
        self.inner.lock().await.get(id).map(|e| e.session.clone())
    }

    /// Atomically transition `Active → Stopping` and detach the session's
    /// resources. Exactly one caller per session ever gets `Detached`.
    pub async fn begin_stop(&self, id: &SessionId) -> StopOutcome {
        let mut map = self.inner.lock().await;
        let Some(entry) = map.get_mut(id) else {
            return StopOutcome::NotFound;
        };
        if !entry.session.try_begin_stop().await {
            return StopOutcome::AlreadyStopping;
        }
        match entry.resources.take() {
            Some(resources) => StopOutcome::Detached {
                session: entry.session.clone(),
                resources,
            },
            None => StopOutcome::AlreadyStopping,
        }
    }

    pub async fn remove(&self, id: &SessionId) -> Option<ActiveSession> {
        self.inner.lock().await.remove(id)
    }

    pub async fn list(&self) -> Vec<Arc<CaptureSession>> {
        self.inner
            .lock()
            .await
            .values()
            .map(|e| e.session.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaAcquisition, SimulatedMediaGateway};
    use crate::platform::Platform;
    use crate::transcribe::SimulatedRecognizer;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn test_entry() -> ActiveSession {
        let session = Arc::new(CaptureSession::new(Platform::Zoom, "https://zoom.us/j/9"));
        session.activate(true, true).await;

        let gateway = Arc::new(SimulatedMediaGateway::new(8, Duration::from_millis(1)));
        let acquisition = MediaAcquisition::new(gateway, Duration::from_secs(1));
        let stream = Arc::new(Mutex::new(acquisition.acquire().await.unwrap()));

        let engine = TranscriptionEngine::new(
            Arc::new(SimulatedRecognizer::with_script(
                Duration::from_millis(5),
                Vec::new(),
            )),
            Duration::from_millis(5),
        );
        let (chunk_tx, _chunk_rx) = mpsc::channel(4);
        let sink = RecordingSink::start(stream.clone(), Duration::from_secs(3600), chunk_tx);

        ActiveSession {
            session,
            resources: Some(SessionResources {
                stream,
                engine,
                sink,
                feed: tokio::spawn(async {}),
                pumps: Vec::new(),
            }),
        }
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty().await);

        let entry = test_entry().await;
        let id = entry.session.id.clone();
        registry.insert(entry).await;

        assert_eq!(registry.len().await, 1);
        assert!(registry.get(&id).await.is_some());
        assert!(registry.get(&SessionId::new("missing")).await.is_none());

        assert!(registry.remove(&id).await.is_some());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_begin_stop_detaches_exactly_once() {
        let registry = SessionRegistry::new();
        let entry = test_entry().await;
        let id = entry.session.id.clone();
        registry.insert(entry).await;

        let first = registry.begin_stop(&id).await;
        assert!(matches!(first, StopOutcome::Detached { .. }));

        let second = registry.begin_stop(&id).await;
        assert!(matches!(second, StopOutcome::AlreadyStopping));

        let missing = registry.begin_stop(&SessionId::new("missing")).await;
        assert!(matches!(missing, StopOutcome::NotFound));
    }
}
