//! Capture event fan-out.
//!
//! Subscribers register per session id and every subscriber receives every
//! event; no single-slot, last-writer-wins callbacks. Dispatch happens
//! synchronously in whatever task emitted the event; observers that need to
//! do real work should hand it off to their own tasks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::recording::Recording;
use crate::session::{SessionId, TranscriptEntry};

/// Observer for capture lifecycle events. Implement only the hooks you care
/// about; the defaults do nothing.
#[async_trait]
pub trait CaptureObserver: Send + Sync {
    /// Newly committed transcript text plus the current interim text.
    async fn on_transcript_update(&self, session: &SessionId, final_text: &str, interim: &str) {
        let _ = (session, final_text, interim);
    }

    async fn on_participant_join(&self, session: &SessionId, name: &str) {
        let _ = (session, name);
    }

    /// The finished recording and the full ordered transcript.
    async fn on_recording_complete(
        &self,
        session: &SessionId,
        recording: &Recording,
        transcript: &[TranscriptEntry],
    ) {
        let _ = (session, recording, transcript);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SessionId, Vec<(SubscriptionId, Arc<dyn CaptureObserver>)>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(
        &self,
        session: &SessionId,
        observer: Arc<dyn CaptureObserver>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .await
            .entry(session.clone())
            .or_default()
            .push((id, observer));
        id
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub async fn unsubscribe(&self, session: &SessionId, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        let Some(list) = subscribers.get_mut(session) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sub_id, _)| *sub_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            subscribers.remove(session);
        }
        removed
    }

    /// Drop every subscription for a closed session.
    pub async fn drop_session(&self, session: &SessionId) {
        self.subscribers.lock().await.remove(session);
    }

    async fn observers_for(&self, session: &SessionId) -> Vec<Arc<dyn CaptureObserver>> {
        self.subscribers
            .lock()
            .await
            .get(session)
            .map(|list| list.iter().map(|(_, obs)| obs.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn transcript_update(&self, session: &SessionId, final_text: &str, interim: &str) {
        for observer in self.observers_for(session).await {
            observer
                .on_transcript_update(session, final_text, interim)
                .await;
        }
    }

    pub async fn participant_join(&self, session: &SessionId, name: &str) {
        for observer in self.observers_for(session).await {
            observer.on_participant_join(session, name).await;
        }
    }

    pub async fn recording_complete(
        &self,
        session: &SessionId,
        recording: &Recording,
        transcript: &[TranscriptEntry],
    ) {
        for observer in self.observers_for(session).await {
            observer
                .on_recording_complete(session, recording, transcript)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingObserver {
        transcripts: AtomicUsize,
        joins: AtomicUsize,
        completions: AtomicUsize,
    }

    #[async_trait]
    impl CaptureObserver for CountingObserver {
        async fn on_transcript_update(&self, _: &SessionId, _: &str, _: &str) {
            self.transcripts.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_participant_join(&self, _: &SessionId, _: &str) {
            self.joins.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_recording_complete(&self, _: &SessionId, _: &Recording, _: &[TranscriptEntry]) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_events() {
        let bus = EventBus::new();
        let session = SessionId::new("s1");

        let first = Arc::new(CountingObserver::default());
        let second = Arc::new(CountingObserver::default());
        bus.subscribe(&session, first.clone()).await;
        bus.subscribe(&session, second.clone()).await;

        bus.transcript_update(&session, "hello", "wor").await;
        bus.participant_join(&session, "John Smith").await;

        assert_eq!(first.transcripts.load(Ordering::SeqCst), 1);
        assert_eq!(second.transcripts.load(Ordering::SeqCst), 1);
        assert_eq!(first.joins.load(Ordering::SeqCst), 1);
        assert_eq!(second.joins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_events_are_scoped_to_session() {
        let bus = EventBus::new();
        let mine = SessionId::new("mine");
        let other = SessionId::new("other");

        let observer = Arc::new(CountingObserver::default());
        bus.subscribe(&mine, observer.clone()).await;

        bus.transcript_update(&other, "not for me", "").await;
        assert_eq!(observer.transcripts.load(Ordering::SeqCst), 0);

        bus.transcript_update(&mine, "for me", "").await;
        assert_eq!(observer.transcripts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let session = SessionId::new("s1");
        let observer = Arc::new(CountingObserver::default());

        let id = bus.subscribe(&session, observer.clone()).await;
        bus.transcript_update(&session, "one", "").await;

        assert!(bus.unsubscribe(&session, id).await);
        assert!(!bus.unsubscribe(&session, id).await);

        bus.transcript_update(&session, "two", "").await;
        assert_eq!(observer.transcripts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_session_clears_all_subscribers() {
        let bus = EventBus::new();
        let session = SessionId::new("s1");
        let observer = Arc::new(CountingObserver::default());
        bus.subscribe(&session, observer.clone()).await;

        let recording = Recording::assemble(vec![vec![0; 3]]);
        bus.recording_complete(&session, &recording, &[]).await;
        assert_eq!(observer.completions.load(Ordering::SeqCst), 1);

        bus.drop_session(&session).await;
        bus.recording_complete(&session, &recording, &[]).await;
        assert_eq!(observer.completions.load(Ordering::SeqCst), 1);
    }
}
