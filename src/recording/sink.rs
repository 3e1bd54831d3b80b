//! Chunked recording sink.
//!
//! Pulls a chunk from the combined stream on a fixed interval and forwards
//! it for buffering. Recorder faults mid-session are logged and survived;
//! the session keeps whatever chunks were already captured.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::media::CombinedStream;

pub struct RecordingSink {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RecordingSink {
    /// Begin pulling chunks from `stream` every `interval`, sending them on
    /// `chunks`. The channel closes when the sink stops.
    pub fn start(
        stream: Arc<Mutex<CombinedStream>>,
        interval: Duration,
        chunks: mpsc::Sender<Vec<u8>>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(stream, interval, chunks, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Stop the chunk timer and flush whatever the stream still has pending.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    stream: Arc<Mutex<CombinedStream>>,
    interval: Duration,
    chunks: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first chunk should come a
    // full interval after start.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match read_chunk(&stream).await {
                    Ok(chunk) if !chunk.is_empty() => {
                        if chunks.send(chunk).await.is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Recorder fault, keeping chunks captured so far: {e}");
                    }
                }
            }
        }
    }

    // Final flush before the device streams are released.
    match read_chunk(&stream).await {
        Ok(chunk) if !chunk.is_empty() => {
            debug!("Flushing final chunk: {} bytes", chunk.len());
            let _ = chunks.send(chunk).await;
        }
        Ok(_) => {}
        Err(e) => warn!("Recorder fault during final flush: {e}"),
    }
}

async fn read_chunk(
    stream: &Arc<Mutex<CombinedStream>>,
) -> Result<Vec<u8>, crate::media::MediaError> {
    stream.lock().await.read_chunk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ChunkSource, DeviceStream, MediaAcquisition, MediaError, MediaGateway, TrackKind};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Chunk source that replays scripted chunk sizes, then goes quiet.
    struct ScriptedSource {
        sizes: Arc<StdMutex<VecDeque<usize>>>,
        fail_after: Option<usize>,
        reads: usize,
    }

    impl ChunkSource for ScriptedSource {
        fn read_chunk(&mut self) -> Result<Vec<u8>, MediaError> {
            self.reads += 1;
            if let Some(limit) = self.fail_after {
                if self.reads > limit {
                    return Err(MediaError::StreamFault("encoder crashed".into()));
                }
            }
            let size = self.sizes.lock().unwrap().pop_front().unwrap_or(0);
            Ok(vec![0xAB; size])
        }

        fn release(&mut self) {}
    }

    struct ScriptedGateway {
        display_sizes: Vec<usize>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl MediaGateway for ScriptedGateway {
        async fn open_display(&self) -> Result<DeviceStream, MediaError> {
            Ok(DeviceStream::new(
                "scripted-display",
                vec![TrackKind::ScreenVideo, TrackKind::ScreenAudio],
                Box::new(ScriptedSource {
                    sizes: Arc::new(StdMutex::new(self.display_sizes.clone().into())),
                    fail_after: self.fail_after,
                    reads: 0,
                }),
            ))
        }

        async fn open_microphone(&self) -> Result<DeviceStream, MediaError> {
            Ok(DeviceStream::new(
                "scripted-microphone",
                vec![TrackKind::Microphone],
                Box::new(ScriptedSource {
                    sizes: Arc::new(StdMutex::new(VecDeque::new())),
                    fail_after: None,
                    reads: 0,
                }),
            ))
        }
    }

    async fn scripted_stream(
        display_sizes: Vec<usize>,
        fail_after: Option<usize>,
    ) -> Arc<Mutex<CombinedStream>> {
        let gateway = Arc::new(ScriptedGateway {
            display_sizes,
            fail_after,
        });
        let acquisition = MediaAcquisition::new(gateway, Duration::from_secs(1));
        Arc::new(Mutex::new(acquisition.acquire().await.unwrap()))
    }

    #[tokio::test]
    async fn test_chunks_buffer_in_order_and_round_trip() {
        let stream = scripted_stream(vec![10, 20, 15], None).await;
        let (tx, mut rx) = mpsc::channel(16);
        let sink = RecordingSink::start(stream, Duration::from_millis(10), tx);

        let mut received = Vec::new();
        while received.len() < 3 {
            match tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
                Ok(Some(chunk)) => received.push(chunk),
                _ => break,
            }
        }
        sink.stop().await;

        let sizes: Vec<usize> = received.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 20, 15]);

        let blob = crate::recording::Recording::assemble(received);
        assert_eq!(blob.len(), 45);
    }

    #[tokio::test]
    async fn test_recorder_fault_keeps_earlier_chunks() {
        let stream = scripted_stream(vec![8], Some(1)).await;
        let (tx, mut rx) = mpsc::channel(16);
        let sink = RecordingSink::start(stream, Duration::from_millis(10), tx);

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("first chunk should arrive")
            .expect("channel open");
        assert_eq!(first.len(), 8);

        // Subsequent reads fault; the sink must keep running, not crash.
        tokio::time::sleep(Duration::from_millis(50)).await;
        sink.stop().await;

        // Channel closed after stop, no further chunks.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stop_flushes_pending_chunk() {
        // One chunk scripted, interval far longer than the test: only the
        // stop-flush can deliver it.
        let stream = scripted_stream(vec![33], None).await;
        let (tx, mut rx) = mpsc::channel(16);
        let sink = RecordingSink::start(stream, Duration::from_secs(3600), tx);

        tokio::time::sleep(Duration::from_millis(20)).await;
        sink.stop().await;

        let flushed = rx.recv().await.expect("flushed chunk");
        assert_eq!(flushed.len(), 33);
        assert!(rx.recv().await.is_none());
    }
}
