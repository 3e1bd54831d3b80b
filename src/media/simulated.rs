//! Simulated capture gateway.
//!
//! Stands in for real OS screen/microphone capture: hands out streams that
//! produce deterministic filler bytes and keeps a live-handle count so
//! teardown paths can be verified. Real device integration plugs in behind
//! the same [`MediaGateway`] trait.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::gateway::{ChunkSource, DeviceStream, MediaError, MediaGateway, TrackKind};

pub struct SimulatedMediaGateway {
    chunk_bytes: usize,
    prompt_delay: Duration,
    live_handles: Arc<AtomicUsize>,
}

impl SimulatedMediaGateway {
    pub fn new(chunk_bytes: usize, prompt_delay: Duration) -> Self {
        Self {
            chunk_bytes,
            prompt_delay,
            live_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Device handles currently open and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }

    fn open(&self, label: &'static str, tracks: Vec<TrackKind>) -> DeviceStream {
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        debug!("Simulated device opened: {}", label);
        DeviceStream::new(
            label,
            tracks,
            Box::new(SimulatedSource {
                seq: 0,
                chunk_bytes: self.chunk_bytes,
                live_handles: self.live_handles.clone(),
                released: false,
            }),
        )
    }
}

impl Default for SimulatedMediaGateway {
    fn default() -> Self {
        Self::new(4096, Duration::from_millis(250))
    }
}

#[async_trait]
impl MediaGateway for SimulatedMediaGateway {
    async fn open_display(&self) -> Result<DeviceStream, MediaError> {
        // Handle registration happens after the simulated prompt resolves,
        // so cancelling mid-prompt acquires nothing.
        tokio::time::sleep(self.prompt_delay).await;
        Ok(self.open(
            "simulated-display",
            vec![TrackKind::ScreenVideo, TrackKind::ScreenAudio],
        ))
    }

    async fn open_microphone(&self) -> Result<DeviceStream, MediaError> {
        tokio::time::sleep(self.prompt_delay).await;
        Ok(self.open("simulated-microphone", vec![TrackKind::Microphone]))
    }
}

struct SimulatedSource {
    seq: u8,
    chunk_bytes: usize,
    live_handles: Arc<AtomicUsize>,
    released: bool,
}

impl ChunkSource for SimulatedSource {
    fn read_chunk(&mut self) -> Result<Vec<u8>, MediaError> {
        // Deterministic filler: each chunk is its sequence number repeated.
        let chunk = vec![self.seq; self.chunk_bytes];
        self.seq = self.seq.wrapping_add(1);
        Ok(chunk)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.live_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
