//! Capture-device gateway abstraction.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MediaError {
    /// The user declined the permission prompt for this device.
    #[error("permission denied for {device}")]
    PermissionDenied { device: &'static str },

    /// No device of the required kind exists.
    #[error("no {device} device available")]
    NoDevice { device: &'static str },

    /// The permission prompt was never answered.
    #[error("permission prompt for {device} timed out after {timeout_secs}s")]
    PromptTimeout {
        device: &'static str,
        timeout_secs: u64,
    },

    /// The device stream failed while capturing.
    #[error("device stream fault: {0}")]
    StreamFault(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackKind {
    ScreenVideo,
    ScreenAudio,
    Microphone,
}

/// Raw capture source behind an opened device handle.
///
/// `read_chunk` returns the encoded bytes captured since the previous call
/// (empty if nothing new). `release` stops capture and frees the OS handle;
/// it must be idempotent.
pub trait ChunkSource: Send {
    fn read_chunk(&mut self) -> Result<Vec<u8>, MediaError>;
    fn release(&mut self);
}

/// One opened capture device: its tracks plus the underlying source.
///
/// Dropping an unreleased stream releases it, so a caller that abandons an
/// acquisition mid-way leaks nothing.
pub struct DeviceStream {
    label: String,
    tracks: Vec<TrackKind>,
    source: Box<dyn ChunkSource>,
    released: bool,
}

impl DeviceStream {
    pub fn new(
        label: impl Into<String>,
        tracks: Vec<TrackKind>,
        source: Box<dyn ChunkSource>,
    ) -> Self {
        Self {
            label: label.into(),
            tracks,
            source,
            released: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tracks(&self) -> &[TrackKind] {
        &self.tracks
    }

    /// Bytes captured since the last read. A released stream yields nothing
    /// rather than erroring, so late timer ticks are harmless.
    pub fn read_chunk(&mut self) -> Result<Vec<u8>, MediaError> {
        if self.released {
            return Ok(Vec::new());
        }
        self.source.read_chunk()
    }

    /// Stop capture and free the device handle. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        debug!("Releasing device stream: {}", self.label);
        self.source.release();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for DeviceStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Backend that opens capture devices.
///
/// Opening triggers the platform permission prompt for that device, which is
/// the most likely real-world failure point: implementations must
/// distinguish a declined prompt (`PermissionDenied`) from a missing device
/// (`NoDevice`). An implementation must not register a live handle until its
/// `open_*` future completes, so a caller cancelling the future mid-prompt
/// acquires nothing.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Screen video plus system/meeting audio.
    async fn open_display(&self) -> Result<DeviceStream, MediaError>;

    /// Microphone audio.
    async fn open_microphone(&self) -> Result<DeviceStream, MediaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        releases: Arc<AtomicUsize>,
    }

    impl ChunkSource for CountingSource {
        fn read_chunk(&mut self) -> Result<Vec<u8>, MediaError> {
            Ok(vec![1, 2, 3])
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting_stream(releases: Arc<AtomicUsize>) -> DeviceStream {
        DeviceStream::new(
            "test-display",
            vec![TrackKind::ScreenVideo, TrackKind::ScreenAudio],
            Box::new(CountingSource { releases }),
        )
    }

    #[test]
    fn test_release_is_idempotent() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut stream = counting_stream(releases.clone());

        stream.release();
        stream.release();
        stream.release();

        assert!(stream.is_released());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_exactly_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let _stream = counting_stream(releases.clone());
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);

        // Explicit release followed by drop must not double-release.
        let mut stream = counting_stream(releases.clone());
        stream.release();
        drop(stream);
        assert_eq!(releases.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_released_stream_reads_empty() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut stream = counting_stream(releases);

        assert_eq!(stream.read_chunk().unwrap(), vec![1, 2, 3]);
        stream.release();
        assert!(stream.read_chunk().unwrap().is_empty());
    }
}
