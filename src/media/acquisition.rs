//! Combined-stream acquisition.
//!
//! Acquires the display (screen video + system audio) and the microphone as
//! one logical stream. Acquisition is all-or-nothing: if the second device
//! fails, the first is released before the error propagates.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::gateway::{DeviceStream, MediaError, MediaGateway, TrackKind};

/// The single logical stream a session records from: screen video, screen
/// audio, and microphone audio, in that track order.
pub struct CombinedStream {
    display: DeviceStream,
    microphone: DeviceStream,
}

impl std::fmt::Debug for CombinedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedStream")
            .field("display", &self.display.label())
            .field("microphone", &self.microphone.label())
            .finish()
    }
}

impl CombinedStream {
    pub fn tracks(&self) -> Vec<TrackKind> {
        let mut tracks = self.display.tracks().to_vec();
        tracks.extend_from_slice(self.microphone.tracks());
        tracks
    }

    /// Bytes captured on all tracks since the last read, concatenated in
    /// track order.
    pub fn read_chunk(&mut self) -> Result<Vec<u8>, MediaError> {
        let mut chunk = self.display.read_chunk()?;
        chunk.extend(self.microphone.read_chunk()?);
        Ok(chunk)
    }

    /// Release every underlying device handle. Idempotent; never blocks on
    /// already-released resources.
    pub fn release(&mut self) {
        self.display.release();
        self.microphone.release();
    }

    pub fn is_released(&self) -> bool {
        self.display.is_released() && self.microphone.is_released()
    }
}

/// Acquires and owns the lifecycle of a session's device streams.
pub struct MediaAcquisition {
    gateway: Arc<dyn MediaGateway>,
    prompt_timeout: Duration,
}

impl MediaAcquisition {
    pub fn new(gateway: Arc<dyn MediaGateway>, prompt_timeout: Duration) -> Self {
        Self {
            gateway,
            prompt_timeout,
        }
    }

    /// Acquire display + microphone as one combined stream.
    ///
    /// Each permission prompt gets a bounded wait; expiry counts as a
    /// declined permission. On a partial failure the already-acquired
    /// device is released before returning.
    pub async fn acquire(&self) -> Result<CombinedStream, MediaError> {
        let display = self
            .open_with_timeout("screen", self.gateway.open_display())
            .await?;
        let display_label = display.label();
        debug!("Acquired display stream: {}", display_label);

        let microphone = match self
            .open_with_timeout("microphone", self.gateway.open_microphone())
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                let mut display = display;
                display.release();
                return Err(e);
            }
        };
        debug!("Acquired microphone stream: {}", microphone.label());

        info!("Media acquisition complete: screen + system audio + microphone");
        Ok(CombinedStream {
            display,
            microphone,
        })
    }

    async fn open_with_timeout<F>(
        &self,
        device: &'static str,
        open: F,
    ) -> Result<DeviceStream, MediaError>
    where
        F: Future<Output = Result<DeviceStream, MediaError>>,
    {
        match tokio::time::timeout(self.prompt_timeout, open).await {
            Ok(result) => result,
            Err(_) => Err(MediaError::PromptTimeout {
                device,
                timeout_secs: self.prompt_timeout.as_secs(),
            }),
        }
    }
}
