//! Capture error taxonomy.
//!
//! Acquisition failures (`PermissionDenied`, `DeviceUnavailable`) abort
//! session creation and are surfaced to the caller. Mid-session faults are
//! isolated to their subsystem and never abort a live capture.

use thiserror::Error;

use crate::media::MediaError;
use crate::session::SessionId;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The user declined a device permission prompt (or it timed out).
    /// Terminal for this acquisition attempt; retrying without user action
    /// cannot succeed.
    #[error("{device} permission denied: grant screen and microphone access, then retry")]
    PermissionDenied { device: &'static str },

    /// No capture-capable device of the required kind exists on this host.
    #[error("no {device} capture device available")]
    DeviceUnavailable { device: &'static str },

    /// The speech recognizer is unsupported or permanently denied.
    /// The session continues without transcription.
    #[error("speech recognition unavailable: {reason}")]
    TranscriptionUnavailable { reason: String },

    /// The recorder failed mid-session. Chunks captured so far are kept.
    #[error("recorder fault: {0}")]
    RecorderFault(String),

    /// The referenced session id is not in the registry.
    #[error("no capture session with id {0}")]
    SessionNotFound(SessionId),
}

impl From<MediaError> for CaptureError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::PermissionDenied { device } => Self::PermissionDenied { device },
            MediaError::PromptTimeout { device, .. } => Self::PermissionDenied { device },
            MediaError::NoDevice { device } => Self::DeviceUnavailable { device },
            MediaError::StreamFault(msg) => Self::RecorderFault(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_error_mapping() {
        let err: CaptureError = MediaError::PermissionDenied { device: "screen" }.into();
        assert!(matches!(
            err,
            CaptureError::PermissionDenied { device: "screen" }
        ));

        // A prompt that never resolves is treated as a declined permission.
        let err: CaptureError = MediaError::PromptTimeout {
            device: "microphone",
            timeout_secs: 30,
        }
        .into();
        assert!(matches!(
            err,
            CaptureError::PermissionDenied {
                device: "microphone"
            }
        ));

        let err: CaptureError = MediaError::NoDevice { device: "screen" }.into();
        assert!(matches!(
            err,
            CaptureError::DeviceUnavailable { device: "screen" }
        ));
    }

    #[test]
    fn test_messages_are_actionable() {
        let msg = CaptureError::PermissionDenied { device: "screen" }.to_string();
        assert!(msg.contains("grant"));

        let msg = CaptureError::DeviceUnavailable { device: "microphone" }.to_string();
        assert!(msg.contains("microphone"));
    }
}
