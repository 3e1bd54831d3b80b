//! Capture sessions: data model, registry, and the orchestrating service.

pub mod model;
pub mod registry;
pub mod service;

pub use model::{
    CaptureSession, SessionId, SessionPhase, SessionSnapshot, TranscriptEntry,
};
pub use registry::{ActiveSession, SessionRegistry, SessionResources, StopOutcome};
pub use service::{CaptureService, CaptureSettings};
