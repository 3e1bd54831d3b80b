//! Media capture layer.
//!
//! Device access goes through the [`MediaGateway`] seam so the capture core
//! never talks to OS APIs directly. [`MediaAcquisition`] combines the
//! per-device streams a gateway hands out into the single logical stream a
//! session records from.

pub mod acquisition;
pub mod gateway;
pub mod simulated;

pub use acquisition::{CombinedStream, MediaAcquisition};
pub use gateway::{ChunkSource, DeviceStream, MediaError, MediaGateway, TrackKind};
pub use simulated::SimulatedMediaGateway;
