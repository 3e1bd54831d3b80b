//! Recording artifacts.

pub mod sink;

pub use sink::RecordingSink;

use serde::Serialize;

/// A finalized recording, assembled from buffered chunks at session stop.
/// This is the only playable artifact; there is no partial/streamed
/// playback path.
#[derive(Debug, Clone, Serialize)]
pub struct Recording {
    pub media_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub chunk_count: usize,
}

impl Recording {
    pub const MEDIA_TYPE: &'static str = "video/webm";

    /// Concatenate chunks in emission order into one blob.
    pub fn assemble(chunks: Vec<Vec<u8>>) -> Self {
        let chunk_count = chunks.len();
        let mut data = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
        for chunk in &chunks {
            data.extend_from_slice(chunk);
        }
        Self {
            media_type: Self::MEDIA_TYPE.to_string(),
            data,
            chunk_count,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
