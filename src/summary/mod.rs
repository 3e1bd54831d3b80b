//! Post-capture summarization boundary.
//!
//! When a session closes, its transcript can be handed to a [`Summarizer`]
//! for meeting minutes, topics, and follow-ups. The capture core only
//! defines the boundary (a pure text-in, structure-out call) and treats
//! summarizer failures as log-and-continue, never as session failures.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::TranscriptEntry;

/// Structured summary of one meeting transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryResult {
    pub overall_summary: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    pub next_steps: Vec<String>,
    pub topics: Vec<String>,
}

/// Turns a plain-text transcript and a meeting title into a structured
/// summary. Stateless by contract.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str, meeting_title: &str) -> Result<SummaryResult>;
}

/// Render transcript entries as the `speaker: text` lines summarizers
/// consume, one utterance per line in chronological order.
pub fn transcript_text(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {}", e.speaker, e.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_text_format() {
        let entries = vec![
            TranscriptEntry::final_utterance("hello everyone", Some(0.95)),
            TranscriptEntry::final_utterance("let's begin", Some(0.9)),
        ];

        let text = transcript_text(&entries);
        assert_eq!(
            text,
            "Current Speaker: hello everyone\nCurrent Speaker: let's begin"
        );
    }

    #[test]
    fn test_empty_transcript_renders_empty() {
        assert_eq!(transcript_text(&[]), "");
    }
}
