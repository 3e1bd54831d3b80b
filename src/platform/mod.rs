//! Meeting platform descriptors and the simulated participant feed.
//!
//! The six supported platforms share one capture behavior; what differs is
//! display metadata and join timing, so the whole adapter is a data table
//! consumed by a single generic feed rather than a type per platform.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    GoogleMeet,
    Zoom,
    MicrosoftTeams,
    Webex,
    Discord,
    Skype,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleMeet => "google-meet",
            Self::Zoom => "zoom",
            Self::MicrosoftTeams => "microsoft-teams",
            Self::Webex => "webex",
            Self::Discord => "discord",
            Self::Skype => "skype",
            Self::Generic => "generic",
        }
    }

    /// Parse a platform id. Unknown ids fall back to the generic capture
    /// path, matching how an arbitrary meeting link is handled.
    pub fn parse(s: &str) -> Self {
        match s {
            "google-meet" => Self::GoogleMeet,
            "zoom" => Self::Zoom,
            "microsoft-teams" => Self::MicrosoftTeams,
            "webex" => Self::Webex,
            "discord" => Self::Discord,
            "skype" => Self::Skype,
            _ => Self::Generic,
        }
    }

    pub fn display_name(&self) -> &'static str {
        spec_for(*self).name
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integration connectivity, surfaced to the UI. Informational only: the
/// capture service never consults it before starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    Connected,
    Ready,
    Disconnected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub video_capture: bool,
    pub audio_capture: bool,
    pub screen_capture: bool,
    pub transcription: bool,
}

/// Static display metadata for one platform integration.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformIntegration {
    pub id: Platform,
    pub name: String,
    pub icon: String,
    pub status: IntegrationStatus,
    pub capabilities: Capabilities,
}

struct PlatformSpec {
    id: Platform,
    name: &'static str,
    icon: &'static str,
    status: IntegrationStatus,
    capabilities: Capabilities,
    /// Delay before the first simulated participant joins.
    join_delay: Duration,
    /// Gap between subsequent joins.
    join_stagger: Duration,
}

const FULL_CAPS: Capabilities = Capabilities {
    video_capture: true,
    audio_capture: true,
    screen_capture: true,
    transcription: true,
};

const DEFAULT_JOIN_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_JOIN_STAGGER: Duration = Duration::from_millis(2000);

const PLATFORMS: &[PlatformSpec] = &[
    PlatformSpec {
        id: Platform::GoogleMeet,
        name: "Google Meet",
        icon: "🎥",
        status: IntegrationStatus::Connected,
        capabilities: FULL_CAPS,
        join_delay: DEFAULT_JOIN_DELAY,
        join_stagger: DEFAULT_JOIN_STAGGER,
    },
    PlatformSpec {
        id: Platform::Zoom,
        name: "Zoom",
        icon: "📹",
        status: IntegrationStatus::Ready,
        capabilities: FULL_CAPS,
        join_delay: DEFAULT_JOIN_DELAY,
        join_stagger: DEFAULT_JOIN_STAGGER,
    },
    PlatformSpec {
        id: Platform::MicrosoftTeams,
        name: "Microsoft Teams",
        icon: "💼",
        status: IntegrationStatus::Ready,
        capabilities: FULL_CAPS,
        join_delay: DEFAULT_JOIN_DELAY,
        join_stagger: DEFAULT_JOIN_STAGGER,
    },
    PlatformSpec {
        id: Platform::Webex,
        name: "Cisco Webex",
        icon: "🌐",
        status: IntegrationStatus::Ready,
        capabilities: FULL_CAPS,
        join_delay: DEFAULT_JOIN_DELAY,
        join_stagger: DEFAULT_JOIN_STAGGER,
    },
    PlatformSpec {
        id: Platform::Discord,
        name: "Discord",
        icon: "🎮",
        status: IntegrationStatus::Ready,
        capabilities: FULL_CAPS,
        join_delay: DEFAULT_JOIN_DELAY,
        join_stagger: DEFAULT_JOIN_STAGGER,
    },
    PlatformSpec {
        id: Platform::Skype,
        name: "Skype",
        icon: "📞",
        status: IntegrationStatus::Ready,
        capabilities: Capabilities {
            screen_capture: false,
            ..FULL_CAPS
        },
        join_delay: DEFAULT_JOIN_DELAY,
        join_stagger: DEFAULT_JOIN_STAGGER,
    },
];

const GENERIC_SPEC: PlatformSpec = PlatformSpec {
    id: Platform::Generic,
    name: "Generic Platform",
    icon: "🖥",
    status: IntegrationStatus::Ready,
    capabilities: FULL_CAPS,
    join_delay: DEFAULT_JOIN_DELAY,
    join_stagger: DEFAULT_JOIN_STAGGER,
};

fn spec_for(platform: Platform) -> &'static PlatformSpec {
    PLATFORMS
        .iter()
        .find(|spec| spec.id == platform)
        .unwrap_or(&GENERIC_SPEC)
}

/// The integrations shown to the UI at startup.
pub fn integrations() -> Vec<PlatformIntegration> {
    PLATFORMS
        .iter()
        .map(|spec| PlatformIntegration {
            id: spec.id,
            name: spec.name.to_string(),
            icon: spec.icon.to_string(),
            status: spec.status,
            capabilities: spec.capabilities,
        })
        .collect()
}

/// Stand-in roster until real participant detection exists.
const ROSTER: &[&str] = &[
    "John Smith",
    "Sarah Johnson",
    "Mike Wilson",
    "Emily Davis",
    "Alex Chen",
];

/// Emit simulated participant-join events on `joins` using the platform's
/// schedule. The task ends when the roster is exhausted or the receiver is
/// dropped.
pub fn spawn_participant_feed(platform: Platform, joins: mpsc::Sender<String>) -> JoinHandle<()> {
    let spec = spec_for(platform);
    spawn_feed(platform, spec.join_delay, spec.join_stagger, joins)
}

fn spawn_feed(
    platform: Platform,
    delay: Duration,
    stagger: Duration,
    joins: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        for name in ROSTER {
            debug!("{} joined the {} meeting", name, platform);
            if joins.send((*name).to_string()).await.is_err() {
                return;
            }
            tokio::time::sleep(stagger).await;
        }
    })
}

/// Platform and meeting id recovered from an invite URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingMetadata {
    pub platform: Platform,
    pub meeting_id: String,
}

/// Best-effort extraction of platform and meeting id from an invite URL.
/// Returns `None` for URLs no known pattern matches.
pub fn extract_meeting_metadata(meeting_url: &str) -> Option<MeetingMetadata> {
    let patterns: &[(Platform, &str)] = &[
        (Platform::GoogleMeet, r"meet\.google\.com/([a-z-]+)"),
        (Platform::Zoom, r"zoom\.us/j/(\d+)"),
        (
            Platform::MicrosoftTeams,
            r"teams\.microsoft\.com.*meetup-join/(\w+)",
        ),
        (Platform::Webex, r"webex\.com.*/(\w+)"),
    ];

    for (platform, pattern) in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(captures) = re.captures(meeting_url) {
            if let Some(id) = captures.get(1) {
                return Some(MeetingMetadata {
                    platform: *platform,
                    meeting_id: id.as_str().to_string(),
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip() {
        for platform in [
            Platform::GoogleMeet,
            Platform::Zoom,
            Platform::MicrosoftTeams,
            Platform::Webex,
            Platform::Discord,
            Platform::Skype,
            Platform::Generic,
        ] {
            assert_eq!(Platform::parse(platform.as_str()), platform);
        }
    }

    #[test]
    fn test_unknown_platform_falls_back_to_generic() {
        assert_eq!(Platform::parse("facetime"), Platform::Generic);
        assert_eq!(Platform::parse(""), Platform::Generic);
    }

    #[test]
    fn test_integrations_table() {
        let list = integrations();
        assert_eq!(list.len(), 6);
        assert_eq!(list[0].id, Platform::GoogleMeet);
        assert_eq!(list[0].status, IntegrationStatus::Connected);

        // Skype is the one platform without screen capture.
        let skype = list.iter().find(|i| i.id == Platform::Skype).unwrap();
        assert!(!skype.capabilities.screen_capture);
        assert!(skype.capabilities.transcription);
    }

    #[test]
    fn test_platform_serde_ids() {
        let json = serde_json::to_string(&Platform::MicrosoftTeams).unwrap();
        assert_eq!(json, "\"microsoft-teams\"");
        let parsed: Platform = serde_json::from_str("\"google-meet\"").unwrap();
        assert_eq!(parsed, Platform::GoogleMeet);
    }

    #[test]
    fn test_extract_meeting_metadata() {
        let meta = extract_meeting_metadata("https://zoom.us/j/123456789").unwrap();
        assert_eq!(meta.platform, Platform::Zoom);
        assert_eq!(meta.meeting_id, "123456789");

        let meta = extract_meeting_metadata("https://meet.google.com/abc-defg-hij").unwrap();
        assert_eq!(meta.platform, Platform::GoogleMeet);
        assert_eq!(meta.meeting_id, "abc-defg-hij");

        assert!(extract_meeting_metadata("https://example.com/room/1").is_none());
    }

    #[tokio::test]
    async fn test_participant_feed_emits_roster_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn_feed(
            Platform::Zoom,
            Duration::from_millis(1),
            Duration::from_millis(1),
            tx,
        );

        let mut names = Vec::new();
        while let Some(name) = rx.recv().await {
            names.push(name);
        }
        let _ = handle.await;

        assert_eq!(names, ROSTER);
    }

    #[tokio::test]
    async fn test_participant_feed_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_feed(
            Platform::Generic,
            Duration::from_millis(1),
            Duration::from_millis(1),
            tx,
        );
        drop(rx);
        // Task must end on its own once sends fail.
        let _ = handle.await;
    }
}
