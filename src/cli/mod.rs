//! Command-line interface.

mod args;

pub use args::{Cli, CliCommand, InspectCliArgs};

use crate::platform;

/// Print the platform integration table.
pub fn handle_platforms_command() {
    println!("{:<17} {:<17} {:<11} capabilities", "id", "name", "status");
    for integration in platform::integrations() {
        let caps = [
            ("video", integration.capabilities.video_capture),
            ("audio", integration.capabilities.audio_capture),
            ("screen", integration.capabilities.screen_capture),
            ("transcription", integration.capabilities.transcription),
        ]
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");

        println!(
            "{:<17} {:<17} {:<11} {}",
            integration.id.as_str(),
            integration.name,
            format!("{:?}", integration.status).to_lowercase(),
            caps
        );
    }
}

/// Print what can be recovered from a meeting invite URL.
pub fn handle_inspect_command(args: &InspectCliArgs) {
    match platform::extract_meeting_metadata(&args.url) {
        Some(meta) => {
            println!("platform:   {}", meta.platform);
            println!("meeting id: {}", meta.meeting_id);
        }
        None => {
            println!("No known meeting platform matches this URL.");
        }
    }
}
