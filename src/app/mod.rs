use crate::api::ApiServer;
use crate::config::Config;
use crate::media::SimulatedMediaGateway;
use crate::session::CaptureService;
use crate::transcribe::SimulatedRecognizer;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub async fn run_service() -> Result<()> {
    info!("Starting meetcap service");

    let config = Config::load()?;

    // Simulated backends until real device capture and a speech backend are
    // wired in; both sit behind trait seams.
    let gateway = Arc::new(SimulatedMediaGateway::new(
        config.simulation.chunk_bytes,
        Duration::from_millis(config.simulation.prompt_delay_ms),
    ));
    let recognizer = Arc::new(SimulatedRecognizer::new(Duration::from_millis(
        config.simulation.recognizer_cadence_ms,
    )));

    let service = Arc::new(CaptureService::new(
        gateway,
        recognizer,
        config.capture.settings(),
    ));

    let port = config.api.port;
    let api_server = ApiServer::new(service.clone(), &config);
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {e}");
        }
    });

    info!("meetcap is ready!");
    info!(
        "Start a capture: curl -X POST http://127.0.0.1:{port}/sessions \
         -H 'content-type: application/json' \
         -d '{{\"platform\":\"zoom\",\"meeting_url\":\"https://zoom.us/j/123\"}}'"
    );

    tokio::signal::ctrl_c().await?;

    info!("Shutting down, closing active sessions");
    service.shutdown().await;

    Ok(())
}
