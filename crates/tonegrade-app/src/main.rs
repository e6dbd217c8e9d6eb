//! Tonegrade demo host.
//!
//! Grades a synthetic test card once at full resolution, then replays a
//! slider drag as a burst of debounced preview updates.
//!
//! Usage: `tonegrade [WIDTH HEIGHT]` (defaults to 1920x1080).

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tonegrade_color::{luminance, GlobalParameters, ToneAdjustment};
use tonegrade_core::ImageBuffer;
use tokio::task::JoinError;
use tonegrade_preview::{
    LatestRequests, PreviewCache, PreviewConfig, PreviewEncoder, PreviewRequest, PreviewResponse,
    PreviewService, PreviewTicket,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Quiet period before a slider tick turns into a render.
const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(100);

/// Interval between simulated slider ticks.
const TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Stands in for a PNG/base64 encoder: quantizes and reports the payload size.
struct Rgb8Summary;

impl PreviewEncoder for Rgb8Summary {
    fn encode(&self, image: &ImageBuffer) -> tonegrade_core::Result<String> {
        let bytes = image.to_rgb8();
        Ok(format!(
            "rgb8:{}x{}:{} bytes",
            image.width(),
            image.height(),
            bytes.len()
        ))
    }
}

fn mean_luminance(image: &ImageBuffer) -> f32 {
    let pixels = image.pixels();
    pixels.iter().map(|p| luminance(*p)).sum::<f32>() / pixels.len().max(1) as f32
}

fn parse_dimension(arg: Option<String>, default: u32) -> Result<u32> {
    match arg {
        Some(s) => s
            .parse::<u32>()
            .with_context(|| format!("invalid dimension '{s}'")),
        None => Ok(default),
    }
}

/// Keep a finished render only while its tick is the newest one.
///
/// A render task that panicked or was cancelled is logged and dropped.
fn settle(
    rendered: std::result::Result<PreviewResponse, JoinError>,
    latest: &LatestRequests,
    ticket: &PreviewTicket,
) -> Option<PreviewResponse> {
    match rendered {
        Ok(response) => latest.is_current(ticket).then_some(response),
        Err(error) => {
            warn!(generation = ticket.generation(), %error, "Preview render task failed");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Tonegrade starting...");

    let mut args = std::env::args().skip(1);
    let width = parse_dimension(args.next(), 1920)?;
    let height = parse_dimension(args.next(), 1080)?;
    anyhow::ensure!(width > 0 && height > 0, "dimensions must be non-zero");

    let config = PreviewConfig::default();
    let cache = PreviewCache::new(&config).shared();
    let service = Arc::new(PreviewService::new(cache, &config));

    let owner = Uuid::new_v4().to_string();
    let source = ImageBuffer::gradient(width, height);
    let tones = ToneAdjustment::new([0.3, 0.0, -0.1], [0.0, 0.1, 0.0], [-0.2, 0.0, 0.3]);
    let params = GlobalParameters::default();

    let outcome = service.apply(&source, Some(&owner), "1", &tones, &params);
    info!(
        width,
        height,
        before = mean_luminance(&source),
        after = mean_luminance(outcome.image()),
        "{}",
        outcome.message()
    );
    let key = outcome
        .key()
        .context("apply did not cache its source")?
        .to_string();

    // Replay a slider drag on the shadows red channel.
    let latest = Arc::new(LatestRequests::new());
    let mut renders = Vec::new();
    for step in 0..8u8 {
        let ticket = latest.issue(&key);
        let mut tick_tones = tones;
        tick_tones.shadows[0] = f32::from(step) * 0.1;
        let request = PreviewRequest::new(key.clone(), tick_tones, params);
        let service = Arc::clone(&service);
        let latest = Arc::clone(&latest);

        renders.push(tokio::spawn(async move {
            tokio::time::sleep(PREVIEW_DEBOUNCE).await;
            if !latest.is_current(&ticket) {
                debug!(generation = ticket.generation(), "Tick superseded before render");
                return None;
            }
            let rendered =
                tokio::task::spawn_blocking(move || service.render_encoded(&request, &Rgb8Summary))
                    .await;
            settle(rendered, &latest, &ticket)
        }));

        tokio::time::sleep(TICK_INTERVAL).await;
    }

    for render in renders {
        match render.await? {
            Some(PreviewResponse::Success { updated_image }) => {
                info!(preview = %updated_image, "Preview updated");
            }
            Some(response) => warn!(status = response.status_code(), ?response, "Preview failed"),
            None => {}
        }
    }

    // A client asking for a key nobody applied gets a distinct not-found answer.
    let stale = r#"{"key": "colorbalance_nobody_0",
        "tones": {"shadows": {}, "midtones": {}, "highlights": {}}}"#;
    let response = service.handle_request(stale, &Rgb8Summary);
    info!(status = response.status_code(), body = %response.to_json()?, "Unknown key");

    let removed = service.cache().prune_owner(&owner);
    latest.forget(&key);
    info!(removed, tracked = latest.tracked(), "Session closed");
    Ok(())
}
