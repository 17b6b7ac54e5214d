//! Headless display: runs a [`DisplayCore`] against the hub and prints the
//! scene whenever it changes.
//!
//! The display follows listener moves. On `server_closing` it resets and
//! reconnects to the announced port on the same host.

#[cfg(test)]
#[path = "watch_test.rs"]
mod watch_test;

use std::time::{Duration, Instant};

use display::engine::{Action, DisplayConfig, DisplayCore, Scene};
use protocol::{ModerationList, ServerEvent};

use crate::CliError;
use crate::client::{self, HubStream};

/// One-line summary of a scene; unchanged while nothing visible changes
/// except motion.
pub fn describe(scene: &Scene) -> String {
    let link = if scene.connected { "connected" } else { "disconnected" };
    let indicator = if scene.indicator.is_some() { "on" } else { "off" };
    let mut line = format!(
        "{link} comments={} fixed={} shapes={} indicator={indicator}",
        scene.comments.len(),
        scene.fixed.len(),
        scene.shapes.len(),
    );
    for fixed in &scene.fixed {
        line.push_str(&format!(" | {}: {}", fixed.id, fixed.text));
    }
    line
}

pub async fn run(base_url: &str, config: DisplayConfig, tick: Duration, json: bool) -> Result<(), CliError> {
    let started = Instant::now();
    let elapsed_ms = || started.elapsed().as_secs_f64() * 1000.0;

    let mut base = base_url.to_owned();
    let mut core = DisplayCore::new(config);
    let mut stream = join(&base, &mut core, elapsed_ms()).await?;
    let mut ticker = tokio::time::interval(tick);
    let mut last_printed: Option<String> = None;

    loop {
        tokio::select! {
            event = client::recv_event(&mut stream) => {
                if let Action::Disconnected { port } = core.handle(event?, elapsed_ms()) {
                    base = client::with_port(&base, port)?;
                    tracing::info!(%base, "hub moved, reconnecting");
                    core.reset();
                    stream = join(&base, &mut core, elapsed_ms()).await?;
                }
            }
            _ = ticker.tick() => {
                let scene = core.tick(elapsed_ms());
                let line = if json { serde_json::to_string(&scene)? } else { describe(&scene) };
                if last_printed.as_deref() != Some(line.as_str()) {
                    println!("{line}");
                    last_printed = Some(line);
                }
            }
        }
    }
}

/// Connect and feed the opening snapshot to the display.
async fn join(base: &str, core: &mut DisplayCore, now: f64) -> Result<HubStream, CliError> {
    let (stream, words) = client::connect(base).await?;
    core.handle(ServerEvent::ModerationListSnapshot(ModerationList { words }), now);
    Ok(stream)
}
