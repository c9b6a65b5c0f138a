//! # forcestopd: force-stop runner
//!
//! Composition root that wires the automation runner to a platform and
//! force-stops the applications named on the command line.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize tracing
//! - Construct the platform adapter (virtual device)
//! - Construct the runner, injecting the adapter via port traits
//! - Forward screen notifications to the runner task
//! - Log progress, abort on Ctrl-C, print the final run status as JSON
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no automation logic belongs here.

mod config;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use forcestop_adapter_virtual::VirtualPlatform;
use forcestop_app::event_bus::InProcessEventBus;
use forcestop_app::runner::AutomationRunner;
use forcestop_app::task::RunnerTask;
use forcestop_domain::event::RunEvent;
use forcestop_domain::target::TargetId;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    let settings = config.runner_settings()?;
    let device = config.virtual_config()?;

    // Targets: CLI args, or every installed app of the virtual device
    let mut targets = std::env::args()
        .skip(1)
        .map(TargetId::new)
        .collect::<Result<Vec<_>, _>>()
        .context("invalid target identifier")?;
    if targets.is_empty() {
        targets = device.apps.iter().map(|app| app.id.clone()).collect();
    }

    // Platform
    let (platform, mut notifications) = VirtualPlatform::new(device);

    // Event bus
    let event_bus = InProcessEventBus::new(64);
    let mut events = event_bus.subscribe();

    // Runner
    let runner = AutomationRunner::new(platform.clone(), platform, event_bus, settings);
    let (handle, task) = RunnerTask::spawn(runner);

    let forwarder = {
        let handle = handle.clone();
        tokio::spawn(async move {
            while let Some(notification) = notifications.recv().await {
                if handle
                    .screen_changed(notification.kind, notification.snapshot)
                    .is_err()
                {
                    break;
                }
            }
        })
    };

    let run_id = handle.start(targets).await?;
    tracing::info!(%run_id, "run started");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(RunEvent::Progress(progress)) => tracing::info!(
                    target_id = %progress.target,
                    label = %progress.label,
                    "force-stopping {}/{}",
                    progress.current,
                    progress.total,
                ),
                Ok(RunEvent::Finished(finish)) => {
                    tracing::info!(aborted = finish.aborted, "run finished");
                    break;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "progress display fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                tracing::warn!("interrupted, aborting run");
                handle.abort();
            }
        }
    }

    let status = handle.status();
    println!("{}", serde_json::to_string_pretty(&status)?);

    forwarder.abort();
    drop(handle);
    task.await.context("runner task panicked")?;
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
