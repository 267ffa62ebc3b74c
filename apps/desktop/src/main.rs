use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    config::{load_settings, resolve_endpoint},
    EventBridge, HttpTransport, Key,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui_state::{HostSync, UiStores};

/// Headless driver: reads host messages as JSON lines on stdin and keeps
/// the UI stores in sync. A line of the form `key:<Name>` is a key press.
#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to `nui.toml` in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    resource: Option<String>,
    /// Overrides the `https://<resource>/` request endpoint.
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(resource) = args.resource {
        settings.resource_name = resource;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let endpoint = resolve_endpoint(
        &settings,
        args.endpoint.as_deref().or(settings.endpoint.as_deref()),
    )?;
    let transport = HttpTransport::new(endpoint.clone(), settings.request_timeout())?;
    let bridge = EventBridge::with_sound_set(Arc::new(transport), &settings.default_sound_set);
    let stores = UiStores::with_notification_duration(settings.notification_duration());
    let _sync = HostSync::bind(&bridge, &stores);
    info!(resource = %settings.resource_name, %endpoint, "bridge ready");

    let mut visibility = stores.app.visible().changes();
    tokio::spawn(async move {
        while let Some(visible) = visibility.next().await {
            info!(visible, "tournament window");
        }
    });
    let mut notifications = stores.notifications.notifications().changes();
    tokio::spawn(async move {
        while let Some(shown) = notifications.next().await {
            if let Some(latest) = shown.last() {
                info!(id = latest.id.0, kind = ?latest.kind, message = %latest.message, "notifications changed");
            }
        }
    });

    let (tx, rx) = mpsc::channel(64);
    let inbound = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.run_inbound(rx).await })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix("key:") {
            match bridge.handle_key(&Key::from_name(name.trim())).await {
                Ok(handled) => info!(key = name.trim(), handled, "key press"),
                Err(err) => warn!(key = name.trim(), error = %err, "key handling failed"),
            }
            continue;
        }
        if tx.send(line.to_string()).await.is_err() {
            break;
        }
    }

    drop(tx);
    inbound.await?;
    let session = stores.app.session();
    info!(
        visible = session.visible,
        tournaments = stores.tournaments.tournaments().get().len(),
        teams = stores.teams.player_teams().get().len(),
        "input closed"
    );
    Ok(())
}
