//! # a2ui-probe
//!
//! Opens the request/response channel (and optionally the feed), performs
//! the init handshake if asked, and logs every push until Ctrl-C or until
//! the channel gives up reconnecting.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use a2ui_client::{A2uiClient, ConnectionState, ConnectionStatus, FeedClient};
use a2ui_core::logging::init_subscriber;
use a2ui_core::{InboundKind, RequestEnvelope};
use a2ui_settings::{load_settings_from_path, settings_path};
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

/// How long to wait for each channel's close frame on the way out.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// a2ui channel probe.
#[derive(Parser, Debug)]
#[command(name = "a2ui-probe", about = "Connect to an a2ui endpoint and log its pushes")]
struct Cli {
    /// Endpoint URL (overrides settings).
    #[arg(long)]
    endpoint: Option<String>,

    /// Authentication token.
    #[arg(long, env = "A2UI_TOKEN", hide_env_values = true)]
    token: String,

    /// Settings file (defaults to `~/.a2ui/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Params for the `a2ui.init` handshake, as JSON.
    #[arg(long)]
    init: Option<String>,

    /// Also open the notification feed.
    #[arg(long)]
    feed: bool,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_subscriber(&cli.log_level);

    let path = cli.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }

    let client = A2uiClient::new(&settings, cli.token.clone()).context("Invalid endpoint")?;
    client.on_message(|req| log_push("rpc", req));
    client.connect().await.context("Failed to connect")?;
    info!(endpoint = %settings.endpoint, path = %settings.channel_path, "connected");

    if let Some(raw) = cli.init.as_deref() {
        let params: Value = serde_json::from_str(raw).context("--init is not valid JSON")?;
        let session = client
            .send_init(params)
            .await
            .context("Init handshake failed")?;
        info!(session = %session.as_value(), "session established");
    }

    let feed = if cli.feed {
        let feed = FeedClient::new(&settings, cli.token).context("Invalid endpoint")?;
        feed.on_message(|req| log_push("feed", req));
        feed.connect().await.context("Failed to connect feed")?;
        info!(path = %settings.feed_path, "feed connected");
        Some(feed)
    } else {
        None
    };

    let mut status = client.subscribe();
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for ctrl-c")?;
            info!("shutting down");
        }
        () = until_down(&mut status) => {
            warn!("channel is down and will not reconnect");
        }
    }

    client.disconnect();
    if let Some(feed) = &feed {
        feed.disconnect();
    }
    if !settle(&mut status).await {
        warn!("channel did not close within grace period");
    }
    let feed_closed = match &feed {
        Some(feed) => settle(&mut feed.subscribe()).await,
        None => true,
    };
    if !feed_closed {
        warn!("feed did not close within grace period");
    }
    Ok(())
}

fn log_push(channel: &str, req: &RequestEnvelope) {
    let kind = InboundKind::from_method(&req.method);
    info!(channel, %kind, params = %req.params_or_null(), "push");
}

async fn until_down(status: &mut watch::Receiver<ConnectionStatus>) {
    let _ = status
        .wait_for(|s| s.state == ConnectionState::Disconnected)
        .await;
}

/// Wait for `status` to reach Disconnected. `false` if the grace ran out.
async fn settle(status: &mut watch::Receiver<ConnectionStatus>) -> bool {
    tokio::time::timeout(CLOSE_GRACE, until_down(status))
        .await
        .is_ok()
}
