use anyhow::{Context, Result};
use clap::Parser;
use obs_osc::config::OSC_SENDER_BIND;
use obs_osc::{Config, ReconciliationLoop};
use obs_websocket::ControlFacade;
use osc_transport::{OscListener, OscSender};
use std::io::{BufRead, IsTerminal};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "obs_osc=info,obs_websocket=info,osc_transport=info";

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();

	let config = Config::parse();
	init_tracing(config.log_json);

	if let Err(e) = run(config).await {
		error!("💥 {:#}", e);
		wait_for_acknowledgement();
		return Err(e);
	}

	info!("👋 obs-osc shutdown complete");
	Ok(())
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
	let registry = tracing_subscriber::registry().with(filter);

	if json {
		registry.with(tracing_subscriber::fmt::layer().json()).init();
	} else {
		registry.with(tracing_subscriber::fmt::layer()).init();
	}
}

async fn run(config: Config) -> Result<()> {
	config.validate()?;

	info!(
		revision = %config.obs_version,
		obs = %config.obs().url(),
		osc_client = %config.osc_client_addr(),
		osc_server = %config.osc_server_addr(),
		"🚀 Starting obs-osc bridge"
	);

	let facade = Arc::new(ControlFacade::connect(&config.obs()).await.context("could not connect to OBS")?);
	let sender = Arc::new(OscSender::bind(OSC_SENDER_BIND, &config.osc_client_addr()).await?);
	let listener = OscListener::bind(&config.osc_server_addr()).await?;

	let cancel = CancellationToken::new();
	let shutdown = cancel.clone();
	tokio::spawn(async move {
		match tokio::signal::ctrl_c().await {
			Ok(()) => {
				info!("🛑 Shutdown signal received");
				shutdown.cancel();
			}
			Err(e) => error!("❌ Failed to listen for shutdown signal: {}", e),
		}
	});

	let outcome = ReconciliationLoop::new(facade.clone(), sender, cancel).run(listener).await;
	facade.close().await;
	Ok(outcome?)
}

/// Keeps a console window open long enough for the error to be read.
fn wait_for_acknowledgement() {
	let stdin = std::io::stdin();
	if !stdin.is_terminal() {
		return;
	}

	eprintln!("Press Enter to exit...");
	let _ = stdin.lock().read_line(&mut String::new());
}
