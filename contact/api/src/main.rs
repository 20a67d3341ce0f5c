use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use common::context::Context;
use common::logging;
use common::signal::SignalHandler;
use contact_api::api;
use contact_api::config::AppConfig;
use contact_api::global::Global;
use tokio::signal::unix::SignalKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = AppConfig::parse()
		.map_err(|err| {
			logging::init("trace", Default::default()).ok();
			err
		})
		.context("failed to parse config")?;

	logging::init(&config.logging.level, config.logging.mode).context("failed to initialize logging")?;

	tracing::info!(name = %config.name, "starting contact api");

	if let Some(file) = &config.config_file {
		tracing::info!(file, "loaded config from file");
	}

	let global = Arc::new(Global::new(config).await.context("failed to setup global state")?);

	let (ctx, handler) = Context::new();

	let mut api_future = tokio::spawn(api::run(global.clone(), ctx));

	let mut signal_handler = SignalHandler::new()
		.with_signal(SignalKind::interrupt())
		.with_signal(SignalKind::terminate());

	let mut failed = false;

	tokio::select! {
		result = &mut api_future => {
			failed = true;
			match result {
				Ok(Ok(())) => tracing::warn!("api stopped unexpectedly"),
				Ok(Err(err)) => tracing::error!("api failed: {err:#}"),
				Err(err) => tracing::error!("api task panicked: {err}"),
			}
		}
		_ = signal_handler.recv() => tracing::info!("received shutdown signal"),
	}

	tracing::info!("waiting for in-flight requests to finish");

	tokio::select! {
		_ = tokio::time::sleep(Duration::from_secs(60)) => tracing::warn!("shutdown timed out"),
		_ = signal_handler.recv() => tracing::warn!("received second signal, forcing shutdown"),
		_ = handler.cancel() => tracing::info!("api drained"),
	}

	global.shutdown().await;

	tracing::info!("contact api stopped");

	if failed {
		anyhow::bail!("api exited before shutdown was requested");
	}

	Ok(())
}
