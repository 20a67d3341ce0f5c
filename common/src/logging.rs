use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

type ReloadHandle = Box<dyn Fn(&str) -> Result<(), LoggingError> + Sync + Send>;

static RELOAD_HANDLE: OnceCell<ReloadHandle> = OnceCell::new();

/// The output format of the log lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("invalid log level: {0}")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to init logger: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload logger: {0}")]
	Reload(#[from] tracing_subscriber::reload::Error),
}

macro_rules! init_with {
	($builder:expr, $env_filter:expr) => {{
		let filter = $builder
			.with_line_number(true)
			.with_file(true)
			.with_env_filter($env_filter)
			.with_filter_reloading();

		let handle = filter.reload_handle();

		filter.finish().try_init()?;

		Ok::<_, LoggingError>(Box::new(move |level: &str| {
			let level = EnvFilter::from_str(level)?;
			handle.reload(level)?;
			Ok(())
		}) as ReloadHandle)
	}};
}

/// Installs the global subscriber.
///
/// The mode is fixed by the first call. Later calls only swap the level
/// filter, which lets tests and the config loader call this repeatedly.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let reload = RELOAD_HANDLE.get_or_try_init(|| {
		let env_filter = EnvFilter::from_str(level)?;

		match mode {
			Mode::Default => init_with!(tracing_subscriber::fmt(), env_filter),
			Mode::Json => init_with!(tracing_subscriber::fmt().json(), env_filter),
			Mode::Pretty => init_with!(tracing_subscriber::fmt().pretty(), env_filter),
			Mode::Compact => init_with!(tracing_subscriber::fmt().compact(), env_filter),
		}
	})?;

	reload(level)?;

	Ok(())
}
