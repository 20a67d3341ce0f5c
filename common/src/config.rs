use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::logging;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config file {path}: {message}")]
	Parse { path: String, message: String },
	#[error("unsupported config file format: {0}")]
	UnsupportedFormat(String),
	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
	#[error("failed to serialize defaults: {0}")]
	Defaults(#[source] serde_json::Error),
	#[error("invalid config at {path}: {message}")]
	Deserialize { path: String, message: String },
}

impl ConfigError {
	pub fn is_io(&self) -> bool {
		matches!(self, Self::Io { .. })
	}
}

/// Flags understood by every service binary.
#[derive(Debug, Clone, Default, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct ConfigArgs {
	/// The configuration file to use
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<String>,
}

/// Layers config sources over a set of defaults.
///
/// Maps are merged key by key, anything else (including lists) is replaced
/// by the incoming value.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	root: Value,
}

impl ConfigBuilder {
	pub fn new<C: Serialize>(defaults: &C) -> Result<Self, ConfigError> {
		Ok(Self {
			root: serde_json::to_value(defaults).map_err(ConfigError::Defaults)?,
		})
	}

	pub fn merge(&mut self, incoming: Value) {
		let root = std::mem::take(&mut self.root);
		self.root = merge_values(root, incoming);
	}

	/// Merges a TOML, YAML or JSON file, picked by extension.
	pub fn merge_file(&mut self, path: &str) -> Result<(), ConfigError> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_string(),
			source,
		})?;

		let parse_err = |message: String| ConfigError::Parse {
			path: path.to_string(),
			message,
		};

		let incoming = match Path::new(path).extension().and_then(|ext| ext.to_str()) {
			Some("toml") => toml::from_str::<Value>(&contents).map_err(|err| parse_err(err.to_string()))?,
			Some("yaml" | "yml") => serde_yaml::from_str::<Value>(&contents).map_err(|err| parse_err(err.to_string()))?,
			Some("json") => serde_json::from_str::<Value>(&contents).map_err(|err| parse_err(err.to_string()))?,
			_ => return Err(ConfigError::UnsupportedFormat(path.to_string())),
		};

		self.merge(incoming);

		Ok(())
	}

	/// Applies `PREFIX_A__B=value` style variables as `a.b = value`.
	pub fn merge_env<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let prefix = format!("{}_", prefix.to_uppercase());

		for (key, raw) in vars {
			let Some(stripped) = key.strip_prefix(&prefix) else {
				continue;
			};

			let path = stripped.to_lowercase();
			let path = path.split("__").collect::<Vec<_>>();
			if path.iter().any(|segment| segment.is_empty()) {
				continue;
			}

			self.set(&path, &raw).map_err(|message| ConfigError::InvalidValue { key, message })?;
		}

		Ok(())
	}

	/// Sets a single key from its string form.
	/// The string is typed after the value currently stored at that key.
	pub fn set(&mut self, path: &[&str], raw: &str) -> Result<(), String> {
		let current = path.iter().try_fold(&self.root, |value, segment| value.get(segment));
		let value = typed_value(current, raw)?;

		let mut incoming = value;
		for segment in path.iter().rev() {
			let mut map = Map::new();
			map.insert(segment.to_string(), incoming);
			incoming = Value::Object(map);
		}

		self.merge(incoming);

		Ok(())
	}

	pub fn get(&self, path: &[&str]) -> Option<&Value> {
		path.iter().try_fold(&self.root, |value, segment| value.get(segment))
	}

	pub fn build<C: DeserializeOwned>(self) -> Result<C, ConfigError> {
		serde_path_to_error::deserialize(self.root).map_err(|err| ConfigError::Deserialize {
			path: err.path().to_string(),
			message: err.inner().to_string(),
		})
	}
}

fn merge_values(root: Value, incoming: Value) -> Value {
	match (root, incoming) {
		(Value::Object(mut first), Value::Object(second)) => {
			for (key, value) in second {
				let combined = match first.remove(&key) {
					Some(existing) => merge_values(existing, value),
					None => value,
				};
				first.insert(key, combined);
			}
			Value::Object(first)
		}
		(_, second) => second,
	}
}

fn typed_value(current: Option<&Value>, raw: &str) -> Result<Value, String> {
	match current {
		Some(Value::Bool(_)) => match raw.trim().to_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
			"false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
			_ => Err(format!("expected a boolean, got {raw:?}")),
		},
		Some(Value::Number(_)) => serde_json::from_str::<serde_json::Number>(raw.trim())
			.map(Value::Number)
			.map_err(|_| format!("expected a number, got {raw:?}")),
		Some(Value::Array(items)) => {
			if raw.trim().is_empty() {
				return Ok(Value::Array(Vec::new()));
			}

			raw.split(',')
				.map(|item| typed_value(items.first(), item.trim()))
				.collect::<Result<Vec<_>, _>>()
				.map(Value::Array)
		}
		Some(Value::String(_)) => Ok(Value::String(raw.to_string())),
		Some(Value::Object(_)) => serde_json::from_str::<Map<String, Value>>(raw)
			.map(Value::Object)
			.map_err(|_| format!("expected a JSON object, got {raw:?}")),
		// Unset optional keys have no type to go by.
		Some(Value::Null) | None => Ok(serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))),
	}
}

/// Loads a config in priority order: defaults, file, environment.
///
/// The file is taken from `--config`, then `{PREFIX}_CONFIG_FILE`, then
/// `default_file`. Only the default file is allowed to be missing.
/// Returns the config and the canonical path of the file that was loaded.
pub fn parse<C>(enable_cli: bool, prefix: &str, default_file: Option<String>) -> Result<(C, Option<String>), ConfigError>
where
	C: Serialize + DeserializeOwned + Default,
{
	let args = if enable_cli {
		<ConfigArgs as clap::Parser>::parse()
	} else {
		ConfigArgs::default()
	};

	parse_with(args, prefix, default_file, std::env::vars())
}

pub fn parse_with<C, I>(
	args: ConfigArgs,
	prefix: &str,
	default_file: Option<String>,
	vars: I,
) -> Result<(C, Option<String>), ConfigError>
where
	C: Serialize + DeserializeOwned + Default,
	I: IntoIterator<Item = (String, String)>,
{
	let vars = vars.into_iter().collect::<Vec<_>>();
	let mut builder = ConfigBuilder::new(&C::default())?;

	let file_key = format!("{}_CONFIG_FILE", prefix.to_uppercase());
	let key = args
		.config
		.or_else(|| vars.iter().find(|(k, _)| k == &file_key).map(|(_, v)| v.clone()));

	let key_provided = key.is_some();

	let mut config_path = None;

	if let Some(path) = key.or(default_file) {
		match builder.merge_file(&path) {
			Ok(()) => {
				config_path = Some(std::fs::canonicalize(&path).map_or(path, |p| p.display().to_string()));
			}
			Err(err) => {
				if key_provided || !err.is_io() {
					return Err(err);
				}

				tracing::debug!("failed to load config file: {}", err);
			}
		}
	}

	builder.merge_env(prefix, vars)?;

	Ok((builder.build()?, config_path))
}
