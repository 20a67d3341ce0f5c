use std::net::{Ipv6Addr, SocketAddr};
use std::time::Duration;

use common::config::LoggingConfig;

/// Prefix of every environment variable the service reads, `CONTACT_API__BIND_ADDRESS` and so on.
pub const ENV_PREFIX: &str = "CONTACT";

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AppConfig {
	/// Name of this instance
	pub name: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// Logging config
	pub logging: LoggingConfig,

	/// API config
	pub api: ApiConfig,

	/// Database config
	pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// Path every route is mounted under
	pub prefix: String,

	/// Origins allowed by CORS, `*` allows any origin
	pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
	#[default]
	Mongo,
	Memory,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// Which store backs the service
	pub kind: DatabaseKind,

	/// The mongodb connection string
	pub uri: String,

	/// The database name, when empty the database named in the uri is used
	pub name: String,

	/// How long to wait for the database during startup
	#[serde(with = "humantime_serde")]
	pub connect_timeout: Duration,

	/// Maximum number of documents kept by the memory store
	pub memory_capacity: Option<usize>,

	/// When false the memory store drops writes and reports nothing inserted
	pub memory_acknowledge_writes: bool,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			name: "contact-api".to_string(),
			config_file: Some("config".to_string()),
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
		}
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from((Ipv6Addr::UNSPECIFIED, 8001)),
			prefix: "/api".to_string(),
			cors_origins: vec!["*".to_string()],
		}
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			kind: DatabaseKind::Mongo,
			uri: "mongodb://localhost:27017".to_string(),
			name: "contact".to_string(),
			connect_timeout: Duration::from_secs(5),
			memory_capacity: None,
			memory_acknowledge_writes: true,
		}
	}
}

impl AppConfig {
	/// Loads the config from the default file, the cli and the environment.
	pub fn parse() -> anyhow::Result<Self> {
		let (config, config_file) =
			common::config::parse::<Self>(!cfg!(test), ENV_PREFIX, Self::default().config_file.map(with_extension))?;

		Ok(config.finish(config_file, std::env::vars()))
	}

	/// Applies the unprefixed deployment variables and normalizes the result.
	pub fn finish<I>(mut self, config_file: Option<String>, vars: I) -> Self
	where
		I: IntoIterator<Item = (String, String)>,
	{
		self.config_file = config_file;

		for (key, value) in vars {
			match key.as_str() {
				"MONGO_URL" => self.database.uri = value,
				"DB_NAME" => self.database.name = value,
				"CORS_ORIGINS" => {
					self.api.cors_origins = value
						.split(',')
						.map(str::trim)
						.filter(|origin| !origin.is_empty())
						.map(str::to_string)
						.collect();
				}
				_ => {}
			}
		}

		self.api.prefix = normalize_prefix(&self.api.prefix);

		self
	}
}

fn with_extension(file: String) -> String {
	if std::path::Path::new(&file).extension().is_some() {
		file
	} else {
		format!("{file}.toml")
	}
}

/// `api/` and `/api` both become `/api`, `/` becomes the empty prefix.
pub fn normalize_prefix(prefix: &str) -> String {
	let trimmed = prefix.trim().trim_matches('/');
	if trimmed.is_empty() {
		String::new()
	} else {
		format!("/{trimmed}")
	}
}
