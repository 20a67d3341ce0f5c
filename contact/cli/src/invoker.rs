use std::time::Duration;

use anyhow::Context as _;
use reqwest::StatusCode;
use serde_json::Value;

use crate::cli::Cli;

pub struct Invoker {
	client: reqwest::Client,
	endpoint: String,
	json_output: bool,
}

/// A response with its body read, parsed as JSON when possible.
#[derive(Debug, Clone)]
pub struct ApiResponse {
	pub status: StatusCode,
	pub body: Value,
	pub text: String,
}

#[derive(serde::Serialize)]
struct DisplayOutput<T> {
	#[serde(rename = "__type")]
	object_type: &'static str,
	#[serde(flatten)]
	value: T,
}

impl Invoker {
	pub fn new(args: &Cli) -> anyhow::Result<Self> {
		Self::with_endpoint(&args.endpoint, args.timeout, args.json)
	}

	pub fn with_endpoint(endpoint: &str, timeout: Duration, json_output: bool) -> anyhow::Result<Self> {
		let endpoint = endpoint.trim_end_matches('/').to_string();
		reqwest::Url::parse(&endpoint).with_context(|| format!("invalid endpoint: {endpoint}"))?;

		let client = reqwest::Client::builder()
			.timeout(timeout)
			.user_agent(concat!("contact-cli/", env!("CARGO_PKG_VERSION")))
			.build()
			.context("failed to build http client")?;

		Ok(Self {
			client,
			endpoint,
			json_output,
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn json_output(&self) -> bool {
		self.json_output
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
	}

	pub async fn get(&self, path: &str) -> anyhow::Result<ApiResponse> {
		self.get_with_query(path, &[]).await
	}

	pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<ApiResponse> {
		let url = self.url(path);
		let response = self
			.client
			.get(&url)
			.query(query)
			.send()
			.await
			.with_context(|| format!("GET {url}"))?;
		ApiResponse::read(response).await
	}

	pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<ApiResponse> {
		let url = self.url(path);
		let response = self
			.client
			.post(&url)
			.json(body)
			.send()
			.await
			.with_context(|| format!("POST {url}"))?;
		ApiResponse::read(response).await
	}

	pub fn display<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<()> {
		let object_type = std::any::type_name::<T>();
		let object_type = object_type.split("::").last().unwrap_or(object_type);

		let output = if self.json_output {
			serde_json::to_string_pretty(&DisplayOutput { object_type, value }).context("failed to display response")?
		} else {
			serde_yaml::to_string(&DisplayOutput { object_type, value }).context("failed to display response")?
		};

		println!("{}", output.trim());

		Ok(())
	}

	pub fn display_array<T: serde::Serialize>(&self, values: &[T]) -> anyhow::Result<()> {
		let object_type = std::any::type_name::<T>();
		let object_type = object_type.split("::").last().unwrap_or(object_type);

		let values = &values
			.iter()
			.map(|value| DisplayOutput { object_type, value })
			.collect::<Vec<_>>();

		let output = if self.json_output {
			serde_json::to_string_pretty(&values).context("failed to display response")?
		} else {
			serde_yaml::to_string(&values).context("failed to display response")?
		};

		println!("{}", output.trim());

		Ok(())
	}
}

impl ApiResponse {
	async fn read(response: reqwest::Response) -> anyhow::Result<Self> {
		let status = response.status();
		let text = response.text().await.context("failed to read response body")?;
		let body = serde_json::from_str(&text).unwrap_or(Value::Null);

		Ok(Self { status, body, text })
	}

	/// Fails with the response body when the status is not `expected`.
	pub fn expect_status(&self, expected: StatusCode) -> anyhow::Result<&Self> {
		if self.status != expected {
			anyhow::bail!("expected {} but got {}: {}", expected.as_u16(), self.status.as_u16(), self.text);
		}

		Ok(self)
	}
}
