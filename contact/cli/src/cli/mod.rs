use std::time::Duration;

use crate::invoker::Invoker;

pub mod display;
pub mod list;
pub mod smoke;
pub mod submit;
pub mod verify;

/// Checks a running contact api from the outside
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// Base url of the api, including its prefix
	#[clap(long, env = "CONTACT_ENDPOINT", default_value = "http://localhost:8001/api")]
	pub endpoint: String,

	/// Per request timeout
	#[clap(long, default_value = "10s", value_parser = humantime::parse_duration)]
	pub timeout: Duration,

	/// Json output
	#[clap(long)]
	pub json: bool,

	#[clap(subcommand)]
	pub command: Commands,
}

#[async_trait::async_trait]
pub trait Invokable {
	async fn invoke(&self, invoker: &mut Invoker, args: &Cli) -> anyhow::Result<()>;
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
	/// Run the end to end checks against the api
	Smoke(smoke::Smoke),

	/// Inspect the most recent contact request
	Verify(verify::Verify),

	/// Submit a contact request
	Submit(submit::Submit),

	/// List contact requests
	List(list::List),
}

#[async_trait::async_trait]
impl Invokable for Commands {
	async fn invoke(&self, invoker: &mut Invoker, args: &Cli) -> anyhow::Result<()> {
		match self {
			Self::Smoke(cmd) => cmd.invoke(invoker, args).await,
			Self::Verify(cmd) => cmd.invoke(invoker, args).await,
			Self::Submit(cmd) => cmd.invoke(invoker, args).await,
			Self::List(cmd) => cmd.invoke(invoker, args).await,
		}
	}
}
