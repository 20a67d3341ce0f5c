use anyhow::Context as _;
use clap::Parser;
use contact_cli::cli::{Cli, Invokable};
use contact_cli::invoker::Invoker;

#[tokio::main]
async fn main() {
	if let Err(err) = start().await {
		eprintln!("{:#}", err);
		std::process::exit(1);
	}
}

async fn start() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let mut invoker = Invoker::new(&cli).context("failed to build invoker")?;

	cli.command.invoke(&mut invoker, &cli).await
}
