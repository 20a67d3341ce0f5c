use anyhow::Context;
use reqwest::StatusCode;

use super::display::ContactRequest;
use crate::cli::{Cli, Invokable};
use crate::invoker::Invoker;

#[derive(Debug, clap::Args)]
pub struct List {
	/// Only list requests with this status
	#[clap(long)]
	pub status: Option<String>,
}

#[async_trait::async_trait]
impl Invokable for List {
	async fn invoke(&self, invoker: &mut Invoker, _: &Cli) -> anyhow::Result<()> {
		let query = match &self.status {
			Some(status) => vec![("status", status.as_str())],
			None => Vec::new(),
		};

		let response = invoker.get_with_query("/contact", &query).await?;
		response.expect_status(StatusCode::OK)?;

		let requests: Vec<ContactRequest> =
			serde_json::from_value(response.body.clone()).context("unexpected contact request list")?;

		invoker.display_array(&requests)?;

		Ok(())
	}
}
