use anyhow::Context;
use reqwest::StatusCode;
use serde_json::json;

use super::display::ContactResponse;
use crate::cli::{Cli, Invokable};
use crate::invoker::Invoker;

#[derive(Debug, clap::Args)]
pub struct Submit {
	/// Full name of the requester
	#[clap(long)]
	pub name: String,

	/// Email address to answer to
	#[clap(long)]
	pub email: String,

	/// Phone number
	#[clap(long)]
	pub phone: String,

	/// Subject of the request
	#[clap(long)]
	pub subject: String,

	/// Free form message
	#[clap(long)]
	pub message: String,

	/// Pets live at the address
	#[clap(long)]
	pub has_pets: bool,

	/// Vulnerable people live at the address
	#[clap(long)]
	pub has_vulnerable_people: bool,
}

#[async_trait::async_trait]
impl Invokable for Submit {
	async fn invoke(&self, invoker: &mut Invoker, _: &Cli) -> anyhow::Result<()> {
		let response = invoker
			.post(
				"/contact",
				&json!({
					"name": self.name,
					"email": self.email,
					"phone": self.phone,
					"subject": self.subject,
					"message": self.message,
					"hasPets": self.has_pets,
					"hasVulnerablePeople": self.has_vulnerable_people,
				}),
			)
			.await?;

		response.expect_status(StatusCode::OK)?;

		let created: ContactResponse =
			serde_json::from_value(response.body.clone()).context("unexpected submission response")?;

		invoker.display(&created)?;

		Ok(())
	}
}
