use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::display::{ContactRequest, ContactResponse};
use crate::cli::{Cli, Invokable};
use crate::invoker::Invoker;

#[derive(Debug, clap::Args)]
pub struct Smoke {}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckResult {
	pub test: String,
	pub success: bool,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<String>,
	pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SmokeReport {
	pub endpoint: String,
	pub results: Vec<CheckResult>,
}

impl SmokeReport {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			results: Vec::new(),
		}
	}

	/// Records the outcome of one check. Failures keep the error chain as details.
	pub fn record(&mut self, test: &str, outcome: anyhow::Result<String>) -> bool {
		let (success, message, details) = match outcome {
			Ok(message) => (true, message, None),
			Err(err) => {
				let causes = err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();
				(false, err.to_string(), (!causes.is_empty()).then(|| causes.join(": ")))
			}
		};

		self.results.push(CheckResult {
			test: test.to_string(),
			success,
			message,
			details,
			timestamp: Utc::now(),
		});

		success
	}

	pub fn total(&self) -> usize {
		self.results.len()
	}

	pub fn passed(&self) -> usize {
		self.results.iter().filter(|result| result.success).count()
	}

	pub fn failed(&self) -> usize {
		self.total() - self.passed()
	}

	pub fn success_rate(&self) -> f64 {
		if self.results.is_empty() {
			return 0.0;
		}

		self.passed() as f64 / self.total() as f64 * 100.0
	}

	pub fn print(&self) {
		println!("Testing api at: {}", self.endpoint);
		println!();

		for result in &self.results {
			let status = if result.success { "PASS" } else { "FAIL" };
			println!("{status}: {}", result.test);
			println!("   {}", result.message);
			if let Some(details) = &result.details {
				println!("   Details: {details}");
			}
		}

		println!();
		println!("Total Tests: {}", self.total());
		println!("Passed: {}", self.passed());
		println!("Failed: {}", self.failed());
		println!("Success Rate: {:.1}%", self.success_rate());

		if self.failed() > 0 {
			println!();
			println!("Failed tests:");
			for result in self.results.iter().filter(|result| !result.success) {
				println!("- {}: {}", result.test, result.message);
			}
		}
	}
}

fn marie_dubois() -> Value {
	json!({
		"name": "Marie Dubois",
		"email": "marie.dubois@email.com",
		"phone": "06 12 34 56 78",
		"subject": "Demande de devis désinfection",
		"message": "Bonjour, je souhaiterais obtenir un devis pour la désinfection de mon appartement de 80m². J'ai des animaux domestiques.",
		"hasPets": true,
		"hasVulnerablePeople": false,
	})
}

async fn check_connectivity(invoker: &Invoker) -> anyhow::Result<String> {
	let response = invoker.get("/").await.context("cannot connect to the api")?;
	response.expect_status(StatusCode::OK)?;

	if response.body["message"] != "Hello World" {
		anyhow::bail!("api responding with an unexpected message: {}", response.text);
	}

	Ok("api is reachable and responding correctly".to_string())
}

async fn submit(invoker: &Invoker, body: &Value) -> anyhow::Result<ContactResponse> {
	let response = invoker.post("/contact", body).await?;
	response.expect_status(StatusCode::OK)?;

	let created: ContactResponse = serde_json::from_value(response.body.clone())
		.with_context(|| format!("response missing required fields: {}", response.text))?;

	if !created.success || created.id.is_empty() || created.message.is_empty() {
		anyhow::bail!("response missing required fields: {}", response.text);
	}

	Ok(created)
}

async fn check_valid_submission(invoker: &Invoker, submitted: &mut Option<String>) -> anyhow::Result<String> {
	let created = submit(invoker, &marie_dubois()).await?;
	let message = format!("contact form submitted with id {}", created.id);
	*submitted = Some(created.id);
	Ok(message)
}

async fn check_rejected(invoker: &Invoker, body: Value, what: &str) -> anyhow::Result<String> {
	let response = invoker.post("/contact", &body).await?;
	response.expect_status(StatusCode::UNPROCESSABLE_ENTITY)?;

	if !response.body["detail"].is_array() {
		anyhow::bail!("422 without field errors: {}", response.text);
	}

	Ok(format!("{what} correctly rejected with 422"))
}

async fn check_defaults(invoker: &Invoker, defaulted: &mut Option<String>) -> anyhow::Result<String> {
	let created = submit(
		invoker,
		&json!({
			"name": "Sophie Laurent",
			"email": "sophie.laurent@email.com",
			"phone": "07 11 22 33 44",
			"subject": "Demande d'information",
			"message": "Je souhaite des informations sur vos services de désinfection pour bureau.",
		}),
	)
	.await?;

	let message = format!("submitted with defaults, id {}", created.id);
	*defaulted = Some(created.id);
	Ok(message)
}

async fn fetch_list(invoker: &Invoker, query: &[(&str, &str)]) -> anyhow::Result<Vec<ContactRequest>> {
	let response = invoker.get_with_query("/contact", query).await?;
	response.expect_status(StatusCode::OK)?;

	if !response.body.is_array() {
		anyhow::bail!("response is not a list: {}", response.text);
	}

	serde_json::from_value(response.body.clone()).context("unexpected contact request shape")
}

fn check_sorted(requests: &[ContactRequest]) -> anyhow::Result<String> {
	if requests.len() < 2 {
		return Ok("fewer than two requests, nothing to compare".to_string());
	}

	if let Some(pair) = requests.windows(2).find(|pair| pair[0].created_at < pair[1].created_at) {
		anyhow::bail!(
			"contact requests not sorted by date: {} before {}",
			pair[0].created_at,
			pair[1].created_at
		);
	}

	Ok("contact requests sorted by date, newest first".to_string())
}

fn find_request<'a>(requests: &'a [ContactRequest], id: Option<&str>, label: &str) -> anyhow::Result<&'a ContactRequest> {
	let id = id.with_context(|| format!("no {label} submission to look up"))?;
	requests
		.iter()
		.find(|request| request.id == id)
		.with_context(|| format!("{label} submission {id} not listed"))
}

fn check_persisted(
	requests: &[ContactRequest],
	submitted: Option<&str>,
	defaulted: Option<&str>,
) -> anyhow::Result<String> {
	let full = find_request(requests, submitted, "valid")?;
	if !full.has_pets || full.has_vulnerable_people || full.name != "Marie Dubois" {
		anyhow::bail!("stored fields do not match the submission: {full:?}");
	}

	if full.status != "nouveau" {
		anyhow::bail!("unexpected initial status {:?}", full.status);
	}

	let bare = find_request(requests, defaulted, "defaulted")?;
	if bare.has_pets || bare.has_vulnerable_people {
		anyhow::bail!("omitted flags did not default to false: {bare:?}");
	}

	Ok("submissions stored with mapped fields and defaults".to_string())
}

async fn check_filter(invoker: &Invoker) -> anyhow::Result<String> {
	let requests = fetch_list(invoker, &[("status", "nouveau")]).await?;

	if let Some(request) = requests.iter().find(|request| request.status != "nouveau") {
		anyhow::bail!("request {} has status {:?}", request.id, request.status);
	}

	Ok(format!("filtered {} requests with status 'nouveau'", requests.len()))
}

/// Runs every check in order. Individual failures never stop the run.
pub async fn run(invoker: &Invoker) -> SmokeReport {
	let mut report = SmokeReport::new(invoker.endpoint());

	report.record("Backend Connectivity", check_connectivity(invoker).await);

	let mut submitted = None;
	let mut defaulted = None;

	report.record(
		"Valid Contact Form Submission",
		check_valid_submission(invoker, &mut submitted).await,
	);

	let mut invalid_email = marie_dubois();
	invalid_email["email"] = json!("invalid-email");
	report.record(
		"Invalid Email Validation",
		check_rejected(invoker, invalid_email, "invalid email").await,
	);

	report.record(
		"Missing Required Fields Validation",
		check_rejected(
			invoker,
			json!({
				"name": "Pierre Durand",
				"email": "pierre.durand@email.com",
				"hasPets": false,
				"hasVulnerablePeople": false,
			}),
			"missing fields",
		)
		.await,
	);

	report.record("Optional Fields Default Values", check_defaults(invoker, &mut defaulted).await);

	match fetch_list(invoker, &[]).await {
		Ok(requests) => {
			report.record(
				"Get Contact Requests",
				Ok(format!("retrieved {} contact requests", requests.len())),
			);
			report.record("Contact Requests Date Sorting", check_sorted(&requests));
			report.record(
				"Submitted Data Persisted",
				check_persisted(&requests, submitted.as_deref(), defaulted.as_deref()),
			);
		}
		Err(err) => {
			report.record("Get Contact Requests", Err(err));
		}
	}

	report.record("Contact Requests Status Filter", check_filter(invoker).await);

	report
}

#[async_trait::async_trait]
impl Invokable for Smoke {
	async fn invoke(&self, invoker: &mut Invoker, _: &Cli) -> anyhow::Result<()> {
		let report = run(invoker).await;

		if invoker.json_output() {
			invoker.display(&report)?;
		} else {
			report.print();
		}

		if report.failed() > 0 {
			anyhow::bail!("{} of {} checks failed", report.failed(), report.total());
		}

		Ok(())
	}
}
