use anyhow::Context;
use reqwest::StatusCode;
use serde_json::Value;

use crate::cli::{Cli, Invokable};
use crate::invoker::Invoker;

const REQUIRED_FIELDS: &[(&str, &str)] = &[
	("id", "string"),
	("name", "string"),
	("email", "string"),
	("phone", "string"),
	("subject", "string"),
	("message", "string"),
	("created_at", "string"),
	("status", "string"),
];

/// Flags the api defaults, older records may lack them.
const OPTIONAL_FIELDS: &[(&str, &str)] = &[("has_pets", "bool"), ("has_vulnerable_people", "bool")];

const DEFAULT_STATUS: &str = "nouveau";

#[derive(Debug, clap::Args)]
pub struct Verify {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
	Pass,
	/// Reported, but does not fail the run.
	Warn,
	Fail,
}

impl Level {
	fn mark(&self) -> &'static str {
		match self {
			Self::Pass => "PASS",
			Self::Warn => "WARN",
			Self::Fail => "FAIL",
		}
	}
}

/// One line of the verification output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Finding {
	pub level: Level,
	pub check: String,
	pub detail: String,
}

impl Finding {
	fn new(level: Level, check: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			level,
			check: check.into(),
			detail: detail.into(),
		}
	}

	pub fn failed(&self) -> bool {
		self.level == Level::Fail
	}
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn check_field(record: &Value, field: &str, expected: &str, when_missing: Level) -> Finding {
	let check = format!("field {field}");
	match record.get(field) {
		Some(value) if type_name(value) == expected => Finding::new(Level::Pass, check, expected),
		Some(value) => Finding::new(
			Level::Fail,
			check,
			format!("expected {expected}, got {}", type_name(value)),
		),
		None => Finding::new(when_missing, check, "missing"),
	}
}

/// Checks one stored contact request as returned by the listing.
pub fn inspect(record: &Value) -> Vec<Finding> {
	let mut findings = Vec::new();

	for (field, expected) in REQUIRED_FIELDS {
		findings.push(check_field(record, field, expected, Level::Fail));
	}

	for (field, expected) in OPTIONAL_FIELDS {
		findings.push(check_field(record, field, expected, Level::Warn));
	}

	for (wire, stored) in [("hasPets", "has_pets"), ("hasVulnerablePeople", "has_vulnerable_people")] {
		let check = format!("mapping {wire} -> {stored}");
		let finding = match (record.get(wire), record.get(stored)) {
			(Some(_), _) => Finding::new(Level::Fail, check, format!("{wire} returned unmapped")),
			(None, Some(value)) => Finding::new(Level::Pass, check, value.to_string()),
			(None, None) => Finding::new(Level::Warn, check, "missing"),
		};

		findings.push(finding);
	}

	let email = record.get("email").and_then(Value::as_str).unwrap_or_default();
	let level = if email.contains('@') { Level::Pass } else { Level::Fail };
	findings.push(Finding::new(level, "email format", email));

	// Status changes happen outside the api.
	let status = record.get("status").and_then(Value::as_str).unwrap_or_default();
	let level = if status == DEFAULT_STATUS { Level::Pass } else { Level::Warn };
	findings.push(Finding::new(level, "default status", status));

	findings
}

#[async_trait::async_trait]
impl Invokable for Verify {
	async fn invoke(&self, invoker: &mut Invoker, _: &Cli) -> anyhow::Result<()> {
		let response = invoker.get("/contact").await?;
		response.expect_status(StatusCode::OK)?;

		let records = response.body.as_array().context("contact listing is not a list")?;
		let Some(record) = records.first() else {
			println!("no contact requests found");
			return Ok(());
		};

		let findings = inspect(record);

		if invoker.json_output() {
			invoker.display_array(&findings)?;
		} else {
			println!("most recent contact request:");
			println!("{}", serde_json::to_string_pretty(record).context("failed to display record")?);
			println!();

			for finding in &findings {
				println!("{}: {} ({})", finding.level.mark(), finding.check, finding.detail);
			}
		}

		let failed = findings.iter().filter(|finding| finding.failed()).count();
		if failed > 0 {
			anyhow::bail!("{failed} of {} checks failed", findings.len());
		}

		Ok(())
	}
}
