use axum::extract::rejection::JsonRejection;
use axum::Json;
use email_address::{EmailAddress, Options};
use serde_json::Value;

use super::models::{ContactRequestPayload, StatusCheckPayload};
use crate::database::NewContactRequest;

#[derive(Debug, Clone, Copy)]
pub enum FragmentItem {
	Map(&'static str),
}

#[derive(Debug)]
pub struct FragmentBuf {
	path: Vec<FragmentItem>,
}

impl Default for FragmentBuf {
	fn default() -> Self {
		Self::new()
	}
}

impl FragmentBuf {
	/// Paths start at the request body.
	pub fn new() -> Self {
		Self {
			path: vec![FragmentItem::Map("body")],
		}
	}

	pub fn push(&mut self, path: impl Into<FragmentItem>) -> Fragment<'_> {
		self.path.push(path.into());
		Fragment::new(&mut self.path)
	}
}

#[derive(Debug)]
pub struct Fragment<'a> {
	path: &'a mut Vec<FragmentItem>,
}

impl<'a> Fragment<'a> {
	pub fn new(path: &'a mut Vec<FragmentItem>) -> Self {
		Self { path }
	}

	/// The path as reported to clients, `["body", "email"]`.
	pub fn loc(&self) -> Vec<Value> {
		self.path
			.iter()
			.map(|FragmentItem::Map(value)| Value::from(*value))
			.collect()
	}
}

impl From<&'static str> for FragmentItem {
	fn from(value: &'static str) -> Self {
		Self::Map(value)
	}
}

impl Drop for Fragment<'_> {
	fn drop(&mut self) {
		self.path.pop();
	}
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
	pub loc: Vec<Value>,
	pub msg: String,
	#[serde(rename = "type")]
	pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	Missing,
	NotAString,
	Empty,
	NotABool,
	InvalidEmail,
	InvalidBody,
	NotAnObject,
}

impl ErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Missing => "value_error.missing",
			Self::NotAString => "type_error.str",
			Self::Empty => "value_error.any_str.min_length",
			Self::NotABool => "type_error.bool",
			Self::InvalidEmail => "value_error.email",
			Self::InvalidBody => "value_error.jsondecode",
			Self::NotAnObject => "type_error.dict",
		}
	}

	pub fn message(&self) -> &'static str {
		match self {
			Self::Missing => "field required",
			Self::NotAString => "str type expected",
			Self::Empty => "ensure this value has at least 1 characters",
			Self::NotABool => "value could not be parsed to a boolean",
			Self::InvalidEmail => "value is not a valid email address",
			Self::InvalidBody => "invalid request body",
			Self::NotAnObject => "value is not a valid dict",
		}
	}
}

/// Every problem found in a request body, in field order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
	errors: Vec<FieldError>,
}

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, fragment: &Fragment, kind: ErrorKind) {
		self.errors.push(FieldError {
			loc: fragment.loc(),
			msg: kind.message().to_string(),
			kind: kind.as_str().to_string(),
		});
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn errors(&self) -> &[FieldError] {
		&self.errors
	}

	pub fn into_errors(self) -> Vec<FieldError> {
		self.errors
	}

	fn finish<T>(self, value: Option<T>) -> Result<T, Self> {
		match value {
			Some(value) if self.is_empty() => Ok(value),
			_ => Err(self),
		}
	}
}

impl ValidationErrors {
	/// A single error about the body as a whole.
	fn body(kind: ErrorKind, msg: impl Into<String>) -> Self {
		Self {
			errors: vec![FieldError {
				loc: vec![Value::from("body")],
				msg: msg.into(),
				kind: kind.as_str().to_string(),
			}],
		}
	}
}

impl From<JsonRejection> for ValidationErrors {
	fn from(rejection: JsonRejection) -> Self {
		Self::body(ErrorKind::InvalidBody, rejection.body_text())
	}
}

/// Reads a payload out of a JSON body. Anything but an object is rejected.
pub fn parse_body<T: serde::de::DeserializeOwned>(
	body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ValidationErrors> {
	let Json(body) = body?;

	if !body.is_object() {
		return Err(ValidationErrors::body(ErrorKind::NotAnObject, ErrorKind::NotAnObject.message()));
	}

	serde_json::from_value(body).map_err(|err| ValidationErrors::body(ErrorKind::InvalidBody, err.to_string()))
}

impl std::fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (idx, error) in self.errors.iter().enumerate() {
			if idx != 0 {
				write!(f, "; ")?;
			}

			let loc = error
				.loc
				.iter()
				.map(|item| match item {
					Value::String(value) => value.clone(),
					other => other.to_string(),
				})
				.collect::<Vec<_>>()
				.join(".");

			write!(f, "{loc}: {}", error.msg)?;
		}

		Ok(())
	}
}

impl std::error::Error for ValidationErrors {}

/// A string that must be present. Empty strings are allowed unless `non_empty` is set.
fn validate_string(
	errors: &mut ValidationErrors,
	fragment: Fragment,
	value: Option<&Value>,
	non_empty: bool,
) -> Option<String> {
	match value {
		None => {
			errors.push(&fragment, ErrorKind::Missing);
			None
		}
		Some(Value::String(value)) if non_empty && value.trim().is_empty() => {
			errors.push(&fragment, ErrorKind::Empty);
			None
		}
		Some(Value::String(value)) => Some(value.clone()),
		Some(_) => {
			errors.push(&fragment, ErrorKind::NotAString);
			None
		}
	}
}

/// Plain `local@domain.tld` addresses only: no display names, domain literals or quoted local parts.
pub fn is_valid_email(value: &str) -> bool {
	let options = Options::default()
		.with_required_tld()
		.without_domain_literal()
		.without_display_text();

	match EmailAddress::parse_with_options(value, options) {
		Ok(email) => !email.local_part().starts_with('"'),
		Err(_) => false,
	}
}

fn validate_email(errors: &mut ValidationErrors, fragment: Fragment, value: Option<&Value>) -> Option<String> {
	match value {
		Some(Value::String(value)) if !is_valid_email(value) => {
			errors.push(&fragment, ErrorKind::InvalidEmail);
			None
		}
		value => validate_string(errors, fragment, value, true),
	}
}

/// Absent flags default to false.
fn validate_flag(errors: &mut ValidationErrors, fragment: Fragment, value: Option<&Value>) -> bool {
	match value {
		None => false,
		Some(Value::Bool(value)) => *value,
		Some(_) => {
			errors.push(&fragment, ErrorKind::NotABool);
			false
		}
	}
}

pub fn validate_status_check(payload: &StatusCheckPayload) -> Result<String, ValidationErrors> {
	let mut fragment = FragmentBuf::new();
	let mut errors = ValidationErrors::new();

	let client_name = validate_string(
		&mut errors,
		fragment.push("client_name"),
		payload.client_name.as_ref(),
		false,
	);

	errors.finish(client_name)
}

pub fn validate_contact_request(payload: &ContactRequestPayload) -> Result<NewContactRequest, ValidationErrors> {
	let mut fragment = FragmentBuf::new();
	let mut errors = ValidationErrors::new();

	let name = validate_string(&mut errors, fragment.push("name"), payload.name.as_ref(), true);
	let email = validate_email(&mut errors, fragment.push("email"), payload.email.as_ref());
	let phone = validate_string(&mut errors, fragment.push("phone"), payload.phone.as_ref(), true);
	let subject = validate_string(&mut errors, fragment.push("subject"), payload.subject.as_ref(), true);
	let message = validate_string(&mut errors, fragment.push("message"), payload.message.as_ref(), true);
	let has_pets = validate_flag(&mut errors, fragment.push("hasPets"), payload.has_pets.as_ref());
	let has_vulnerable_people = validate_flag(
		&mut errors,
		fragment.push("hasVulnerablePeople"),
		payload.has_vulnerable_people.as_ref(),
	);

	let request = match (name, email, phone, subject, message) {
		(Some(name), Some(email), Some(phone), Some(subject), Some(message)) => Some(NewContactRequest {
			name,
			email,
			phone,
			subject,
			message,
			has_pets,
			has_vulnerable_people,
		}),
		_ => None,
	};

	errors.finish(request)
}
