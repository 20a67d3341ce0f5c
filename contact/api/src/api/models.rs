//! Wire shapes of the HTTP API, kept apart from the stored documents.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::database;

/// Body of `POST /status`. Fields stay loosely typed so validation can report every problem at once.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct StatusCheckPayload {
	pub client_name: Option<Value>,
}

/// Body of `POST /contact`, in the camelCase the form sends.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestPayload {
	pub name: Option<Value>,
	pub email: Option<Value>,
	pub phone: Option<Value>,
	pub subject: Option<Value>,
	pub message: Option<Value>,
	pub has_pets: Option<Value>,
	pub has_vulnerable_people: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatusCheck {
	pub id: String,
	pub client_name: String,
	pub timestamp: DateTime<Utc>,
}

impl From<database::StatusCheck> for StatusCheck {
	fn from(value: database::StatusCheck) -> Self {
		Self {
			id: value.id,
			client_name: value.client_name,
			timestamp: value.timestamp,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactRequest {
	pub id: String,
	pub name: String,
	pub email: String,
	pub phone: String,
	pub subject: String,
	pub message: String,
	pub has_pets: bool,
	pub has_vulnerable_people: bool,
	pub created_at: DateTime<Utc>,
	pub status: String,
}

impl From<database::ContactRequest> for ContactRequest {
	fn from(value: database::ContactRequest) -> Self {
		Self {
			id: value.id,
			name: value.name,
			email: value.email,
			phone: value.phone,
			subject: value.subject,
			message: value.message,
			has_pets: value.has_pets,
			has_vulnerable_people: value.has_vulnerable_people,
			created_at: value.created_at,
			status: value.status,
		}
	}
}

/// Returned after a contact request was stored.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactResponse {
	pub success: bool,
	pub message: String,
	pub id: String,
}
