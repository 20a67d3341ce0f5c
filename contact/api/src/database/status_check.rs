use chrono::{DateTime, Utc};

/// A liveness record written by `POST /status`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct StatusCheck {
	/// Random UUIDv4 in its hyphenated form
	pub id: String,
	pub client_name: String,
	#[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
	pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
	pub const COLLECTION: &'static str = "status_checks";

	pub fn new(client_name: String) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			client_name,
			timestamp: super::now(),
		}
	}
}
