use chrono::{DateTime, Utc};

/// Every request starts out in this state.
pub const DEFAULT_STATUS: &str = "nouveau";

/// A validated submission, before the server assigned fields are filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactRequest {
	pub name: String,
	pub email: String,
	pub phone: String,
	pub subject: String,
	pub message: String,
	pub has_pets: bool,
	pub has_vulnerable_people: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ContactRequest {
	/// Random UUIDv4 in its hyphenated form, unique across the collection
	pub id: String,
	pub name: String,
	pub email: String,
	pub phone: String,
	pub subject: String,
	pub message: String,
	pub has_pets: bool,
	pub has_vulnerable_people: bool,
	#[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
	pub created_at: DateTime<Utc>,
	/// Workflow state, never changed by this service
	pub status: String,
}

impl ContactRequest {
	pub const COLLECTION: &'static str = "contact_requests";

	pub fn new(request: NewContactRequest) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			name: request.name,
			email: request.email,
			phone: request.phone,
			subject: request.subject,
			message: request.message,
			has_pets: request.has_pets,
			has_vulnerable_people: request.has_vulnerable_people,
			created_at: super::now(),
			status: DEFAULT_STATUS.to_string(),
		}
	}
}
