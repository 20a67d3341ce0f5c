//! Response shapes as the cli reads them back from the api.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
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

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContactResponse {
	pub success: bool,
	pub message: String,
	pub id: String,
}
