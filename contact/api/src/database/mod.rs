use chrono::{DateTime, SubsecRound, Utc};

use self::memory::{MemoryStore, MemoryStoreError};
use self::mongo::{MongoStore, MongoStoreError};
use crate::config::{DatabaseConfig, DatabaseKind};

pub mod contact_request;
pub mod memory;
pub mod mongo;
pub mod status_check;

pub use self::contact_request::{ContactRequest, NewContactRequest, DEFAULT_STATUS};
pub use self::status_check::StatusCheck;

/// Upper bound on the number of records a single listing returns.
pub const LIST_LIMIT: usize = 1000;

/// The current time at the millisecond precision the database keeps.
pub fn now() -> DateTime<Utc> {
	Utc::now().trunc_subsecs(3)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("mongo: {0}")]
	Mongo(#[from] MongoStoreError),
	#[error("memory: {0}")]
	Memory(#[from] MemoryStoreError),
	#[error("insert was not acknowledged")]
	NotInserted,
}

impl From<mongodb::error::Error> for StoreError {
	fn from(value: mongodb::error::Error) -> Self {
		Self::Mongo(MongoStoreError::Mongo(value))
	}
}

pub trait Store {
	/// Name of the backend, used in logs
	fn name(&self) -> &str;

	/// Persists a status check
	fn insert_status_check(&self, check: &StatusCheck) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

	/// Lists status checks in storage order
	fn list_status_checks(
		&self,
		limit: usize,
	) -> impl std::future::Future<Output = Result<Vec<StatusCheck>, StoreError>> + Send;

	/// Persists a contact request
	fn insert_contact_request(
		&self,
		request: &ContactRequest,
	) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

	/// Lists contact requests newest first, optionally only those with the given status
	fn list_contact_requests(
		&self,
		status: Option<&str>,
		limit: usize,
	) -> impl std::future::Future<Output = Result<Vec<ContactRequest>, StoreError>> + Send;

	/// Whether the backend can currently serve requests
	fn healthy(&self) -> impl std::future::Future<Output = bool> + Send {
		async { true }
	}

	/// Releases the backend, later calls fail
	fn close(&self) -> impl std::future::Future<Output = ()> + Send;
}

#[derive(Debug)]
pub enum AnyStore {
	Mongo(MongoStore),
	Memory(MemoryStore),
}

impl Store for AnyStore {
	fn name(&self) -> &str {
		match self {
			AnyStore::Mongo(store) => store.name(),
			AnyStore::Memory(store) => store.name(),
		}
	}

	async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), StoreError> {
		match self {
			AnyStore::Mongo(store) => store.insert_status_check(check).await,
			AnyStore::Memory(store) => store.insert_status_check(check).await,
		}
	}

	async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>, StoreError> {
		match self {
			AnyStore::Mongo(store) => store.list_status_checks(limit).await,
			AnyStore::Memory(store) => store.list_status_checks(limit).await,
		}
	}

	async fn insert_contact_request(&self, request: &ContactRequest) -> Result<(), StoreError> {
		match self {
			AnyStore::Mongo(store) => store.insert_contact_request(request).await,
			AnyStore::Memory(store) => store.insert_contact_request(request).await,
		}
	}

	async fn list_contact_requests(&self, status: Option<&str>, limit: usize) -> Result<Vec<ContactRequest>, StoreError> {
		match self {
			AnyStore::Mongo(store) => store.list_contact_requests(status, limit).await,
			AnyStore::Memory(store) => store.list_contact_requests(status, limit).await,
		}
	}

	async fn healthy(&self) -> bool {
		match self {
			AnyStore::Mongo(store) => store.healthy().await,
			AnyStore::Memory(store) => store.healthy().await,
		}
	}

	async fn close(&self) {
		match self {
			AnyStore::Mongo(store) => store.close().await,
			AnyStore::Memory(store) => store.close().await,
		}
	}
}

pub async fn build_store(config: &DatabaseConfig) -> Result<AnyStore, StoreError> {
	match config.kind {
		DatabaseKind::Mongo => Ok(AnyStore::Mongo(MongoStore::new(config).await?)),
		DatabaseKind::Memory => Ok(AnyStore::Memory(MemoryStore::from_config(config))),
	}
}
