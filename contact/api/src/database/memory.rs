use tokio::sync::RwLock;

use super::{ContactRequest, StatusCheck, Store, StoreError};
use crate::config::DatabaseConfig;

#[derive(Debug, Clone, thiserror::Error)]
pub enum MemoryStoreError {
	#[error("no space left in store")]
	NoSpaceLeft,
	#[error("store is closed")]
	Closed,
	#[error("duplicate id: {0}")]
	DuplicateId(String),
}

#[derive(Debug)]
struct Collections {
	closed: bool,
	acknowledge_writes: bool,
	remaining_capacity: usize,
	status_checks: Vec<StatusCheck>,
	contact_requests: Vec<ContactRequest>,
}

impl Collections {
	fn reserve(&mut self) -> Result<(), MemoryStoreError> {
		if self.closed {
			return Err(MemoryStoreError::Closed);
		}

		if self.remaining_capacity == 0 {
			return Err(MemoryStoreError::NoSpaceLeft);
		}

		self.remaining_capacity -= 1;
		Ok(())
	}

	fn open(&self) -> Result<&Self, MemoryStoreError> {
		if self.closed {
			return Err(MemoryStoreError::Closed);
		}

		Ok(self)
	}
}

/// Keeps both collections in process, for tests and local runs without mongodb.
#[derive(Debug)]
pub struct MemoryStore {
	collections: RwLock<Collections>,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new(None)
	}
}

impl MemoryStore {
	/// `capacity` caps the number of documents across both collections.
	pub fn new(capacity: Option<usize>) -> Self {
		tracing::debug!("setting up memory store");
		Self {
			collections: RwLock::new(Collections {
				closed: false,
				acknowledge_writes: true,
				remaining_capacity: capacity.unwrap_or(usize::MAX),
				status_checks: Vec::new(),
				contact_requests: Vec::new(),
			}),
		}
	}

	pub fn from_config(config: &DatabaseConfig) -> Self {
		let store = Self::new(config.memory_capacity);
		if config.memory_acknowledge_writes {
			store
		} else {
			store.without_acknowledged_writes()
		}
	}

	/// Inserts are dropped and reported as [`StoreError::NotInserted`].
	pub fn without_acknowledged_writes(mut self) -> Self {
		self.collections.get_mut().acknowledge_writes = false;
		self
	}
}

impl Store for MemoryStore {
	fn name(&self) -> &str {
		"memory"
	}

	#[tracing::instrument(skip_all, name = "MemoryStore::insert_status_check", fields(id = %check.id), err)]
	async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), StoreError> {
		let mut collections = self.collections.write().await;
		collections.open()?;

		if collections.status_checks.iter().any(|existing| existing.id == check.id) {
			return Err(MemoryStoreError::DuplicateId(check.id.clone()).into());
		}

		if !collections.acknowledge_writes {
			return Err(StoreError::NotInserted);
		}

		collections.reserve()?;
		collections.status_checks.push(check.clone());

		Ok(())
	}

	#[tracing::instrument(skip(self), name = "MemoryStore::list_status_checks", err)]
	async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>, StoreError> {
		let collections = self.collections.read().await;

		Ok(collections.open()?.status_checks.iter().take(limit).cloned().collect())
	}

	#[tracing::instrument(skip_all, name = "MemoryStore::insert_contact_request", fields(id = %request.id), err)]
	async fn insert_contact_request(&self, request: &ContactRequest) -> Result<(), StoreError> {
		let mut collections = self.collections.write().await;
		collections.open()?;

		if collections.contact_requests.iter().any(|existing| existing.id == request.id) {
			return Err(MemoryStoreError::DuplicateId(request.id.clone()).into());
		}

		if !collections.acknowledge_writes {
			return Err(StoreError::NotInserted);
		}

		collections.reserve()?;
		collections.contact_requests.push(request.clone());

		Ok(())
	}

	#[tracing::instrument(skip(self), name = "MemoryStore::list_contact_requests", err)]
	async fn list_contact_requests(&self, status: Option<&str>, limit: usize) -> Result<Vec<ContactRequest>, StoreError> {
		let collections = self.collections.read().await;

		let mut requests = collections
			.open()?
			.contact_requests
			.iter()
			.filter(|request| status.map_or(true, |status| request.status == status))
			.cloned()
			.collect::<Vec<_>>();

		// Stable, so equal timestamps keep insertion order.
		requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		requests.truncate(limit);

		Ok(requests)
	}

	async fn healthy(&self) -> bool {
		!self.collections.read().await.closed
	}

	async fn close(&self) {
		tracing::debug!("closing memory store");
		self.collections.write().await.closed = true;
	}
}
