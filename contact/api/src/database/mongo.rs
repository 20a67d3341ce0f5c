use bson::{doc, Bson};
use common::prelude::FutureTimeout;
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use super::{ContactRequest, StatusCheck, Store, StoreError};
use crate::config::DatabaseConfig;

#[derive(Debug, thiserror::Error)]
pub enum MongoStoreError {
	#[error("{0}")]
	Mongo(#[from] mongodb::error::Error),
	#[error("timed out after {0:?}")]
	Timeout(std::time::Duration),
	#[error("no database name configured and the uri names none")]
	NoDatabase,
}

#[derive(Debug)]
pub struct MongoStore {
	name: String,
	client: Client,
	database: Database,
}

impl MongoStore {
	#[tracing::instrument(skip(config), name = "MongoStore::new", fields(database = %config.name), err)]
	pub async fn new(config: &DatabaseConfig) -> Result<Self, MongoStoreError> {
		tracing::debug!("setting up mongo client");

		let mut options = ClientOptions::parse(&config.uri)
			.timeout(config.connect_timeout)
			.await
			.map_err(|_| MongoStoreError::Timeout(config.connect_timeout))??;
		options.connect_timeout = Some(config.connect_timeout);
		options.server_selection_timeout = Some(config.connect_timeout);

		let client = Client::with_options(options)?;

		let database = if config.name.is_empty() {
			client.default_database().ok_or(MongoStoreError::NoDatabase)?
		} else {
			client.database(&config.name)
		};

		tracing::debug!("setting up collections");

		Self::setup_collections(&database)
			.timeout(config.connect_timeout)
			.await
			.map_err(|_| MongoStoreError::Timeout(config.connect_timeout))??;

		Ok(Self {
			name: database.name().to_string(),
			client,
			database,
		})
	}

	async fn setup_collections(database: &Database) -> Result<(), mongodb::error::Error> {
		let status_checks = database.collection::<StatusCheck>(StatusCheck::COLLECTION);

		status_checks
			.create_index(
				IndexModel::builder()
					.keys(doc! { "id": 1 })
					.options(Some(IndexOptions::builder().unique(true).build()))
					.build(),
				None,
			)
			.await?;

		let contact_requests = database.collection::<ContactRequest>(ContactRequest::COLLECTION);

		contact_requests
			.create_index(
				IndexModel::builder()
					.keys(doc! { "id": 1 })
					.options(Some(IndexOptions::builder().unique(true).build()))
					.build(),
				None,
			)
			.await?;

		contact_requests
			.create_index(IndexModel::builder().keys(doc! { "created_at": -1 }).build(), None)
			.await?;

		contact_requests
			.create_index(IndexModel::builder().keys(doc! { "status": 1, "created_at": -1 }).build(), None)
			.await?;

		Ok(())
	}

	fn status_checks(&self) -> Collection<StatusCheck> {
		self.database.collection(StatusCheck::COLLECTION)
	}

	fn contact_requests(&self) -> Collection<ContactRequest> {
		self.database.collection(ContactRequest::COLLECTION)
	}

	pub fn database(&self) -> &Database {
		&self.database
	}
}

fn clamp_limit(limit: usize) -> i64 {
	i64::try_from(limit).unwrap_or(i64::MAX)
}

impl Store for MongoStore {
	fn name(&self) -> &str {
		&self.name
	}

	#[tracing::instrument(skip_all, name = "MongoStore::insert_status_check", fields(id = %check.id), err)]
	async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), StoreError> {
		let result = self.status_checks().insert_one(check, None).await?;
		if result.inserted_id == Bson::Null {
			return Err(StoreError::NotInserted);
		}

		Ok(())
	}

	#[tracing::instrument(skip(self), name = "MongoStore::list_status_checks", err)]
	async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>, StoreError> {
		let options = FindOptions::builder()
			.limit(clamp_limit(limit))
			.projection(doc! { "_id": 0 })
			.build();

		let checks = self.status_checks().find(None, options).await?.try_collect().await?;

		Ok(checks)
	}

	#[tracing::instrument(skip_all, name = "MongoStore::insert_contact_request", fields(id = %request.id), err)]
	async fn insert_contact_request(&self, request: &ContactRequest) -> Result<(), StoreError> {
		let result = self.contact_requests().insert_one(request, None).await?;
		if result.inserted_id == Bson::Null {
			return Err(StoreError::NotInserted);
		}

		Ok(())
	}

	#[tracing::instrument(skip(self), name = "MongoStore::list_contact_requests", err)]
	async fn list_contact_requests(&self, status: Option<&str>, limit: usize) -> Result<Vec<ContactRequest>, StoreError> {
		let filter = match status {
			Some(status) => doc! { "status": status },
			None => doc! {},
		};

		let options = FindOptions::builder()
			.sort(doc! { "created_at": -1 })
			.limit(clamp_limit(limit))
			.projection(doc! { "_id": 0 })
			.build();

		let requests = self.contact_requests().find(filter, options).await?.try_collect().await?;

		Ok(requests)
	}

	async fn healthy(&self) -> bool {
		if let Err(err) = self.database.run_command(doc! { "ping": 1 }, None).await {
			tracing::error!("database ping failed: {err}");
			return false;
		}

		true
	}

	async fn close(&self) {
		tracing::debug!("closing mongo client");
		self.client.clone().shutdown().await;
	}
}
