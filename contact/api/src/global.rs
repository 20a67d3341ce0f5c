use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{build_store, AnyStore, Store};

pub struct Global {
	config: AppConfig,
	store: AnyStore,
	closed: AtomicBool,
}

impl Global {
	pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
		tracing::debug!(kind = ?config.database.kind, "setting up store");

		let store = build_store(&config.database).await.context("store")?;

		tracing::info!(store = %store.name(), "store ready");

		Ok(Self::with_store(config, store))
	}

	pub fn with_store(config: AppConfig, store: AnyStore) -> Self {
		Self {
			config,
			store,
			closed: AtomicBool::new(false),
		}
	}

	pub fn config(&self) -> &AppConfig {
		&self.config
	}

	pub fn store(&self) -> &AnyStore {
		&self.store
	}

	pub async fn healthy(&self) -> bool {
		!self.closed.load(Ordering::Acquire) && self.store.healthy().await
	}

	/// Closes the store. Only the first call does anything.
	pub async fn shutdown(&self) {
		if self.closed.swap(true, Ordering::AcqRel) {
			return;
		}

		tracing::info!(store = %self.store.name(), "closing store");
		self.store.close().await;
	}
}
