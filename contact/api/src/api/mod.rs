use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::context::Context;
use serde_json::json;
use tokio::net::{TcpListener, TcpSocket};

use self::cors::CorsPolicy;
use self::error::RouteError;
use crate::global::Global;

pub mod contact;
pub mod cors;
pub mod error;
pub mod models;
pub mod status;
pub mod validation;

pub fn routes(global: &Arc<Global>) -> Router {
	let config = &global.config().api;
	let prefix = config.prefix.as_str();
	let path = |route: &str| format!("{prefix}{route}");

	let mut router = Router::new()
		.route(&path("/"), get(root))
		.route(&path("/health"), get(health))
		.route(&path("/status"), get(status::list).post(status::create))
		.route(&path("/contact"), get(contact::list).post(contact::create));

	if !prefix.is_empty() {
		router = router.route(prefix, get(root));
	}

	router
		.fallback(not_found)
		.layer(axum::middleware::from_fn_with_state(
			Arc::new(CorsPolicy::new(&config.cors_origins)),
			cors::cors_middleware,
		))
		.with_state(global.clone())
}

async fn root() -> Json<serde_json::Value> {
	Json(json!({ "message": "Hello World" }))
}

async fn health(State(global): State<Arc<Global>>) -> Response {
	if global.healthy().await {
		(StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
	} else {
		(StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unhealthy" }))).into_response()
	}
}

async fn not_found() -> RouteError {
	RouteError::from((StatusCode::NOT_FOUND, "Not Found"))
}

/// Binds the configured address and serves until `ctx` is cancelled.
pub async fn run(global: Arc<Global>, ctx: Context) -> anyhow::Result<()> {
	let bind_address = global.config().api.bind_address;

	tracing::info!("api listening on {bind_address}");

	let listener = bind(bind_address).with_context(|| format!("failed to bind {bind_address}"))?;

	serve(global, listener, ctx).await
}

fn bind(address: SocketAddr) -> std::io::Result<TcpListener> {
	let socket = if address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(address)?;
	socket.listen(1024)
}

/// Serves on an already bound listener. In-flight requests finish before this returns.
pub async fn serve(global: Arc<Global>, listener: TcpListener, ctx: Context) -> anyhow::Result<()> {
	let router = routes(&global);
	let shutdown = ctx.clone();

	axum::serve(listener, router)
		.with_graceful_shutdown(async move { shutdown.done().await })
		.await
		.context("api server failed")?;

	tracing::info!("api stopped");

	drop(ctx);

	Ok(())
}
