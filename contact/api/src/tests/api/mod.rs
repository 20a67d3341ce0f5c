use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use common::context::Context;
use common::prelude::FutureTimeout;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use crate::api;
use crate::global::Global;
use crate::tests::global::{memory_config, mock_global_state};

mod contact;
mod validation;

pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
	let response = router.clone().oneshot(request).await.expect("router is infallible");

	let status = response.status();
	let headers = response.headers().clone();
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("failed to read body");

	let body = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
	};

	TestResponse { status, headers, body }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
	send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
	send(
		router,
		Request::builder()
			.method(Method::POST)
			.uri(uri)
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
	)
	.await
}

pub fn memory_router() -> (Arc<Global>, Router) {
	let global = mock_global_state(memory_config());
	let router = api::routes(&global);
	(global, router)
}

#[tokio::test]
async fn test_root() {
	let (_, router) = memory_router();

	let response = get(&router, "/api/").await;
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body, json!({ "message": "Hello World" }));

	let response = get(&router, "/api").await;
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body, json!({ "message": "Hello World" }));
}

#[tokio::test]
async fn test_not_found() {
	let (_, router) = memory_router();

	for uri in ["/", "/contact", "/api/unknown", "/api/contact/extra"] {
		let response = get(&router, uri).await;
		assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
		assert_eq!(response.body, json!({ "detail": "Not Found" }), "{uri}");
	}
}

#[tokio::test]
async fn test_method_not_allowed() {
	let (_, router) = memory_router();

	let response = send(
		&router,
		Request::builder()
			.method(Method::DELETE)
			.uri("/api/contact")
			.body(Body::empty())
			.unwrap(),
	)
	.await;

	assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_custom_prefix() {
	let mut config = memory_config();
	config.api.prefix = String::new();
	let global = mock_global_state(config);
	let router = api::routes(&global);

	assert_eq!(get(&router, "/").await.body, json!({ "message": "Hello World" }));
	assert_eq!(get(&router, "/contact").await.status, StatusCode::OK);
	assert_eq!(get(&router, "/api/contact").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
	let (global, router) = memory_router();

	let response = get(&router, "/api/health").await;
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body, json!({ "status": "ok" }));

	global.shutdown().await;

	let response = get(&router, "/api/health").await;
	assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(response.body, json!({ "status": "unhealthy" }));
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
	let (global, router) = memory_router();

	global.shutdown().await;
	global.shutdown().await;

	let response = get(&router, "/api/contact").await;
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_serve_graceful_shutdown() {
	let global = mock_global_state(memory_config());
	let (ctx, handler) = Context::new();

	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	let server = tokio::spawn(api::serve(global.clone(), listener, ctx));

	let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
	stream
		.write_all(b"GET /api/ HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
		.await
		.unwrap();

	let mut raw = String::new();
	stream.read_to_string(&mut raw).await.unwrap();

	assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
	assert!(raw.contains("Hello World"), "{raw}");

	handler
		.cancel()
		.timeout(Duration::from_secs(5))
		.await
		.expect("server did not shut down in time");

	server.await.unwrap().expect("server failed");
}

#[tokio::test]
async fn test_run_bad_bind() {
	let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();

	let mut config = memory_config();
	config.api.bind_address = occupied.local_addr().unwrap();
	let global = mock_global_state(config);

	let (ctx, handler) = Context::new();

	let result = api::run(global, ctx).timeout(Duration::from_secs(5)).await.expect("run should fail fast");
	assert!(result.is_err());

	handler.cancel().timeout(Duration::from_secs(1)).await.expect("context should be released");
}
