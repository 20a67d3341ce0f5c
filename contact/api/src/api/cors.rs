use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOW_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const MAX_AGE: &str = "600";

/// Which origins may call the API from a browser.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
	any: bool,
	origins: Vec<HeaderValue>,
}

impl CorsPolicy {
	pub fn new(origins: &[String]) -> Self {
		Self {
			any: origins.iter().any(|origin| origin == "*"),
			origins: origins
				.iter()
				.filter(|origin| origin.as_str() != "*")
				.filter_map(|origin| match HeaderValue::from_str(origin) {
					Ok(value) => Some(value),
					Err(err) => {
						tracing::warn!(%origin, "ignoring invalid cors origin: {err}");
						None
					}
				})
				.collect(),
		}
	}

	/// The `Access-Control-Allow-Origin` value for a request, if it is allowed at all.
	fn allow_origin(&self, origin: Option<&HeaderValue>) -> Option<HeaderValue> {
		if self.any {
			return Some(HeaderValue::from_static("*"));
		}

		origin.filter(|origin| self.origins.contains(origin)).cloned()
	}

	fn apply(&self, headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
		let Some(allowed) = self.allow_origin(origin) else {
			return;
		};

		if !self.any {
			headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
			headers.append(header::VARY, HeaderValue::from_static("Origin"));
		}

		headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed);
	}
}

pub async fn cors_middleware(State(policy): State<Arc<CorsPolicy>>, request: Request, next: Next) -> Response {
	let origin = request.headers().get(header::ORIGIN).cloned();

	let preflight =
		request.method() == Method::OPTIONS && request.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

	if preflight {
		if origin.is_some() && policy.allow_origin(origin.as_ref()).is_none() {
			return (StatusCode::BAD_REQUEST, "Disallowed CORS origin").into_response();
		}

		let mut response = StatusCode::OK.into_response();
		let headers = response.headers_mut();
		policy.apply(headers, origin.as_ref());
		headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
		headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));

		if let Some(requested) = request.headers().get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
			headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
		}

		return response;
	}

	let mut response = next.run(request).await;
	policy.apply(response.headers_mut(), origin.as_ref());
	response
}
