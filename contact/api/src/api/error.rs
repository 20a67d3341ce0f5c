use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::panic::Location;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::validation::{FieldError, ValidationErrors};

pub type Result<T, E = RouteError> = std::result::Result<T, E>;

/// What ends up under `detail` in an error body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Detail {
	Message(Cow<'static, str>),
	Fields(Vec<FieldError>),
}

pub struct RouteError {
	source: Option<anyhow::Error>,
	location: &'static Location<'static>,
	span: tracing::Span,
	status: StatusCode,
	detail: Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldLog {
	Yes,
	Debug,
	No,
}

impl RouteError {
	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn detail(&self) -> &Detail {
		&self.detail
	}

	pub fn should_log(&self) -> ShouldLog {
		if self.status.is_server_error() {
			ShouldLog::Yes
		} else if self.source.is_some() || matches!(self.detail, Detail::Fields(_)) {
			ShouldLog::Debug
		} else {
			ShouldLog::No
		}
	}

	fn with_source(self, source: Option<anyhow::Error>) -> Self {
		Self { source, ..self }
	}

	fn with_location(self, location: &'static Location<'static>) -> Self {
		Self { location, ..self }
	}

	#[track_caller]
	fn new(status: StatusCode, detail: Detail) -> Self {
		Self {
			source: None,
			location: Location::caller(),
			span: tracing::Span::current(),
			status,
			detail,
		}
	}
}

impl From<(StatusCode, &'static str)> for RouteError {
	#[track_caller]
	fn from((status, message): (StatusCode, &'static str)) -> Self {
		Self::new(status, Detail::Message(Cow::Borrowed(message)))
	}
}

impl<T> From<(StatusCode, &'static str, T)> for RouteError
where
	T: Into<anyhow::Error>,
{
	#[track_caller]
	fn from((status, message, source): (StatusCode, &'static str, T)) -> Self {
		Self::new(status, Detail::Message(Cow::Borrowed(message))).with_source(Some(source.into()))
	}
}

impl From<&'static str> for RouteError {
	#[track_caller]
	fn from(message: &'static str) -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR, Detail::Message(Cow::Borrowed(message)))
	}
}

impl From<ValidationErrors> for RouteError {
	#[track_caller]
	fn from(errors: ValidationErrors) -> Self {
		Self::new(StatusCode::UNPROCESSABLE_ENTITY, Detail::Fields(errors.into_errors()))
	}
}

impl Debug for RouteError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError: {:?}", err),
			None => write!(f, "RouteError: Unknown Source"),
		}
	}
}

impl Display for RouteError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError: {}", err),
			None => write!(f, "RouteError: Unknown Source"),
		}
	}
}

impl std::error::Error for RouteError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match &self.source {
			Some(err) => Some(err.as_ref()),
			None => None,
		}
	}
}

impl IntoResponse for RouteError {
	fn into_response(self) -> Response {
		let _enter = self.span.enter();
		match self.should_log() {
			ShouldLog::Yes => {
				tracing::error!(path = %self.location, status = self.status.as_u16(), error = ?self.source, "http error")
			}
			ShouldLog::Debug => {
				tracing::debug!(path = %self.location, status = self.status.as_u16(), error = ?self.source, detail = ?self.detail, "http error")
			}
			ShouldLog::No => (),
		}

		(self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
	}
}

pub trait ResultExt<T, E>: Sized {
	fn into_err_route<C>(self, ctx: C) -> Result<T>
	where
		RouteError: From<C>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
	anyhow::Error: From<E>,
{
	#[track_caller]
	fn into_err_route<C>(self, ctx: C) -> Result<T>
	where
		RouteError: From<C>,
	{
		match self {
			Ok(val) => Ok(val),
			Err(err) => Err(RouteError::from(ctx)
				.with_source(Some(err.into()))
				.with_location(Location::caller())),
		}
	}
}
