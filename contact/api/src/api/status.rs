use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::error::{Result, ResultExt};
use super::models::{StatusCheck, StatusCheckPayload};
use super::validation::{parse_body, validate_status_check};
use crate::database::{self, Store, LIST_LIMIT};
use crate::global::Global;

#[tracing::instrument(name = "status::create", skip_all)]
pub async fn create(
	State(global): State<Arc<Global>>,
	body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusCheck>> {
	let payload: StatusCheckPayload = parse_body(body)?;
	let check = database::StatusCheck::new(validate_status_check(&payload)?);

	global
		.store()
		.insert_status_check(&check)
		.await
		.into_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))?;

	Ok(Json(check.into()))
}

#[tracing::instrument(name = "status::list", skip_all)]
pub async fn list(State(global): State<Arc<Global>>) -> Result<Json<Vec<StatusCheck>>> {
	let checks = global
		.store()
		.list_status_checks(LIST_LIMIT)
		.await
		.into_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))?;

	Ok(Json(checks.into_iter().map(StatusCheck::from).collect()))
}
