use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::error::{Result, RouteError};
use super::models::{ContactRequest, ContactRequestPayload, ContactResponse};
use super::validation::{parse_body, validate_contact_request};
use crate::database::{self, Store, StoreError, LIST_LIMIT};
use crate::global::Global;

pub const CONFIRMATION_MESSAGE: &str = "Votre demande a été envoyée avec succès. Nous vous recontacterons sous 24h.";
pub const SAVE_FAILED: &str = "Erreur lors de la sauvegarde";
pub const INTERNAL_ERROR: &str = "Une erreur interne s'est produite";
pub const FETCH_FAILED: &str = "Erreur lors de la récupération des données";

#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ListQuery {
	pub status: Option<String>,
}

#[tracing::instrument(name = "contact::create", skip_all)]
pub async fn create(
	State(global): State<Arc<Global>>,
	body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
	let payload: ContactRequestPayload = parse_body(body)?;
	let request = database::ContactRequest::new(validate_contact_request(&payload)?);

	global
		.store()
		.insert_contact_request(&request)
		.await
		.map_err(|err| match err {
			StoreError::NotInserted => RouteError::from((StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED, err)),
			err => RouteError::from((StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, err)),
		})?;

	tracing::info!(id = %request.id, "new contact request created");

	Ok(Json(ContactResponse {
		success: true,
		message: CONFIRMATION_MESSAGE.to_string(),
		id: request.id,
	}))
}

#[tracing::instrument(name = "contact::list", skip_all)]
pub async fn list(State(global): State<Arc<Global>>, Query(query): Query<ListQuery>) -> Result<Json<Vec<ContactRequest>>> {
	// An empty `?status=` lists everything.
	let status = query.status.as_deref().filter(|status| !status.is_empty());

	let requests = global
		.store()
		.list_contact_requests(status, LIST_LIMIT)
		.await
		.map_err(|err| RouteError::from((StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED, err)))?;

	Ok(Json(requests.into_iter().map(ContactRequest::from).collect()))
}
