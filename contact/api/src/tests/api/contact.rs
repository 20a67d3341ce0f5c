use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};

use super::{get, memory_router, post_json, send};
use crate::api;
use crate::api::contact::{CONFIRMATION_MESSAGE, FETCH_FAILED, INTERNAL_ERROR, SAVE_FAILED};
use crate::api::models::{ContactRequest, ContactResponse};
use crate::database::{self, NewContactRequest, Store};
use crate::tests::global::{memory_config, mock_global_state};

fn marie_dubois() -> Value {
	json!({
		"name": "Marie Dubois",
		"email": "marie.dubois@email.com",
		"phone": "06 12 34 56 78",
		"subject": "Désinfection après sinistre",
		"message": "Dégât des eaux dans la cuisine, besoin d'une intervention rapide.",
		"hasPets": true,
		"hasVulnerablePeople": false,
	})
}

fn detail_fields(body: &Value) -> Vec<String> {
	body["detail"]
		.as_array()
		.expect("detail should be a list")
		.iter()
		.map(|error| error["loc"][1].as_str().expect("loc should name a field").to_string())
		.collect()
}

#[tokio::test]
async fn test_create_contact_request() {
	let (_, router) = memory_router();

	let before = Utc::now() - Duration::seconds(1);
	let response = post_json(&router, "/api/contact", &marie_dubois()).await;
	assert_eq!(response.status, StatusCode::OK, "{}", response.body);

	let created: ContactResponse = serde_json::from_value(response.body).unwrap();
	assert!(created.success);
	assert_eq!(created.message, CONFIRMATION_MESSAGE);
	assert!(uuid::Uuid::parse_str(&created.id).is_ok());

	let response = get(&router, "/api/contact").await;
	assert_eq!(response.status, StatusCode::OK);

	let listed: Vec<ContactRequest> = serde_json::from_value(response.body.clone()).unwrap();
	assert_eq!(listed.len(), 1);

	let stored = &listed[0];
	assert_eq!(stored.id, created.id);
	assert_eq!(stored.name, "Marie Dubois");
	assert_eq!(stored.email, "marie.dubois@email.com");
	assert_eq!(stored.phone, "06 12 34 56 78");
	assert_eq!(stored.subject, "Désinfection après sinistre");
	assert!(stored.has_pets);
	assert!(!stored.has_vulnerable_people);
	assert_eq!(stored.status, "nouveau");
	assert!(stored.created_at >= before && stored.created_at <= Utc::now());

	// Listings use the stored snake_case names and never leak the mongo id.
	let raw = &response.body[0];
	assert!(raw.get("has_pets").is_some());
	assert!(raw.get("hasPets").is_none());
	assert!(raw.get("_id").is_none());
}

#[tokio::test]
async fn test_create_contact_request_defaults() {
	let (_, router) = memory_router();

	let mut body = marie_dubois();
	body.as_object_mut().unwrap().remove("hasPets");
	body.as_object_mut().unwrap().remove("hasVulnerablePeople");

	let response = post_json(&router, "/api/contact", &body).await;
	assert_eq!(response.status, StatusCode::OK, "{}", response.body);

	let listed: Vec<ContactRequest> = serde_json::from_value(get(&router, "/api/contact").await.body).unwrap();
	assert!(!listed[0].has_pets);
	assert!(!listed[0].has_vulnerable_people);
}

#[tokio::test]
async fn test_create_contact_request_ignores_client_fields() {
	let (_, router) = memory_router();

	let mut body = marie_dubois();
	let object = body.as_object_mut().unwrap();
	object.insert("id".to_string(), json!("chosen-by-client"));
	object.insert("status".to_string(), json!("traité"));
	object.insert("created_at".to_string(), json!("2001-01-01T00:00:00Z"));

	let response = post_json(&router, "/api/contact", &body).await;
	assert_eq!(response.status, StatusCode::OK);
	assert_ne!(response.body["id"], json!("chosen-by-client"));

	let listed: Vec<ContactRequest> = serde_json::from_value(get(&router, "/api/contact").await.body).unwrap();
	assert_eq!(listed[0].status, "nouveau");
	assert!(listed[0].created_at.timestamp() > 978_307_200);
}

#[tokio::test]
async fn test_create_contact_request_invalid_email() {
	let (global, router) = memory_router();

	let mut body = marie_dubois();
	body["email"] = json!("invalid-email");

	let response = post_json(&router, "/api/contact", &body).await;
	assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(
		response.body,
		json!({
			"detail": [{
				"loc": ["body", "email"],
				"msg": "value is not a valid email address",
				"type": "value_error.email",
			}]
		})
	);

	assert!(global.store().list_contact_requests(None, 1000).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_contact_request_missing_fields() {
	let (global, router) = memory_router();

	let response = post_json(&router, "/api/contact", &json!({ "name": "Marie Dubois" })).await;
	assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(detail_fields(&response.body), vec!["email", "phone", "subject", "message"]);
	assert!(response.body["detail"]
		.as_array()
		.unwrap()
		.iter()
		.all(|error| error["type"] == "value_error.missing"));

	assert!(global.store().list_contact_requests(None, 1000).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_contact_request_wrong_types() {
	let (_, router) = memory_router();

	let mut body = marie_dubois();
	body["name"] = json!("   ");
	body["phone"] = json!(612345678);
	body["hasPets"] = json!("yes");
	body["hasVulnerablePeople"] = json!(1);

	let response = post_json(&router, "/api/contact", &body).await;
	assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(
		detail_fields(&response.body),
		vec!["name", "phone", "hasPets", "hasVulnerablePeople"]
	);

	let kinds = response.body["detail"]
		.as_array()
		.unwrap()
		.iter()
		.map(|error| error["type"].as_str().unwrap().to_string())
		.collect::<Vec<_>>();
	assert_eq!(
		kinds,
		vec![
			"value_error.any_str.min_length",
			"type_error.str",
			"type_error.bool",
			"type_error.bool"
		]
	);
}

#[tokio::test]
async fn test_create_contact_request_null_flag_defaults() {
	let (_, router) = memory_router();

	let mut body = marie_dubois();
	body["hasPets"] = Value::Null;

	let response = post_json(&router, "/api/contact", &body).await;
	assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_contact_request_malformed_body() {
	let (_, router) = memory_router();

	for body in ["{\"name\": ", "[1, 2, 3]", "\"text\""] {
		let response = send(
			&router,
			Request::builder()
				.method(Method::POST)
				.uri("/api/contact")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(body))
				.unwrap(),
		)
		.await;

		assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
		assert_eq!(response.body["detail"][0]["loc"], json!(["body"]), "{body}");
	}

	let response = send(
		&router,
		Request::builder()
			.method(Method::POST)
			.uri("/api/contact")
			.body(Body::from(marie_dubois().to_string()))
			.unwrap(),
	)
	.await;
	assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_contact_request_positional_array() {
	let (global, router) = memory_router();

	let body = json!([
		"Marie Dubois",
		"marie.dubois@email.com",
		"06 12 34 56 78",
		"Devis",
		"Bonjour",
		true,
		false,
	]);

	let response = post_json(&router, "/api/contact", &body).await;
	assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(
		response.body,
		json!({
			"detail": [{
				"loc": ["body"],
				"msg": "value is not a valid dict",
				"type": "type_error.dict",
			}]
		})
	);

	assert!(global.store().list_contact_requests(None, 1000).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_contact_requests_sorted_and_filtered() {
	let (global, router) = memory_router();

	let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
	for (idx, (name, status)) in [("a", "nouveau"), ("b", "en_cours"), ("c", "nouveau"), ("d", "traité")]
		.into_iter()
		.enumerate()
	{
		let mut request = database::ContactRequest::new(NewContactRequest {
			name: name.to_string(),
			email: format!("{name}@hygitech-3d.fr"),
			phone: "0600000000".to_string(),
			subject: "Nuisibles".to_string(),
			message: "Bonjour".to_string(),
			has_pets: false,
			has_vulnerable_people: false,
		});
		request.status = status.to_string();
		request.created_at = base + Duration::minutes(idx as i64);
		global.store().insert_contact_request(&request).await.unwrap();
	}

	let names = |body: Value| {
		serde_json::from_value::<Vec<ContactRequest>>(body)
			.unwrap()
			.into_iter()
			.map(|request| request.name)
			.collect::<Vec<_>>()
	};

	assert_eq!(names(get(&router, "/api/contact").await.body), vec!["d", "c", "b", "a"]);
	assert_eq!(names(get(&router, "/api/contact?status=nouveau").await.body), vec!["c", "a"]);
	assert_eq!(names(get(&router, "/api/contact?status=").await.body), vec!["d", "c", "b", "a"]);
	assert!(names(get(&router, "/api/contact?status=archiv%C3%A9").await.body).is_empty());
	assert_eq!(names(get(&router, "/api/contact?status=trait%C3%A9").await.body), vec!["d"]);
}

#[tokio::test]
async fn test_list_contact_requests_through_api_newest_first() {
	let (_, router) = memory_router();

	let mut ids = Vec::new();
	for _ in 0..3 {
		let response = post_json(&router, "/api/contact", &marie_dubois()).await;
		ids.push(response.body["id"].as_str().unwrap().to_string());
		// Timestamps are kept at millisecond precision.
		tokio::time::sleep(std::time::Duration::from_millis(5)).await;
	}

	let listed: Vec<ContactRequest> = serde_json::from_value(get(&router, "/api/contact").await.body).unwrap();
	ids.reverse();
	assert_eq!(listed.into_iter().map(|r| r.id).collect::<Vec<_>>(), ids);
}

#[tokio::test]
async fn test_list_contact_requests_capped() {
	let (global, router) = memory_router();

	for idx in 0..1005 {
		let mut request = database::ContactRequest::new(NewContactRequest {
			name: format!("client {idx}"),
			email: "client@hygitech-3d.fr".to_string(),
			phone: "0600000000".to_string(),
			subject: "Dératisation".to_string(),
			message: "Bonjour".to_string(),
			has_pets: false,
			has_vulnerable_people: false,
		});
		request.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(idx);
		global.store().insert_contact_request(&request).await.unwrap();
	}

	let listed: Vec<ContactRequest> = serde_json::from_value(get(&router, "/api/contact").await.body).unwrap();
	assert_eq!(listed.len(), 1000);
	assert_eq!(listed[0].name, "client 1004");
}

#[tokio::test]
async fn test_create_contact_request_store_failure() {
	let mut config = memory_config();
	config.database.memory_capacity = Some(0);
	let global = mock_global_state(config);
	let router = api::routes(&global);

	let response = post_json(&router, "/api/contact", &marie_dubois()).await;
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(response.body, json!({ "detail": INTERNAL_ERROR }));
}

#[tokio::test]
async fn test_create_contact_request_not_inserted() {
	let mut config = memory_config();
	config.database.memory_acknowledge_writes = false;
	let global = mock_global_state(config);
	let router = api::routes(&global);

	let response = post_json(&router, "/api/contact", &marie_dubois()).await;
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(response.body, json!({ "detail": SAVE_FAILED }));

	assert!(global.store().list_contact_requests(None, 1000).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_contact_requests_store_failure() {
	let (global, router) = memory_router();
	global.store().close().await;

	let response = get(&router, "/api/contact").await;
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(response.body, json!({ "detail": FETCH_FAILED }));
}
