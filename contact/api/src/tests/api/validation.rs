use serde_json::{json, Value};

use crate::api::models::{ContactRequestPayload, StatusCheckPayload};
use crate::api::validation::{
	is_valid_email, parse_body, validate_contact_request, validate_status_check, FragmentBuf, ValidationErrors,
};

fn payload(value: Value) -> ContactRequestPayload {
	serde_json::from_value(value).expect("payload should deserialize")
}

#[test]
fn test_fragment_paths() {
	let mut fragment = FragmentBuf::new();

	{
		let field = fragment.push("email");
		assert_eq!(field.loc(), vec![json!("body"), json!("email")]);
	}

	let field = fragment.push("phone");
	assert_eq!(field.loc(), vec![json!("body"), json!("phone")]);
}

#[test]
fn test_validate_contact_request_maps_fields() {
	let request = validate_contact_request(&payload(json!({
		"name": "Marie Dubois",
		"email": "marie.dubois@email.com",
		"phone": "06 12 34 56 78",
		"subject": "Punaises de lit",
		"message": "Bonjour",
		"hasVulnerablePeople": true,
	})))
	.expect("payload should be valid");

	assert_eq!(request.name, "Marie Dubois");
	assert_eq!(request.email, "marie.dubois@email.com");
	assert!(!request.has_pets);
	assert!(request.has_vulnerable_people);
}

#[test]
fn test_validate_contact_request_keeps_whitespace() {
	let request = validate_contact_request(&payload(json!({
		"name": " Marie ",
		"email": "marie@hygitech-3d.fr",
		"phone": "0612345678",
		"subject": "Sujet",
		"message": "  Texte  ",
	})))
	.expect("payload should be valid");

	assert_eq!(request.name, " Marie ");
	assert_eq!(request.message, "  Texte  ");
}

#[test]
fn test_validate_contact_request_collects_all_errors() {
	let errors = validate_contact_request(&ContactRequestPayload::default()).unwrap_err();

	assert_eq!(errors.errors().len(), 5);
	assert_eq!(
		errors.to_string(),
		"body.name: field required; body.email: field required; body.phone: field required; body.subject: field \
		 required; body.message: field required"
	);
}

#[test]
fn test_validate_email() {
	for email in [
		"invalid-email",
		"@hygitech-3d.fr",
		"marie@",
		"marie dubois@email.com",
		"marie@localhost",
		"marie@[127.0.0.1]",
		"\"marie dubois\"@email.com",
		"Marie Dubois <marie@email.com>",
	] {
		let errors = validate_contact_request(&payload(json!({
			"name": "Marie",
			"email": email,
			"phone": "0612345678",
			"subject": "Sujet",
			"message": "Texte",
		})))
		.unwrap_err();

		assert_eq!(errors.errors().len(), 1, "{email}");
		assert_eq!(errors.errors()[0].kind, "value_error.email", "{email}");
	}
}

#[test]
fn test_validate_status_check() {
	let name = validate_status_check(&StatusCheckPayload {
		client_name: Some(json!("smoke")),
	})
	.unwrap();
	assert_eq!(name, "smoke");

	let errors: ValidationErrors = validate_status_check(&StatusCheckPayload {
		client_name: Some(json!(["smoke"])),
	})
	.unwrap_err();
	assert_eq!(errors.errors()[0].loc, vec![json!("body"), json!("client_name")]);
	assert_eq!(errors.errors()[0].kind, "type_error.str");
}

#[test]
fn test_is_valid_email() {
	for email in ["marie.dubois@email.com", "contact+devis@hygitech-3d.fr", "m@sub.domaine.fr"] {
		assert!(is_valid_email(email), "{email}");
	}

	for email in ["marie@localhost", "marie@[127.0.0.1]", "\"marie\"@email.com"] {
		assert!(!is_valid_email(email), "{email}");
	}
}

#[test]
fn test_parse_body_requires_object() {
	let payload: StatusCheckPayload = parse_body(Ok(axum::Json(json!({ "client_name": "smoke" })))).unwrap();
	assert_eq!(payload.client_name, Some(json!("smoke")));

	for body in [json!(["smoke"]), json!(1), json!(true)] {
		let errors = parse_body::<ContactRequestPayload>(Ok(axum::Json(body.clone()))).unwrap_err();
		assert_eq!(errors.errors().len(), 1, "{body}");
		assert_eq!(errors.errors()[0].loc, vec![json!("body")], "{body}");
		assert_eq!(errors.errors()[0].kind, "type_error.dict", "{body}");
	}
}
