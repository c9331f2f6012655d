use super::*;
use serde_json::json;

// =============================================================================
// parse_auth_response
// =============================================================================

#[test]
fn parse_falls_back_to_underscore_id() {
    let body = json!({
        "token": "t1",
        "user": { "_id": "u1", "email": "a@b.com", "name": "A", "role": "admin" }
    })
    .to_string();
    let (credential, identity) = parse_auth_response(&body).unwrap();
    assert_eq!(credential.expose(), "t1");
    assert_eq!(
        identity,
        Identity { id: "u1".into(), email: "a@b.com".into(), name: "A".into(), role: Role::Admin }
    );
}

#[test]
fn parse_id_wins_over_underscore_id() {
    let body = json!({
        "token": "t1",
        "user": { "id": "canonical", "_id": "legacy", "email": "a@b.com", "name": "A" }
    })
    .to_string();
    let (_, identity) = parse_auth_response(&body).unwrap();
    assert_eq!(identity.id, "canonical");
}

#[test]
fn parse_numeric_id_is_stringified() {
    let body = json!({ "token": "t1", "user": { "id": 42, "email": "a@b.com" } }).to_string();
    let (_, identity) = parse_auth_response(&body).unwrap();
    assert_eq!(identity.id, "42");
    assert_eq!(identity.name, "");
}

#[test]
fn parse_missing_role_defaults_to_user() {
    let body = json!({ "token": "t1", "user": { "id": "u1", "email": "a@b.com", "name": "A" } }).to_string();
    let (_, identity) = parse_auth_response(&body).unwrap();
    assert_eq!(identity.role, Role::User);
}

#[test]
fn parse_rejects_missing_token() {
    let body = json!({ "user": { "id": "u1" } }).to_string();
    assert!(matches!(parse_auth_response(&body), Err(SessionError::InvalidResponse(_))));
}

#[test]
fn parse_rejects_empty_token() {
    let body = json!({ "token": "", "user": { "id": "u1" } }).to_string();
    assert!(matches!(parse_auth_response(&body), Err(SessionError::InvalidResponse(_))));
}

#[test]
fn parse_rejects_missing_user() {
    let body = json!({ "token": "t1" }).to_string();
    assert!(matches!(parse_auth_response(&body), Err(SessionError::InvalidResponse(_))));
}

#[test]
fn parse_rejects_user_without_any_id() {
    let body = json!({ "token": "t1", "user": { "id": null, "email": "a@b.com" } }).to_string();
    let err = parse_auth_response(&body).unwrap_err();
    assert!(err.to_string().contains("no id"));
}

#[test]
fn parse_rejects_non_json() {
    assert!(matches!(parse_auth_response("<html>"), Err(SessionError::InvalidResponse(_))));
}

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_from_wire_known_values() {
    assert_eq!(Role::from_wire(Some("admin")), Role::Admin);
    assert_eq!(Role::from_wire(Some("Coach")), Role::Coach);
    assert_eq!(Role::from_wire(Some(" athlete ")), Role::Athlete);
    assert_eq!(Role::from_wire(Some("user")), Role::User);
}

#[test]
fn role_from_wire_unknown_is_user() {
    assert_eq!(Role::from_wire(Some("superuser")), Role::User);
    assert_eq!(Role::from_wire(None), Role::User);
}

#[test]
fn identity_persisted_layout() {
    let identity = Identity { id: "u1".into(), email: "a@b.com".into(), name: "A".into(), role: Role::Coach };
    let value = serde_json::to_value(&identity).unwrap();
    assert_eq!(value, json!({ "id": "u1", "email": "a@b.com", "name": "A", "role": "coach" }));
}

// =============================================================================
// rejection_message
// =============================================================================

#[test]
fn rejection_message_from_json_message() {
    assert_eq!(rejection_message(r#"{"message":"Invalid credentials"}"#), "Invalid credentials");
}

#[test]
fn rejection_message_from_json_error() {
    assert_eq!(rejection_message(r#"{"error":"Email taken"}"#), "Email taken");
}

#[test]
fn rejection_message_plain_text_and_empty() {
    assert_eq!(rejection_message(" nope \n"), "nope");
    assert_eq!(rejection_message(""), "credentials rejected");
}

// =============================================================================
// state
// =============================================================================

#[test]
fn credential_debug_is_redacted() {
    let credential = Credential::new("secret-token");
    assert!(!format!("{credential:?}").contains("secret"));
}

#[test]
fn state_status_mapping() {
    assert_eq!(SessionState::default().status(), SessionStatus::Uninitialized);
    assert!(SessionStatus::Restoring.is_loading());
    assert!(!SessionStatus::Anonymous.is_loading());

    let state = SessionState::Authenticated {
        credential: Credential::new("t1"),
        identity: Identity { id: "u1".into(), email: String::new(), name: String::new(), role: Role::User },
    };
    let snapshot = state.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert_eq!(snapshot.identity.unwrap().id, "u1");
}
