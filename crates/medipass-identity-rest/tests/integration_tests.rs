//! Integration tests for the REST identity store using wiremock.

use chrono::Utc;
use medipass_core::IdentityId;
use medipass_directory::{DirectoryError, IdentityStore, NewIdentity};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medipass_identity_rest::{RestIdentityConfig, RestIdentityStore};

const SERVICE_TOKEN: &str = "service-token-1";

async fn store(server: &MockServer) -> RestIdentityStore {
    RestIdentityStore::new(RestIdentityConfig::new(server.uri(), SERVICE_TOKEN)).unwrap()
}

fn identity_json(id: Uuid, address: &str) -> serde_json::Value {
    json!({
        "id": id,
        "address": address,
        "metadata": { "account_number": "MED001" },
        "created_at": Utc::now(),
    })
}

#[tokio::test]
async fn test_find_by_address_sends_service_token_and_filter() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/admin/identities"))
        .and(query_param("address", "med001@hospital.example.org"))
        .and(header("authorization", format!("Bearer {SERVICE_TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identities": [identity_json(id, "med001@hospital.example.org")]
        })))
        .mount(&server)
        .await;

    let found = store(&server)
        .await
        .find_by_address("med001@hospital.example.org")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, IdentityId::from_uuid(id));
    assert_eq!(found.metadata_account_number(), Some("MED001"));
}

#[tokio::test]
async fn test_find_by_address_empty_result_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/identities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "identities": [] })))
        .mount(&server)
        .await;

    let found = store(&server)
        .await
        .find_by_address("ghost@hospital.example.org")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_create_posts_address_and_secret() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/admin/identities"))
        .and(body_partial_json(json!({
            "address": "doc001@hospital.example.org",
            "secret": "doc-secret-1",
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(identity_json(id, "doc001@hospital.example.org")),
        )
        .mount(&server)
        .await;

    let created = store(&server)
        .await
        .create(NewIdentity {
            address: "doc001@hospital.example.org".to_string(),
            secret: "doc-secret-1".to_string(),
            metadata: serde_json::Map::new(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, IdentityId::from_uuid(id));
}

#[tokio::test]
async fn test_create_conflict_maps_to_address_in_use() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/identities"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = store(&server)
        .await
        .create(NewIdentity {
            address: "doc001@hospital.example.org".to_string(),
            secret: "doc-secret-1".to_string(),
            metadata: serde_json::Map::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::AddressInUse { .. }));
}

#[tokio::test]
async fn test_rotate_secret_hits_secret_endpoint() {
    let server = MockServer::start().await;
    let id = IdentityId::new();

    Mock::given(method("PUT"))
        .and(path(format!("/admin/identities/{id}/secret")))
        .and(body_partial_json(json!({ "secret": "new-secret-1" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .await
        .rotate_secret(id, "new-secret-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_identity_is_not_found() {
    let server = MockServer::start().await;
    let id = IdentityId::new();

    Mock::given(method("DELETE"))
        .and(path(format!("/admin/identities/{id}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store(&server).await.delete(id).await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_resolve_bearer_forwards_user_token() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/identities/me"))
        .and(header("authorization", "Bearer user-token-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(identity_json(id, "staff@hospital.example.org")),
        )
        .mount(&server)
        .await;

    let resolved = store(&server)
        .await
        .resolve_bearer("user-token-1")
        .await
        .unwrap();
    assert_eq!(resolved.id, IdentityId::from_uuid(id));
}

#[tokio::test]
async fn test_resolve_bearer_unauthorized_is_invalid_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/identities/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = store(&server)
        .await
        .resolve_bearer("expired")
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidToken));
}

#[tokio::test]
async fn test_mint_recovery_round_trip() {
    let server = MockServer::start().await;
    let id = IdentityId::new();

    Mock::given(method("POST"))
        .and(path("/admin/recovery"))
        .and(body_partial_json(json!({
            "identity_id": id.as_uuid(),
            "redirect_to": "https://portal/reset",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identity_id": id.as_uuid(),
            "action_link": "https://idp/recover?code=abc",
            "expires_at": Utc::now(),
        })))
        .mount(&server)
        .await;

    let artifact = store(&server)
        .await
        .mint_recovery(id, "https://portal/reset")
        .await
        .unwrap();
    assert_eq!(artifact.identity_id, id);
    assert!(artifact.action_link.contains("code=abc"));
}

#[tokio::test]
async fn test_server_error_passes_message_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/identities"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&server)
        .await;

    let err = store(&server).await.list().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("maintenance window"), "{message}");
}
