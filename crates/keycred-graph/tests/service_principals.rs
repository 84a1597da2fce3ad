//! Upload flow against a mocked Graph endpoint.

use chrono::{TimeZone, Utc};
use keycred_core::{
    CredentialPayload, KeyCredError, KeyCredential, KeyCredentialType, PasswordCredential,
    UploadError, UploadErrorKind,
};
use keycred_graph::GraphClient;
use secrecy::SecretString;
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SP_ID: &str = "6b9f3a1e-0000-4000-8000-000000000001";
const CKI: &str = "P+SSQxGHC99J89p2HBdvdLMC6pSN9qFQcEYCNndSXxg=";

fn payload() -> CredentialPayload {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let sign_id = Uuid::new_v4();
    let entry = |key_id, credential_type: KeyCredentialType, key: &str| KeyCredential {
        custom_key_identifier: CKI.into(),
        end_date_time: end,
        key_id,
        start_date_time: start,
        credential_type,
        usage: credential_type.usage(),
        key: key.into(),
        display_name: "CN=claims-app".into(),
    };
    CredentialPayload::new(
        entry(sign_id, KeyCredentialType::X509CertAndPassword, "cGZ4"),
        entry(Uuid::new_v4(), KeyCredentialType::AsymmetricX509Cert, "Y2Vy"),
        PasswordCredential {
            custom_key_identifier: CKI.into(),
            key_id: sign_id,
            end_date_time: end,
            start_date_time: start,
            secret_text: SecretString::from("pfx-pass".to_string()),
        },
    )
}

fn client(server: &MockServer) -> GraphClient {
    GraphClient::builder(SecretString::from("test-token".to_string()))
        .base_url(server.uri())
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

fn service_principal(with_key: bool) -> serde_json::Value {
    let keys = if with_key {
        json!([{
            "customKeyIdentifier": CKI,
            "keyId": "4c2f0000-0000-4000-8000-000000000004",
            "type": "X509CertAndPassword",
            "usage": "Sign",
            "startDateTime": "2024-01-01T00:00:00Z",
            "endDateTime": "2025-01-01T00:00:00Z"
        }])
    } else {
        json!([])
    };
    json!({
        "id": SP_ID,
        "appId": "2f1c0c6e-0000-4000-8000-000000000002",
        "displayName": "claims-app",
        "keyCredentials": keys,
        "passwordCredentials": []
    })
}

#[tokio::test]
async fn patch_204_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/servicePrincipals/{SP_ID}")))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "passwordCredentials": [{"customKeyIdentifier": CKI, "secretText": "pfx-pass"}]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .service_principals()
        .update_key_credentials(SP_ID, &payload())
        .await;
    assert_ok!(result);
}

#[tokio::test]
async fn patch_403_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/servicePrincipals/{SP_ID}")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": "Authorization_RequestDenied",
                "message": "Insufficient privileges to complete the operation."
            }
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .service_principals()
        .update_key_credentials(SP_ID, &payload())
        .await;
    let err = assert_err!(result);

    match err {
        KeyCredError::Upload(UploadError::Http4xx { status, code, message }) => {
            assert_eq!(status, 403);
            assert_eq!(code.as_deref(), Some("Authorization_RequestDenied"));
            assert_eq!(message, "Insufficient privileges to complete the operation.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn patch_500_is_http5xx() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .service_principals()
        .update_key_credentials(SP_ID, &payload())
        .await
        .unwrap_err();
    let upload = err.as_upload().unwrap();
    assert_eq!(upload.kind(), UploadErrorKind::Http5xx);
    assert_eq!(upload.server_message(), Some("Service Unavailable"));
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = client(&server)
        .service_principals()
        .update_key_credentials(SP_ID, &payload())
        .await
        .unwrap_err();
    let upload = err.as_upload().unwrap();
    assert_eq!(upload.kind(), UploadErrorKind::Timeout);
    assert!(upload.outcome_unknown());
}

#[tokio::test]
async fn preflight_failure_sends_no_patch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/servicePrincipals/{SP_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "Request_ResourceNotFound", "message": "Resource does not exist."}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .service_principals()
        .upload_credentials(SP_ID, &payload())
        .await
        .unwrap_err();
    assert_eq!(err.as_upload().and_then(UploadError::status_code), Some(404));
}

#[tokio::test]
async fn upload_confirms_new_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/servicePrincipals/{SP_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_principal(false)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/servicePrincipals/{SP_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/servicePrincipals/{SP_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_principal(true)))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server)
        .service_principals()
        .upload_credentials(SP_ID, &payload())
        .await
        .unwrap();

    assert!(report.before.key_credentials.is_empty());
    assert!(report.confirmed);
    assert_eq!(report.custom_key_identifier, CKI);
    assert!(report.confirmation_error.is_none());
}

#[tokio::test]
async fn failed_confirmation_is_reported_not_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_principal(false)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let report = client(&server)
        .service_principals()
        .upload_credentials(SP_ID, &payload())
        .await
        .unwrap();
    assert!(!report.confirmed);
    assert!(report.after.is_none());
    assert!(report.confirmation_error.unwrap().contains("502"));
}
