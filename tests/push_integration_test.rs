use anyhow::Result;
use chrono::Utc;
use httpmock::prelude::*;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use timetable_admin::adapters::firebase::auth::{AssertionClaims, MESSAGING_SCOPE};
use timetable_admin::adapters::firebase::{
    FcmGateway, RealtimeDbDirectory, ServiceAccountAuth, ServiceAccountKey,
};
use timetable_admin::domain::model::{LeaveBalance, LeaveStatus, LeaveUpdate, PushNotification};
use timetable_admin::domain::ports::{PushGateway, RealtimeDirectory};
use timetable_admin::utils::keys::firebase_key_from_email;
use timetable_admin::{AppConfig, Backend, LeaveNotifier};

const PRIVATE_KEY: &str = include_str!("fixtures/test_private_key.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/test_public_key.pem");

fn service_account(server: &MockServer) -> ServiceAccountKey {
    ServiceAccountKey {
        client_email: "notifier@campus-app.iam.gserviceaccount.com".to_string(),
        private_key: PRIVATE_KEY.to_string(),
        private_key_id: Some("key-1".to_string()),
        project_id: "campus-app".to_string(),
        token_uri: server.url("/token"),
    }
}

fn auth(server: &MockServer) -> Arc<ServiceAccountAuth> {
    Arc::new(ServiceAccountAuth::new(
        service_account(server),
        &[MESSAGING_SCOPE],
        reqwest::Client::new(),
    ))
}

fn notification() -> PushNotification {
    PushNotification {
        title: "Leave Approved".to_string(),
        body: "Your casual leave has been approved.".to_string(),
        data: HashMap::from([("type".to_string(), "leave_update".to_string())]),
    }
}

fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
            .body_contains("assertion=");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "access_token": "ya29.test-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            }));
    })
}

#[test]
fn test_assertion_is_rs256_signed_for_token_endpoint() -> Result<()> {
    let server = MockServer::start();
    let auth = auth(&server);

    let assertion = auth.build_assertion(Utc::now())?;

    let header = decode_header(&assertion)?;
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("key-1"));

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[server.url("/token")]);
    let claims = decode::<AssertionClaims>(
        &assertion,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes())?,
        &validation,
    )?
    .claims;

    assert_eq!(claims.iss, "notifier@campus-app.iam.gserviceaccount.com");
    assert_eq!(claims.scope, MESSAGING_SCOPE);
    assert_eq!(claims.exp - claims.iat, 3600);
    Ok(())
}

#[tokio::test]
async fn test_access_token_is_cached() -> Result<()> {
    let server = MockServer::start();
    let token_mock = mock_token(&server);
    let auth = auth(&server);

    assert_eq!(auth.access_token().await?, "ya29.test-token");
    assert_eq!(auth.access_token().await?, "ya29.test-token");

    token_mock.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_token_endpoint_rejection_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(400).body(r#"{"error":"invalid_grant"}"#);
    });

    let err = auth(&server).access_token().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Token exchange failed with status 400: {"error":"invalid_grant"}"#
    );
}

#[tokio::test]
async fn test_fcm_send_posts_message_envelope() {
    let server = MockServer::start();
    mock_token(&server);
    let send_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/campus-app/messages:send")
            .header("authorization", "Bearer ya29.test-token")
            .json_body(json!({
                "message": {
                    "token": "device-abc",
                    "notification": {
                        "title": "Leave Approved",
                        "body": "Your casual leave has been approved."
                    },
                    "data": {"type": "leave_update"}
                }
            }));
        then.status(200)
            .json_body(json!({"name": "projects/campus-app/messages/1"}));
    });

    let gateway = FcmGateway::new(auth(&server), reqwest::Client::new(), &server.base_url());

    assert!(gateway.send("device-abc", &notification()).await);
    send_mock.assert();
}

#[tokio::test]
async fn test_fcm_failures_become_false() {
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(POST).path("/v1/projects/campus-app/messages:send");
        then.status(404)
            .json_body(json!({"error": {"status": "NOT_FOUND"}}));
    });
    let gateway = FcmGateway::new(auth(&server), reqwest::Client::new(), &server.base_url());
    assert!(!gateway.send("stale-device", &notification()).await);

    // 取不到 token 時也只回傳 false
    let no_auth_server = MockServer::start();
    no_auth_server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(500);
    });
    let gateway = FcmGateway::new(
        auth(&no_auth_server),
        reqwest::Client::new(),
        &no_auth_server.base_url(),
    );
    assert!(!gateway.send("device-abc", &notification()).await);
}

#[tokio::test]
async fn test_realtime_directory_reads_tokens_and_writes_balances() -> Result<()> {
    let server = MockServer::start();
    mock_token(&server);
    let key = firebase_key_from_email("asha@college.edu");

    let tokens_mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/device_tokens/{}.json", key))
            .header("authorization", "Bearer ya29.test-token");
        then.status(200).json_body(json!({"tok-a": true, "tok-b": true}));
    });
    let balance_mock = server.mock(|when, then| {
        when.method(PUT)
            .path(format!("/leave_balances/{}.json", key))
            .json_body(json!({
                "employee_id": "E1",
                "name": "Asha Rao",
                "department": "CSE",
                "total_leaves": 20.0,
                "cl": 8.0,
                "el": 8.0,
                "ml": 4.0
            }));
        then.status(200).json_body(json!(null));
    });

    let directory =
        RealtimeDbDirectory::new(auth(&server), reqwest::Client::new(), &server.base_url());

    let mut tokens = directory.device_tokens("Asha@College.edu ").await?;
    tokens.sort();
    assert_eq!(tokens, vec!["tok-a", "tok-b"]);

    let balance = LeaveBalance {
        employee_id: "E1".to_string(),
        name: "Asha Rao".to_string(),
        department: "CSE".to_string(),
        total_leaves: 20.0,
        cl: 8.0,
        el: 8.0,
        ml: 4.0,
    };
    directory.publish_leave_balance("asha@college.edu", &balance).await?;

    tokens_mock.assert();
    balance_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_notifier_succeeds_when_one_device_accepts() {
    let server = MockServer::start();
    let token_mock = mock_token(&server);
    let key = firebase_key_from_email("asha@college.edu");

    server.mock(|when, then| {
        when.method(GET).path(format!("/device_tokens/{}.json", key));
        then.status(200).json_body(json!(["stale", "fresh"]));
    });
    let stale = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/campus-app/messages:send")
            .body_contains("\"stale\"");
        then.status(404);
    });
    let fresh = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/campus-app/messages:send")
            .body_contains("\"fresh\"");
        then.status(200).json_body(json!({}));
    });

    let auth = auth(&server);
    let notifier = LeaveNotifier::new(
        Arc::new(RealtimeDbDirectory::new(
            auth.clone(),
            reqwest::Client::new(),
            &server.base_url(),
        )),
        Arc::new(FcmGateway::new(auth, reqwest::Client::new(), &server.base_url())),
    );

    let update = LeaveUpdate {
        faculty_email: "asha@college.edu".to_string(),
        leave_type: "casual".to_string(),
        from: "2024-07-01".to_string(),
        to: "2024-07-02".to_string(),
        status: LeaveStatus::Approved,
        remarks: None,
    };

    assert!(notifier.notify_leave(&update).await);
    stale.assert_hits(1);
    fresh.assert_hits(1);
    token_mock.assert_hits(1);
}

#[tokio::test]
async fn test_remote_backend_from_config() -> Result<()> {
    let server = MockServer::start();
    mock_token(&server);
    let key = firebase_key_from_email("ravi@college.edu");
    server.mock(|when, then| {
        when.method(GET).path(format!("/device_tokens/{}.json", key));
        then.status(200).json_body(json!(null));
    });

    let dir = TempDir::new()?;
    let key_path = dir.path().join("service-account.json");
    std::fs::write(&key_path, serde_json::to_string(&service_account(&server))?)?;

    let toml = format!(
        r#"
[app]
name = "timetable-admin"

[database]
path = "{db}"

[backend]
mode = "remote"

[firebase]
service_account_path = "{key}"
database_url = "{url}"
messaging_endpoint = "{url}"
request_timeout_seconds = 5
"#,
        db = dir.path().join("t.sqlite").display().to_string().replace('\\', "/"),
        key = key_path.display().to_string().replace('\\', "/"),
        url = server.base_url(),
    );
    let config = AppConfig::from_toml_str(&toml)?;
    let backend = Backend::from_config(&config)?;

    // 沒有註冊裝置 → false，不會呼叫 FCM
    assert!(!backend.notifier().notify("ravi@college.edu", &notification()).await);
    Ok(())
}
