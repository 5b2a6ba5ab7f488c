// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Integration tests for the Cognito identity service using a mock server.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::post,
};
use nautilus_techread::{
    auth::{CognitoIdentityService, CredentialProvider, IdentityService, TechreadAuthError},
    common::credential::Identity,
};
use rstest::rstest;
use serde_json::{Value, json};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Issue,
    Reject,
    Challenge,
    Outage,
}

#[derive(Clone, Default)]
struct TestServerState {
    mode: Arc<tokio::sync::Mutex<Mode>>,
    login_count: Arc<AtomicUsize>,
    last_request: Arc<tokio::sync::Mutex<Option<(HeaderMap, Value)>>>,
}

async fn handle_initiate_auth(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let n = state.login_count.fetch_add(1, Ordering::SeqCst) + 1;
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    *state.last_request.lock().await = Some((headers, request));

    let mode = *state.mode.lock().await;
    let (status, body) = match mode {
        Mode::Issue => (
            StatusCode::OK,
            json!({
                "AuthenticationResult": {
                    "AccessToken": "access",
                    "IdToken": format!("id-token-{n}"),
                    "ExpiresIn": 3600,
                    "TokenType": "Bearer",
                },
                "ChallengeParameters": {},
            }),
        ),
        Mode::Reject => (
            StatusCode::BAD_REQUEST,
            json!({
                "__type": "NotAuthorizedException",
                "message": "Incorrect username or password.",
            }),
        ),
        Mode::Challenge => (
            StatusCode::OK,
            json!({"ChallengeName": "NEW_PASSWORD_REQUIRED", "Session": "abc"}),
        ),
        Mode::Outage => (StatusCode::SERVICE_UNAVAILABLE, json!({"message": "down"})),
    };
    (status, body.to_string())
}

async fn start_test_server() -> (SocketAddr, TestServerState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = TestServerState::default();

    let router = Router::new()
        .route("/", post(handle_initiate_auth))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, state)
}

fn identity() -> Identity {
    Identity::new(
        "eu-central-1",
        "eu-central-1_AbCdEf",
        "client-id",
        "client-secret",
        "alice",
        "hunter22",
    )
}

fn service(addr: SocketAddr) -> CognitoIdentityService {
    CognitoIdentityService::new(format!("http://{addr}/"), Some(5)).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_login_posts_initiate_auth() {
    let (addr, state) = start_test_server().await;

    let token = service(addr).authenticate(&identity()).await.unwrap();

    assert_eq!(token, "id-token-1");
    let guard = state.last_request.lock().await;
    let (headers, request) = guard.as_ref().unwrap();
    assert_eq!(
        headers.get(CONTENT_TYPE).unwrap(),
        "application/x-amz-json-1.1"
    );
    assert_eq!(
        headers.get("X-Amz-Target").unwrap(),
        "AWSCognitoIdentityProviderService.InitiateAuth"
    );
    assert_eq!(
        request,
        &json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": "client-id",
            "AuthParameters": {
                "USERNAME": "alice",
                "PASSWORD": "hunter22",
                "SECRET_HASH": "qROqM+PMKX09MK8ulDVm8LCWdCRqQQEUG9HcF+N7/S4=",
            },
        })
    );
}

#[rstest]
#[tokio::test]
async fn test_rejected_login() {
    let (addr, state) = start_test_server().await;
    *state.mode.lock().await = Mode::Reject;

    let err = service(addr).authenticate(&identity()).await.unwrap_err();

    assert!(matches!(
        err,
        TechreadAuthError::Rejected { ref error_type, .. } if error_type == "NotAuthorizedException"
    ));
}

#[rstest]
#[tokio::test]
async fn test_challenge_is_missing_token() {
    let (addr, state) = start_test_server().await;
    *state.mode.lock().await = Mode::Challenge;

    let err = service(addr).authenticate(&identity()).await.unwrap_err();

    assert!(
        matches!(err, TechreadAuthError::MissingToken(ref m) if m.contains("NEW_PASSWORD_REQUIRED")),
        "{err}"
    );
}

#[rstest]
#[tokio::test]
async fn test_outage_is_unexpected_status() {
    let (addr, state) = start_test_server().await;
    *state.mode.lock().await = Mode::Outage;

    let err = service(addr).authenticate(&identity()).await.unwrap_err();

    assert!(matches!(
        err,
        TechreadAuthError::UnexpectedStatus { status: 503, .. }
    ));
}

#[rstest]
#[tokio::test]
async fn test_invalid_identity_makes_no_request() {
    let (addr, state) = start_test_server().await;
    let identity = Identity::new(
        "eu-central-1",
        "us-east-1_AbCdEf",
        "client-id",
        "client-secret",
        "alice",
        "hunter22",
    );

    let err = service(addr).authenticate(&identity).await.unwrap_err();

    assert!(matches!(err, TechreadAuthError::InvalidIdentity(_)));
    assert_eq!(state.login_count.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn test_provider_refresh_through_identity_service() {
    let (addr, state) = start_test_server().await;
    let provider = CredentialProvider::new(identity(), Arc::new(service(addr)));

    let first = provider.ensure_token().await.unwrap();
    let again = provider.ensure_token().await.unwrap();
    let refreshed = provider.refresh(Some(&first)).await.unwrap();
    let stale_refresh = provider.refresh(Some(&first)).await.unwrap();

    assert_eq!(first.as_str(), "id-token-1");
    assert_eq!(again, first);
    assert_eq!(refreshed.as_str(), "id-token-2");
    assert_eq!(stale_refresh, refreshed);
    assert_eq!(provider.login_count(), 2);
    assert_eq!(state.login_count.load(Ordering::SeqCst), 2);
}
