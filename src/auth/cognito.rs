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

//! Login against a Cognito user pool through the `InitiateAuth` JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::{
    error::{IdentityErrorResponse, TechreadAuthError},
    provider::IdentityService,
};
use crate::common::{
    consts::{COGNITO_AUTH_FLOW, COGNITO_CONTENT_TYPE, COGNITO_TARGET_INITIATE_AUTH},
    credential::Identity,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
    secret_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    #[serde(default)]
    id_token: Option<String>,
}

/// [`IdentityService`] backed by a Cognito user pool.
#[derive(Debug, Clone)]
pub struct CognitoIdentityService {
    endpoint: String,
    client: reqwest::Client,
}

impl CognitoIdentityService {
    /// Creates a new [`CognitoIdentityService`] posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, TechreadAuthError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            endpoint: endpoint.into(),
            client: builder.build()?,
        })
    }

    /// Returns the endpoint logins are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IdentityService for CognitoIdentityService {
    async fn authenticate(&self, identity: &Identity) -> Result<String, TechreadAuthError> {
        identity
            .validate()
            .map_err(TechreadAuthError::InvalidIdentity)?;

        let request = InitiateAuthRequest {
            auth_flow: COGNITO_AUTH_FLOW,
            client_id: identity.client_id(),
            auth_parameters: AuthParameters {
                username: identity.username(),
                password: identity.password(),
                secret_hash: identity.secret_hash(),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, COGNITO_CONTENT_TYPE)
            .header("X-Amz-Target", COGNITO_TARGET_INITIATE_AUTH)
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status.is_client_error()
                && let Ok(error) = serde_json::from_str::<IdentityErrorResponse>(&body)
                && error.error_type.is_some()
            {
                return Err(error.into());
            }
            return Err(TechreadAuthError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&body)?;
        match parsed.authentication_result.and_then(|r| r.id_token) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(TechreadAuthError::MissingToken(
                parsed
                    .challenge_name
                    .map_or_else(|| "no id token in response".to_string(), |c| {
                        format!("unsupported challenge {c}")
                    }),
            )),
        }
    }
}
