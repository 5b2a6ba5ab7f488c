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

//! Error structures for the identity service integration.

use serde::Deserialize;
use thiserror::Error;

/// JSON error body returned by the identity service.
#[derive(Clone, Debug, Deserialize)]
pub struct IdentityErrorResponse {
    /// Exception type, e.g. `NotAuthorizedException`.
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

/// A typed error enumeration for logins against the identity service.
#[derive(Debug, Clone, Error)]
pub enum TechreadAuthError {
    /// The identity service rejected the login (bad credentials, unknown client).
    #[error("Login rejected: {error_type}: {message}")]
    Rejected { error_type: String, message: String },
    /// The identity service answered without issuing a token (e.g. a challenge flow).
    #[error("No token issued: {0}")]
    MissingToken(String),
    /// The identity fields are incomplete or inconsistent.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Generic network error.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Any unexpected HTTP status from the identity service.
    #[error("Unexpected HTTP status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<reqwest::Error> for TechreadAuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}

impl From<serde_json::Error> for TechreadAuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

impl From<IdentityErrorResponse> for TechreadAuthError {
    fn from(error: IdentityErrorResponse) -> Self {
        Self::Rejected {
            error_type: error
                .error_type
                .unwrap_or_else(|| "UnknownException".to_string()),
            message: error.message.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_error_response_to_rejected() {
        let response: IdentityErrorResponse = serde_json::from_str(
            r#"{"__type":"NotAuthorizedException","message":"Incorrect username or password."}"#,
        )
        .unwrap();
        let error = TechreadAuthError::from(response);

        assert_eq!(
            error.to_string(),
            "Login rejected: NotAuthorizedException: Incorrect username or password."
        );
    }

    #[rstest]
    fn test_error_response_without_type() {
        let response: IdentityErrorResponse = serde_json::from_str("{}").unwrap();
        let error = TechreadAuthError::from(response);

        assert!(matches!(
            error,
            TechreadAuthError::Rejected { ref error_type, .. } if error_type == "UnknownException"
        ));
    }
}
