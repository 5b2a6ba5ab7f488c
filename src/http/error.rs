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

//! Error structures and enumerations for the Techread transfer channel (HTTP).

use thiserror::Error;

/// A typed error enumeration for the Techread HTTP client.
#[derive(Debug, Clone, Error)]
pub enum TechreadHttpError {
    /// Error variant when no bearer token is available for an authenticated request.
    #[error("Missing bearer token for authenticated request")]
    MissingToken,
    /// The service answered 401 or 403.
    #[error("Unauthorized ({status}) for {url}")]
    Unauthorized { status: u16, url: String },
    /// A payload URL points outside the configured transfer host.
    #[error("Untrusted payload URL '{url}': expected authority '{expected}'")]
    UntrustedPayloadUrl { url: String, expected: String },
    /// A URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// A downloaded body could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Generic network error (connect failure, timeout, broken body).
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Any non-success HTTP status other than 401/403.
    #[error("Unexpected HTTP status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<reqwest::Error> for TechreadHttpError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}

impl From<serde_json::Error> for TechreadHttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

impl From<base64::DecodeError> for TechreadHttpError {
    fn from(error: base64::DecodeError) -> Self {
        Self::DecodeError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_http_error_display() {
        let error = TechreadHttpError::UnexpectedStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "Unexpected HTTP status code 500: boom");

        let error = TechreadHttpError::UntrustedPayloadUrl {
            url: "https://evil.example/x".to_string(),
            expected: "files.example:443".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Untrusted payload URL 'https://evil.example/x': expected authority 'files.example:443'"
        );
    }

    #[rstest]
    fn test_http_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json")
            .expect_err("Should fail to parse");
        let http_err = TechreadHttpError::from(json_err);

        assert!(matches!(http_err, TechreadHttpError::JsonError(_)));
    }
}
