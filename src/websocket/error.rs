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

//! Error types produced by the Techread command channel (WebSocket).

use thiserror::Error;
use tokio_tungstenite::tungstenite::{self, http::StatusCode};

/// A typed error enumeration for the Techread WebSocket client.
#[derive(Debug, Clone, Error)]
pub enum TechreadWsError {
    /// Handshake rejected with 401/403, or a gateway `Forbidden` envelope.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// A message that matches neither the message schema nor a known gateway envelope.
    #[error("Unknown message: {0}")]
    UnknownMessage(String),
    /// Handshake rejected with a status other than 401/403.
    #[error("Handshake rejected with HTTP status code {status}")]
    HandshakeRejected { status: u16 },
    /// Connection error during WebSocket setup.
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// The connection dropped without a closing handshake.
    #[error("Connection closed abnormally: {0}")]
    ClosedAbnormally(String),
    /// WebSocket transport error.
    #[error("Tungstenite error: {0}")]
    TungsteniteError(String),
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl TechreadWsError {
    /// Maps a failed opening handshake to a typed error.
    #[must_use]
    pub fn from_handshake(error: tungstenite::Error) -> Self {
        match error {
            tungstenite::Error::Http(response) => match response.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Self::Unauthorized(format!("handshake rejected ({})", response.status()))
                }
                status => Self::HandshakeRejected {
                    status: status.as_u16(),
                },
            },
            other => Self::ConnectionError(other.to_string()),
        }
    }
}

impl From<tungstenite::Error> for TechreadWsError {
    fn from(error: tungstenite::Error) -> Self {
        match error {
            tungstenite::Error::Protocol(
                tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
            )
            | tungstenite::Error::Io(_) => Self::ClosedAbnormally(error.to_string()),
            other => Self::TungsteniteError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for TechreadWsError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_reset_is_abnormal_close() {
        let error = TechreadWsError::from(tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        ));
        assert!(matches!(error, TechreadWsError::ClosedAbnormally(_)));
    }

    #[rstest]
    fn test_handshake_io_failure_is_connection_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = TechreadWsError::from_handshake(tungstenite::Error::Io(io));
        assert!(matches!(error, TechreadWsError::ConnectionError(_)));
    }

    #[rstest]
    fn test_ws_error_display() {
        let error = TechreadWsError::UnknownMessage("{\"message\":\"Oops\"}".to_string());
        assert_eq!(error.to_string(), "Unknown message: {\"message\":\"Oops\"}");

        let error = TechreadWsError::HandshakeRejected { status: 502 };
        assert_eq!(
            error.to_string(),
            "Handshake rejected with HTTP status code 502"
        );
    }
}
