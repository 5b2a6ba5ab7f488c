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

//! Unified error taxonomy surfaced to callers of a Techread session.
//!
//! Channel-specific errors ([`TechreadAuthError`], [`TechreadWsError`], [`TechreadHttpError`])
//! are folded into [`TechreadError`], which is what a [`crate::session::TechreadStream`] yields.

use thiserror::Error;

use crate::{
    auth::error::TechreadAuthError, common::enums::FileRole, http::error::TechreadHttpError,
    websocket::error::TechreadWsError,
};

/// Result type for Techread session operations.
pub type TechreadResult<T> = Result<T, TechreadError>;

/// Errors surfaced by a Techread session.
#[derive(Debug, Clone, Error)]
pub enum TechreadError {
    /// 401/403 from either channel, or a gateway `Forbidden` envelope.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The identity service refused to issue a token.
    #[error("Authentication failed: {0}")]
    Authentication(#[from] TechreadAuthError),
    /// Malformed or unexpected message on the command channel.
    #[error("Unknown message: {0}")]
    Unknown(String),
    /// Non-success status other than 401/403.
    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },
    /// A payload URL pointed outside the trusted transfer host.
    #[error("Security violation: {0}")]
    Security(String),
    /// Connection failure, abnormal close or timeout.
    #[error("Transport error: {0}")]
    Transport(String),
    /// An upload body exceeds the service's message size limit.
    #[error("Payload too large: {role} upload is {size} bytes (limit {limit})")]
    PayloadTooLarge {
        role: FileRole,
        size: usize,
        limit: usize,
    },
    /// The submission cannot be sent (e.g. empty drawing).
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TechreadError {
    /// Returns true if the error is an authorization failure that a fresh token may resolve.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Returns true if resubmitting the whole drawing may succeed.
    ///
    /// Retries are only meaningful at submission granularity since a request id is bound to
    /// the command channel connection that produced it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::Transport(_) => true,
            _ => false,
        }
    }
}

impl From<TechreadWsError> for TechreadError {
    fn from(error: TechreadWsError) -> Self {
        match error {
            TechreadWsError::Unauthorized(msg) => Self::Unauthorized(msg),
            TechreadWsError::UnknownMessage(msg) | TechreadWsError::JsonError(msg) => {
                Self::Unknown(msg)
            }
            TechreadWsError::HandshakeRejected { status } => Self::Server {
                status,
                message: "command channel handshake rejected".to_string(),
            },
            TechreadWsError::ConnectionError(msg)
            | TechreadWsError::ClosedAbnormally(msg)
            | TechreadWsError::TungsteniteError(msg) => Self::Transport(msg),
        }
    }
}

impl From<TechreadHttpError> for TechreadError {
    fn from(error: TechreadHttpError) -> Self {
        match error {
            TechreadHttpError::MissingToken => {
                Self::Unauthorized("no bearer token available".to_string())
            }
            TechreadHttpError::Unauthorized { .. } => Self::Unauthorized(error.to_string()),
            TechreadHttpError::UntrustedPayloadUrl { .. } => Self::Security(error.to_string()),
            TechreadHttpError::UnexpectedStatus { status, body } => Self::Server {
                status,
                message: body,
            },
            TechreadHttpError::DecodeError(msg) | TechreadHttpError::JsonError(msg) => {
                Self::Unknown(msg)
            }
            TechreadHttpError::InvalidUrl(msg) => Self::Config(msg),
            TechreadHttpError::NetworkError(msg) => Self::Transport(msg),
        }
    }
}
