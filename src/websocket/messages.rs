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

//! Command channel wire messages and the two-step message decoder.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::TechreadWsError;
use crate::common::{
    consts::GATEWAY_FORBIDDEN,
    enums::{TechreadAction, TechreadArchitecture, TechreadAsk, TechreadMessageType},
};

/// Command sent by the client.
///
/// `message` carries a JSON document encoded as a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechreadCommand {
    pub action: TechreadAction,
    pub message: String,
}

impl TechreadCommand {
    /// Creates an `initialize` command for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be serialized.
    pub fn initialize(request: &TechreadInitializeRequest) -> Result<Self, TechreadWsError> {
        Ok(Self {
            action: TechreadAction::Initialize,
            message: serde_json::to_string(request)?,
        })
    }

    /// Creates a `read` command.
    #[must_use]
    pub fn read() -> Self {
        Self {
            action: TechreadAction::Read,
            message: "{}".to_string(),
        }
    }
}

/// Body of the `initialize` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechreadInitializeRequest {
    pub asks: Vec<TechreadAsk>,
    pub architecture: TechreadArchitecture,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

impl TechreadInitializeRequest {
    /// Creates a new request stamped with this crate's version.
    #[must_use]
    pub fn new(asks: Vec<TechreadAsk>, architecture: TechreadArchitecture) -> Self {
        Self {
            asks,
            architecture,
            client_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }
}

/// Message pushed by the service on the command channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechreadMessage {
    /// Request the message belongs to; absent for transport-level errors.
    #[serde(default)]
    pub request_id: Option<Uuid>,
    pub message_type: TechreadMessageType,
    #[serde(default, alias = "payload_json")]
    pub payload_dict: Option<Map<String, Value>>,
    /// Location of a large payload, fetched over the transfer channel.
    #[serde(default)]
    pub payload_url: Option<String>,
    /// Bytes downloaded from `payload_url`, attached before the message is handed out.
    #[serde(skip)]
    pub payload_bytes: Option<Bytes>,
}

/// Envelope produced by the API gateway in front of the service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEnvelope {
    pub message: String,
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Decodes a raw command channel frame.
///
/// The frame is first matched against the [`TechreadMessage`] schema; on a structural mismatch
/// it is matched against the [`GatewayEnvelope`] schema.
///
/// # Errors
///
/// - [`TechreadWsError::Unauthorized`] for a gateway `Forbidden` envelope.
/// - [`TechreadWsError::UnknownMessage`] for invalid JSON, an unknown message type, or any
///   other shape.
pub fn decode_message(raw: &str) -> Result<TechreadMessage, TechreadWsError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| TechreadWsError::UnknownMessage(format!("invalid JSON ({e}): {raw}")))?;

    let primary_error = match TechreadMessage::deserialize(&value) {
        Ok(message) => return Ok(message),
        Err(e) => e,
    };

    match GatewayEnvelope::deserialize(&value) {
        Ok(envelope) if envelope.message == GATEWAY_FORBIDDEN => {
            tracing::warn!(
                connection_id = ?envelope.connection_id,
                request_id = ?envelope.request_id,
                "Gateway rejected action: {}",
                envelope.message
            );
            Err(TechreadWsError::Unauthorized(envelope.message))
        }
        Ok(envelope) => Err(TechreadWsError::UnknownMessage(format!(
            "gateway: {}",
            envelope.message
        ))),
        Err(_) => Err(TechreadWsError::UnknownMessage(format!(
            "{primary_error}: {raw}"
        ))),
    }
}
