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

//! WebSocket client for the Techread command channel.
//!
//! The [`TechreadWebSocketClient`] owns exactly one connection. Messages are received in the
//! order the service sent them; nothing is buffered, reordered or de-duplicated.

use std::{fmt::Debug, time::Duration};

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self, Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::AUTHORIZATION},
    },
};

use super::{
    error::TechreadWsError,
    messages::{TechreadCommand, TechreadMessage, decode_message},
};
use crate::{
    auth::BearerToken,
    common::{consts::TECHREAD_WS_CLOSE_TIMEOUT_SECS, enums::TechreadAction},
};

/// Result type for command channel operations.
pub type TechreadWsResult<T> = Result<T, TechreadWsError>;

/// A single authenticated connection to the Techread command channel.
pub struct TechreadWebSocketClient {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    close_timeout: Duration,
    is_closed: bool,
}

impl Debug for TechreadWebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TechreadWebSocketClient))
            .field("url", &self.url)
            .field("close_timeout", &self.close_timeout)
            .field("is_closed", &self.is_closed)
            .finish()
    }
}

impl TechreadWebSocketClient {
    /// Opens a connection to `url`, presenting `token` in the handshake.
    ///
    /// # Errors
    ///
    /// - [`TechreadWsError::Unauthorized`] if the handshake is rejected with 401/403.
    /// - [`TechreadWsError::HandshakeRejected`] for any other rejection status.
    /// - [`TechreadWsError::ConnectionError`] if the service cannot be reached.
    pub async fn connect(url: &str, token: &BearerToken) -> TechreadWsResult<Self> {
        let mut request = url
            .into_client_request()
            .map_err(|e| TechreadWsError::ConnectionError(format!("{url}: {e}")))?;
        let header = HeaderValue::from_str(&token.authorization_value())
            .map_err(|e| TechreadWsError::ConnectionError(format!("invalid token header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, header);

        tracing::debug!("Connecting to {url}");
        let (stream, response) = connect_async(request)
            .await
            .map_err(TechreadWsError::from_handshake)?;
        tracing::info!(status = %response.status(), "Connected to {url}");

        Ok(Self {
            url: url.to_string(),
            stream,
            close_timeout: Duration::from_secs(TECHREAD_WS_CLOSE_TIMEOUT_SECS),
            is_closed: false,
        })
    }

    /// Sets the time allowed for the closing handshake.
    #[must_use]
    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }

    /// Returns the URL this client is connected to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns true once the connection has been closed by either side.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Sends a command composed of `action` and its JSON-encoded `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be written.
    pub async fn send(&mut self, action: TechreadAction, message: String) -> TechreadWsResult<()> {
        self.send_command(&TechreadCommand { action, message }).await
    }

    /// Sends `command` without waiting for any reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be serialized or written.
    pub async fn send_command(&mut self, command: &TechreadCommand) -> TechreadWsResult<()> {
        let text = serde_json::to_string(command)?;
        tracing::debug!(action = %command.action, "Sending command");
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Waits for the next message.
    ///
    /// Returns `Ok(None)` once the service has closed the connection cleanly.
    ///
    /// # Errors
    ///
    /// - [`TechreadWsError::Unauthorized`] for a gateway `Forbidden` envelope.
    /// - [`TechreadWsError::UnknownMessage`] for a frame that cannot be decoded.
    /// - [`TechreadWsError::ClosedAbnormally`] if the connection dropped without a closing
    ///   handshake.
    pub async fn receive(&mut self) -> TechreadWsResult<Option<TechreadMessage>> {
        if self.is_closed {
            return Ok(None);
        }

        loop {
            let Some(frame) = self.stream.next().await else {
                self.is_closed = true;
                return Ok(None);
            };

            match frame {
                Ok(Message::Text(text)) => return decode_message(text.as_str()).map(Some),
                Ok(Message::Binary(data)) => {
                    let text = std::str::from_utf8(&data).map_err(|e| {
                        TechreadWsError::UnknownMessage(format!("binary frame is not UTF-8: {e}"))
                    })?;
                    return decode_message(text).map(Some);
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "Command channel closed by server");
                    self.is_closed = true;
                    return Ok(None);
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.is_closed = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.is_closed = true;
                    return Err(e.into());
                }
            }
        }
    }

    /// Converts the client into a lazy stream of messages.
    ///
    /// The stream ends when the service closes the connection and ends after yielding the first
    /// error. Dropping the stream drops the connection.
    pub fn into_stream(mut self) -> impl Stream<Item = TechreadWsResult<TechreadMessage>> {
        async_stream::stream! {
            loop {
                match self.receive().await {
                    Ok(Some(message)) => yield Ok(message),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
            self.close().await;
        }
    }

    /// Closes the connection, sending a close frame if still open.
    ///
    /// Idempotent; failures are logged and otherwise ignored.
    pub async fn close(&mut self) {
        let was_closed = std::mem::replace(&mut self.is_closed, true);

        match tokio::time::timeout(self.close_timeout, self.stream.close(None)).await {
            Ok(Ok(())) => tracing::debug!("Closed {}", self.url),
            Ok(Err(e)) if was_closed => tracing::trace!("Close after server close: {e}"),
            Ok(Err(e)) => tracing::debug!("Error closing {}: {e}", self.url),
            Err(_) => tracing::warn!(
                "Timed out after {:?} closing {}",
                self.close_timeout,
                self.url
            ),
        }
    }
}
