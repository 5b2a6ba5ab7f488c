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

//! Session handler running one submission's protocol in a dedicated Tokio task.
//!
//! The handler owns the command channel connection and the transfer client for its
//! submission. Messages flow to the caller through a bounded channel, so the connection is only
//! read as fast as the caller consumes.

use std::{sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{client::TechreadSubmission, state::SessionState};
use crate::{
    auth::{BearerToken, CredentialProvider},
    common::{
        consts::TECHREAD_MAX_MESSAGE_BYTES,
        enums::{FileRole, TechreadMessageType},
    },
    error::{TechreadError, TechreadResult},
    http::{TechreadHttpClient, TechreadUploadRequest},
    websocket::{
        TechreadCommand, TechreadInitializeRequest, TechreadMessage, TechreadWebSocketClient,
    },
};

/// How the streaming phase ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    ServerClosed,
    Cancelled,
}

#[derive(Debug)]
pub(crate) struct SessionHandler {
    submission: TechreadSubmission,
    ws_url: String,
    ws_close_timeout: Duration,
    credentials: Arc<CredentialProvider>,
    http_client: TechreadHttpClient,
    out_tx: mpsc::Sender<TechreadResult<TechreadMessage>>,
    state_tx: watch::Sender<SessionState>,
    cancellation_token: CancellationToken,
}

impl SessionHandler {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        submission: TechreadSubmission,
        ws_url: String,
        ws_close_timeout: Duration,
        credentials: Arc<CredentialProvider>,
        http_client: TechreadHttpClient,
        out_tx: mpsc::Sender<TechreadResult<TechreadMessage>>,
        state_tx: watch::Sender<SessionState>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            submission,
            ws_url,
            ws_close_timeout,
            credentials,
            http_client,
            out_tx,
            state_tx,
            cancellation_token,
        }
    }

    /// Runs the session to a terminal state.
    ///
    /// A failure is delivered to the caller as the final item of the stream.
    pub(crate) async fn run(self) {
        match self.execute().await {
            Ok(Outcome::ServerClosed) => self.transition(SessionState::Completed),
            Ok(Outcome::Cancelled) => {
                tracing::debug!("Session cancelled by caller");
                self.transition(SessionState::Cancelled);
            }
            Err(e) => {
                tracing::error!("Session failed: {e}");
                self.transition(SessionState::Failed);
                let _ = self.out_tx.send(Err(e)).await;
            }
        }
    }

    async fn execute(&self) -> TechreadResult<Outcome> {
        self.preflight()?;

        let Some(mut ws) = self.open_session().await? else {
            return Ok(Outcome::Cancelled);
        };

        let outcome = self.stream_results(&mut ws).await;
        ws.close().await;
        outcome
    }

    fn preflight(&self) -> TechreadResult<()> {
        if self.submission.drawing.is_empty() {
            return Err(TechreadError::InvalidSubmission(
                "drawing is empty".to_string(),
            ));
        }

        let uploads = [
            (FileRole::Drawing, Some(self.submission.drawing.len())),
            (FileRole::Model, self.submission.model.as_ref().map(|m| m.len())),
        ];
        for (role, len) in uploads {
            let Some(len) = len else { continue };
            let size = TechreadUploadRequest::encoded_len(role, len);
            if size > TECHREAD_MAX_MESSAGE_BYTES {
                return Err(TechreadError::PayloadTooLarge {
                    role,
                    size,
                    limit: TECHREAD_MAX_MESSAGE_BYTES,
                });
            }
        }
        Ok(())
    }

    /// Authenticates, initializes, uploads and sends `read`.
    ///
    /// An authorization failure at any of these steps restarts the whole sequence once with a
    /// refreshed token, since the request id is bound to the connection it was issued on.
    /// Returns `None` if the caller cancelled before `read` was sent.
    async fn open_session(&self) -> TechreadResult<Option<TechreadWebSocketClient>> {
        let Some(token) = self
            .cancellation_token
            .run_until_cancelled(self.credentials.ensure_token())
            .await
        else {
            return Ok(None);
        };
        let token = token?;
        self.transition(SessionState::Authenticated);

        match self.establish(&token).await {
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("{e}, refreshing token and restarting session");
                self.transition(SessionState::Idle);
                let Some(token) = self
                    .cancellation_token
                    .run_until_cancelled(self.credentials.refresh(Some(&token)))
                    .await
                else {
                    return Ok(None);
                };
                let token = token?;
                self.transition(SessionState::Authenticated);
                self.establish(&token).await
            }
            result => result,
        }
    }

    async fn establish(
        &self,
        token: &BearerToken,
    ) -> TechreadResult<Option<TechreadWebSocketClient>> {
        let Some(ws) = self
            .cancellation_token
            .run_until_cancelled(TechreadWebSocketClient::connect(&self.ws_url, token))
            .await
        else {
            return Ok(None);
        };
        let mut ws = ws?.with_close_timeout(self.ws_close_timeout);
        self.transition(SessionState::ChannelOpen);

        // The connection must outlive the race so a cancelled session still closes it
        let result = tokio::select! {
            result = self.initialize_and_upload(&mut ws) => Some(result),
            () = self.cancellation_token.cancelled() => None,
        };

        match result {
            Some(Ok(())) => Ok(Some(ws)),
            Some(Err(e)) => {
                ws.close().await;
                Err(e)
            }
            None => {
                tracing::debug!("Session cancelled before read, closing command channel");
                ws.close().await;
                Ok(None)
            }
        }
    }

    async fn initialize_and_upload(&self, ws: &mut TechreadWebSocketClient) -> TechreadResult<()> {
        let request = TechreadInitializeRequest::new(
            self.submission.asks.clone(),
            self.submission.architecture,
        );
        ws.send_command(&TechreadCommand::initialize(&request)?)
            .await?;

        let request_id = match ws.receive().await? {
            Some(TechreadMessage {
                request_id: Some(request_id),
                message_type: TechreadMessageType::InitializationSuccess,
                ..
            }) => request_id,
            Some(message) => {
                return Err(TechreadError::Unknown(format!(
                    "unexpected reply to initialize: {} (request_id {:?})",
                    message.message_type, message.request_id
                )));
            }
            None => {
                return Err(TechreadError::Unknown(
                    "command channel closed before initialize reply".to_string(),
                ));
            }
        };
        tracing::info!(%request_id, "Initialized request");
        self.transition(SessionState::Initialized);

        self.transition(SessionState::Uploading);
        self.upload_files(request_id).await?;

        self.transition(SessionState::Reading);
        ws.send_command(&TechreadCommand::read()).await?;
        Ok(())
    }

    async fn upload_files(&self, request_id: Uuid) -> TechreadResult<()> {
        let (drawing, model) = tokio::join!(
            self.http_client.upload(
                request_id,
                FileRole::Drawing,
                Some(self.submission.drawing.as_ref()),
            ),
            self.http_client
                .upload(request_id, FileRole::Model, self.submission.model.as_deref()),
        );

        match (
            drawing.map_err(TechreadError::from),
            model.map_err(TechreadError::from),
        ) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), _) if e.is_unauthorized() => Err(e),
            (_, Err(e)) if e.is_unauthorized() => Err(e),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    async fn stream_results(&self, ws: &mut TechreadWebSocketClient) -> TechreadResult<Outcome> {
        self.transition(SessionState::Streaming);

        loop {
            // Hold a slot before reading so at most one message is fetched ahead of the caller
            let permit = tokio::select! {
                () = self.cancellation_token.cancelled() => return Ok(Outcome::Cancelled),
                permit = self.out_tx.reserve() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return Ok(Outcome::Cancelled),
                },
            };

            let received = tokio::select! {
                () = self.cancellation_token.cancelled() => return Ok(Outcome::Cancelled),
                received = ws.receive() => received?,
            };

            let Some(mut message) = received else {
                tracing::info!("Command channel closed by server");
                return Ok(Outcome::ServerClosed);
            };
            log_received(&message);

            if let Some(payload_url) = message.payload_url.as_deref() {
                let payload = tokio::select! {
                    () = self.cancellation_token.cancelled() => return Ok(Outcome::Cancelled),
                    payload = self.http_client.download(payload_url) => payload?,
                };
                message.payload_bytes = Some(payload);
            }

            permit.send(Ok(message));
        }
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state_tx.send_replace(next);
        tracing::debug!(from = %previous, to = %next, "Session state transition");
    }
}

fn log_received(message: &TechreadMessage) {
    if message.message_type.is_error() {
        tracing::warn!(
            message_type = %message.message_type,
            request_id = ?message.request_id,
            payload = ?message.payload_dict,
            "Received error message"
        );
    } else {
        tracing::debug!(
            message_type = %message.message_type,
            request_id = ?message.request_id,
            "Received message"
        );
    }
}
