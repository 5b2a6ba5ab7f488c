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

//! Public entry point for reading drawings.

use std::{path::Path, sync::Arc, time::Duration};

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::{
    handler::SessionHandler,
    hooks::{TechreadHook, dispatch},
    state::SessionState,
    stream::TechreadStream,
};
use crate::{
    auth::{CognitoIdentityService, CredentialProvider, IdentityService},
    common::{
        consts::TECHREAD_WS_CLOSE_TIMEOUT_SECS,
        enums::{TechreadArchitecture, TechreadAsk},
    },
    config::TechreadClientConfig,
    error::{TechreadError, TechreadResult},
    http::TechreadHttpClient,
};

/// A drawing (and optional 3-D model) to read, with the asks to compute.
#[derive(Clone, Debug, Default)]
pub struct TechreadSubmission {
    pub drawing: Bytes,
    pub model: Option<Bytes>,
    pub asks: Vec<TechreadAsk>,
    pub architecture: TechreadArchitecture,
}

impl TechreadSubmission {
    /// Creates a submission for `drawing` with no asks on the default architecture.
    #[must_use]
    pub fn new(drawing: impl Into<Bytes>) -> Self {
        Self {
            drawing: drawing.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<Bytes>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_asks(mut self, asks: Vec<TechreadAsk>) -> Self {
        self.asks = asks;
        self
    }

    #[must_use]
    pub fn with_architecture(mut self, architecture: TechreadArchitecture) -> Self {
        self.architecture = architecture;
        self
    }
}

/// Client for the Techread service.
///
/// Cheap to clone; clones share one [`CredentialProvider`], so a token refreshed by one
/// session is seen by all others. Each submission gets its own command channel connection and
/// transfer client.
#[derive(Debug, Clone)]
pub struct TechreadClient {
    config: Arc<TechreadClientConfig>,
    credentials: Arc<CredentialProvider>,
}

impl TechreadClient {
    /// Creates a new [`TechreadClient`] logging in through the Cognito identity service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has no valid identity.
    pub fn new(config: TechreadClientConfig) -> TechreadResult<Self> {
        let endpoint = config
            .identity_endpoint()
            .ok_or_else(|| TechreadError::Config("missing identity".to_string()))?;
        let service = CognitoIdentityService::new(endpoint, config.http_timeout_secs)?;
        Self::with_identity_service(config, Arc::new(service))
    }

    /// Creates a new [`TechreadClient`] logging in through `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has no valid identity.
    pub fn with_identity_service(
        config: TechreadClientConfig,
        service: Arc<dyn IdentityService>,
    ) -> TechreadResult<Self> {
        let identity = config
            .identity
            .clone()
            .ok_or_else(|| TechreadError::Config("missing identity".to_string()))?;
        identity.validate().map_err(TechreadError::Config)?;

        Ok(Self {
            credentials: Arc::new(CredentialProvider::new(identity, service)),
            config: Arc::new(config),
        })
    }

    /// Creates a client from the license file at `path`, or from the environment if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load(path: impl AsRef<Path>) -> TechreadResult<Self> {
        Self::new(TechreadClientConfig::load(path)?)
    }

    /// Creates a client from the `TECHREAD_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is missing.
    pub fn from_env() -> TechreadResult<Self> {
        Self::new(TechreadClientConfig::from_env()?)
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &TechreadClientConfig {
        &self.config
    }

    /// Returns the credential provider shared by all sessions of this client.
    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    /// Creates a submission for `drawing` using the configured asks and architecture.
    #[must_use]
    pub fn submission(&self, drawing: impl Into<Bytes>) -> TechreadSubmission {
        TechreadSubmission::new(drawing)
            .with_asks(self.config.asks.clone())
            .with_architecture(self.config.architecture)
    }

    /// Starts reading `submission` and returns the stream of result messages.
    ///
    /// The session runs on a dedicated Tokio task and advances only as the stream is consumed.
    /// Errors are yielded as the final stream item.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn read_drawing(&self, submission: TechreadSubmission) -> TechreadStream {
        let (out_tx, out_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let cancellation_token = CancellationToken::new();

        let http_client = match TechreadHttpClient::new(
            &self.config.http_base_url(),
            self.credentials.clone(),
            self.config.http_timeout_secs,
        ) {
            Ok(client) => client,
            Err(e) => {
                state_tx.send_replace(SessionState::Failed);
                let _ = out_tx.try_send(Err(e.into()));
                return TechreadStream::new(out_rx, state_rx, cancellation_token, None);
            }
        };

        let handler = SessionHandler::new(
            submission,
            self.config.ws_url(),
            Duration::from_secs(
                self.config
                    .ws_close_timeout_secs
                    .unwrap_or(TECHREAD_WS_CLOSE_TIMEOUT_SECS),
            ),
            self.credentials.clone(),
            http_client,
            out_tx,
            state_tx,
            cancellation_token.clone(),
        );
        let task = tokio::spawn(handler.run());

        TechreadStream::new(out_rx, state_rx, cancellation_token, Some(task))
    }

    /// Reads `submission`, invoking each hook for the messages matching its trigger.
    ///
    /// Asks named by hooks are added to the submission. Messages matching no hook are logged.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by the session.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub async fn read_drawing_with_hooks(
        &self,
        mut submission: TechreadSubmission,
        mut hooks: Vec<TechreadHook>,
    ) -> TechreadResult<()> {
        for ask in hooks.iter().filter_map(TechreadHook::ask) {
            if !submission.asks.contains(&ask) {
                submission.asks.push(ask);
            }
        }

        let mut stream = self.read_drawing(submission);
        while let Some(message) = stream.next().await {
            let message = message?;
            if dispatch(&mut hooks, &message).await == 0 {
                tracing::warn!(
                    message_type = %message.message_type,
                    "No hook registered for message"
                );
            }
        }
        Ok(())
    }
}
