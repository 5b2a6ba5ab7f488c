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

//! Caller-facing stream of result messages for one submission.

use std::{
    fmt::Debug,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::Stream;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::state::SessionState;
use crate::{error::TechreadResult, websocket::TechreadMessage};

/// Lazy, ordered stream of result messages for one submission.
///
/// Yields messages in the order the service sent them, with downloaded payloads attached. An
/// error is always the final item. Dropping the stream (or calling [`TechreadStream::close`])
/// cancels the session and closes its command channel.
pub struct TechreadStream {
    rx: mpsc::Receiver<TechreadResult<TechreadMessage>>,
    state_rx: watch::Receiver<SessionState>,
    cancellation_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Debug for TechreadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(TechreadStream))
            .field("state", &self.state())
            .field("is_cancelled", &self.cancellation_token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl TechreadStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<TechreadResult<TechreadMessage>>,
        state_rx: watch::Receiver<SessionState>,
        cancellation_token: CancellationToken,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            rx,
            state_rx,
            cancellation_token,
            task,
        }
    }

    /// Returns the current phase of the session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Cancels the session, waits for the command channel to close and returns the final state.
    pub async fn close(mut self) -> SessionState {
        self.cancellation_token.cancel();
        self.rx.close();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::error!("Session task failed: {e}");
        }
        self.state()
    }
}

impl Stream for TechreadStream {
    type Item = TechreadResult<TechreadMessage>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for TechreadStream {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
