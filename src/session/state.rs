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

use strum::{AsRefStr, Display};

/// Phase of a drawing session.
///
/// A session moves forward through the phases and may restart from [`SessionState::Idle`]
/// once after an authorization failure.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Hash, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Idle,
    Authenticated,
    ChannelOpen,
    Initialized,
    Uploading,
    Reading,
    Streaming,
    /// The service closed the command channel.
    Completed,
    Failed,
    /// The caller stopped consuming the stream.
    Cancelled,
}

impl SessionState {
    /// Returns true if the session has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}
