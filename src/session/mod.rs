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

//! Drawing sessions sequencing the command and transfer channels.
//!
//! This module provides a two-layer architecture:
//! - Outer client: [`TechreadClient`] builds submissions and hands out [`TechreadStream`]s.
//! - Inner handler: runs one submission's protocol in a dedicated Tokio task.
//!
//! A session advances through [`SessionState`]:
//! `IDLE → AUTHENTICATED → CHANNEL_OPEN → INITIALIZED → UPLOADING → READING → STREAMING`,
//! ending in `COMPLETED`, `FAILED` or `CANCELLED`. An authorization failure before `read` is
//! sent restarts the session from `IDLE` once with a refreshed token.

pub mod client;
mod handler;
pub mod hooks;
pub mod state;
pub mod stream;

pub use client::{TechreadClient, TechreadSubmission};
pub use hooks::{HookTrigger, TechreadHook};
pub use state::SessionState;
pub use stream::TechreadStream;
