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

//! Streaming client for the Techread technical-drawing interpretation service.
//!
//! Techread receives a drawing (and optionally a 3-D model) and pushes back a sequence of
//! incrementally computed results ("asks"). Reading one drawing is a multi-phase session that
//! spans two transports:
//!
//! - **Command channel** (WebSocket): `initialize` and `read` commands, followed by the stream
//!   of typed result messages.
//! - **Transfer channel** (HTTPS): uploads keyed by the request id issued at initialization, and
//!   downloads of large payloads referenced by result messages.
//!
//! Both transports authenticate with a bearer token obtained from the identity service and
//! refreshed on demand by a single-flight [`auth::CredentialProvider`].
//!
//! The main entry point is [`session::TechreadClient::read_drawing`], which returns a lazy
//! [`session::TechreadStream`] of result messages. Dropping the stream cancels the session and
//! closes the command channel.
//!
//! # Example
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use nautilus_techread::{config::TechreadClientConfig, session::TechreadClient};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = TechreadClientConfig::load(".techread")?;
//! let client = TechreadClient::new(config)?;
//! let drawing = std::fs::read("drawing.pdf")?;
//!
//! let mut stream = client.read_drawing(client.submission(drawing));
//! while let Some(message) = stream.next().await {
//!     let message = message?;
//!     println!("{}: {:?}", message.message_type, message.payload_dict);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod common;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod websocket;
