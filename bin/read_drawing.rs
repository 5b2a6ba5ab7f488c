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

//! Reads a drawing against the live Techread service and logs every result message.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin techread-read --package nautilus-techread -- drawing.pdf [model.step]
//! ```
//!
//! # Configuration
//!
//! Read from a `.techread` license file in the working directory if present, otherwise from
//! the `TECHREAD_*` environment variables (see [`nautilus_techread::config`]).

use anyhow::Context;
use futures_util::StreamExt;
use nautilus_techread::{
    common::{consts::TECHREAD_LICENSE_FILE, enums::TechreadAsk},
    session::TechreadClient,
};
use strum::IntoEnumIterator;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let drawing_path = args
        .next()
        .context("usage: techread-read <drawing> [model]")?;
    let model_path = args.next();

    let drawing = std::fs::read(&drawing_path).with_context(|| format!("reading {drawing_path}"))?;
    let client = TechreadClient::load(TECHREAD_LICENSE_FILE)?;

    let mut submission = client
        .submission(drawing)
        .with_asks(TechreadAsk::iter().collect());
    if let Some(path) = model_path {
        let model = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
        submission = submission.with_model(model);
    }

    tracing::info!(
        drawing = %drawing_path,
        has_model = submission.model.is_some(),
        asks = submission.asks.len(),
        "Submitting drawing"
    );
    let start = std::time::Instant::now();

    let mut stream = client.read_drawing(submission);
    let mut count = 0usize;
    while let Some(message) = stream.next().await {
        let message = message?;
        count += 1;
        tracing::info!(
            message_type = %message.message_type,
            request_id = ?message.request_id,
            payload_keys = message.payload_dict.as_ref().map_or(0, |d| d.len()),
            payload_bytes = message.payload_bytes.as_ref().map_or(0, |b| b.len()),
            "Received message"
        );
    }

    tracing::info!(
        "Session {} with {count} messages in {:.2}s",
        stream.state(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
