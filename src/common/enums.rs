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

//! Enumerations that model Techread string enums across WebSocket and HTTP payloads.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Command sent over the command channel.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TechreadAction {
    /// Opens a unit of work and obtains its request id.
    Initialize,
    /// Starts processing once every upload has completed.
    Read,
}

/// Role of an uploaded file within one submission.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileRole {
    /// The technical drawing (PDF or image).
    Drawing,
    /// Optional 3-D model associated with the drawing.
    Model,
}

/// Processing architecture requested for a submission.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TechreadArchitecture {
    #[default]
    CpuV1,
    GpuV1,
}

/// A requested kind of extracted result.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(tag = "ask_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TechreadAsk {
    /// Dimensions (measures) found on the drawing.
    Measures,
    /// Thumbnail of the drawing canvas.
    CanvasThumbnail,
    /// Thumbnail of the whole page.
    PageThumbnail,
    /// Thumbnail of the sheet (page without margins).
    SheetThumbnail,
}

impl TechreadAsk {
    /// Returns the message type the service uses to deliver this ask's result.
    #[must_use]
    pub const fn result_type(&self) -> TechreadMessageType {
        match self {
            Self::Measures => TechreadMessageType::AskMeasures,
            Self::CanvasThumbnail => TechreadMessageType::AskCanvasThumbnail,
            Self::PageThumbnail => TechreadMessageType::AskPageThumbnail,
            Self::SheetThumbnail => TechreadMessageType::AskSheetThumbnail,
        }
    }
}

/// Kind of a message pushed by the service on the command channel.
///
/// The set is closed: an unrecognized tag fails decoding instead of being guessed.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TechreadMessageType {
    /// Reply to `initialize`, carrying the request id.
    InitializationSuccess,
    #[serde(alias = "STARTED")]
    ProcessingStarted,
    AskMeasures,
    AskCanvasThumbnail,
    AskPageThumbnail,
    AskSheetThumbnail,
    /// Result of an ask the client has no dedicated kind for.
    AskResult,
    Completed,
    /// The drawing was rejected (unsupported format, unreadable file).
    Rejection,
    ErrorInternal,
}

impl TechreadMessageType {
    /// Returns true if the message carries the result of an ask.
    #[must_use]
    pub const fn is_ask_result(&self) -> bool {
        matches!(
            self,
            Self::AskMeasures
                | Self::AskCanvasThumbnail
                | Self::AskPageThumbnail
                | Self::AskSheetThumbnail
                | Self::AskResult
        )
    }

    /// Returns true if the message reports a failure of the submission.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Rejection | Self::ErrorInternal)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    fn test_ask_serializes_with_tag() {
        let json = serde_json::to_string(&TechreadAsk::CanvasThumbnail).unwrap();
        assert_eq!(json, r#"{"ask_type":"CANVAS_THUMBNAIL"}"#);
    }

    #[rstest]
    fn test_architecture_wire_names() {
        assert_eq!(
            serde_json::to_string(&TechreadArchitecture::CpuV1).unwrap(),
            r#""CPU_V1""#
        );
        assert_eq!(TechreadArchitecture::GpuV1.to_string(), "GPU_V1");
    }

    #[rstest]
    #[case(TechreadAction::Initialize, "initialize")]
    #[case(TechreadAction::Read, "read")]
    fn test_action_wire_names(#[case] action: TechreadAction, #[case] expected: &str) {
        assert_eq!(action.as_ref(), expected);
    }

    #[rstest]
    fn test_every_ask_has_an_ask_result_type() {
        for ask in TechreadAsk::iter() {
            assert!(ask.result_type().is_ask_result(), "{ask}");
        }
    }

    #[rstest]
    #[case("\"STARTED\"", TechreadMessageType::ProcessingStarted)]
    #[case("\"PROCESSING_STARTED\"", TechreadMessageType::ProcessingStarted)]
    #[case("\"ASK_RESULT\"", TechreadMessageType::AskResult)]
    fn test_message_type_aliases(#[case] raw: &str, #[case] expected: TechreadMessageType) {
        let parsed: TechreadMessageType = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn test_unknown_message_type_is_rejected() {
        assert!(serde_json::from_str::<TechreadMessageType>("\"ASK_GUESSWORK\"").is_err());
    }
}
