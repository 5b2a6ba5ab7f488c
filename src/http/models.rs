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

//! Data transfer objects for the Techread transfer channel.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::common::enums::FileRole;

/// Body of `POST /{version}/upload/{request_id}`.
///
/// Exactly one role is populated per request, holding the base64-encoded file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechreadUploadRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TechreadUploadRequest {
    /// Creates an upload request carrying `content` under `role`.
    #[must_use]
    pub fn new(role: FileRole, content: &[u8]) -> Self {
        let encoded = Some(STANDARD.encode(content));
        match role {
            FileRole::Drawing => Self {
                drawing: encoded,
                model: None,
            },
            FileRole::Model => Self {
                drawing: None,
                model: encoded,
            },
        }
    }

    /// Returns the serialized body size for `content_len` raw bytes uploaded under `role`.
    ///
    /// Allows rejecting oversize files before anything is encoded or sent.
    #[must_use]
    pub fn encoded_len(role: FileRole, content_len: usize) -> usize {
        // {"<role>":"<base64>"}
        let base64_len = content_len.div_ceil(3) * 4;
        role.as_ref().len() + base64_len + 7
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_upload_request_serializes_single_role() {
        let request = TechreadUploadRequest::new(FileRole::Drawing, b"%PDF-1.7 test");
        let json = serde_json::to_string(&request).unwrap();

        assert_eq!(json, r#"{"drawing":"JVBERi0xLjcgdGVzdA=="}"#);
    }

    #[rstest]
    #[case(FileRole::Drawing, 0)]
    #[case(FileRole::Drawing, 13)]
    #[case(FileRole::Model, 2048)]
    #[case(FileRole::Model, 2050)]
    fn test_encoded_len_matches_serialized_body(#[case] role: FileRole, #[case] len: usize) {
        let content = vec![0xAB_u8; len];
        let body = serde_json::to_vec(&TechreadUploadRequest::new(role, &content)).unwrap();

        assert_eq!(TechreadUploadRequest::encoded_len(role, len), body.len());
    }
}
