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

//! HTTP client for the Techread transfer channel.
//!
//! Uploads files for a request id and downloads payloads referenced by result messages. Every
//! request carries the current bearer token, so payload URLs are checked against the configured
//! host before anything is sent.

use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use reqwest::{
    Response, StatusCode, Url,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use uuid::Uuid;

use super::{error::TechreadHttpError, models::TechreadUploadRequest};
use crate::{auth::CredentialProvider, common::enums::FileRole};

/// Provides an HTTP client for uploads and payload downloads.
#[derive(Debug, Clone)]
pub struct TechreadHttpClient {
    base_url: Url,
    client: reqwest::Client,
    credentials: Arc<CredentialProvider>,
}

impl TechreadHttpClient {
    /// Creates a new [`TechreadHttpClient`] rooted at `base_url` (host plus version prefix).
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL or the HTTP client cannot
    /// be built.
    pub fn new(
        base_url: &str,
        credentials: Arc<CredentialProvider>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, TechreadHttpError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TechreadHttpError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.host_str().is_none() {
            return Err(TechreadHttpError::InvalidUrl(format!(
                "{base_url}: expected an absolute http(s) URL"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url,
            client: builder.build()?,
            credentials,
        })
    }

    /// Returns the base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the trusted `host:port` authority.
    #[must_use]
    pub fn authority(&self) -> String {
        authority(&self.base_url)
    }

    /// Uploads `content` under `role` for `request_id`.
    ///
    /// Absent content is a successful no-op without any network call. No retries are made.
    ///
    /// # Errors
    ///
    /// - [`TechreadHttpError::Unauthorized`] on 401/403.
    /// - [`TechreadHttpError::UnexpectedStatus`] on any other non-success status.
    /// - [`TechreadHttpError::NetworkError`] if the request fails in transit.
    pub async fn upload(
        &self,
        request_id: Uuid,
        role: FileRole,
        content: Option<&[u8]>,
    ) -> Result<(), TechreadHttpError> {
        let Some(content) = content else {
            tracing::debug!(%request_id, %role, "No content, skipping upload");
            return Ok(());
        };

        let url = self.endpoint_url(&format!("upload/{request_id}"));
        let body = serde_json::to_vec(&TechreadUploadRequest::new(role, content))?;
        tracing::debug!(%request_id, %role, bytes = body.len(), "Uploading to {url}");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.authorization()?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(&url, response).await?;

        tracing::info!(%request_id, %role, "Uploaded {} bytes", content.len());
        Ok(())
    }

    /// Downloads and decodes the payload at `payload_url`.
    ///
    /// # Errors
    ///
    /// - [`TechreadHttpError::UntrustedPayloadUrl`] if the URL is outside the configured
    ///   authority; no request is made.
    /// - [`TechreadHttpError::Unauthorized`] on 401/403.
    /// - [`TechreadHttpError::UnexpectedStatus`] on any other non-success status.
    /// - [`TechreadHttpError::DecodeError`] if the body is not base64.
    pub async fn download(&self, payload_url: &str) -> Result<Bytes, TechreadHttpError> {
        let url = self.verify_payload_url(payload_url)?;
        tracing::debug!("Downloading payload from {url}");

        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.authorization()?)
            .send()
            .await?;
        let response = check_status(url.as_str(), response).await?;

        let text = response.text().await?;
        let payload = STANDARD.decode(text.trim())?;
        tracing::debug!("Downloaded {} payload bytes from {url}", payload.len());
        Ok(Bytes::from(payload))
    }

    /// Verifies that `payload_url` targets the configured transfer authority.
    ///
    /// The scheme, host and port must match the base URL and the URL must not carry user
    /// info. Any mismatch is logged as an error.
    ///
    /// # Errors
    ///
    /// Returns [`TechreadHttpError::UntrustedPayloadUrl`] on mismatch or if the URL cannot be
    /// parsed.
    pub fn verify_payload_url(&self, payload_url: &str) -> Result<Url, TechreadHttpError> {
        let trusted = Url::parse(payload_url).ok().filter(|url| {
            url.scheme() == self.base_url.scheme()
                && url.username().is_empty()
                && url.password().is_none()
                && url.host_str().is_some()
                && url.host_str() == self.base_url.host_str()
                && url.port_or_known_default() == self.base_url.port_or_known_default()
        });

        trusted.ok_or_else(|| {
            let expected = self.authority();
            tracing::error!(
                payload_url,
                expected = %expected,
                "Refusing to download payload from untrusted authority"
            );
            TechreadHttpError::UntrustedPayloadUrl {
                url: payload_url.to_string(),
                expected,
            }
        })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn authorization(&self) -> Result<String, TechreadHttpError> {
        self.credentials
            .token()
            .map(|token| token.authorization_value())
            .ok_or(TechreadHttpError::MissingToken)
    }
}

fn authority(url: &Url) -> String {
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response, TechreadHttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "Request to {url} failed: {body}");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TechreadHttpError::Unauthorized {
            status: status.as_u16(),
            url: url.to_string(),
        }),
        _ => Err(TechreadHttpError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rstest::rstest;
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        auth::{IdentityService, TechreadAuthError},
        common::credential::Identity,
    };

    #[derive(Debug)]
    struct StaticService;

    #[async_trait]
    impl IdentityService for StaticService {
        async fn authenticate(&self, _identity: &Identity) -> Result<String, TechreadAuthError> {
            Ok("token".to_string())
        }
    }

    fn client(base_url: &str) -> TechreadHttpClient {
        let identity = Identity::new("r", "r_p", "c", "s", "u", "p");
        let credentials = Arc::new(CredentialProvider::new(identity, Arc::new(StaticService)));
        TechreadHttpClient::new(base_url, credentials, Some(5)).unwrap()
    }

    #[rstest]
    #[case("https://files.example.com/v1/payload/1")]
    #[case("https://FILES.example.com:443/v1/payload/1")]
    #[case("https://files.example.com/other/path?x=1")]
    fn test_verify_payload_url_accepts_same_authority(#[case] url: &str) {
        assert!(client("https://files.example.com/v1").verify_payload_url(url).is_ok());
    }

    #[rstest]
    #[case("https://evil.example.com/v1/payload/1")]
    #[case("https://files.example.com.evil.example/v1/payload/1")]
    #[case("https://files.example.com:8443/v1/payload/1")]
    #[case("http://files.example.com/v1/payload/1")]
    #[case("https://user@files.example.com/v1/payload/1")]
    #[case("https://files.example.com@evil.example.com/v1/payload/1")]
    #[case("/v1/payload/1")]
    #[case("not a url")]
    fn test_verify_payload_url_rejects_foreign_authority(#[case] url: &str) {
        let err = client("https://files.example.com/v1")
            .verify_payload_url(url)
            .unwrap_err();

        assert!(matches!(
            err,
            TechreadHttpError::UntrustedPayloadUrl { ref expected, .. } if expected == "files.example.com:443"
        ));
    }

    #[rstest]
    #[traced_test]
    fn test_verify_payload_url_logs_rejection() {
        let _ = client("https://files.example.com/v1")
            .verify_payload_url("https://evil.example.com/v1/payload/1");

        assert!(logs_contain("Refusing to download payload from untrusted authority"));
    }

    #[rstest]
    fn test_endpoint_url() {
        let client = client("http://127.0.0.1:8080/v1/");
        assert_eq!(client.endpoint_url("upload/abc"), "http://127.0.0.1:8080/v1/upload/abc");
        assert_eq!(client.authority(), "127.0.0.1:8080");
    }

    #[rstest]
    #[case("ftp://files.example.com/v1")]
    #[case("files.example.com/v1")]
    fn test_new_rejects_non_http_base_url(#[case] base_url: &str) {
        let identity = Identity::new("r", "r_p", "c", "s", "u", "p");
        let credentials = Arc::new(CredentialProvider::new(identity, Arc::new(StaticService)));

        assert!(matches!(
            TechreadHttpClient::new(base_url, credentials, None),
            Err(TechreadHttpError::InvalidUrl(_))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn test_upload_without_token_is_missing_token() {
        let client = client("http://127.0.0.1:9/v1");
        let err = client
            .upload(Uuid::new_v4(), FileRole::Drawing, Some(b"data"))
            .await
            .unwrap_err();

        assert!(matches!(err, TechreadHttpError::MissingToken));
    }
}
