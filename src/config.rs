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

//! Configuration structures for the Techread client.

use std::{collections::HashMap, path::Path};

use crate::{
    common::{
        consts::{
            ENV_AUTH_CLIENT_ID, ENV_AUTH_CLIENT_SECRET, ENV_AUTH_PASSWORD, ENV_AUTH_POOL_ID,
            ENV_AUTH_REGION, ENV_AUTH_USERNAME, ENV_SERVER_HTTPS, ENV_SERVER_WSS, ENV_VERSION,
            TECHREAD_API_VERSION, TECHREAD_HTTP_HOST, TECHREAD_HTTP_TIMEOUT_SECS,
            TECHREAD_WS_CLOSE_TIMEOUT_SECS, TECHREAD_WS_HOST,
        },
        credential::Identity,
        enums::{TechreadArchitecture, TechreadAsk},
    },
    error::{TechreadError, TechreadResult},
};

/// Configuration for the Techread client.
#[derive(Clone, Debug)]
pub struct TechreadClientConfig {
    /// Host serving the command channel.
    pub server_wss: String,
    /// Host serving uploads and payload downloads.
    pub server_https: String,
    /// Protocol version path segment.
    pub version: String,
    /// Optional override for the full command channel URL.
    pub base_url_ws: Option<String>,
    /// Optional override for the full transfer base URL (including the version segment).
    pub base_url_http: Option<String>,
    /// Identity used to log in; required to build a client.
    pub identity: Option<Identity>,
    /// Optional override for the identity service endpoint.
    pub identity_endpoint: Option<String>,
    /// Processing architecture requested for every submission.
    pub architecture: TechreadArchitecture,
    /// Asks requested for every submission.
    pub asks: Vec<TechreadAsk>,
    /// Optional REST timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Optional time allowed for the command channel closing handshake, in seconds.
    pub ws_close_timeout_secs: Option<u64>,
}

impl Default for TechreadClientConfig {
    fn default() -> Self {
        Self {
            server_wss: TECHREAD_WS_HOST.to_string(),
            server_https: TECHREAD_HTTP_HOST.to_string(),
            version: TECHREAD_API_VERSION.to_string(),
            base_url_ws: None,
            base_url_http: None,
            identity: None,
            identity_endpoint: None,
            architecture: TechreadArchitecture::default(),
            asks: Vec::new(),
            http_timeout_secs: Some(TECHREAD_HTTP_TIMEOUT_SECS),
            ws_close_timeout_secs: Some(TECHREAD_WS_CLOSE_TIMEOUT_SECS),
        }
    }
}

impl TechreadClientConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the command channel URL, considering overrides.
    #[must_use]
    pub fn ws_url(&self) -> String {
        self.base_url_ws
            .clone()
            .unwrap_or_else(|| format!("wss://{}/{}", self.server_wss, self.version))
    }

    /// Returns the transfer base URL, considering overrides.
    #[must_use]
    pub fn http_base_url(&self) -> String {
        self.base_url_http
            .clone()
            .unwrap_or_else(|| format!("https://{}/{}", self.server_https, self.version))
    }

    /// Returns the identity service endpoint, considering overrides.
    #[must_use]
    pub fn identity_endpoint(&self) -> Option<String> {
        self.identity_endpoint.clone().or_else(|| {
            self.identity
                .as_ref()
                .map(|identity| format!("https://cognito-idp.{}.amazonaws.com/", identity.region()))
        })
    }

    /// Loads the configuration from `path` if the file exists, otherwise from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any required key is missing.
    pub fn load(path: impl AsRef<Path>) -> TechreadResult<Self> {
        let path = path.as_ref();
        if path.is_file() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_license_file(path)
        } else {
            Self::from_env()
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any required key is missing.
    pub fn from_env() -> TechreadResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from a dotenv-formatted license file.
    ///
    /// The process environment is not modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or any required key is missing.
    pub fn from_license_file(path: impl AsRef<Path>) -> TechreadResult<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .map_err(|e| TechreadError::Config(format!("{}: {e}", path.display())))?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|e| TechreadError::Config(format!("{}: {e}", path.display())))?;
        Self::from_lookup(|key| entries.get(key).cloned())
    }

    /// Builds the configuration from a key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error naming every required key that is missing or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TechreadResult<Self> {
        let mut missing = Vec::new();
        let mut require = |key: &'static str| match lookup(key) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let server_https = require(ENV_SERVER_HTTPS);
        let server_wss = require(ENV_SERVER_WSS);
        let version = require(ENV_VERSION);
        let region = require(ENV_AUTH_REGION);
        let pool_id = require(ENV_AUTH_POOL_ID);
        let client_id = require(ENV_AUTH_CLIENT_ID);
        let client_secret = require(ENV_AUTH_CLIENT_SECRET);
        let username = require(ENV_AUTH_USERNAME);
        let password = require(ENV_AUTH_PASSWORD);

        if !missing.is_empty() {
            return Err(TechreadError::Config(format!(
                "Missing configuration keys: {}",
                missing.join(", ")
            )));
        }

        let identity = Identity::new(region, pool_id, client_id, client_secret, username, password);
        identity.validate().map_err(TechreadError::Config)?;

        Ok(Self {
            server_wss,
            server_https,
            version,
            identity: Some(identity),
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_SERVER_HTTPS, "files.example.com"),
            (ENV_SERVER_WSS, "ws.example.com"),
            (ENV_VERSION, "v2"),
            (ENV_AUTH_REGION, "eu-central-1"),
            (ENV_AUTH_POOL_ID, "eu-central-1_AbCdEf"),
            (ENV_AUTH_CLIENT_ID, "client-id"),
            (ENV_AUTH_CLIENT_SECRET, "client-secret"),
            (ENV_AUTH_USERNAME, "alice"),
            (ENV_AUTH_PASSWORD, "hunter22"),
        ])
    }

    #[rstest]
    fn test_default_urls() {
        let config = TechreadClientConfig::default();

        assert_eq!(config.ws_url(), "wss://ws-api.techread.io/v1");
        assert_eq!(config.http_base_url(), "https://files-api.techread.io/v1");
        assert_eq!(config.identity_endpoint(), None);
        assert_eq!(config.architecture, TechreadArchitecture::CpuV1);
    }

    #[rstest]
    fn test_url_overrides() {
        let config = TechreadClientConfig {
            base_url_ws: Some("ws://127.0.0.1:9000/v1".to_string()),
            base_url_http: Some("http://127.0.0.1:9001/v1".to_string()),
            ..Default::default()
        };

        assert_eq!(config.ws_url(), "ws://127.0.0.1:9000/v1");
        assert_eq!(config.http_base_url(), "http://127.0.0.1:9001/v1");
    }

    #[rstest]
    fn test_from_lookup() {
        let env = full_env();
        let config =
            TechreadClientConfig::from_lookup(|key| env.get(key).map(ToString::to_string)).unwrap();

        assert_eq!(config.ws_url(), "wss://ws.example.com/v2");
        assert_eq!(config.http_base_url(), "https://files.example.com/v2");
        assert_eq!(
            config.identity_endpoint().as_deref(),
            Some("https://cognito-idp.eu-central-1.amazonaws.com/")
        );
        assert_eq!(config.identity.unwrap().username(), "alice");
    }

    #[rstest]
    fn test_from_lookup_names_missing_keys() {
        let mut env = full_env();
        env.remove(ENV_AUTH_PASSWORD);
        env.insert(ENV_VERSION, "  ");

        let err = TechreadClientConfig::from_lookup(|key| env.get(key).map(ToString::to_string))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: Missing configuration keys: TECHREAD_VERSION, TECHREAD_AUTH_PASSWORD"
        );
    }

    #[rstest]
    fn test_from_lookup_rejects_foreign_pool() {
        let mut env = full_env();
        env.insert(ENV_AUTH_POOL_ID, "us-east-1_AbCdEf");

        let err = TechreadClientConfig::from_lookup(|key| env.get(key).map(ToString::to_string))
            .unwrap_err();

        assert!(matches!(err, TechreadError::Config(_)));
    }

    #[rstest]
    fn test_from_license_file() {
        let path = std::env::temp_dir().join(format!("techread-{}.env", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        for (key, value) in full_env() {
            writeln!(file, "{key}={value}").unwrap();
        }
        drop(file);

        let config = TechreadClientConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server_wss, "ws.example.com");
        assert_eq!(config.version, "v2");
    }
}
