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

//! Core constants shared across the Techread client components.

/// Default host serving the command channel (WebSocket).
pub const TECHREAD_WS_HOST: &str = "ws-api.techread.io";

/// Default host serving the transfer channel (uploads and payload downloads).
pub const TECHREAD_HTTP_HOST: &str = "files-api.techread.io";

/// Default protocol version path segment.
pub const TECHREAD_API_VERSION: &str = "v1";

/// Gateway envelope message that signals a rejected (unauthorized) action.
pub const GATEWAY_FORBIDDEN: &str = "Forbidden";

/// Maximum size in bytes of any single message or upload body accepted by the service.
pub const TECHREAD_MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Default HTTP request timeout in seconds.
pub const TECHREAD_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default time allowed for the closing handshake of the command channel, in seconds.
pub const TECHREAD_WS_CLOSE_TIMEOUT_SECS: u64 = 10;

/// Default license file consulted before the process environment.
pub const TECHREAD_LICENSE_FILE: &str = ".techread";

// Identity service (Cognito user pools)
pub const COGNITO_TARGET_INITIATE_AUTH: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
pub const COGNITO_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
pub const COGNITO_AUTH_FLOW: &str = "USER_PASSWORD_AUTH";

// Environment variables
pub const ENV_SERVER_HTTPS: &str = "TECHREAD_SERVER_HTTPS";
pub const ENV_SERVER_WSS: &str = "TECHREAD_SERVER_WSS";
pub const ENV_VERSION: &str = "TECHREAD_VERSION";
pub const ENV_AUTH_REGION: &str = "TECHREAD_AUTH_REGION";
pub const ENV_AUTH_POOL_ID: &str = "TECHREAD_AUTH_POOL_ID";
pub const ENV_AUTH_CLIENT_ID: &str = "TECHREAD_AUTH_CLIENT_ID";
pub const ENV_AUTH_CLIENT_SECRET: &str = "TECHREAD_AUTH_CLIENT_SECRET";
pub const ENV_AUTH_USERNAME: &str = "TECHREAD_AUTH_USERNAME";
pub const ENV_AUTH_PASSWORD: &str = "TECHREAD_AUTH_PASSWORD";
