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

//! Bearer token acquisition and refresh.
//!
//! - [`IdentityService`]: seam to the external identity service.
//! - [`CognitoIdentityService`]: user-pool login over the Cognito JSON API.
//! - [`CredentialProvider`]: holds the current token and serializes refreshes.

pub mod cognito;
pub mod error;
pub mod provider;

pub use cognito::CognitoIdentityService;
pub use error::TechreadAuthError;
pub use provider::{BearerToken, CredentialProvider, IdentityService};
