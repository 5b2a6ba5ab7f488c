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

//! Identity fields used to obtain bearer tokens from the Techread identity service.

use core::fmt::Debug;

use base64::{Engine, engine::general_purpose::STANDARD};
use ring::hmac;
use zeroize::ZeroizeOnDrop;

/// Long-lived identity used to log in to the Techread identity service (a Cognito user pool).
///
/// The client secret and password never appear in [`Debug`] output and are zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Identity {
    region: Box<str>,
    pool_id: Box<str>,
    client_id: Box<str>,
    client_secret: Box<str>,
    username: Box<str>,
    password: Box<str>,
}

impl Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Identity))
            .field("region", &self.region)
            .field("pool_id", &self.pool_id)
            .field("client_id", &self.masked_client_id())
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Identity {
    /// Creates a new [`Identity`] instance.
    #[must_use]
    pub fn new(
        region: impl Into<String>,
        pool_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into().into_boxed_str(),
            pool_id: pool_id.into().into_boxed_str(),
            client_id: client_id.into().into_boxed_str(),
            client_secret: client_secret.into().into_boxed_str(),
            username: username.into().into_boxed_str(),
            password: password.into().into_boxed_str(),
        }
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the account password.
    ///
    /// # Safety
    ///
    /// The password should be handled carefully and never logged or exposed.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Validates the identity fields.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is empty, or if the pool id does not belong to the
    /// configured region (user pool ids have the form `<region>_<suffix>`).
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("region", &self.region),
            ("pool_id", &self.pool_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("password", &self.password),
        ];
        let empty: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !empty.is_empty() {
            return Err(format!("Empty identity fields: {}", empty.join(", ")));
        }

        match self.pool_id.split_once('_') {
            Some((region, suffix)) if region == &*self.region && !suffix.is_empty() => Ok(()),
            _ => Err(format!(
                "Pool id '{}' does not belong to region '{}'",
                self.pool_id, self.region
            )),
        }
    }

    /// Computes the `SECRET_HASH` proving knowledge of the client secret.
    ///
    /// Base64 of HMAC-SHA256 keyed with the client secret over `username + client_id`.
    #[must_use]
    pub fn secret_hash(&self) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, self.client_secret.as_bytes());
        let mut context = hmac::Context::with_key(&key);
        context.update(self.username.as_bytes());
        context.update(self.client_id.as_bytes());
        STANDARD.encode(context.sign().as_ref())
    }

    /// Returns a masked version of the client id for logging purposes.
    #[must_use]
    pub fn masked_client_id(&self) -> String {
        let id = self.client_id.as_ref();
        let len = id.len();

        if len <= 8 {
            "*".repeat(len)
        } else {
            format!("{}...{}", &id[..4], &id[len - 4..])
        }
    }
}
