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

//! Single-flight bearer token provider shared by every session of a client.

use std::{
    fmt::Debug,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;

use super::error::TechreadAuthError;
use crate::common::credential::Identity;

/// Short-lived bearer token issued by the identity service.
///
/// Cloning is cheap. The token value never appears in [`Debug`] output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Arc<str>);

impl Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(stringify!(BearerToken))
            .field(&"<redacted>")
            .finish()
    }
}

impl BearerToken {
    /// Creates a new [`BearerToken`] from the raw token value.
    #[must_use]
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value for the `Authorization` header.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// External service issuing bearer tokens for an [`Identity`].
#[async_trait]
pub trait IdentityService: Debug + Send + Sync {
    /// Logs in with `identity` and returns the raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the login or cannot be reached.
    async fn authenticate(&self, identity: &Identity) -> Result<String, TechreadAuthError>;
}

/// Holds the current bearer token and refreshes it on demand.
///
/// Logins are single-flight: concurrent callers queue on one lock, and a refresh requested for
/// a token that has already been replaced returns the replacement without another login.
pub struct CredentialProvider {
    identity: Identity,
    service: Arc<dyn IdentityService>,
    token: RwLock<Option<BearerToken>>,
    login_lock: tokio::sync::Mutex<()>,
    login_count: AtomicU64,
}

impl Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CredentialProvider))
            .field("identity", &self.identity)
            .field("service", &self.service)
            .field("has_token", &self.token().is_some())
            .field("login_count", &self.login_count())
            .finish()
    }
}

impl CredentialProvider {
    /// Creates a new [`CredentialProvider`] with no token held.
    #[must_use]
    pub fn new(identity: Identity, service: Arc<dyn IdentityService>) -> Self {
        Self {
            identity,
            service,
            token: RwLock::new(None),
            login_lock: tokio::sync::Mutex::new(()),
            login_count: AtomicU64::new(0),
        }
    }

    /// Returns the current token, or `None` if never logged in.
    #[must_use]
    pub fn token(&self) -> Option<BearerToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of successful logins performed so far.
    #[must_use]
    pub fn login_count(&self) -> u64 {
        self.login_count.load(Ordering::Relaxed)
    }

    /// Logs in and replaces the held token.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity service rejects the login.
    pub async fn login(&self) -> Result<BearerToken, TechreadAuthError> {
        let _guard = self.login_lock.lock().await;
        self.login_locked().await
    }

    /// Returns the held token, logging in first if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a login is needed and fails.
    pub async fn ensure_token(&self) -> Result<BearerToken, TechreadAuthError> {
        if let Some(token) = self.token() {
            return Ok(token);
        }

        let _guard = self.login_lock.lock().await;
        if let Some(token) = self.token() {
            return Ok(token);
        }
        self.login_locked().await
    }

    /// Replaces `stale` with a fresh token.
    ///
    /// If another caller already replaced `stale` the held token is returned as is, so a burst
    /// of rejections for the same token results in exactly one login.
    ///
    /// # Errors
    ///
    /// Returns an error if a login is needed and fails.
    pub async fn refresh(
        &self,
        stale: Option<&BearerToken>,
    ) -> Result<BearerToken, TechreadAuthError> {
        let _guard = self.login_lock.lock().await;
        if let Some(current) = self.token()
            && stale != Some(&current)
        {
            tracing::debug!("Token already refreshed by a concurrent caller");
            return Ok(current);
        }
        self.login_locked().await
    }

    async fn login_locked(&self) -> Result<BearerToken, TechreadAuthError> {
        tracing::debug!(
            username = self.identity.username(),
            client_id = %self.identity.masked_client_id(),
            "Logging in to identity service"
        );

        let token = match self.service.authenticate(&self.identity).await {
            Ok(raw) => BearerToken::new(raw),
            Err(e) => {
                tracing::error!("Login failed: {e}");
                return Err(e);
            }
        };

        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        let count = self.login_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(login_count = count, "Obtained bearer token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::AtomicUsize, time::Duration};

    use rstest::rstest;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingService {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl IdentityService for CountingService {
        async fn authenticate(&self, _identity: &Identity) -> Result<String, TechreadAuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(TechreadAuthError::MissingToken("challenge".to_string()));
            }
            Ok(format!("token-{n}"))
        }
    }

    fn identity() -> Identity {
        Identity::new(
            "eu-central-1",
            "eu-central-1_AbCdEf",
            "client-id",
            "client-secret",
            "alice",
            "hunter22",
        )
    }

    fn provider(service: Arc<CountingService>) -> Arc<CredentialProvider> {
        Arc::new(CredentialProvider::new(identity(), service))
    }

    #[rstest]
    fn test_bearer_token_header_and_debug() {
        let token = BearerToken::new("abc123def456");

        assert_eq!(token.authorization_value(), "Bearer abc123def456");
        assert!(!format!("{token:?}").contains("abc123"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_token_is_none_before_login() {
        let provider = provider(Arc::new(CountingService::default()));
        assert!(provider.token().is_none());
        assert_eq!(provider.login_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_replaces_token() {
        let provider = provider(Arc::new(CountingService::default()));

        let first = provider.login().await.unwrap();
        let second = provider.login().await.unwrap();

        assert_eq!(first.as_str(), "token-1");
        assert_eq!(second.as_str(), "token-2");
        assert_eq!(provider.token(), Some(second));
    }

    #[rstest]
    #[tokio::test]
    async fn test_concurrent_ensure_token_logs_in_once() {
        let service = Arc::new(CountingService::default());
        let provider = provider(service.clone());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.ensure_token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().as_str(), "token-1");
        }

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_burst_of_refreshes_for_same_token_logs_in_once() {
        let service = Arc::new(CountingService::default());
        let provider = provider(service.clone());
        let stale = provider.login().await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                let stale = stale.clone();
                tokio::spawn(async move { provider.refresh(Some(&stale)).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().as_str(), "token-2");
        }

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.login_count(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_failed_login_keeps_previous_token() {
        let service = Arc::new(CountingService {
            fail: true,
            ..Default::default()
        });
        let provider = provider(service);

        let err = provider.ensure_token().await.unwrap_err();

        assert!(matches!(err, TechreadAuthError::MissingToken(_)));
        assert!(provider.token().is_none());
        assert_eq!(provider.login_count(), 0);
    }
}
