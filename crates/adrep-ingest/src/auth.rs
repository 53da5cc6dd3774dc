//! Shared credential management
//!
//! Many concurrent tasks share one credential. When it expires mid-run the
//! refresh must happen once, not once per task: the lock is held across the
//! token issue call, and a generation counter lets waiters that queued
//! behind the refresh reuse the new credential instead of issuing again.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
#[error("token issue failed: {0}")]
pub struct AuthError(pub String);

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn issue(&self) -> Result<String, AuthError>;
}

/// A token plus the refresh generation it came from.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub generation: u64,
}

pub struct SharedCredentials {
    source: Box<dyn TokenSource>,
    state: Mutex<Credential>,
}

impl SharedCredentials {
    pub fn new(source: Box<dyn TokenSource>, initial_token: String) -> Self {
        Self {
            source,
            state: Mutex::new(Credential {
                token: initial_token,
                generation: 0,
            }),
        }
    }

    pub async fn current(&self) -> Credential {
        self.state.lock().await.clone()
    }

    /// Refresh the credential the caller observed failing. If another task
    /// already refreshed past `seen`, the existing credential is returned
    /// without a new issue call.
    pub async fn refresh_after(&self, seen: &Credential) -> Result<Credential, AuthError> {
        let mut state = self.state.lock().await;
        if state.generation > seen.generation {
            debug!(generation = state.generation, "reusing refreshed credential");
            return Ok(state.clone());
        }
        let token = self.source.issue().await?;
        state.token = token;
        state.generation += 1;
        info!(generation = state.generation, "credential refreshed");
        Ok(state.clone())
    }
}

/// Token source backed by a fixed string, for setups where the token is
/// provisioned out of band and refresh means re-reading it.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn issue(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        issued: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn issue(&self) -> Result<String, AuthError> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{n}"))
        }
    }

    #[tokio::test]
    async fn test_concurrent_refresh_issues_once() {
        let issued = Arc::new(AtomicUsize::new(0));
        let creds = Arc::new(SharedCredentials::new(
            Box::new(CountingSource {
                issued: issued.clone(),
            }),
            "initial".to_string(),
        ));

        let seen_a = creds.current().await;
        let seen_b = creds.current().await;

        let (a, b) = tokio::join!(creds.refresh_after(&seen_a), creds.refresh_after(&seen_b));
        let a = a.unwrap();
        let b = b.unwrap();

        // One caller performed the refresh; the other reused its result.
        assert_eq!(issued.load(Ordering::SeqCst), 1);
        assert_eq!(a.token, b.token);
        assert_eq!(a.generation, 1);
        assert_eq!(b.generation, 1);
    }

    #[tokio::test]
    async fn test_stale_observation_after_refresh_reuses() {
        let issued = Arc::new(AtomicUsize::new(0));
        let creds = SharedCredentials::new(
            Box::new(CountingSource {
                issued: issued.clone(),
            }),
            "initial".to_string(),
        );

        let stale = creds.current().await;
        creds.refresh_after(&stale).await.unwrap();

        // Still holding the generation-0 view; no second issue happens.
        let reused = creds.refresh_after(&stale).await.unwrap();
        assert_eq!(issued.load(Ordering::SeqCst), 1);
        assert_eq!(reused.generation, 1);
    }

    #[tokio::test]
    async fn test_fresh_observation_triggers_new_refresh() {
        let issued = Arc::new(AtomicUsize::new(0));
        let creds = SharedCredentials::new(
            Box::new(CountingSource {
                issued: issued.clone(),
            }),
            "initial".to_string(),
        );

        let first = creds.current().await;
        let refreshed = creds.refresh_after(&first).await.unwrap();
        let again = creds.refresh_after(&refreshed).await.unwrap();

        assert_eq!(issued.load(Ordering::SeqCst), 2);
        assert_eq!(again.generation, 2);
    }
}
