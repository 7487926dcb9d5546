//! Bearer token supply.

use async_trait::async_trait;

use crate::error::FetchError;

/// Supplies the bearer token for backend calls.
///
/// Token retrieval may itself be remote and may fail; failures surface as
/// `FetchErrorKind::Unauthorized` before the dependent call is made.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current bearer token.
    async fn bearer_token(&self) -> Result<String, FetchError>;
}

/// A fixed token, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    /// Wrap an optional token; `None` means signed out.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String, FetchError> {
        self.token
            .clone()
            .ok_or_else(|| FetchError::unauthorized("not signed in"))
    }
}
