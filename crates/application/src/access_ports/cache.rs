use async_trait::async_trait;
use fixhub_core::{AccountId, AppResult};
use fixhub_domain::CapabilityName;

/// Optional cache port memoizing authorization decisions.
///
/// Entries are keyed by account and exact capability name and are never
/// shared across accounts or capabilities.
#[async_trait]
pub trait DecisionCache: Send + Sync {
    /// Returns a cached decision for one account and capability.
    async fn get_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
    ) -> AppResult<Option<bool>>;

    /// Stores a decision for one account and capability with ttl.
    async fn set_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
        allowed: bool,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops every cached decision for an account.
    async fn invalidate_account(&self, account_id: AccountId) -> AppResult<()>;
}
