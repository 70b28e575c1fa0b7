use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fixhub_application::DecisionCache;
use fixhub_core::{AccountId, AppResult};
use fixhub_domain::CapabilityName;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct DecisionEntry {
    allowed: bool,
    expires_at: Instant,
}

/// In-memory decision cache for single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryDecisionCache {
    entries: RwLock<HashMap<(AccountId, String), DecisionEntry>>,
}

impl InMemoryDecisionCache {
    /// Creates an empty in-memory decision cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DecisionCache for InMemoryDecisionCache {
    async fn get_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
    ) -> AppResult<Option<bool>> {
        let key = (account_id, capability.as_str().to_owned());

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.allowed));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&key);
        }

        Ok(None)
    }

    async fn set_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
        allowed: bool,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries.write().await.insert(
            (account_id, capability.as_str().to_owned()),
            DecisionEntry {
                allowed,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate_account(&self, account_id: AccountId) -> AppResult<()> {
        self.entries
            .write()
            .await
            .retain(|(entry_account_id, _), _| *entry_account_id != account_id);

        Ok(())
    }
}
