//! Redis-backed authorization decision cache.

use async_trait::async_trait;
use fixhub_application::DecisionCache;
use fixhub_core::{AccountId, AppError, AppResult};
use fixhub_domain::CapabilityName;
use redis::AsyncCommands;

/// Redis implementation of the decision cache port for shared deployments.
#[derive(Clone)]
pub struct RedisDecisionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisDecisionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, account_id: AccountId, capability: &CapabilityName) -> String {
        format!(
            "{}:account={}:capability={}",
            self.key_prefix,
            account_id,
            capability.as_str()
        )
    }

    fn account_pattern(&self, account_id: AccountId) -> String {
        format!("{}:account={}:capability=*", self.key_prefix, account_id)
    }

    fn encode_decision(allowed: bool) -> &'static str {
        if allowed { "1" } else { "0" }
    }

    fn decode_decision(value: &str) -> AppResult<bool> {
        match value {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(AppError::Internal(format!(
                "invalid decision cache value '{other}'"
            ))),
        }
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl DecisionCache for RedisDecisionCache {
    async fn get_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
    ) -> AppResult<Option<bool>> {
        let key = self.key_for(account_id, capability);
        let mut connection = self.connection().await?;

        let encoded: Option<String> = connection.get(key).await.map_err(|error| {
            AppError::Unavailable(format!("failed to read decision cache entry: {error}"))
        })?;

        encoded.as_deref().map(Self::decode_decision).transpose()
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

        let key = self.key_for(account_id, capability);
        let mut connection = self.connection().await?;

        connection
            .set_ex(key, Self::encode_decision(allowed), u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to write decision cache entry: {error}"))
            })
    }

    async fn invalidate_account(&self, account_id: AccountId) -> AppResult<()> {
        let pattern = self.account_pattern(account_id);
        let mut connection = self.connection().await?;

        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern.as_str())
                .arg("COUNT")
                .arg(100)
                .query_async(&mut connection)
                .await
                .map_err(|error| {
                    AppError::Unavailable(format!(
                        "failed to scan decision cache entries: {error}"
                    ))
                })?;

            if !keys.is_empty() {
                let _: usize = connection.del(keys).await.map_err(|error| {
                    AppError::Unavailable(format!(
                        "failed to drop decision cache entries: {error}"
                    ))
                })?;
            }

            cursor = next_cursor;
            if cursor == 0 {
                return Ok(());
            }
        }
    }
}
