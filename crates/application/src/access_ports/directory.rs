use async_trait::async_trait;
use fixhub_core::{AccountId, AppResult};
use fixhub_domain::{Permission, Role, RoleId};

/// Read-side port answering role and permission lookups during checks.
///
/// Implementations report transient failure as `AppError::Unavailable` so
/// callers can tell "not authorized" from "could not determine authorization".
#[async_trait]
pub trait AccessDirectory: Send + Sync {
    /// Lists the live roles currently held by an account.
    async fn find_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>>;

    /// Lists the live permissions granted to a role.
    async fn find_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;
}
