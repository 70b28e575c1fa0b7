use fixhub_core::AccountContext;
use fixhub_domain::{CapabilityName, Role};
use tracing::info;

use super::*;

impl AccessAdminService {
    /// Assigns a role to an account.
    pub async fn assign_role_to_account(
        &self,
        context: &AccountContext,
        account_id: AccountId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        self.membership_store.assign_role(account_id, role_id).await?;
        self.authorization.invalidate_account(account_id).await?;

        info!(account_id = %account_id, role_id = %role_id, "assigned role to account");
        Ok(())
    }

    /// Removes a role from an account.
    pub async fn revoke_role_from_account(
        &self,
        context: &AccountContext,
        account_id: AccountId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        self.membership_store.revoke_role(account_id, role_id).await?;
        self.authorization.invalidate_account(account_id).await?;

        info!(account_id = %account_id, role_id = %role_id, "revoked role from account");
        Ok(())
    }

    /// Lists the live roles an account holds.
    pub async fn account_roles(
        &self,
        context: &AccountContext,
        account_id: AccountId,
    ) -> AppResult<Vec<Role>> {
        self.require_manage_access(context).await?;
        self.membership_store.list_account_roles(account_id).await
    }

    /// Lists the memberships of a role.
    pub async fn role_members(
        &self,
        context: &AccountContext,
        role_id: RoleId,
    ) -> AppResult<Vec<RoleMembership>> {
        self.require_manage_access(context).await?;
        self.membership_store.list_role_members(role_id).await
    }

    /// Returns the effective capability union for an account.
    pub async fn account_capabilities(
        &self,
        context: &AccountContext,
        account_id: AccountId,
    ) -> AppResult<Vec<CapabilityName>> {
        self.require_manage_access(context).await?;
        self.authorization.effective_capabilities(account_id).await
    }
}
