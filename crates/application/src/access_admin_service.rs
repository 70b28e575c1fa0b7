use std::collections::HashSet;
use std::sync::Arc;

use fixhub_core::{AccountContext, AccountId, AppResult};
use fixhub_domain::{CapabilityName, MANAGE_ACCESS_CAPABILITY, PermissionId, RoleId, RoleMembership};

use crate::access_ports::{MembershipStore, PermissionStore, RoleListQuery, RoleStore};
use crate::authorization_service::{AuthorizationService, CapabilityRegistry};

mod memberships;
mod permissions;
mod roles;

/// Application service for administrative access-control changes.
///
/// Every operation requires the caller to hold the access administration
/// capability. Mutations keep the capability registry current and invalidate
/// cached decisions for the accounts whose effective permissions changed.
#[derive(Clone)]
pub struct AccessAdminService {
    authorization: AuthorizationService,
    permission_store: Arc<dyn PermissionStore>,
    role_store: Arc<dyn RoleStore>,
    membership_store: Arc<dyn MembershipStore>,
    registry: Arc<CapabilityRegistry>,
    manage_access: CapabilityName,
}

impl AccessAdminService {
    /// Creates the admin service over its stores and the resolver.
    pub fn new(
        authorization: AuthorizationService,
        permission_store: Arc<dyn PermissionStore>,
        role_store: Arc<dyn RoleStore>,
        membership_store: Arc<dyn MembershipStore>,
        registry: Arc<CapabilityRegistry>,
    ) -> AppResult<Self> {
        Ok(Self {
            authorization,
            permission_store,
            role_store,
            membership_store,
            registry,
            manage_access: CapabilityName::new(MANAGE_ACCESS_CAPABILITY)?,
        })
    }

    async fn require_manage_access(&self, context: &AccountContext) -> AppResult<()> {
        self.authorization
            .require_capability(context, &self.manage_access)
            .await
    }

    /// Accounts whose effective set references this permission through a role.
    async fn accounts_granted_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<AccountId>> {
        let query = RoleListQuery {
            granting_permission: Some(permission_id),
            limit: usize::MAX,
            ..RoleListQuery::default()
        };

        let mut accounts = HashSet::new();
        for role in self.role_store.list_roles(query).await? {
            for membership in self.membership_store.list_role_members(role.id()).await? {
                accounts.insert(membership.account_id());
            }
        }
        Ok(accounts.into_iter().collect())
    }

    async fn invalidate_accounts(&self, account_ids: Vec<AccountId>) -> AppResult<()> {
        for account_id in account_ids {
            self.authorization.invalidate_account(account_id).await?;
        }
        Ok(())
    }

    async fn invalidate_role_members(&self, role_id: RoleId) -> AppResult<()> {
        let members = self.membership_store.list_role_members(role_id).await?;
        self.invalidate_accounts(members.iter().map(RoleMembership::account_id).collect())
            .await
    }
}
