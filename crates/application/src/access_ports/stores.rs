use async_trait::async_trait;
use fixhub_core::{AccountId, AppResult};
use fixhub_domain::{CapabilityName, Permission, PermissionId, Role, RoleId, RoleMembership, RoleName};

use super::inputs::{
    CreatePermissionInput, CreateRoleInput, PermissionListQuery, RoleListQuery,
    UpdatePermissionInput, UpdateRoleInput,
};

/// Repository port for permission records.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Creates a permission; the name must be free among live rows.
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission>;

    /// Updates name and description of a live permission.
    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission>;

    /// Finds a live permission by id.
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Permission>;

    /// Finds a live permission by exact name.
    async fn find_permission_by_name(
        &self,
        name: &CapabilityName,
    ) -> AppResult<Option<Permission>>;

    /// Lists permissions for administrative views.
    async fn list_permissions(&self, query: PermissionListQuery) -> AppResult<Vec<Permission>>;

    /// Soft deletes a live permission, freeing its name.
    async fn soft_delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Restores a soft-deleted permission; fails if the name was retaken.
    async fn restore_permission(&self, permission_id: PermissionId) -> AppResult<Permission>;

    /// Permanently removes a live or trashed permission and its grants,
    /// returning the removed row.
    async fn force_delete_permission(&self, permission_id: PermissionId) -> AppResult<Permission>;

    /// Lists the names of all live permissions.
    async fn list_capability_names(&self) -> AppResult<Vec<CapabilityName>>;
}

/// Repository port for role records and their permission grants.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Creates a role; the name must be free among live rows.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role>;

    /// Updates name and description of a live role.
    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role>;

    /// Finds a live role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Role>;

    /// Finds a live role by exact name.
    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<Role>>;

    /// Lists roles for administrative views.
    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>>;

    /// Soft deletes a live role, removing it from authorization consideration.
    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Restores a soft-deleted role; fails if the name was retaken.
    async fn restore_role(&self, role_id: RoleId) -> AppResult<Role>;

    /// Permanently removes a live or trashed role, its grants and its
    /// memberships, returning the removed row.
    async fn force_delete_role(&self, role_id: RoleId) -> AppResult<Role>;

    /// Grants a live permission to a live role; duplicate grants are no-ops.
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Removes a grant; absent grants are no-ops.
    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Replaces the full grant set of a live role.
    async fn replace_grants(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()>;

    /// Lists the live permissions granted to a role.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;
}

/// Repository port for account role memberships.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Assigns a live role to an account; duplicate assignments are no-ops.
    async fn assign_role(&self, account_id: AccountId, role_id: RoleId) -> AppResult<()>;

    /// Removes a role from an account; absent memberships are no-ops.
    async fn revoke_role(&self, account_id: AccountId, role_id: RoleId) -> AppResult<()>;

    /// Lists the live roles an account currently holds.
    async fn list_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>>;

    /// Lists the memberships of a role.
    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<RoleMembership>>;
}
