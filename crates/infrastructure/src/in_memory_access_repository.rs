use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use fixhub_application::{
    AccessDirectory, CreatePermissionInput, CreateRoleInput, MembershipStore, PermissionListQuery,
    PermissionStore, RoleListQuery, RoleStore, UpdatePermissionInput, UpdateRoleInput,
};
use fixhub_core::{AccountId, AppError, AppResult};
use fixhub_domain::{
    CapabilityName, Permission, PermissionId, Role, RoleGrant, RoleId, RoleMembership, RoleName,
};
use tokio::sync::RwLock;

mod memberships;
mod roles;


/// In-memory access-control store backing every repository port.
///
/// A single instance serves `PermissionStore`, `RoleStore`, `MembershipStore`
/// and `AccessDirectory`, so grants and memberships written through the admin
/// surface are immediately visible to authorization checks.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    permissions: RwLock<HashMap<PermissionId, Permission>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    grants: RwLock<HashSet<RoleGrant>>,
    memberships: RwLock<HashMap<(AccountId, RoleId), RoleMembership>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn require_live_role(&self, role_id: RoleId) -> AppResult<()> {
        let roles = self.roles.read().await;
        match roles.get(&role_id) {
            Some(role) if !role.is_deleted() => Ok(()),
            _ => Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            ))),
        }
    }

    async fn require_live_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let permissions = self.permissions.read().await;
        match permissions.get(&permission_id) {
            Some(permission) if !permission.is_deleted() => Ok(()),
            _ => Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            ))),
        }
    }

    async fn collect_role_permissions(&self, role_id: RoleId) -> Vec<Permission> {
        let permission_ids: Vec<PermissionId> = {
            let grants = self.grants.read().await;
            grants
                .iter()
                .filter(|grant| grant.role_id() == role_id)
                .map(RoleGrant::permission_id)
                .collect()
        };

        let permissions = self.permissions.read().await;
        let mut granted: Vec<Permission> = permission_ids
            .into_iter()
            .filter_map(|permission_id| {
                permissions
                    .get(&permission_id)
                    .filter(|permission| !permission.is_deleted())
                    .cloned()
            })
            .collect();
        granted.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        granted
    }
}

fn matches_search(name: &str, description: Option<&str>, search: &str) -> bool {
    let needle = search.to_lowercase();

    name.to_lowercase().contains(needle.as_str())
        || description
            .map(|text| text.to_lowercase().contains(needle.as_str()))
            .unwrap_or(false)
}

#[async_trait]
impl PermissionStore for InMemoryAccessRepository {
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let mut permissions = self.permissions.write().await;

        let name_taken = permissions
            .values()
            .any(|permission| !permission.is_deleted() && permission.name() == &input.name);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.name
            )));
        }

        let permission = Permission::new(input.name, input.description);
        permissions.insert(permission.id(), permission.clone());

        Ok(permission)
    }

    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let mut permissions = self.permissions.write().await;

        let name_taken = permissions.values().any(|permission| {
            permission.id() != permission_id
                && !permission.is_deleted()
                && permission.name() == &input.name
        });
        if name_taken {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.name
            )));
        }

        let Some(permission) = permissions.get_mut(&permission_id) else {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        };
        if permission.is_deleted() {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        permission.rename(input.name);
        permission.set_description(input.description);

        Ok(permission.clone())
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        let permissions = self.permissions.read().await;

        permissions
            .get(&permission_id)
            .filter(|permission| !permission.is_deleted())
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    async fn find_permission_by_name(
        &self,
        name: &CapabilityName,
    ) -> AppResult<Option<Permission>> {
        let permissions = self.permissions.read().await;

        Ok(permissions
            .values()
            .find(|permission| !permission.is_deleted() && permission.name() == name)
            .cloned())
    }

    async fn list_permissions(&self, query: PermissionListQuery) -> AppResult<Vec<Permission>> {
        let granted: Option<HashSet<PermissionId>> = match query.granted_to_role {
            Some(role_id) => {
                let grants = self.grants.read().await;
                Some(
                    grants
                        .iter()
                        .filter(|grant| grant.role_id() == role_id)
                        .map(RoleGrant::permission_id)
                        .collect(),
                )
            }
            None => None,
        };

        let permissions = self.permissions.read().await;
        let mut listed: Vec<Permission> = permissions
            .values()
            .filter(|permission| {
                (query.include_deleted || !permission.is_deleted())
                    && granted
                        .as_ref()
                        .map(|ids| ids.contains(&permission.id()))
                        .unwrap_or(true)
                    && query
                        .search
                        .as_deref()
                        .map(|search| {
                            matches_search(
                                permission.name().as_str(),
                                permission.description(),
                                search,
                            )
                        })
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        Ok(listed
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn soft_delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;

        let Some(permission) = permissions.get_mut(&permission_id) else {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        };
        if permission.is_deleted() {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        permission.mark_deleted();
        Ok(())
    }

    async fn restore_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        let mut permissions = self.permissions.write().await;

        let restored_name = match permissions.get(&permission_id) {
            Some(permission) if permission.is_deleted() => permission.name().clone(),
            _ => {
                return Err(AppError::NotFound(format!(
                    "soft-deleted permission '{permission_id}' was not found"
                )));
            }
        };

        let name_taken = permissions.values().any(|permission| {
            permission.id() != permission_id
                && !permission.is_deleted()
                && permission.name() == &restored_name
        });
        if name_taken {
            return Err(AppError::Conflict(format!(
                "permission '{restored_name}' already exists"
            )));
        }

        let Some(permission) = permissions.get_mut(&permission_id) else {
            return Err(AppError::NotFound(format!(
                "soft-deleted permission '{permission_id}' was not found"
            )));
        };
        permission.restore();

        Ok(permission.clone())
    }

    async fn force_delete_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        let removed = {
            let mut permissions = self.permissions.write().await;
            permissions.remove(&permission_id).ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })?
        };

        self.grants
            .write()
            .await
            .retain(|grant| grant.permission_id() != permission_id);

        Ok(removed)
    }

    async fn list_capability_names(&self) -> AppResult<Vec<CapabilityName>> {
        let permissions = self.permissions.read().await;

        let mut names: Vec<CapabilityName> = permissions
            .values()
            .filter(|permission| !permission.is_deleted())
            .map(|permission| permission.name().clone())
            .collect();
        names.sort_by(|left, right| left.as_str().cmp(right.as_str()));

        Ok(names)
    }
}
