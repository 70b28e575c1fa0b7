use fixhub_domain::{CapabilityName, PermissionId, RoleId, RoleName};

/// Default page size for administrative listings.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Input payload for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Capability name, unique among live permissions.
    pub name: CapabilityName,
    /// Optional administrative description.
    pub description: Option<String>,
}

/// Input payload for updating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePermissionInput {
    /// Replacement capability name.
    pub name: CapabilityName,
    /// Replacement description.
    pub description: Option<String>,
}

/// Query parameters for permission listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Case-insensitive substring filter over name and description.
    pub search: Option<String>,
    /// Restricts results to permissions granted to this role.
    pub granted_to_role: Option<RoleId>,
    /// Includes soft-deleted rows for administrative trash views.
    pub include_deleted: bool,
}

impl Default for PermissionListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            search: None,
            granted_to_role: None,
            include_deleted: false,
        }
    }
}

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name, unique among live roles.
    pub name: RoleName,
    /// Optional administrative description.
    pub description: Option<String>,
}

/// Input payload for updating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Replacement role name.
    pub name: RoleName,
    /// Replacement description.
    pub description: Option<String>,
}

/// Query parameters for role listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Case-insensitive substring filter over name and description.
    pub search: Option<String>,
    /// Restricts results to roles granted this permission.
    pub granting_permission: Option<PermissionId>,
    /// Includes soft-deleted rows for administrative trash views.
    pub include_deleted: bool,
}

impl Default for RoleListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            search: None,
            granting_permission: None,
            include_deleted: false,
        }
    }
}
