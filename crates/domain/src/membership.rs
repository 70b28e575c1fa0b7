//! Join records linking accounts to roles and roles to permissions.

use chrono::{DateTime, Utc};
use fixhub_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::{PermissionId, RoleId};

/// A permission granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    role_id: RoleId,
    permission_id: PermissionId,
}

impl RoleGrant {
    /// Creates a grant pairing a role with a permission.
    #[must_use]
    pub fn new(role_id: RoleId, permission_id: PermissionId) -> Self {
        Self {
            role_id,
            permission_id,
        }
    }

    /// Returns the granting role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the granted permission.
    #[must_use]
    pub fn permission_id(&self) -> PermissionId {
        self.permission_id
    }
}

/// A role held by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembership {
    account_id: AccountId,
    role_id: RoleId,
    assigned_at: DateTime<Utc>,
}

impl RoleMembership {
    /// Creates a membership assigned now.
    #[must_use]
    pub fn new(account_id: AccountId, role_id: RoleId) -> Self {
        Self {
            account_id,
            role_id,
            assigned_at: Utc::now(),
        }
    }

    /// Reconstructs a membership from stored values.
    #[must_use]
    pub fn from_parts(account_id: AccountId, role_id: RoleId, assigned_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            role_id,
            assigned_at,
        }
    }

    /// Returns the member account.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the held role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns when the role was assigned.
    #[must_use]
    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}
