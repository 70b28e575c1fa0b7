//! Role entity and naming rules.

use chrono::{DateTime, Utc};
use fixhub_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters in a role name.
pub const ROLE_NAME_MAX_CHARS: usize = 150;

/// Role name that bypasses capability checks entirely.
pub const SUPER_ADMIN_ROLE_NAME: &str = "super-admin";

/// Seeded role holding the read-side baseline capabilities.
pub const MANAGER_ROLE_NAME: &str = "manager";

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated role name, trimmed and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }

        if trimmed.chars().count() > ROLE_NAME_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_CHARS} characters"
            )));
        }

        Ok(Self(NonEmptyString::new(trimmed)?))
    }

    /// Returns the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0.into()
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// A named grouping of permissions assignable to accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: RoleName,
    description: Option<String>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    /// Creates a new role with a fresh identifier.
    #[must_use]
    pub fn new(name: RoleName, description: Option<String>) -> Self {
        Self {
            id: RoleId::new(),
            name,
            description,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Reconstructs a role from stored values.
    #[must_use]
    pub fn from_parts(
        id: RoleId,
        name: RoleName,
        description: Option<String>,
        created_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            deleted_at,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the administrative description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns when the role was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the role was soft deleted, if it was.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the role is currently soft deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Replaces the role name.
    pub fn rename(&mut self, name: RoleName) {
        self.name = name;
    }

    /// Replaces the administrative description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Marks the role as soft deleted, keeping the first deletion time.
    pub fn mark_deleted(&mut self) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
        }
    }

    /// Clears a previous soft delete.
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }
}
