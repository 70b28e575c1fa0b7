//! Permission entity and capability naming rules.

use chrono::{DateTime, Utc};
use fixhub_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters in a capability name.
pub const CAPABILITY_NAME_MAX_CHARS: usize = 150;

/// Unique identifier for a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a new random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
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

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated capability name.
///
/// Names are trimmed on construction and compared case-sensitively, so
/// `"View Contacts"` and `"view contacts"` are distinct capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityName(NonEmptyString);

impl CapabilityName {
    /// Creates a validated capability name.
    ///
    /// Surrounding whitespace is removed; interior casing and spacing are
    /// preserved exactly as entered.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "capability name must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > CAPABILITY_NAME_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "capability name must not exceed {CAPABILITY_NAME_MAX_CHARS} characters"
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

impl From<CapabilityName> for String {
    fn from(value: CapabilityName) -> Self {
        value.0.into()
    }
}

impl std::fmt::Display for CapabilityName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// A named capability that roles can grant to accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: CapabilityName,
    description: Option<String>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Permission {
    /// Creates a new permission with a fresh identifier.
    #[must_use]
    pub fn new(name: CapabilityName, description: Option<String>) -> Self {
        Self {
            id: PermissionId::new(),
            name,
            description,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Reconstructs a permission from stored values.
    #[must_use]
    pub fn from_parts(
        id: PermissionId,
        name: CapabilityName,
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

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &CapabilityName {
        &self.name
    }

    /// Returns the administrative description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns when the permission was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the permission was soft deleted, if it was.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the permission is currently soft deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Replaces the capability name.
    pub fn rename(&mut self, name: CapabilityName) {
        self.name = name;
    }

    /// Replaces the administrative description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Marks the permission as soft deleted, keeping the first deletion time.
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
