/// Outcome of one capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The check passed.
    Granted(GrantReason),
    /// The check failed.
    Denied(DenialReason),
}

impl AccessDecision {
    /// Returns whether the decision grants access.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Why a check granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantReason {
    /// The account holds the configured super-admin role.
    SuperAdmin,
    /// A held role grants the capability.
    RolePermission,
    /// A policy hook allowed the concrete record.
    Policy,
}

/// Why a check denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The caller is not authenticated.
    Anonymous,
    /// The capability name is not registered.
    UnknownCapability,
    /// No held role grants the capability.
    MissingCapability,
}
