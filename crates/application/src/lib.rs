//! Application services and ports for access control.

#![forbid(unsafe_code)]

mod access_admin_service;
mod access_gate;
mod access_ports;
mod authorization_service;
mod bootstrap;

pub use access_admin_service::AccessAdminService;
pub use access_gate::AccessGate;
pub use access_ports::{
    AccessDirectory, CreatePermissionInput, CreateRoleInput, DEFAULT_LIST_LIMIT, DecisionCache,
    EntityRef, MembershipStore, PermissionListQuery, PermissionStore, PolicyDecision, PolicyHook,
    RoleListQuery, RoleStore, UpdatePermissionInput, UpdateRoleInput,
};
pub use authorization_service::{
    AccessDecision, AuthorizationConfig, AuthorizationService, CapabilityRegistry,
    DEFAULT_DECISION_TTL_SECONDS, DenialReason, GrantReason,
};
pub use bootstrap::{SeedReport, seed_baseline_access};
