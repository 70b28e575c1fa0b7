//! Access-control entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod membership;
mod permission;
mod role;

pub use catalog::{
    BaselineCapability, MANAGE_ACCESS_CAPABILITY, baseline_capabilities, manager_capability_names,
};
pub use membership::{RoleGrant, RoleMembership};
pub use permission::{CAPABILITY_NAME_MAX_CHARS, CapabilityName, Permission, PermissionId};
pub use role::{
    MANAGER_ROLE_NAME, ROLE_NAME_MAX_CHARS, Role, RoleId, RoleName, SUPER_ADMIN_ROLE_NAME,
};
