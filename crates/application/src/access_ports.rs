mod cache;
mod directory;
mod inputs;
mod policy;
mod stores;

pub use cache::DecisionCache;
pub use directory::AccessDirectory;
pub use inputs::{
    CreatePermissionInput, CreateRoleInput, DEFAULT_LIST_LIMIT, PermissionListQuery, RoleListQuery,
    UpdatePermissionInput, UpdateRoleInput,
};
pub use policy::{EntityRef, PolicyDecision, PolicyHook};
pub use stores::{MembershipStore, PermissionStore, RoleStore};
