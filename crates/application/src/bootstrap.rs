//! Idempotent seeding of the baseline access-control state.

use std::collections::HashSet;

use fixhub_core::{AppError, AppResult};
use fixhub_domain::{
    CapabilityName, MANAGER_ROLE_NAME, RoleName, SUPER_ADMIN_ROLE_NAME, baseline_capabilities,
    manager_capability_names,
};
use tracing::info;

use crate::access_ports::{CreatePermissionInput, CreateRoleInput, PermissionStore, RoleStore};
use crate::authorization_service::CapabilityRegistry;

/// Counters describing what a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Permissions created by this run.
    pub permissions_created: usize,
    /// Roles created by this run.
    pub roles_created: usize,
    /// Role grants created by this run.
    pub grants_created: usize,
}

/// Seeds the baseline capability catalog and the built-in roles.
///
/// Runs ungated because it executes before any administrator exists. Safe to
/// run at every process start: existing rows are left untouched and a
/// conflicting concurrent create counts as already seeded. Finishes by
/// syncing the capability registry from the store.
pub async fn seed_baseline_access(
    permission_store: &dyn PermissionStore,
    role_store: &dyn RoleStore,
    registry: &CapabilityRegistry,
) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    for capability in baseline_capabilities() {
        let name = CapabilityName::new(capability.name)?;
        if permission_store
            .find_permission_by_name(&name)
            .await?
            .is_some()
        {
            continue;
        }

        let input = CreatePermissionInput {
            name,
            description: Some(capability.description.to_owned()),
        };
        match permission_store.create_permission(input).await {
            Ok(_) => report.permissions_created += 1,
            Err(AppError::Conflict(_)) => {}
            Err(error) => return Err(error),
        }
    }

    report.roles_created += ensure_role(
        role_store,
        SUPER_ADMIN_ROLE_NAME,
        "Bypasses every capability check",
    )
    .await?;
    report.roles_created += ensure_role(
        role_store,
        MANAGER_ROLE_NAME,
        "Read access to day-to-day records",
    )
    .await?;

    report.grants_created = ensure_manager_grants(permission_store, role_store).await?;

    registry
        .sync(permission_store.list_capability_names().await?)
        .await;

    info!(
        permissions = report.permissions_created,
        roles = report.roles_created,
        grants = report.grants_created,
        "seeded baseline access"
    );
    Ok(report)
}

async fn ensure_role(
    role_store: &dyn RoleStore,
    name: &str,
    description: &str,
) -> AppResult<usize> {
    let role_name = RoleName::new(name)?;
    if role_store.find_role_by_name(&role_name).await?.is_some() {
        return Ok(0);
    }

    let input = CreateRoleInput {
        name: role_name,
        description: Some(description.to_owned()),
    };
    match role_store.create_role(input).await {
        Ok(_) => Ok(1),
        Err(AppError::Conflict(_)) => Ok(0),
        Err(error) => Err(error),
    }
}

async fn ensure_manager_grants(
    permission_store: &dyn PermissionStore,
    role_store: &dyn RoleStore,
) -> AppResult<usize> {
    let manager_name = RoleName::new(MANAGER_ROLE_NAME)?;
    let Some(manager) = role_store.find_role_by_name(&manager_name).await? else {
        return Err(AppError::Internal(
            "seeded manager role is missing".to_owned(),
        ));
    };

    let granted: HashSet<String> = role_store
        .list_role_permissions(manager.id())
        .await?
        .iter()
        .map(|permission| permission.name().as_str().to_owned())
        .collect();

    let mut created = 0;
    for name in manager_capability_names() {
        if granted.contains(*name) {
            continue;
        }

        let capability = CapabilityName::new(*name)?;
        let Some(permission) = permission_store
            .find_permission_by_name(&capability)
            .await?
        else {
            continue;
        };

        role_store
            .grant_permission(manager.id(), permission.id())
            .await?;
        created += 1;
    }
    Ok(created)
}
