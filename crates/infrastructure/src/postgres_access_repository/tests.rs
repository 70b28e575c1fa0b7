use fixhub_application::{
    AccessDirectory, CreatePermissionInput, CreateRoleInput, MembershipStore, PermissionListQuery,
    PermissionStore, RoleStore, UpdatePermissionInput,
};
use fixhub_core::{AccountId, AppError};
use fixhub_domain::{CapabilityName, RoleName};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::PostgresAccessDirectory;

use super::PostgresAccessRepository;

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS access_permissions (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        deleted_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS access_permissions_live_name_idx
        ON access_permissions (name)
        WHERE deleted_at IS NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS access_roles (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        deleted_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS access_roles_live_name_idx
        ON access_roles (name)
        WHERE deleted_at IS NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS access_role_grants (
        role_id UUID NOT NULL REFERENCES access_roles (id) ON DELETE CASCADE,
        permission_id UUID NOT NULL REFERENCES access_permissions (id) ON DELETE CASCADE,
        PRIMARY KEY (role_id, permission_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS access_role_memberships (
        account_id UUID NOT NULL,
        role_id UUID NOT NULL REFERENCES access_roles (id) ON DELETE CASCADE,
        assigned_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (account_id, role_id)
    )
    "#,
];

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    for statement in SCHEMA_STATEMENTS {
        if let Err(error) = sqlx::query(statement).execute(&pool).await {
            panic!("failed to prepare access tables for tests: {error}");
        }
    }

    Some(pool)
}

fn unique_name(stem: &str) -> String {
    format!("{stem} {}", uuid::Uuid::new_v4())
}

fn capability(name: &str) -> CapabilityName {
    CapabilityName::new(name).unwrap_or_else(|_| unreachable!())
}

fn role_name(name: &str) -> RoleName {
    RoleName::new(name).unwrap_or_else(|_| unreachable!())
}

fn permission_input(name: &str) -> CreatePermissionInput {
    CreatePermissionInput {
        name: capability(name),
        description: None,
    }
}

fn role_input(name: &str) -> CreateRoleInput {
    CreateRoleInput {
        name: role_name(name),
        description: None,
    }
}

#[tokio::test]
async fn live_name_conflicts_surface_as_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);
    let name = unique_name("calibrate benches");

    let first = repository
        .create_permission(permission_input(name.as_str()))
        .await;
    assert!(first.is_ok());
    let first = first.unwrap_or_else(|_| unreachable!());

    let duplicate = repository
        .create_permission(permission_input(name.as_str()))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let deleted = repository.soft_delete_permission(first.id()).await;
    assert!(deleted.is_ok());

    let recreated = repository
        .create_permission(permission_input(name.as_str()))
        .await;
    assert!(recreated.is_ok());
}

#[tokio::test]
async fn updates_exclude_the_row_itself_from_uniqueness() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);
    let first_name = unique_name("stage couriers");
    let second_name = unique_name("audit couriers");

    let first = repository
        .create_permission(permission_input(first_name.as_str()))
        .await;
    assert!(first.is_ok());
    let first = first.unwrap_or_else(|_| unreachable!());

    let second = repository
        .create_permission(permission_input(second_name.as_str()))
        .await;
    assert!(second.is_ok());

    let same_name = repository
        .update_permission(
            first.id(),
            UpdatePermissionInput {
                name: capability(first_name.as_str()),
                description: Some("Dispatch staging".to_owned()),
            },
        )
        .await;
    assert!(same_name.is_ok());

    let collision = repository
        .update_permission(
            first.id(),
            UpdatePermissionInput {
                name: capability(second_name.as_str()),
                description: None,
            },
        )
        .await;
    assert!(matches!(collision, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn restore_conflicts_when_the_name_was_retaken() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);
    let name = unique_name("reseal units");

    let original = repository
        .create_permission(permission_input(name.as_str()))
        .await;
    assert!(original.is_ok());
    let original = original.unwrap_or_else(|_| unreachable!());

    let deleted = repository.soft_delete_permission(original.id()).await;
    assert!(deleted.is_ok());

    let replacement = repository
        .create_permission(permission_input(name.as_str()))
        .await;
    assert!(replacement.is_ok());

    let restored = repository.restore_permission(original.id()).await;
    assert!(matches!(restored, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn grants_are_idempotent_and_scoped_to_live_permissions() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);

    let role = repository
        .create_role(role_input(unique_name("bench lead").as_str()))
        .await;
    assert!(role.is_ok());
    let role = role.unwrap_or_else(|_| unreachable!());

    let permission = repository
        .create_permission(permission_input(unique_name("issue loaners").as_str()))
        .await;
    assert!(permission.is_ok());
    let permission = permission.unwrap_or_else(|_| unreachable!());

    let first_grant = repository.grant_permission(role.id(), permission.id()).await;
    assert!(first_grant.is_ok());
    let second_grant = repository.grant_permission(role.id(), permission.id()).await;
    assert!(second_grant.is_ok());

    let granted = repository.list_role_permissions(role.id()).await;
    assert!(granted.is_ok());
    assert_eq!(granted.unwrap_or_default().len(), 1);

    let deleted = repository.soft_delete_permission(permission.id()).await;
    assert!(deleted.is_ok());

    let after_delete = repository.list_role_permissions(role.id()).await;
    assert!(after_delete.is_ok());
    assert!(after_delete.unwrap_or_default().is_empty());

    let denied_grant = repository.grant_permission(role.id(), permission.id()).await;
    assert!(matches!(denied_grant, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn memberships_feed_the_directory_with_live_roles_only() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool.clone());
    let directory = PostgresAccessDirectory::new(pool);
    let account_id = AccountId::new();

    let role = repository
        .create_role(role_input(unique_name("intake clerk").as_str()))
        .await;
    assert!(role.is_ok());
    let role = role.unwrap_or_else(|_| unreachable!());

    let permission = repository
        .create_permission(permission_input(unique_name("log arrivals").as_str()))
        .await;
    assert!(permission.is_ok());
    let permission = permission.unwrap_or_else(|_| unreachable!());

    let granted = repository.grant_permission(role.id(), permission.id()).await;
    assert!(granted.is_ok());

    let assigned = repository.assign_role(account_id, role.id()).await;
    assert!(assigned.is_ok());
    let assigned_again = repository.assign_role(account_id, role.id()).await;
    assert!(assigned_again.is_ok());

    let held = directory.find_account_roles(account_id).await;
    assert!(held.is_ok());
    let held = held.unwrap_or_default();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].id(), role.id());

    let resolved = directory.find_role_permissions(role.id()).await;
    assert!(resolved.is_ok());
    assert_eq!(resolved.unwrap_or_default().len(), 1);

    let deleted = repository.soft_delete_role(role.id()).await;
    assert!(deleted.is_ok());

    let after_delete = directory.find_account_roles(account_id).await;
    assert!(after_delete.is_ok());
    assert!(after_delete.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn listing_supports_search_pagination_and_trash() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);
    let suffix = uuid::Uuid::new_v4().to_string();

    let mut created = Vec::new();
    for stem in ["alpha", "beta", "gamma"] {
        let permission = repository
            .create_permission(permission_input(format!("{stem} {suffix}").as_str()))
            .await;
        assert!(permission.is_ok());
        created.push(permission.unwrap_or_else(|_| unreachable!()));
    }

    let searched = repository
        .list_permissions(PermissionListQuery {
            search: Some(suffix.clone()),
            ..PermissionListQuery::default()
        })
        .await;
    assert!(searched.is_ok());
    let searched = searched.unwrap_or_default();
    assert_eq!(searched.len(), 3);
    assert!(searched[0].name().as_str().starts_with("alpha"));

    let window = repository
        .list_permissions(PermissionListQuery {
            limit: 2,
            offset: 2,
            search: Some(suffix.clone()),
            ..PermissionListQuery::default()
        })
        .await;
    assert!(window.is_ok());
    let window = window.unwrap_or_default();
    assert_eq!(window.len(), 1);
    assert!(window[0].name().as_str().starts_with("gamma"));

    let deleted = repository.soft_delete_permission(created[1].id()).await;
    assert!(deleted.is_ok());

    let live_only = repository
        .list_permissions(PermissionListQuery {
            search: Some(suffix.clone()),
            ..PermissionListQuery::default()
        })
        .await;
    assert!(live_only.is_ok());
    assert_eq!(live_only.unwrap_or_default().len(), 2);

    let with_trash = repository
        .list_permissions(PermissionListQuery {
            search: Some(suffix.clone()),
            include_deleted: true,
            ..PermissionListQuery::default()
        })
        .await;
    assert!(with_trash.is_ok());
    assert_eq!(with_trash.unwrap_or_default().len(), 3);

    let role = repository
        .create_role(role_input(unique_name("filter probe").as_str()))
        .await;
    assert!(role.is_ok());
    let role = role.unwrap_or_else(|_| unreachable!());
    let granted = repository.grant_permission(role.id(), created[0].id()).await;
    assert!(granted.is_ok());

    let filtered = repository
        .list_permissions(PermissionListQuery {
            search: Some(suffix.clone()),
            granted_to_role: Some(role.id()),
            ..PermissionListQuery::default()
        })
        .await;
    assert!(filtered.is_ok());
    let filtered = filtered.unwrap_or_default();
    assert_eq!(filtered.len(), 1);
    assert!(filtered[0].name().as_str().starts_with("alpha"));
}

#[tokio::test]
async fn replace_grants_swaps_the_whole_set() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);

    let role = repository
        .create_role(role_input(unique_name("triage lead").as_str()))
        .await;
    assert!(role.is_ok());
    let role = role.unwrap_or_else(|_| unreachable!());

    let mut permissions = Vec::new();
    for stem in ["receive drops", "quote repairs", "close tickets"] {
        let permission = repository
            .create_permission(permission_input(unique_name(stem).as_str()))
            .await;
        assert!(permission.is_ok());
        permissions.push(permission.unwrap_or_else(|_| unreachable!()));
    }

    let initial = repository
        .replace_grants(role.id(), vec![permissions[0].id(), permissions[1].id()])
        .await;
    assert!(initial.is_ok());

    let swapped = repository
        .replace_grants(
            role.id(),
            vec![permissions[2].id(), permissions[2].id()],
        )
        .await;
    assert!(swapped.is_ok());

    let granted = repository.list_role_permissions(role.id()).await;
    assert!(granted.is_ok());
    let granted = granted.unwrap_or_default();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].id(), permissions[2].id());

    let deleted = repository.soft_delete_permission(permissions[0].id()).await;
    assert!(deleted.is_ok());
    let rejected = repository
        .replace_grants(role.id(), vec![permissions[0].id()])
        .await;
    assert!(matches!(rejected, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn force_delete_cascades_grants_and_memberships() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAccessRepository::new(pool);
    let account_id = AccountId::new();

    let role = repository
        .create_role(role_input(unique_name("night shift").as_str()))
        .await;
    assert!(role.is_ok());
    let role = role.unwrap_or_else(|_| unreachable!());

    let permission = repository
        .create_permission(permission_input(unique_name("open cages").as_str()))
        .await;
    assert!(permission.is_ok());
    let permission = permission.unwrap_or_else(|_| unreachable!());

    let granted = repository.grant_permission(role.id(), permission.id()).await;
    assert!(granted.is_ok());
    let assigned = repository.assign_role(account_id, role.id()).await;
    assert!(assigned.is_ok());

    let removed = repository.force_delete_role(role.id()).await;
    assert!(removed.is_ok());
    assert_eq!(removed.unwrap_or_else(|_| unreachable!()).id(), role.id());

    let members = repository.list_role_members(role.id()).await;
    assert!(members.is_ok());
    assert!(members.unwrap_or_default().is_empty());

    let orphaned = repository
        .list_permissions(PermissionListQuery {
            granted_to_role: Some(role.id()),
            ..PermissionListQuery::default()
        })
        .await;
    assert!(orphaned.is_ok());
    assert!(orphaned.unwrap_or_default().is_empty());

    let missing = repository.force_delete_role(role.id()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
