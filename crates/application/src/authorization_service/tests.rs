use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fixhub_core::{AccountContext, AccountId, AccountIdentity, AppError, AppResult};
use fixhub_domain::{CapabilityName, Permission, Role, RoleId, RoleName, SUPER_ADMIN_ROLE_NAME};
use tokio::sync::Mutex;

use crate::access_ports::{AccessDirectory, DecisionCache, EntityRef, PolicyDecision, PolicyHook};

use super::{
    AccessDecision, AuthorizationConfig, AuthorizationService, CapabilityRegistry, DenialReason,
    GrantReason,
};

#[derive(Default)]
struct FakeDirectory {
    roles: Mutex<HashMap<AccountId, Vec<Role>>>,
    permissions: Mutex<HashMap<RoleId, Vec<Permission>>>,
    fail: bool,
}

#[async_trait]
impl AccessDirectory for FakeDirectory {
    async fn find_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>> {
        if self.fail {
            return Err(AppError::Unavailable("directory offline".to_owned()));
        }
        Ok(self
            .roles
            .lock()
            .await
            .get(&account_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        if self.fail {
            return Err(AppError::Unavailable("directory offline".to_owned()));
        }
        Ok(self
            .permissions
            .lock()
            .await
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct FakeDecisionCache {
    entries: Mutex<HashMap<(AccountId, String), bool>>,
}

#[async_trait]
impl DecisionCache for FakeDecisionCache {
    async fn get_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
    ) -> AppResult<Option<bool>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&(account_id, capability.as_str().to_owned()))
            .copied())
    }

    async fn set_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
        allowed: bool,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert((account_id, capability.as_str().to_owned()), allowed);
        Ok(())
    }

    async fn invalidate_account(&self, account_id: AccountId) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .retain(|(entry_account, _), _| *entry_account != account_id);
        Ok(())
    }
}

struct FailingCache;

#[async_trait]
impl DecisionCache for FailingCache {
    async fn get_decision(
        &self,
        _account_id: AccountId,
        _capability: &CapabilityName,
    ) -> AppResult<Option<bool>> {
        Err(AppError::Unavailable("cache offline".to_owned()))
    }

    async fn set_decision(
        &self,
        _account_id: AccountId,
        _capability: &CapabilityName,
        _allowed: bool,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        Err(AppError::Unavailable("cache offline".to_owned()))
    }

    async fn invalidate_account(&self, _account_id: AccountId) -> AppResult<()> {
        Err(AppError::Unavailable("cache offline".to_owned()))
    }
}

struct OwnRecordHook {
    capability: CapabilityName,
    owned_id: String,
}

#[async_trait]
impl PolicyHook for OwnRecordHook {
    fn capability(&self) -> &CapabilityName {
        &self.capability
    }

    async fn evaluate(
        &self,
        _identity: &AccountIdentity,
        entity: &EntityRef,
    ) -> AppResult<PolicyDecision> {
        Ok(if entity.id == self.owned_id {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Abstain
        })
    }
}

fn capability(name: &str) -> CapabilityName {
    CapabilityName::new(name).unwrap_or_else(|_| unreachable!())
}

fn role_named(name: &str) -> Role {
    Role::new(RoleName::new(name).unwrap_or_else(|_| unreachable!()), None)
}

fn permission_named(name: &str) -> Permission {
    Permission::new(capability(name), None)
}

fn authenticated(account_id: AccountId) -> AccountContext {
    AccountContext::authenticated(account_id, "Priya")
}

fn config() -> AuthorizationConfig {
    AuthorizationConfig::standard().unwrap_or_else(|_| unreachable!())
}

async fn registry_with(names: &[&str]) -> Arc<CapabilityRegistry> {
    let registry = CapabilityRegistry::new();
    for name in names {
        registry.register(capability(name)).await;
    }
    Arc::new(registry)
}

fn directory_with(account_id: AccountId, entries: Vec<(Role, Vec<Permission>)>) -> FakeDirectory {
    let mut roles = HashMap::new();
    let mut permissions = HashMap::new();
    let mut held = Vec::new();

    for (role, granted) in entries {
        permissions.insert(role.id(), granted);
        held.push(role);
    }
    roles.insert(account_id, held);

    FakeDirectory {
        roles: Mutex::new(roles),
        permissions: Mutex::new(permissions),
        fail: false,
    }
}

#[tokio::test]
async fn super_admin_bypass_grants_unregistered_names() {
    let account_id = AccountId::new();
    let directory = directory_with(
        account_id,
        vec![(role_named(SUPER_ADMIN_ROLE_NAME), Vec::new())],
    );
    let service =
        AuthorizationService::new(Arc::new(directory), registry_with(&[]).await, config());
    let context = authenticated(account_id);

    let decision = service
        .check_capability(&context, &capability("anything at all"))
        .await;
    assert_eq!(
        decision.ok(),
        Some(AccessDecision::Granted(GrantReason::SuperAdmin))
    );

    let result = service
        .require_capability(&context, &capability("delete the building"))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn grant_follows_the_role_permission_union() {
    let account_id = AccountId::new();
    let directory = directory_with(
        account_id,
        vec![(
            role_named("manager"),
            vec![
                permission_named("view reports"),
                permission_named("viewAny users"),
            ],
        )],
    );
    let service = AuthorizationService::new(
        Arc::new(directory),
        registry_with(&["view reports", "viewAny users", "delete users"]).await,
        config(),
    );
    let context = authenticated(account_id);

    let granted = service
        .check_capability(&context, &capability("view reports"))
        .await;
    assert_eq!(
        granted.ok(),
        Some(AccessDecision::Granted(GrantReason::RolePermission))
    );

    let denied = service
        .check_capability(&context, &capability("delete users"))
        .await;
    assert_eq!(
        denied.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );

    let result = service
        .require_capability(&context, &capability("delete users"))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn unregistered_capability_is_a_config_error() {
    let account_id = AccountId::new();
    let directory = directory_with(
        account_id,
        vec![(role_named("manager"), vec![permission_named("view reports")])],
    );
    let service = AuthorizationService::new(
        Arc::new(directory),
        registry_with(&["view reports"]).await,
        config(),
    );
    let context = authenticated(account_id);

    let decision = service
        .check_capability(&context, &capability("view repots"))
        .await;
    assert_eq!(
        decision.ok(),
        Some(AccessDecision::Denied(DenialReason::UnknownCapability))
    );

    let result = service
        .require_capability(&context, &capability("view repots"))
        .await;
    assert!(matches!(result, Err(AppError::InvalidCapability(_))));
}

#[tokio::test]
async fn anonymous_context_never_grants() {
    let service = AuthorizationService::new(
        Arc::new(FakeDirectory::default()),
        registry_with(&["view reports"]).await,
        config(),
    );

    let decision = service
        .check_capability(&AccountContext::Anonymous, &capability("view reports"))
        .await;
    assert_eq!(
        decision.ok(),
        Some(AccessDecision::Denied(DenialReason::Anonymous))
    );

    let result = service
        .require_capability(&AccountContext::Anonymous, &capability("view reports"))
        .await;
    assert!(matches!(result, Err(AppError::Unauthenticated(_))));
}

#[tokio::test]
async fn revoking_the_granting_role_denies_uncached_checks() {
    let account_id = AccountId::new();
    let directory = Arc::new(directory_with(
        account_id,
        vec![(role_named("manager"), vec![permission_named("view reports")])],
    ));
    let service = AuthorizationService::new(
        directory.clone(),
        registry_with(&["view reports"]).await,
        config(),
    );
    let context = authenticated(account_id);

    let before = service
        .check_capability_uncached(&context, &capability("view reports"))
        .await;
    assert_eq!(
        before.ok(),
        Some(AccessDecision::Granted(GrantReason::RolePermission))
    );

    directory.roles.lock().await.insert(account_id, Vec::new());

    let after = service
        .check_capability_uncached(&context, &capability("view reports"))
        .await;
    assert_eq!(
        after.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );
}

#[tokio::test]
async fn cached_decisions_serve_stale_until_invalidated() {
    let account_id = AccountId::new();
    let directory = Arc::new(directory_with(
        account_id,
        vec![(role_named("manager"), vec![permission_named("view reports")])],
    ));
    let cache = Arc::new(FakeDecisionCache::default());
    let service = AuthorizationService::new(
        directory.clone(),
        registry_with(&["view reports"]).await,
        config(),
    )
    .with_decision_cache(cache);
    let context = authenticated(account_id);

    let warmed = service
        .check_capability(&context, &capability("view reports"))
        .await;
    assert_eq!(
        warmed.ok(),
        Some(AccessDecision::Granted(GrantReason::RolePermission))
    );

    directory.roles.lock().await.insert(account_id, Vec::new());

    let stale = service
        .check_capability(&context, &capability("view reports"))
        .await;
    assert_eq!(
        stale.ok(),
        Some(AccessDecision::Granted(GrantReason::RolePermission))
    );

    let fresh = service
        .check_capability_uncached(&context, &capability("view reports"))
        .await;
    assert_eq!(
        fresh.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );

    let invalidated = service.invalidate_account(account_id).await;
    assert!(invalidated.is_ok());

    let after = service
        .check_capability(&context, &capability("view reports"))
        .await;
    assert_eq!(
        after.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );
}

#[tokio::test]
async fn cache_entries_are_scoped_per_account_and_capability() {
    let holder = AccountId::new();
    let bystander = AccountId::new();
    let directory = Arc::new(directory_with(
        holder,
        vec![(role_named("manager"), vec![permission_named("view reports")])],
    ));
    let cache = Arc::new(FakeDecisionCache::default());
    let service = AuthorizationService::new(
        directory,
        registry_with(&["view reports", "delete users"]).await,
        config(),
    )
    .with_decision_cache(cache);

    let warmed = service
        .check_capability(&authenticated(holder), &capability("view reports"))
        .await;
    assert_eq!(
        warmed.ok(),
        Some(AccessDecision::Granted(GrantReason::RolePermission))
    );

    let other_account = service
        .check_capability(&authenticated(bystander), &capability("view reports"))
        .await;
    assert_eq!(
        other_account.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );

    let other_capability = service
        .check_capability(&authenticated(holder), &capability("delete users"))
        .await;
    assert_eq!(
        other_capability.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );
}

#[tokio::test]
async fn policy_hook_allows_only_matching_records() {
    let account_id = AccountId::new();
    let directory = directory_with(account_id, vec![(role_named("technician"), Vec::new())]);
    let hook = OwnRecordHook {
        capability: capability("edit job cards"),
        owned_id: "42".to_owned(),
    };
    let service = AuthorizationService::new(
        Arc::new(directory),
        registry_with(&["edit job cards"]).await,
        config(),
    )
    .with_policy_hook(Arc::new(hook));
    let context = authenticated(account_id);

    let owned = service
        .check_entity_capability(
            &context,
            &capability("edit job cards"),
            &EntityRef::new("job_card", "42"),
        )
        .await;
    assert_eq!(
        owned.ok(),
        Some(AccessDecision::Granted(GrantReason::Policy))
    );

    let foreign = service
        .check_entity_capability(
            &context,
            &capability("edit job cards"),
            &EntityRef::new("job_card", "7"),
        )
        .await;
    assert_eq!(
        foreign.ok(),
        Some(AccessDecision::Denied(DenialReason::MissingCapability))
    );

    let anonymous = service
        .check_entity_capability(
            &AccountContext::Anonymous,
            &capability("edit job cards"),
            &EntityRef::new("job_card", "42"),
        )
        .await;
    assert_eq!(
        anonymous.ok(),
        Some(AccessDecision::Denied(DenialReason::Anonymous))
    );
}

#[tokio::test]
async fn directory_failure_surfaces_unavailable() {
    let directory = FakeDirectory {
        roles: Mutex::new(HashMap::new()),
        permissions: Mutex::new(HashMap::new()),
        fail: true,
    };
    let service = AuthorizationService::new(
        Arc::new(directory),
        registry_with(&["view reports"]).await,
        config(),
    );

    let result = service
        .has_capability(
            &authenticated(AccountId::new()),
            &capability("view reports"),
        )
        .await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn cache_failures_degrade_to_a_miss() {
    let account_id = AccountId::new();
    let directory = directory_with(
        account_id,
        vec![(role_named("manager"), vec![permission_named("view reports")])],
    );
    let service = AuthorizationService::new(
        Arc::new(directory),
        registry_with(&["view reports"]).await,
        config(),
    )
    .with_decision_cache(Arc::new(FailingCache));

    let decision = service
        .check_capability(&authenticated(account_id), &capability("view reports"))
        .await;
    assert_eq!(
        decision.ok(),
        Some(AccessDecision::Granted(GrantReason::RolePermission))
    );
}

#[tokio::test]
async fn effective_capabilities_collapse_duplicates_sorted() {
    let account_id = AccountId::new();
    let directory = directory_with(
        account_id,
        vec![
            (
                role_named("manager"),
                vec![
                    permission_named("view invoices"),
                    permission_named("manage invoices"),
                ],
            ),
            (
                role_named("front desk"),
                vec![permission_named("view invoices")],
            ),
        ],
    );
    let service = AuthorizationService::new(
        Arc::new(directory),
        registry_with(&["view invoices", "manage invoices"]).await,
        config(),
    );

    let names = service
        .effective_capabilities(account_id)
        .await
        .unwrap_or_default();
    let names: Vec<&str> = names.iter().map(CapabilityName::as_str).collect();
    assert_eq!(names, vec!["manage invoices", "view invoices"]);
}

#[tokio::test]
async fn holds_any_role_is_a_logical_or() {
    let member = AccountId::new();
    let bypasser = AccountId::new();
    let mut entries = HashMap::new();
    entries.insert(member, vec![role_named("manager")]);
    entries.insert(bypasser, vec![role_named(SUPER_ADMIN_ROLE_NAME)]);
    let directory = FakeDirectory {
        roles: Mutex::new(entries),
        permissions: Mutex::new(HashMap::new()),
        fail: false,
    };
    let service =
        AuthorizationService::new(Arc::new(directory), registry_with(&[]).await, config());

    let names = [
        RoleName::new("technician").unwrap_or_else(|_| unreachable!()),
        RoleName::new("manager").unwrap_or_else(|_| unreachable!()),
    ];
    assert_eq!(service.holds_any_role(member, &names).await.ok(), Some(true));

    let other = [RoleName::new("technician").unwrap_or_else(|_| unreachable!())];
    assert_eq!(
        service.holds_any_role(member, &other).await.ok(),
        Some(false)
    );
    assert_eq!(
        service.holds_any_role(bypasser, &other).await.ok(),
        Some(true)
    );
}
