use std::collections::HashSet;
use std::sync::Arc;

use fixhub_core::{AccountContext, AccountId, AppError, AppResult};
use fixhub_domain::{CapabilityName, Role, RoleName, SUPER_ADMIN_ROLE_NAME};
use tracing::warn;

use crate::access_ports::{AccessDirectory, DecisionCache, EntityRef, PolicyDecision, PolicyHook};

mod decision;
mod registry;

pub use decision::{AccessDecision, DenialReason, GrantReason};
pub use registry::CapabilityRegistry;

/// Default decision cache time-to-live, in seconds.
pub const DEFAULT_DECISION_TTL_SECONDS: u32 = 1800;

/// Tunables for the authorization resolver.
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    /// Role name that bypasses every capability check.
    pub super_admin_role: RoleName,
    /// Time-to-live for cached decisions, in seconds.
    pub cache_ttl_seconds: u32,
}

impl AuthorizationConfig {
    /// Creates a config with an explicit super-admin role and cache ttl.
    #[must_use]
    pub fn new(super_admin_role: RoleName, cache_ttl_seconds: u32) -> Self {
        Self {
            super_admin_role,
            cache_ttl_seconds,
        }
    }

    /// Creates the standard config: `super-admin` bypass, 30 minute ttl.
    pub fn standard() -> AppResult<Self> {
        Ok(Self::new(
            RoleName::new(SUPER_ADMIN_ROLE_NAME)?,
            DEFAULT_DECISION_TTL_SECONDS,
        ))
    }
}

/// Application service deciding capability checks for accounts.
///
/// Checks resolve in a fixed order: anonymous deny, super-admin bypass,
/// capability registry lookup, then the union of the permissions granted by
/// the account's live roles. Role and permission state is re-read from the
/// directory on every check; the only sanctioned staleness is the optional
/// TTL-bounded decision cache.
#[derive(Clone)]
pub struct AuthorizationService {
    directory: Arc<dyn AccessDirectory>,
    registry: Arc<CapabilityRegistry>,
    cache: Option<Arc<dyn DecisionCache>>,
    policy_hooks: Vec<Arc<dyn PolicyHook>>,
    config: AuthorizationConfig,
}

impl AuthorizationService {
    /// Creates a resolver over a directory and capability registry.
    #[must_use]
    pub fn new(
        directory: Arc<dyn AccessDirectory>,
        registry: Arc<CapabilityRegistry>,
        config: AuthorizationConfig,
    ) -> Self {
        Self {
            directory,
            registry,
            cache: None,
            policy_hooks: Vec::new(),
            config,
        }
    }

    /// Attaches a decision cache.
    #[must_use]
    pub fn with_decision_cache(mut self, cache: Arc<dyn DecisionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Registers an entity-scoped policy hook.
    #[must_use]
    pub fn with_policy_hook(mut self, hook: Arc<dyn PolicyHook>) -> Self {
        self.policy_hooks.push(hook);
        self
    }

    /// Decides a capability check, consulting the decision cache.
    pub async fn check_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
    ) -> AppResult<AccessDecision> {
        self.resolve(context, capability, true).await
    }

    /// Decides a capability check, bypassing the decision cache.
    pub async fn check_capability_uncached(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
    ) -> AppResult<AccessDecision> {
        self.resolve(context, capability, false).await
    }

    /// Returns whether the account holds the capability.
    pub async fn has_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
    ) -> AppResult<bool> {
        Ok(self.check_capability(context, capability).await?.is_granted())
    }

    /// Ensures the account holds the capability.
    pub async fn require_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
    ) -> AppResult<()> {
        let decision = self.check_capability(context, capability).await?;
        enforce(context, capability, &decision)
    }

    /// Decides an entity-scoped check, layering policy hooks over a coarse
    /// deny.
    ///
    /// Hooks run only when the role walk denied an authenticated account for
    /// a registered capability; a grant is never overturned.
    pub async fn check_entity_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
        entity: &EntityRef,
    ) -> AppResult<AccessDecision> {
        let decision = self.check_capability(context, capability).await?;

        let AccessDecision::Denied(DenialReason::MissingCapability) = decision else {
            return Ok(decision);
        };
        let Some(identity) = context.identity() else {
            return Ok(decision);
        };

        for hook in &self.policy_hooks {
            if hook.capability() != capability {
                continue;
            }
            if hook.evaluate(identity, entity).await? == PolicyDecision::Allow {
                return Ok(AccessDecision::Granted(GrantReason::Policy));
            }
        }

        Ok(decision)
    }

    /// Ensures the account may act on the concrete record.
    pub async fn require_entity_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
        entity: &EntityRef,
    ) -> AppResult<()> {
        let decision = self
            .check_entity_capability(context, capability, entity)
            .await?;
        enforce(context, capability, &decision)
    }

    /// Returns whether the account holds any of the named roles.
    ///
    /// The configured super-admin role satisfies every requirement.
    pub async fn holds_any_role(
        &self,
        account_id: AccountId,
        role_names: &[RoleName],
    ) -> AppResult<bool> {
        let held = self.directory.find_account_roles(account_id).await?;

        Ok(held.iter().any(|role| {
            role.name() == &self.config.super_admin_role
                || role_names.iter().any(|name| name == role.name())
        }))
    }

    /// Returns the sorted union of capabilities the account's roles grant.
    pub async fn effective_capabilities(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<CapabilityName>> {
        let roles = self.directory.find_account_roles(account_id).await?;

        let mut union = HashSet::new();
        for role in roles {
            for permission in self.directory.find_role_permissions(role.id()).await? {
                union.insert(permission.name().clone());
            }
        }

        let mut names: Vec<CapabilityName> = union.into_iter().collect();
        names.sort_by(|left, right| left.as_str().cmp(right.as_str()));
        Ok(names)
    }

    /// Drops cached decisions for one account.
    pub async fn invalidate_account(&self, account_id: AccountId) -> AppResult<()> {
        if let Some(cache) = self.cache.as_ref() {
            cache.invalidate_account(account_id).await?;
        }
        Ok(())
    }

    async fn resolve(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
        use_cache: bool,
    ) -> AppResult<AccessDecision> {
        let Some(identity) = context.identity() else {
            return Ok(AccessDecision::Denied(DenialReason::Anonymous));
        };
        let account_id = identity.account_id();

        let roles = self.directory.find_account_roles(account_id).await?;

        if roles
            .iter()
            .any(|role| role.name() == &self.config.super_admin_role)
        {
            return Ok(AccessDecision::Granted(GrantReason::SuperAdmin));
        }

        if !self.registry.contains(capability).await {
            warn!(
                capability = %capability,
                account_id = %account_id,
                "denied check for unregistered capability"
            );
            return Ok(AccessDecision::Denied(DenialReason::UnknownCapability));
        }

        if use_cache && let Some(decision) = self.cached_decision(account_id, capability).await {
            return Ok(decision);
        }

        let allowed = self.union_grants(&roles, capability).await?;

        if use_cache {
            self.store_decision(account_id, capability, allowed).await;
        }

        Ok(if allowed {
            AccessDecision::Granted(GrantReason::RolePermission)
        } else {
            AccessDecision::Denied(DenialReason::MissingCapability)
        })
    }

    async fn union_grants(&self, roles: &[Role], capability: &CapabilityName) -> AppResult<bool> {
        for role in roles {
            let permissions = self.directory.find_role_permissions(role.id()).await?;
            if permissions
                .iter()
                .any(|permission| permission.name() == capability)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn cached_decision(
        &self,
        account_id: AccountId,
        capability: &CapabilityName,
    ) -> Option<AccessDecision> {
        let cache = self.cache.as_ref()?;

        match cache.get_decision(account_id, capability).await {
            Ok(Some(true)) => Some(AccessDecision::Granted(GrantReason::RolePermission)),
            Ok(Some(false)) => Some(AccessDecision::Denied(DenialReason::MissingCapability)),
            Ok(None) => None,
            Err(error) => {
                warn!(
                    %error,
                    account_id = %account_id,
                    capability = %capability,
                    "decision cache read failed, treating as miss"
                );
                None
            }
        }
    }

    async fn store_decision(&self, account_id: AccountId, capability: &CapabilityName, allowed: bool) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        if let Err(error) = cache
            .set_decision(account_id, capability, allowed, self.config.cache_ttl_seconds)
            .await
        {
            warn!(
                %error,
                account_id = %account_id,
                capability = %capability,
                "decision cache write failed"
            );
        }
    }
}

fn enforce(
    context: &AccountContext,
    capability: &CapabilityName,
    decision: &AccessDecision,
) -> AppResult<()> {
    match decision {
        AccessDecision::Granted(_) => Ok(()),
        AccessDecision::Denied(DenialReason::Anonymous) => Err(AppError::Unauthenticated(
            "an authenticated account is required".to_owned(),
        )),
        AccessDecision::Denied(DenialReason::UnknownCapability) => Err(AppError::InvalidCapability(
            format!("capability '{capability}' is not registered"),
        )),
        AccessDecision::Denied(DenialReason::MissingCapability) => {
            let account = context
                .identity()
                .map(|identity| identity.account_id().to_string())
                .unwrap_or_default();
            Err(AppError::Forbidden(format!(
                "account '{account}' is missing capability '{capability}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests;
