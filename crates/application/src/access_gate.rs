use fixhub_core::{AccountContext, AppError, AppResult};
use fixhub_domain::{CapabilityName, RoleName};

use crate::access_ports::EntityRef;
use crate::authorization_service::AuthorizationService;

/// Enforcement point the serving layer calls before acting.
///
/// The gate never mutates state; it answers purely from role, permission and
/// grant state through the resolver.
#[derive(Clone)]
pub struct AccessGate {
    authorization: AuthorizationService,
}

impl AccessGate {
    /// Creates a gate over a resolver.
    #[must_use]
    pub fn new(authorization: AuthorizationService) -> Self {
        Self { authorization }
    }

    /// Ensures the account holds at least one of the named roles.
    pub async fn require_any_role(
        &self,
        context: &AccountContext,
        role_names: &[RoleName],
    ) -> AppResult<()> {
        let Some(identity) = context.identity() else {
            return Err(AppError::Unauthenticated(
                "an authenticated account is required".to_owned(),
            ));
        };

        if self
            .authorization
            .holds_any_role(identity.account_id(), role_names)
            .await?
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "account '{}' does not hold a required role",
            identity.account_id()
        )))
    }

    /// Ensures the account holds the capability.
    pub async fn require_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
    ) -> AppResult<()> {
        self.authorization.require_capability(context, capability).await
    }

    /// Ensures the account may act on the concrete record.
    pub async fn require_entity_capability(
        &self,
        context: &AccountContext,
        capability: &CapabilityName,
        entity: &EntityRef,
    ) -> AppResult<()> {
        self.authorization
            .require_entity_capability(context, capability, entity)
            .await
    }
}
