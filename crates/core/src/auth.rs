use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an account managed by the external user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a random account identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an account identifier from an existing UUID value.
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

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AccountId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Account information resolved by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    account_id: AccountId,
    display_name: String,
}

impl AccountIdentity {
    /// Creates an account identity from authentication data.
    #[must_use]
    pub fn new(account_id: AccountId, display_name: impl Into<String>) -> Self {
        Self {
            account_id,
            display_name: display_name.into(),
        }
    }

    /// Returns the stable account identifier.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the display name for the account.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

/// Caller context attached to one inbound operation.
///
/// The authentication layer either resolves an account or hands the
/// enforcement gates an anonymous context; the gates deny the latter
/// unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountContext {
    /// No resolvable account behind the operation.
    Anonymous,
    /// Operation performed by an authenticated account.
    Authenticated(AccountIdentity),
}

impl AccountContext {
    /// Creates an authenticated context for one account.
    #[must_use]
    pub fn authenticated(account_id: AccountId, display_name: impl Into<String>) -> Self {
        Self::Authenticated(AccountIdentity::new(account_id, display_name))
    }

    /// Returns the identity when the caller is authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<&AccountIdentity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }

    /// Returns whether the context carries an authenticated account.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountContext, AccountId};

    #[test]
    fn account_id_formats_as_uuid() {
        let account_id = AccountId::new();
        assert_eq!(account_id.to_string().len(), 36);
    }

    #[test]
    fn anonymous_context_has_no_identity() {
        assert!(AccountContext::Anonymous.identity().is_none());
        assert!(!AccountContext::Anonymous.is_authenticated());
    }

    #[test]
    fn authenticated_context_exposes_identity() {
        let account_id = AccountId::new();
        let context = AccountContext::authenticated(account_id, "Asha");
        assert!(context.is_authenticated());
        assert_eq!(
            context.identity().map(|identity| identity.account_id()),
            Some(account_id)
        );
    }
}
