use async_trait::async_trait;
use fixhub_core::{AccountIdentity, AppResult};
use fixhub_domain::CapabilityName;

/// Reference to the concrete record an entity-scoped check targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    /// Record kind, e.g. `job_card`.
    pub kind: String,
    /// Record identifier within the kind.
    pub id: String,
}

impl EntityRef {
    /// Creates a reference from a kind and identifier.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// Outcome of one policy hook evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The hook allows the account to act on this record.
    Allow,
    /// The hook has no opinion; other hooks and the coarse result stand.
    Abstain,
}

/// Entity-scoped override consulted when the coarse role walk denies.
///
/// Hooks refine exactly one capability, never run for anonymous callers and
/// can only turn a deny into a grant.
#[async_trait]
pub trait PolicyHook: Send + Sync {
    /// Capability name this hook refines.
    fn capability(&self) -> &CapabilityName;

    /// Evaluates the hook for one account and record.
    async fn evaluate(
        &self,
        identity: &AccountIdentity,
        entity: &EntityRef,
    ) -> AppResult<PolicyDecision>;
}
