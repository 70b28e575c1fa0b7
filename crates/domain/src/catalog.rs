//! Baseline capability catalog for the service-center product.

/// Capability gating every access-administration operation.
pub const MANAGE_ACCESS_CAPABILITY: &str = "manage access";

/// One seedable capability with its administrative description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineCapability {
    /// Capability name checked by enforcement gates.
    pub name: &'static str,
    /// Description shown on management screens.
    pub description: &'static str,
}

/// Returns every capability seeded for a new installation.
#[must_use]
pub fn baseline_capabilities() -> &'static [BaselineCapability] {
    BASELINE
}

/// Returns the read-side capability names granted to the seeded manager role.
#[must_use]
pub fn manager_capability_names() -> &'static [&'static str] {
    MANAGER_GRANTS
}

static BASELINE: &[BaselineCapability] = &[
    BaselineCapability {
        name: "view contacts",
        description: "Browse customer and supplier contact records",
    },
    BaselineCapability {
        name: "manage contacts",
        description: "Create, edit and archive contact records",
    },
    BaselineCapability {
        name: "view service inwards",
        description: "Browse devices received for repair",
    },
    BaselineCapability {
        name: "manage service inwards",
        description: "Register and update devices received for repair",
    },
    BaselineCapability {
        name: "view job cards",
        description: "Browse repair job cards",
    },
    BaselineCapability {
        name: "manage job cards",
        description: "Create and update repair job cards",
    },
    BaselineCapability {
        name: "view tasks",
        description: "Browse technician task queues",
    },
    BaselineCapability {
        name: "assign tasks",
        description: "Assign repair tasks to technicians",
    },
    BaselineCapability {
        name: "view spare part requests",
        description: "Browse spare part requests raised on job cards",
    },
    BaselineCapability {
        name: "manage spare part requests",
        description: "Raise and resolve spare part requests",
    },
    BaselineCapability {
        name: "view quotations",
        description: "Browse repair quotations",
    },
    BaselineCapability {
        name: "manage quotations",
        description: "Draft and send repair quotations",
    },
    BaselineCapability {
        name: "view invoices",
        description: "Browse customer invoices",
    },
    BaselineCapability {
        name: "manage invoices",
        description: "Issue and adjust customer invoices",
    },
    BaselineCapability {
        name: "view enquiries",
        description: "Browse customer enquiries and their SLA state",
    },
    BaselineCapability {
        name: "manage enquiries",
        description: "Record and progress customer enquiries",
    },
    BaselineCapability {
        name: "view reports",
        description: "Browse operational reports",
    },
    BaselineCapability {
        name: MANAGE_ACCESS_CAPABILITY,
        description: "Administer roles, permissions and memberships",
    },
];

static MANAGER_GRANTS: &[&str] = &[
    "view contacts",
    "view service inwards",
    "view job cards",
    "view tasks",
    "view spare part requests",
    "view quotations",
    "view invoices",
    "view enquiries",
    "view reports",
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{MANAGE_ACCESS_CAPABILITY, baseline_capabilities, manager_capability_names};
    use crate::CapabilityName;

    #[test]
    fn baseline_includes_access_administration() {
        assert!(
            baseline_capabilities()
                .iter()
                .any(|capability| capability.name == MANAGE_ACCESS_CAPABILITY)
        );
    }

    #[test]
    fn baseline_names_are_unique_and_valid() {
        let mut seen = HashSet::new();
        for capability in baseline_capabilities() {
            assert!(CapabilityName::new(capability.name).is_ok());
            assert!(seen.insert(capability.name), "duplicate {}", capability.name);
        }
    }

    #[test]
    fn manager_grants_come_from_the_baseline() {
        let baseline: HashSet<&str> = baseline_capabilities()
            .iter()
            .map(|capability| capability.name)
            .collect();

        for name in manager_capability_names() {
            assert!(baseline.contains(name), "unknown {name}");
        }
    }
}
