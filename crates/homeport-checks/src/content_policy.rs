// homeport-checks/src/content_policy.rs
// ============================================================================
// Module: Content Policy Check
// Description: Scan of rendered resource definitions for disallowed literals.
// Purpose: Catch inline credentials bypassing the secret-reference mechanism.
// Dependencies: homeport-core
// ============================================================================

//! ## Overview
//! The content policy check scans the raw source text of rendered resource
//! definitions for disallowed literal patterns, such as an inline credential
//! that should be routed through a secret reference. Any match is critical:
//! a leaked literal is a defect regardless of whether the deployment
//! otherwise converged. The scan is a plain substring search over the
//! rendered documents, not an execution of them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use homeport_core::CheckId;
use homeport_core::CheckOutcome;
use homeport_core::CheckResult;
use homeport_core::CheckRunner;
use homeport_core::CheckSeverity;
use homeport_core::Clock;
use homeport_core::ResourceSet;

// ============================================================================
// SECTION: Policy Sources
// ============================================================================

/// One named source document scanned by the policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySource {
    /// Display name of the scanned document.
    pub name: String,
    /// Raw document text.
    pub text: String,
}

impl PolicySource {
    /// Collects policy sources from a rendered resource set.
    #[must_use]
    pub fn from_resource_set(set: &ResourceSet) -> Vec<Self> {
        set.objects
            .iter()
            .map(|object| Self {
                name: object.display_name(),
                text: object.source_text.clone(),
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Content Policy Check
// ============================================================================

/// Health check scanning rendered definitions for disallowed literals.
pub struct ContentPolicyCheck {
    /// Check identifier.
    check_id: CheckId,
    /// Disallowed literal patterns.
    patterns: Vec<String>,
    /// Source documents to scan.
    sources: Vec<PolicySource>,
}

impl ContentPolicyCheck {
    /// Creates a content policy check over the given sources.
    #[must_use]
    pub const fn new(
        check_id: CheckId,
        patterns: Vec<String>,
        sources: Vec<PolicySource>,
    ) -> Self {
        Self {
            check_id,
            patterns,
            sources,
        }
    }
}

impl CheckRunner for ContentPolicyCheck {
    fn check_id(&self) -> CheckId {
        self.check_id.clone()
    }

    fn severity(&self) -> CheckSeverity {
        CheckSeverity::Critical
    }

    fn run(&self, clock: &dyn Clock) -> CheckResult {
        let mut matches = Vec::new();
        for source in &self.sources {
            for pattern in &self.patterns {
                if source.text.contains(pattern.as_str()) {
                    matches.push(format!("{} contains \"{pattern}\"", source.name));
                }
            }
        }

        let (outcome, message) = if matches.is_empty() {
            (
                CheckOutcome::Pass,
                format!("no disallowed literals across {} documents", self.sources.len()),
            )
        } else {
            (CheckOutcome::Fail, matches.join("; "))
        };

        CheckResult {
            check_name: self.check_id.clone(),
            severity: CheckSeverity::Critical,
            outcome,
            message,
            observed_at: clock.now(),
        }
    }
}
