//! Rule for the serialization of required fields.
//!
//! # Rationale
//!
//! A required field whose zero value is accepted by validation cannot be
//! told apart from an unset one unless it is a pointer. When the zero value
//! is rejected anyway, a pointer only adds noise.
//!
//! # Detected Patterns
//!
//! The decision table in [`api_lint_core::serialization`], with the pointer
//! preference fixed to `WhenRequired`.
//!
//! # Configuration
//!
//! - `omitempty = { policy = "SuggestFix" | "Warn" | "Ignore" }`

use api_lint_core::serialization::{OmitEmptyPolicy, Requirement, SerializationOptions};
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::optionalfields::{check_requirement, omit_empty_policy};

/// Rule code for requiredfields.
pub const CODE: &str = "KAL006";

/// Rule name for requiredfields.
pub const NAME: &str = "requiredfields";

/// Checks pointers and `omitempty` on required fields.
#[derive(Debug, Clone)]
pub struct RequiredFields {
    /// `omitempty` policy.
    pub omit_empty: OmitEmptyPolicy,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self::new()
    }
}

impl RequiredFields {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            omit_empty: OmitEmptyPolicy::SuggestFix,
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new().severity(config.severity.unwrap_or(Severity::Warning));
        if let Some(policy) = omit_empty_policy(config) {
            rule.omit_empty = policy;
        }
        rule
    }

    /// Sets the `omitempty` policy.
    #[must_use]
    pub fn omit_empty(mut self, policy: OmitEmptyPolicy) -> Self {
        self.omit_empty = policy;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for RequiredFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks pointers and omitempty on required fields"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let options = SerializationOptions {
            omit_empty: self.omit_empty,
            ..SerializationOptions::default()
        };
        check_requirement(self, ctx, Requirement::Required, &options)
    }
}
