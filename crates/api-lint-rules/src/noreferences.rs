//! Rule for reference-related words in field names.
//!
//! # Rationale
//!
//! Kubernetes API conventions abbreviate `Reference` to `Ref` in field
//! names (`secretRef`, `podRefs`).
//!
//! # Detected Patterns
//!
//! Words are split at camel-case boundaries, so `CrossReferenceID` has a
//! `Reference` word but `Crossreference` does not.
//!
//! - `PreferAbbreviatedReference` (default): a name that starts or ends with
//!   the word `Reference` or `References`, unless it already contains a
//!   `Ref` or `Refs` word
//! - `NoReferences`: any `Ref`, `Refs`, `Reference` or `References` word
//!
//! # Configuration
//!
//! - `policy`: `PreferAbbreviatedReference` or `NoReferences`

use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};
use serde::Deserialize;

use crate::support::{self, words};

/// Rule code for noreferences.
pub const CODE: &str = "KAL004";

/// Rule name for noreferences.
pub const NAME: &str = "noreferences";

/// What the rule asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ReferencePolicy {
    /// `Reference` becomes `Ref` at either end of the name.
    #[default]
    PreferAbbreviatedReference,
    /// No reference-related words at all.
    NoReferences,
}

/// Reports reference-related words in field names.
#[derive(Debug, Clone)]
pub struct NoReferences {
    /// Naming policy.
    pub policy: ReferencePolicy,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoReferences {
    fn default() -> Self {
        Self::new()
    }
}

impl NoReferences {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: ReferencePolicy::PreferAbbreviatedReference,
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new().severity(config.severity.unwrap_or(Severity::Warning));
        if let Some(policy) = config.get_option("policy") {
            rule.policy = policy;
        }
        rule
    }

    /// Sets the naming policy.
    #[must_use]
    pub fn policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn message(&self, name: &str) -> Option<String> {
        let words = words(name);

        match self.policy {
            ReferencePolicy::NoReferences => words
                .iter()
                .any(|w| matches!(*w, "Ref" | "Refs" | "Reference" | "References"))
                .then(|| {
                    format!("field {name}: field names should not contain reference-related words")
                }),
            ReferencePolicy::PreferAbbreviatedReference => {
                if words.iter().any(|w| matches!(*w, "Ref" | "Refs")) {
                    return None;
                }
                let ends = [words.first(), words.last()];
                if ends.contains(&Some(&"References")) {
                    Some(format!(
                        "field {name}: field names should use 'Refs' instead of 'References'"
                    ))
                } else if ends.contains(&Some(&"Reference")) {
                    Some(format!(
                        "field {name}: field names should use 'Ref' instead of 'Reference'"
                    ))
                } else {
                    None
                }
            }
        }
    }
}

impl Rule for NoReferences {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Prefers Ref over Reference in field names"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        support::fields(ctx.file)
            .into_iter()
            .filter(|(field, _)| !field.is_embedded() && !field.json_tag().ignored)
            .filter_map(|(field, _)| {
                let message = self.message(field.display_name())?;
                Some(support::violation(self, ctx, field.pos, message))
            })
            .collect()
    }
}
