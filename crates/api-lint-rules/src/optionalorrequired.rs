//! Rule requiring every field to be marked optional or required.
//!
//! # Rationale
//!
//! Whether a field may be omitted is part of the API contract. Leaving it to
//! the generator's default makes the contract implicit.
//!
//! # Detected Patterns
//!
//! - Fields with neither an optional nor a required marker
//! - Fields with both
//! - Fields using a marker other than the preferred spelling, e.g.
//!   `kubebuilder:validation:Optional` where `optional` is preferred
//!
//! # Configuration
//!
//! - `preferred_optional_marker` (default `optional`)
//! - `preferred_required_marker` (default `required`)

use api_lint_core::constraints::{OPTIONAL_MARKERS, REQUIRED_MARKERS};
use api_lint_core::markers::{names, MarkerSet};
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

use crate::support;

/// Rule code for optionalorrequired.
pub const CODE: &str = "KAL008";

/// Rule name for optionalorrequired.
pub const NAME: &str = "optionalorrequired";

/// Requires exactly one of the optional and required markers.
#[derive(Debug, Clone)]
pub struct OptionalOrRequired {
    /// Preferred optional marker.
    pub preferred_optional: String,
    /// Preferred required marker.
    pub preferred_required: String,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for OptionalOrRequired {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionalOrRequired {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preferred_optional: names::OPTIONAL.to_string(),
            preferred_required: names::REQUIRED.to_string(),
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new()
            .severity(config.severity.unwrap_or(Severity::Warning))
            .preferred_markers(
                config.get_str("preferred_optional_marker", names::OPTIONAL),
                config.get_str("preferred_required_marker", names::REQUIRED),
            )
    }

    /// Sets the preferred marker spellings.
    #[must_use]
    pub fn preferred_markers(mut self, optional: &str, required: &str) -> Self {
        self.preferred_optional = optional.to_string();
        self.preferred_required = required.to_string();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Non-preferred markers of one family present on the field.
    fn misspelled<'m>(
        markers: &MarkerSet,
        family: &[&'m str],
        preferred: &str,
    ) -> Vec<&'m str> {
        family
            .iter()
            .copied()
            .filter(|m| *m != preferred && markers.has(m))
            .collect()
    }
}

impl Rule for OptionalOrRequired {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires fields to be marked optional or required"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (field, _) in support::fields(ctx.file) {
            let json = field.json_tag();
            if field.is_embedded() || json.inline || json.ignored {
                continue;
            }
            let name = field.display_name();
            let markers = ctx.markers(&field.doc);
            let optional = markers.has_any(OPTIONAL_MARKERS);
            let required = markers.has_any(REQUIRED_MARKERS);

            match (optional, required) {
                (false, false) => violations.push(support::violation(
                    self,
                    ctx,
                    field.pos,
                    format!("field {name} must be marked as optional or required"),
                )),
                (true, true) => violations.push(support::violation(
                    self,
                    ctx,
                    field.pos,
                    format!("field {name} must not be marked as both optional and required"),
                )),
                _ => {}
            }

            let families = [
                (OPTIONAL_MARKERS, self.preferred_optional.as_str()),
                (REQUIRED_MARKERS, self.preferred_required.as_str()),
            ];
            for (family, preferred) in families {
                for marker in Self::misspelled(&markers, family, preferred) {
                    violations.push(
                        support::violation(
                            self,
                            ctx,
                            field.pos,
                            format!("field {name} should use marker {preferred} instead of {marker}"),
                        )
                        .with_suggestion(Suggestion::new(format!(
                            "replace +{marker} with +{preferred}"
                        ))),
                    );
                }
            }
        }

        violations
    }
}
