//! Rule forbidding floating point types.
//!
//! # Rationale
//!
//! Floats do not round-trip reliably between languages and serializers.
//! Use `resource.Quantity` or a string with validation instead.
//!
//! # Detected Patterns
//!
//! `float32` and `float64` in fields and type declarations, including
//! behind pointers, list elements and map keys/values.

use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::layers::{check_type_usage, predeclared_basic};

/// Rule code for nofloats.
pub const CODE: &str = "KAL010";

/// Rule name for nofloats.
pub const NAME: &str = "nofloats";

/// Forbids `float32` and `float64`.
#[derive(Debug, Clone)]
pub struct NoFloats {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoFloats {
    fn default() -> Self {
        Self::new()
    }
}

impl NoFloats {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new().severity(config.severity.unwrap_or(Severity::Warning))
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoFloats {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids float32 and float64"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_type_usage(self, ctx, |referent| {
            predeclared_basic(referent)
                .filter(|basic| basic.is_float())
                .map(|_| "should not use a float value because they cannot be reliably round-tripped.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, render, structure};
    use api_lint_core::model::{Field, TypeDecl, TypeExpr};

    #[test]
    fn reports_floats_at_every_layer() {
        let violations = check(
            &NoFloats::new(),
            vec![
                TypeDecl::defined("Ratio", TypeExpr::ident("float64")).at(3, 6),
                TypeDecl::alias("Weight", TypeExpr::ident("float32")).at(4, 6),
                structure(
                    "Spec",
                    vec![
                        Field::new("Ratio", TypeExpr::ident("Ratio")).at(7, 2),
                        Field::new("Weight", TypeExpr::pointer(TypeExpr::ident("Weight"))).at(8, 2),
                        Field::new("Scores", TypeExpr::slice(TypeExpr::ident("float32"))).at(9, 2),
                        Field::new("Count", TypeExpr::ident("int32")).at(10, 2),
                    ],
                ),
            ],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        3: type Ratio should not use a float value because they cannot be reliably round-tripped.
        4: type Weight should not use a float value because they cannot be reliably round-tripped.
        8: field Weight pointer should not use a float value because they cannot be reliably round-tripped.
        9: field Scores array element should not use a float value because they cannot be reliably round-tripped.
        "###);
    }
}
