//! Rule forbidding booleans.
//!
//! # Rationale
//!
//! A bool leaves no room for a third state once the API evolves. A string
//! enum with meaningful values can grow.
//!
//! # Detected Patterns
//!
//! `bool` in fields and type declarations, including behind pointers, list
//! elements and map keys/values.

use api_lint_core::resolve::BasicKind;
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::layers::{check_type_usage, predeclared_basic};

/// Rule code for nobools.
pub const CODE: &str = "KAL011";

/// Rule name for nobools.
pub const NAME: &str = "nobools";

/// Forbids `bool`.
#[derive(Debug, Clone)]
pub struct NoBools {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoBools {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBools {
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

impl Rule for NoBools {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids bool in favour of string enums"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_type_usage(self, ctx, |referent| {
            (predeclared_basic(referent) == Some(BasicKind::Bool))
                .then_some("should not use a bool. Use a string type with meaningful constant values as an enum.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, messages, structure};
    use api_lint_core::model::{Field, TypeExpr};

    #[test]
    fn reports_bools() {
        let violations = check(
            &NoBools::new(),
            vec![structure(
                "Spec",
                vec![
                    Field::new("Enabled", TypeExpr::ident("bool")),
                    Field::new(
                        "Flags",
                        TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("bool")),
                    ),
                    Field::new("Mode", TypeExpr::ident("string")),
                ],
            )],
        );
        assert_eq!(
            messages(&violations),
            [
                "field Enabled should not use a bool. Use a string type with meaningful constant values as an enum.",
                "field Flags map value should not use a bool. Use a string type with meaningful constant values as an enum.",
            ]
        );
    }

    #[test]
    fn ignores_embedded_fields() {
        let violations = check(
            &NoBools::new(),
            vec![
                api_lint_core::model::TypeDecl::defined("Toggle", TypeExpr::ident("bool")),
                structure("Spec", vec![Field::embedded(TypeExpr::ident("Toggle"))]),
            ],
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with("type Toggle"));
    }
}
