//! Rule forbidding duration types in APIs.
//!
//! # Rationale
//!
//! Go duration strings (`1h30m`) force every client to implement Go's
//! duration parser. An integer with the unit in its name (`timeoutSeconds`)
//! is portable.
//!
//! # Detected Patterns
//!
//! - `time.Duration` and `metav1.Duration` in fields and type declarations
//! - The same behind pointers, list elements, map keys and map values; the
//!   violation names the layer (e.g. `map value pointer`) as its fact

use api_lint_core::resolve::{Referent, METAV1, TIME};
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::layers::check_type_usage;

/// Rule code for nodurations.
pub const CODE: &str = "KAL002";

/// Rule name for nodurations.
pub const NAME: &str = "nodurations";

const MESSAGE: &str = "should not use a Duration. Use an integer type with units in the name to avoid the need for clients to implement Go style duration parsing.";

/// Forbids `Duration` types.
#[derive(Debug, Clone)]
pub struct NoDurations {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoDurations {
    fn default() -> Self {
        Self::new()
    }
}

impl NoDurations {
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

fn is_duration(package: &str, name: &str) -> bool {
    name == "Duration" && (package == TIME || package == METAV1)
}

impl Rule for NoDurations {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids time.Duration and metav1.Duration"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_type_usage(self, ctx, |referent| {
            let duration = match referent {
                Referent::Known(link, _) | Referent::Unknown(link) => {
                    is_duration(link.package, link.name)
                }
                Referent::Decl { package, decl, .. } => is_duration(&package.path, &decl.name),
                Referent::Param(_) | Referent::Predeclared(_) => false,
            };
            duration.then_some(MESSAGE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, render, structure};
    use api_lint_core::model::{Field, TypeDecl, TypeExpr};

    fn duration() -> TypeExpr {
        TypeExpr::qualified(TIME, "Duration")
    }

    #[test]
    fn reports_type_declaration_itself() {
        let violations = check(
            &NoDurations::new(),
            vec![TypeDecl::defined("Foo", duration()).at(4, 6)],
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "type Foo should not use a Duration. Use an integer type with units in the name to avoid the need for clients to implement Go style duration parsing."
        );
        assert_eq!(violations[0].fact, None);
    }

    #[test]
    fn names_every_layer() {
        let violations = check(
            &NoDurations::new(),
            vec![structure(
                "Spec",
                vec![
                    Field::new("Plain", TypeExpr::qualified(METAV1, "Duration")).at(3, 2),
                    Field::new("Ptr", TypeExpr::pointer(duration())).at(4, 2),
                    Field::new("List", TypeExpr::slice(TypeExpr::pointer(duration()))).at(5, 2),
                    Field::new(
                        "Keyed",
                        TypeExpr::map(duration(), TypeExpr::pointer(duration())),
                    )
                    .at(6, 2),
                ],
            )],
        );
        let facts: Vec<_> = violations.iter().map(|v| v.fact.as_deref()).collect();
        assert_eq!(
            facts,
            [
                None,
                Some("pointer"),
                Some("array element pointer"),
                Some("map key"),
                Some("map value pointer"),
            ]
        );
        assert!(violations[4]
            .message
            .starts_with("field Keyed map value pointer should not use a Duration."));
    }

    #[test]
    fn sees_through_aliases_but_not_defined_types() {
        let violations = check(
            &NoDurations::new(),
            vec![
                TypeDecl::alias("Timeout", duration()).at(3, 6),
                TypeDecl::defined("Interval", duration()).at(4, 6),
                structure(
                    "Spec",
                    vec![
                        Field::new("Timeout", TypeExpr::ident("Timeout")).at(7, 2),
                        Field::new("Interval", TypeExpr::ident("Interval")).at(8, 2),
                        Field::new("Seconds", TypeExpr::ident("int32")).at(9, 2),
                    ],
                ),
            ],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        3: type Timeout should not use a Duration. Use an integer type with units in the name to avoid the need for clients to implement Go style duration parsing.
        4: type Interval should not use a Duration. Use an integer type with units in the name to avoid the need for clients to implement Go style duration parsing.
        7: field Timeout should not use a Duration. Use an integer type with units in the name to avoid the need for clients to implement Go style duration parsing.
        "###);
    }
}
