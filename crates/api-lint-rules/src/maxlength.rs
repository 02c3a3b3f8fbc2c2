//! Rule requiring maximum bounds on strings, lists and maps.
//!
//! # Rationale
//!
//! Unbounded values make it impossible to estimate the cost of validating
//! an object, and let a single resource grow without limit.
//!
//! # Detected Patterns
//!
//! - String and `[]byte` fields without `MaxLength` (unless an `Enum` is set)
//! - List fields without `MaxItems`, and list elements without
//!   `items:MaxLength` / `items:MaxProperties`
//! - Map fields without `MaxProperties`
//! - The same for defined string, list and map types

use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::length::{check_bounds, Side};

/// Rule code for maxlength.
pub const CODE: &str = "KAL009";

/// Rule name for maxlength.
pub const NAME: &str = "maxlength";

/// Requires maximum length, item and property bounds.
#[derive(Debug, Clone)]
pub struct MaxLength {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for MaxLength {
    fn default() -> Self {
        Self::new()
    }
}

impl MaxLength {
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

impl Rule for MaxLength {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires MaxLength, MaxItems and MaxProperties markers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_bounds(self, ctx, Side::Maximum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, render, structure};
    use api_lint_core::model::{Field, TypeDecl, TypeExpr};

    #[test]
    fn reports_missing_maximums() {
        let violations = check(
            &MaxLength::new(),
            vec![
                TypeDecl::defined("Name", TypeExpr::ident("string"))
                    .at(3, 6)
                    .doc(["// +kubebuilder:validation:MaxLength=63"]),
                structure(
                    "Spec",
                    vec![
                        Field::new("Name", TypeExpr::ident("Name"))
                            .at(6, 2)
                            .tag(r#"json:"name""#),
                        Field::new("Description", TypeExpr::ident("string"))
                            .at(8, 2)
                            .tag(r#"json:"description""#),
                        Field::new("Hosts", TypeExpr::slice(TypeExpr::ident("string")))
                            .at(11, 2)
                            .doc(["// +kubebuilder:validation:MaxItems=16"])
                            .tag(r#"json:"hosts""#),
                        Field::new("Nested", TypeExpr::ident("Name"))
                            .at(13, 2)
                            .tag(r#"json:",inline""#),
                    ],
                ),
            ],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        8: field Description must have a maximum length, add kubebuilder:validation:MaxLength marker
        11: field Hosts array element must have a maximum length, add kubebuilder:validation:items:MaxLength marker
        "###);
    }

    #[test]
    fn reports_only_malformed_maximums() {
        let violations = check(
            &MaxLength::new(),
            vec![structure(
                "Spec",
                vec![
                    Field::new("Host", TypeExpr::ident("string"))
                        .at(4, 2)
                        .doc([
                            "// +kubebuilder:validation:MinLength=abc",
                            "// +kubebuilder:validation:MaxLength=253",
                        ])
                        .tag(r#"json:"host""#),
                    Field::new("Hosts", TypeExpr::slice(TypeExpr::ident("string")))
                        .at(7, 2)
                        .doc([
                            "// +kubebuilder:validation:MaxItems=lots",
                            "// +kubebuilder:validation:items:MaxLength=253",
                        ])
                        .tag(r#"json:"hosts""#),
                ],
            )],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        7: field Hosts has an invalid validation marker: invalid value "lots" for marker kubebuilder:validation:MaxItems: not a valid integer
        "###);
    }

    #[test]
    fn structs_are_not_bounded_from_above() {
        let violations = check(
            &MaxLength::new(),
            vec![
                structure("Inner", vec![]),
                structure(
                    "Spec",
                    vec![Field::new("Inner", TypeExpr::ident("Inner")).tag(r#"json:"inner""#)],
                ),
            ],
        );
        assert!(violations.is_empty());
    }
}
