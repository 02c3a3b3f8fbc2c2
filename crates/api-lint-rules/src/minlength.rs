//! Rule requiring minimum bounds on strings, lists and maps.
//!
//! # Rationale
//!
//! An unbounded empty string or list is rarely a meaningful value. Declaring
//! a minimum makes the API reject it instead of storing it.
//!
//! # Detected Patterns
//!
//! - String and `[]byte` fields without `MinLength` (fields with an `Enum`
//!   are bounded by the enum)
//! - List fields without `MinItems`, and list elements without
//!   `items:MinLength` / `items:MinProperties`
//! - Map fields without `MinProperties`
//! - Struct fields whose empty object is accepted because nothing bounds it
//! - The same for defined string, list and map types
//!
//! Markers on a named type are inherited by fields of that type.

use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::length::{check_bounds, Side};

/// Rule code for minlength.
pub const CODE: &str = "KAL001";

/// Rule name for minlength.
pub const NAME: &str = "minlength";

/// Requires minimum length, item and property bounds.
#[derive(Debug, Clone)]
pub struct MinLength {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for MinLength {
    fn default() -> Self {
        Self::new()
    }
}

impl MinLength {
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

impl Rule for MinLength {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires MinLength, MinItems and MinProperties markers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_bounds(self, ctx, Side::Minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, messages, render, structure};
    use api_lint_core::model::{Field, TypeDecl, TypeExpr};

    fn field(name: &str, ty: TypeExpr) -> Field {
        Field::new(name, ty).tag(format!(r#"json:"{}""#, name.to_lowercase()))
    }

    #[test]
    fn string_without_min_length() {
        let violations = check(
            &MinLength::new(),
            vec![structure(
                "Spec",
                vec![field("StringWithoutMinLength", TypeExpr::ident("string")).at(5, 2)],
            )],
        );
        assert_eq!(
            messages(&violations),
            ["field StringWithoutMinLength must have a minimum length, add kubebuilder:validation:MinLength marker"]
        );
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].location.line, 5);
    }

    #[test]
    fn bounded_enum_and_byte_fields() {
        let violations = check(
            &MinLength::new(),
            vec![structure(
                "Spec",
                vec![
                    field("Name", TypeExpr::ident("string"))
                        .doc(["// +kubebuilder:validation:MinLength=1"]),
                    field("Mode", TypeExpr::ident("string"))
                        .doc(["// +kubebuilder:validation:Enum=Fast;Slow"]),
                    field("Data", TypeExpr::slice(TypeExpr::ident("byte"))),
                ],
            )],
        );
        assert_eq!(
            messages(&violations),
            ["field Data must have a minimum length, add kubebuilder:validation:MinLength marker"]
        );
    }

    #[test]
    fn inherits_type_level_markers() {
        let violations = check(
            &MinLength::new(),
            vec![
                TypeDecl::defined("Name", TypeExpr::ident("string"))
                    .doc(["// +kubebuilder:validation:MinLength=1"]),
                structure(
                    "Spec",
                    vec![field("Name", TypeExpr::pointer(TypeExpr::ident("Name")))],
                ),
            ],
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn lists_maps_and_elements() {
        let violations = check(
            &MinLength::new(),
            vec![
                TypeDecl::defined("Tags", TypeExpr::slice(TypeExpr::ident("string"))).at(3, 6),
                structure(
                    "Spec",
                    vec![
                        field("Names", TypeExpr::slice(TypeExpr::ident("string"))).at(6, 2),
                        field("Bounded", TypeExpr::slice(TypeExpr::ident("string")))
                            .at(9, 2)
                            .doc([
                                "// +kubebuilder:validation:MinItems=1",
                                "// +kubebuilder:validation:items:MinLength=1",
                            ]),
                        field(
                            "Labels",
                            TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("string")),
                        )
                        .at(12, 2),
                        field(
                            "Selectors",
                            TypeExpr::slice(TypeExpr::map(
                                TypeExpr::ident("string"),
                                TypeExpr::ident("string"),
                            )),
                        )
                        .at(15, 2)
                        .doc(["// +kubebuilder:validation:MinItems=1"]),
                    ],
                )
                .at(5, 6),
            ],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        3: type Tags must have a minimum items, add kubebuilder:validation:MinItems marker
        3: type Tags array element must have a minimum length, add kubebuilder:validation:items:MinLength marker
        6: field Names must have a minimum items, add kubebuilder:validation:MinItems marker
        6: field Names array element must have a minimum length, add kubebuilder:validation:items:MinLength marker
        12: field Labels must have a minimum properties, add kubebuilder:validation:MinProperties marker
        15: field Selectors array element must have a minimum properties, add kubebuilder:validation:items:MinProperties marker
        "###);
    }

    #[test]
    fn struct_fields_follow_the_zero_value() {
        let violations = check(
            &MinLength::new(),
            vec![
                structure(
                    "Open",
                    vec![field("Note", TypeExpr::ident("string"))
                        .doc(["// +kubebuilder:validation:MinLength=1"])
                        .tag(r#"json:"note,omitempty""#)],
                ),
                structure(
                    "Bounded",
                    vec![field("Note", TypeExpr::ident("string"))
                        .doc(["// +kubebuilder:validation:MinLength=1"])
                        .tag(r#"json:"note,omitempty""#)],
                )
                .doc(["// +kubebuilder:validation:MinProperties=1"]),
                structure(
                    "Spec",
                    vec![
                        field("Open", TypeExpr::ident("Open")),
                        field("Bounded", TypeExpr::ident("Bounded")),
                    ],
                ),
            ],
        );
        assert_eq!(
            messages(&violations),
            ["field Open must have a minimum properties, add kubebuilder:validation:MinProperties marker"]
        );
    }

    #[test]
    fn malformed_bounds_are_reported_instead_of_missing() {
        let violations = check(
            &MinLength::new(),
            vec![
                TypeDecl::defined("Name", TypeExpr::ident("string"))
                    .at(3, 6)
                    .doc(["// +kubebuilder:validation:MinLength=abc"]),
                structure(
                    "Spec",
                    vec![
                        field("Host", TypeExpr::ident("string"))
                            .at(6, 2)
                            .doc(["// +kubebuilder:validation:MinLength=abc"]),
                        field("Port", TypeExpr::ident("string"))
                            .at(8, 2)
                            .doc([
                                "// +required",
                                "// +kubebuilder:validation:MinLength=x",
                            ]),
                        field("Path", TypeExpr::ident("string"))
                            .at(10, 2)
                            .doc(["// +kubebuilder:validation:MaxLength=many"]),
                    ],
                )
                .at(5, 6),
            ],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        3: type Name has an invalid validation marker: invalid value "abc" for marker kubebuilder:validation:MinLength: not a valid integer
        6: field Host has an invalid validation marker: invalid value "abc" for marker kubebuilder:validation:MinLength: not a valid integer
        10: field Path must have a minimum length, add kubebuilder:validation:MinLength marker
        "###);
    }

    #[test]
    fn from_config_reads_severity() {
        let config = RuleConfig {
            severity: Some(Severity::Error),
            ..RuleConfig::default()
        };
        assert_eq!(MinLength::from_config(&config).default_severity(), Severity::Error);
    }
}
