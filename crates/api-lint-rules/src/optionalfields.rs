//! Rule for the serialization of optional fields.
//!
//! # Rationale
//!
//! An optional field must be able to tell "unset" from "set to the zero
//! value" whenever the zero value is accepted by validation. That takes a
//! pointer (or `omitzero` for structs) and an `omitempty` tag.
//!
//! # Detected Patterns
//!
//! See [`api_lint_core::serialization`] for the decision table shared with
//! `requiredfields`. Malformed validation markers on optional fields are
//! reported too, since they leave the decision without its input.
//!
//! # Configuration
//!
//! ```toml
//! [rules.optionalfields]
//! pointers = { preference = "Always" }      # or "WhenRequired"
//! omitempty = { policy = "SuggestFix" }     # or "Warn", "Ignore"
//! ```

use api_lint_core::serialization::{
    evaluate, FieldFacts, OmitEmptyPolicy, PointerPreference, Requirement, SerializationOptions,
};
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};
use serde::Deserialize;

use crate::support::{self, Subject};

/// Rule code for optionalfields.
pub const CODE: &str = "KAL005";

/// Rule name for optionalfields.
pub const NAME: &str = "optionalfields";

#[derive(Debug, Default, Deserialize)]
struct PointerOptions {
    #[serde(default)]
    preference: PointerPreference,
}

#[derive(Debug, Default, Deserialize)]
struct OmitEmptyOptions {
    #[serde(default)]
    policy: OmitEmptyPolicy,
}

/// Reads the `omitempty` section shared with `requiredfields`.
pub(crate) fn omit_empty_policy(config: &RuleConfig) -> Option<OmitEmptyPolicy> {
    config
        .get_option::<OmitEmptyOptions>("omitempty")
        .map(|o| o.policy)
}

/// Checks pointers and `omitempty` on optional fields.
#[derive(Debug, Clone)]
pub struct OptionalFields {
    /// Table options.
    pub options: SerializationOptions,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for OptionalFields {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionalFields {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: SerializationOptions::default(),
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new().severity(config.severity.unwrap_or(Severity::Warning));
        if let Some(pointers) = config.get_option::<PointerOptions>("pointers") {
            rule.options.pointers = pointers.preference;
        }
        if let Some(policy) = omit_empty_policy(config) {
            rule.options.omit_empty = policy;
        }
        rule
    }

    /// Sets the pointer preference.
    #[must_use]
    pub fn pointers(mut self, preference: PointerPreference) -> Self {
        self.options.pointers = preference;
        self
    }

    /// Sets the `omitempty` policy.
    #[must_use]
    pub fn omit_empty(mut self, policy: OmitEmptyPolicy) -> Self {
        self.options.omit_empty = policy;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Runs the decision table over every field with the given requirement.
pub(crate) fn check_requirement(
    rule: &dyn Rule,
    ctx: &FileContext<'_>,
    requirement: Requirement,
    options: &SerializationOptions,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (field, scope) in support::fields(ctx.file) {
        let info = ctx.inspect_field(field, &scope);
        let selected = match requirement {
            Requirement::Optional => info.constraints.optional,
            Requirement::Required => info.constraints.required,
        };
        if info.is_skipped() || !selected {
            continue;
        }

        violations.extend(support::marker_errors(
            rule,
            ctx,
            field.pos,
            Subject::Field(info.name()),
            &info.errors,
        ));

        let facts = FieldFacts::new(info.name(), &info.resolved, &info.constraints);
        for finding in evaluate(&facts, requirement, options) {
            let mut violation = support::violation(rule, ctx, field.pos, finding.message);
            if let Some(suggestion) = finding.suggestion {
                violation = violation.with_suggestion(Suggestion::new(suggestion));
            }
            violations.push(violation);
        }
    }

    violations
}

impl Rule for OptionalFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks pointers and omitempty on optional fields"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_requirement(self, ctx, Requirement::Optional, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, messages, render, structure};
    use api_lint_core::model::{Field, TypeExpr};

    fn optional(name: &str, ty: TypeExpr, tag: &str) -> Field {
        Field::new(name, ty).doc(["// +optional"]).tag(tag)
    }

    #[test]
    fn struct_with_inherited_min_properties() {
        let violations = check(
            &OptionalFields::new(),
            vec![
                structure(
                    "Settings",
                    vec![Field::new("Mode", TypeExpr::ident("string"))
                        .at(3, 2)
                        .doc(["// +optional"])
                        .tag(r#"json:"mode,omitempty""#)],
                )
                .doc(["// +kubebuilder:validation:MinProperties=1"]),
                structure(
                    "Spec",
                    vec![optional("Settings", TypeExpr::ident("Settings"), r#"json:"settings""#)
                        .at(9, 2)],
                ),
            ],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        3: field Mode has a valid zero value (""), but the validation is not complete (e.g. minimum length). The field should be a pointer to allow the zero value to be set. If the zero value is not a valid use case, complete the validation and remove the pointer.
        9: field Settings should have the omitempty tag.
        9: field Settings has a greater than zero minimum number of properties and should be a pointer.
        "###);
    }

    #[test]
    fn pointer_preferences() {
        let decls = || {
            vec![structure(
                "Spec",
                vec![
                    optional("Replicas", TypeExpr::pointer(TypeExpr::ident("int32")), r#"json:"replicas,omitempty""#)
                        .doc(["// +optional", "// +kubebuilder:validation:Minimum=1"]),
                    optional("Name", TypeExpr::ident("string"), r#"json:"name,omitempty""#)
                        .doc(["// +optional", "// +kubebuilder:validation:MinLength=1"]),
                ],
            )]
        };

        assert_eq!(
            messages(&check(&OptionalFields::new(), decls())),
            ["field Name should be a pointer."]
        );
        assert_eq!(
            messages(&check(
                &OptionalFields::new().pointers(PointerPreference::WhenRequired),
                decls()
            )),
            ["field Replicas does not allow the zero value. The field does not need to be a pointer."]
        );
    }

    #[test]
    fn containers_and_double_pointers() {
        let violations = check(
            &OptionalFields::new(),
            vec![structure(
                "Spec",
                vec![
                    optional(
                        "Items",
                        TypeExpr::pointer(TypeExpr::slice(TypeExpr::ident("string"))),
                        r#"json:"items,omitempty""#,
                    ),
                    optional(
                        "Count",
                        TypeExpr::pointer(TypeExpr::pointer(TypeExpr::ident("int32"))),
                        r#"json:"count,omitempty""#,
                    ),
                    optional("Tags", TypeExpr::slice(TypeExpr::ident("string")), r#"json:"tags,omitempty""#),
                ],
            )],
        );
        assert_eq!(
            messages(&violations),
            [
                "field Items is a pointer to a slice type and should not be a pointer.",
                "field Count is a pointer type and should not be a pointer.",
            ]
        );
        assert_eq!(
            violations[0].suggestion.as_ref().map(|s| s.message.as_str()),
            Some("remove the pointer")
        );
    }

    #[test]
    fn reports_malformed_markers() {
        let violations = check(
            &OptionalFields::new(),
            vec![structure(
                "Spec",
                vec![optional(
                    "Replicas",
                    TypeExpr::pointer(TypeExpr::ident("int32")),
                    r#"json:"replicas,omitempty""#,
                )
                .doc(["// +optional", "// +kubebuilder:validation:Minimum=one"])],
            )],
        );
        assert_eq!(
            messages(&violations),
            [r#"field Replicas has an invalid validation marker: invalid value "one" for marker kubebuilder:validation:Minimum: not a valid integer"#]
        );
    }

    #[test]
    fn config_sections() {
        let config = api_lint_core::Config::parse(
            r#"
[rules.optionalfields]
pointers = { preference = "WhenRequired" }
omitempty = { policy = "Ignore" }
"#,
        )
        .expect("valid config");
        let rule = OptionalFields::from_config(config.rule(NAME).expect("section"));
        assert_eq!(rule.options.pointers, PointerPreference::WhenRequired);
        assert_eq!(rule.options.omit_empty, OmitEmptyPolicy::Ignore);
    }
}
