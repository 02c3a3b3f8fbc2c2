//! Pointer and `omitempty` recommendations shared by the optional and
//! required field rules.
//!
//! [`evaluate`] is the single decision table. Inputs are the field's
//! [`FieldFacts`], whether it is optional or required, and the rule options.
//! Evaluation order:
//!
//! | # | Condition | Finding |
//! |---|-----------|---------|
//! | 1 | no `omitempty`/`omitzero`, policy is not `Ignore` | [`FindingKind::MissingOmitEmpty`] |
//! | 2 | two or more pointer levels | [`FindingKind::DoublePointer`], stop |
//! | 3 | pointer to slice, `[]byte` or map | [`FindingKind::PointerToContainer`], stop |
//! | 4 | slice, `[]byte` or map, policy `Ignore`, no omit tag, zero invalid | [`FindingKind::MustHaveOmitEmpty`], stop |
//! | 5 | zero valid, not a pointer, complete | [`FindingKind::ShouldBePointer`] |
//! | 6 | zero valid, not a pointer, incomplete | [`FindingKind::IncompleteValidation`] |
//! | 7 | zero invalid, pointer, `WhenRequired`, not a struct or `omitzero` set | [`FindingKind::NeedNotBePointer`] |
//! | 8 | zero invalid, not a pointer, struct without `omitzero`, `MinProperties` not met | [`FindingKind::MinPropertiesPointer`] |
//! | 9 | zero invalid, not a pointer, struct without `omitzero` | [`FindingKind::ZeroNotAllowedPointer`] |
//! | 10 | zero invalid, not a pointer, `Always` | [`FindingKind::AlwaysPointer`] |
//! | 11 | zero invalid, not a pointer, policy `Ignore`, no omit tag | [`FindingKind::MustHaveOmitEmpty`] |
//!
//! Rows 5 to 11 are exclusive. Required fields always use
//! [`PointerPreference::WhenRequired`]. Interfaces and opaque types produce
//! no pointer findings.

use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintSet;
use crate::resolve::ResolvedType;
use crate::zero::{fails_min_properties, zero_validity, Shape, ZeroValidity};

/// Whether a field is optional or required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Marked optional.
    Optional,
    /// Marked required.
    Required,
}

/// When optional fields should be pointers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPreference {
    /// Every optional scalar or struct is a pointer.
    #[default]
    Always,
    /// Only where the zero value is a valid value.
    WhenRequired,
}

/// How a missing `omitempty` tag is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmitEmptyPolicy {
    /// Report it and suggest adding the tag.
    #[default]
    SuggestFix,
    /// Report it without a suggestion.
    Warn,
    /// Do not report it; fields whose zero value is invalid must then carry
    /// the tag to be omitted at all.
    Ignore,
}

/// Options of the decision table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializationOptions {
    /// Pointer preference for optional fields.
    pub pointers: PointerPreference,
    /// `omitempty` policy.
    pub omit_empty: OmitEmptyPolicy,
}

/// Facts about a field the decision table reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFacts<'f> {
    /// Name used in messages.
    pub name: &'f str,
    /// Serialized shape.
    pub shape: Shape,
    /// Pointer levels.
    pub pointer_depth: usize,
    /// Oracle answer.
    pub zero: ZeroValidity,
    /// `omitempty` is set.
    pub omit_empty: bool,
    /// `omitzero` is set.
    pub omit_zero: bool,
    /// The struct's zero value fails `MinProperties`.
    pub fails_min_properties: bool,
}

impl<'f> FieldFacts<'f> {
    /// Collects the facts for a resolved field.
    #[must_use]
    pub fn new(name: &'f str, ty: &ResolvedType<'_>, constraints: &ConstraintSet) -> Self {
        let shape = Shape::of(ty);
        Self {
            name,
            shape,
            pointer_depth: ty.pointer_depth,
            zero: zero_validity(shape, constraints),
            omit_empty: constraints.json.omit_empty,
            omit_zero: constraints.json.omit_zero,
            fails_min_properties: shape == Shape::Struct && fails_min_properties(constraints),
        }
    }

    fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    fn omittable(&self) -> bool {
        self.omit_empty || self.omit_zero
    }
}

/// Finding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum FindingKind {
    MissingOmitEmpty,
    DoublePointer,
    PointerToContainer,
    ShouldBePointer,
    IncompleteValidation,
    NeedNotBePointer,
    MustHaveOmitEmpty,
    MinPropertiesPointer,
    ZeroNotAllowedPointer,
    AlwaysPointer,
}

/// One recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Category.
    pub kind: FindingKind,
    /// Diagnostic text.
    pub message: String,
    /// Fix description, if one is offered.
    pub suggestion: Option<String>,
}

impl Finding {
    fn new(kind: FindingKind, message: String) -> Self {
        Self {
            kind,
            message,
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

/// Hint in the incomplete-validation message.
fn validation_hint(shape: Shape) -> &'static str {
    match shape {
        Shape::String | Shape::Bytes => "minimum length",
        Shape::Integer | Shape::Float => "minimum/maximum",
        Shape::List => "minimum items",
        Shape::Bool | Shape::Map | Shape::Struct | Shape::Other => "minimum properties",
    }
}

/// Runs the decision table for one field.
#[must_use]
pub fn evaluate(
    facts: &FieldFacts<'_>,
    requirement: Requirement,
    options: &SerializationOptions,
) -> Vec<Finding> {
    let name = facts.name;
    let mut findings = Vec::new();

    if !facts.omittable() && options.omit_empty != OmitEmptyPolicy::Ignore {
        let finding = Finding::new(
            FindingKind::MissingOmitEmpty,
            format!("field {name} should have the omitempty tag."),
        );
        findings.push(if options.omit_empty == OmitEmptyPolicy::SuggestFix {
            finding.suggest("add omitempty to the json tag")
        } else {
            finding
        });
    }

    if facts.pointer_depth > 1 {
        findings.push(
            Finding::new(
                FindingKind::DoublePointer,
                format!("field {name} is a pointer type and should not be a pointer."),
            )
            .suggest("remove the extra pointer levels"),
        );
        return findings;
    }

    let container = match facts.shape {
        Shape::List | Shape::Bytes => Some("slice"),
        Shape::Map => Some("map"),
        _ => None,
    };
    if let Some(container) = container {
        if facts.is_pointer() {
            findings.push(
                Finding::new(
                    FindingKind::PointerToContainer,
                    format!(
                        "field {name} is a pointer to a {container} type and should not be a pointer."
                    ),
                )
                .suggest("remove the pointer"),
            );
        } else if options.omit_empty == OmitEmptyPolicy::Ignore
            && !facts.omittable()
            && !facts.zero.valid
        {
            findings.push(must_have_omit_empty(name));
        }
        return findings;
    }

    if facts.shape == Shape::Other {
        return findings;
    }

    let preference = match requirement {
        Requirement::Optional => options.pointers,
        Requirement::Required => PointerPreference::WhenRequired,
    };
    let zero = facts.zero;
    let literal = facts.shape.zero_literal();

    let finding = match (zero.valid, facts.is_pointer()) {
        (true, false) if zero.complete => Some(
            Finding::new(
                FindingKind::ShouldBePointer,
                format!("field {name} has a valid zero value ({literal}) and should be a pointer."),
            )
            .suggest("convert the field to a pointer"),
        ),
        (true, false) => Some(
            Finding::new(
                FindingKind::IncompleteValidation,
                format!(
                    "field {name} has a valid zero value ({literal}), but the validation is not complete (e.g. {}). The field should be a pointer to allow the zero value to be set. If the zero value is not a valid use case, complete the validation and remove the pointer.",
                    validation_hint(facts.shape)
                ),
            )
            .suggest("convert the field to a pointer"),
        ),
        (true, true) => None,
        (false, true) => (preference == PointerPreference::WhenRequired
            && (facts.shape != Shape::Struct || facts.omit_zero))
            .then(|| {
                Finding::new(
                    FindingKind::NeedNotBePointer,
                    format!(
                        "field {name} does not allow the zero value. The field does not need to be a pointer."
                    ),
                )
                .suggest("remove the pointer")
            }),
        (false, false) if facts.shape == Shape::Struct && !facts.omit_zero => {
            Some(if facts.fails_min_properties {
                Finding::new(
                    FindingKind::MinPropertiesPointer,
                    format!(
                        "field {name} has a greater than zero minimum number of properties and should be a pointer."
                    ),
                )
                .suggest("convert the field to a pointer")
            } else {
                Finding::new(
                    FindingKind::ZeroNotAllowedPointer,
                    format!("field {name} does not allow the zero value and should be a pointer."),
                )
                .suggest("convert the field to a pointer")
            })
        }
        (false, false) if preference == PointerPreference::Always => Some(
            Finding::new(
                FindingKind::AlwaysPointer,
                format!("field {name} should be a pointer."),
            )
            .suggest("convert the field to a pointer"),
        ),
        (false, false)
            if options.omit_empty == OmitEmptyPolicy::Ignore && !facts.omittable() =>
        {
            Some(must_have_omit_empty(name))
        }
        (false, false) => None,
    };

    findings.extend(finding);
    findings
}

fn must_have_omit_empty(name: &str) -> Finding {
    Finding::new(
        FindingKind::MustHaveOmitEmpty,
        format!("field {name} does not allow the zero value. It must have the omitempty tag."),
    )
    .suggest("add omitempty to the json tag")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(shape: Shape, pointer_depth: usize, valid: bool, complete: bool) -> FieldFacts<'static> {
        FieldFacts {
            name: "Field",
            shape,
            pointer_depth,
            zero: ZeroValidity { valid, complete },
            omit_empty: true,
            omit_zero: false,
            fails_min_properties: false,
        }
    }

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    const WHEN_REQUIRED: SerializationOptions = SerializationOptions {
        pointers: PointerPreference::WhenRequired,
        omit_empty: OmitEmptyPolicy::SuggestFix,
    };

    #[test]
    fn required_int_with_zero_minimum_and_no_tag() {
        let mut f = facts(Shape::Integer, 0, true, true);
        f.omit_empty = false;
        f.name = "IntWithZeroMinimum";

        let findings = evaluate(&f, Requirement::Required, &SerializationOptions::default());
        assert_eq!(
            findings.iter().map(|f| f.message.as_str()).collect::<Vec<_>>(),
            [
                "field IntWithZeroMinimum should have the omitempty tag.",
                "field IntWithZeroMinimum has a valid zero value (0) and should be a pointer.",
            ]
        );
        assert!(findings[0].suggestion.is_some());
    }

    #[test]
    fn warn_policy_has_no_suggestion() {
        let mut f = facts(Shape::String, 1, true, true);
        f.omit_empty = false;
        let options = SerializationOptions {
            omit_empty: OmitEmptyPolicy::Warn,
            ..WHEN_REQUIRED
        };
        let findings = evaluate(&f, Requirement::Optional, &options);
        assert_eq!(kinds(&findings), [FindingKind::MissingOmitEmpty]);
        assert!(findings[0].suggestion.is_none());
    }

    #[test]
    fn double_pointer_stops_evaluation() {
        let f = facts(Shape::String, 2, true, false);
        let findings = evaluate(&f, Requirement::Optional, &WHEN_REQUIRED);
        assert_eq!(kinds(&findings), [FindingKind::DoublePointer]);
        assert_eq!(
            findings[0].message,
            "field Field is a pointer type and should not be a pointer."
        );
    }

    #[test]
    fn pointer_to_containers() {
        for (shape, word) in [(Shape::List, "slice"), (Shape::Bytes, "slice"), (Shape::Map, "map")] {
            let findings = evaluate(&facts(shape, 1, true, false), Requirement::Optional, &WHEN_REQUIRED);
            assert_eq!(
                findings[0].message,
                format!("field Field is a pointer to a {word} type and should not be a pointer.")
            );
        }
    }

    #[test]
    fn containers_with_ignore_policy() {
        let options = SerializationOptions {
            omit_empty: OmitEmptyPolicy::Ignore,
            ..WHEN_REQUIRED
        };
        let mut f = facts(Shape::List, 0, false, true);
        f.omit_empty = false;
        assert_eq!(
            kinds(&evaluate(&f, Requirement::Required, &options)),
            [FindingKind::MustHaveOmitEmpty]
        );

        f.zero.valid = true;
        assert!(evaluate(&f, Requirement::Required, &options).is_empty());
    }

    #[test]
    fn scalar_matrix() {
        let cases = [
            (true, true, 0, Requirement::Optional, Some(FindingKind::ShouldBePointer)),
            (true, false, 0, Requirement::Optional, Some(FindingKind::IncompleteValidation)),
            (true, false, 1, Requirement::Optional, None),
            (false, true, 1, Requirement::Optional, Some(FindingKind::NeedNotBePointer)),
            (false, true, 1, Requirement::Required, Some(FindingKind::NeedNotBePointer)),
            (false, true, 0, Requirement::Optional, None),
            (false, true, 0, Requirement::Required, None),
        ];

        for (valid, complete, depth, requirement, expected) in cases {
            let findings = evaluate(
                &facts(Shape::Integer, depth, valid, complete),
                requirement,
                &WHEN_REQUIRED,
            );
            assert_eq!(
                findings.first().map(|f| f.kind),
                expected,
                "valid={valid} complete={complete} depth={depth} {requirement:?}"
            );
        }
    }

    #[test]
    fn always_preference_only_applies_to_optional_fields() {
        let always = SerializationOptions::default();
        let f = facts(Shape::String, 0, false, true);
        assert_eq!(
            kinds(&evaluate(&f, Requirement::Optional, &always)),
            [FindingKind::AlwaysPointer]
        );
        assert!(evaluate(&f, Requirement::Required, &always).is_empty());

        let pointer = facts(Shape::String, 1, false, true);
        assert!(evaluate(&pointer, Requirement::Optional, &always).is_empty());
        assert_eq!(
            kinds(&evaluate(&pointer, Requirement::Required, &always)),
            [FindingKind::NeedNotBePointer]
        );
    }

    #[test]
    fn incomplete_message_names_the_missing_validation() {
        let f = facts(Shape::String, 0, true, false);
        let findings = evaluate(&f, Requirement::Optional, &WHEN_REQUIRED);
        assert_eq!(
            findings[0].message,
            "field Field has a valid zero value (\"\"), but the validation is not complete (e.g. minimum length). The field should be a pointer to allow the zero value to be set. If the zero value is not a valid use case, complete the validation and remove the pointer."
        );
    }

    #[test]
    fn structs_need_pointers_unless_omitzero() {
        let mut f = facts(Shape::Struct, 0, false, true);
        f.fails_min_properties = true;
        f.omit_empty = false;
        let findings = evaluate(&f, Requirement::Optional, &WHEN_REQUIRED);
        assert_eq!(
            kinds(&findings),
            [FindingKind::MissingOmitEmpty, FindingKind::MinPropertiesPointer]
        );
        assert_eq!(
            findings[1].message,
            "field Field has a greater than zero minimum number of properties and should be a pointer."
        );

        f.fails_min_properties = false;
        assert_eq!(
            kinds(&evaluate(&f, Requirement::Required, &WHEN_REQUIRED))[1],
            FindingKind::ZeroNotAllowedPointer
        );

        let pointer = facts(Shape::Struct, 1, false, true);
        assert!(evaluate(&pointer, Requirement::Required, &WHEN_REQUIRED).is_empty());

        let mut omit_zero = facts(Shape::Struct, 1, false, true);
        omit_zero.omit_zero = true;
        assert_eq!(
            kinds(&evaluate(&omit_zero, Requirement::Required, &WHEN_REQUIRED)),
            [FindingKind::NeedNotBePointer]
        );
    }

    #[test]
    fn ignore_policy_requires_tag_when_zero_is_invalid() {
        let options = SerializationOptions {
            omit_empty: OmitEmptyPolicy::Ignore,
            ..WHEN_REQUIRED
        };
        let mut f = facts(Shape::Integer, 0, false, true);
        f.omit_empty = false;
        let findings = evaluate(&f, Requirement::Required, &options);
        assert_eq!(
            findings[0].message,
            "field Field does not allow the zero value. It must have the omitempty tag."
        );
    }

    #[test]
    fn opaque_types_get_no_pointer_findings() {
        let f = facts(Shape::Other, 0, true, false);
        assert!(evaluate(&f, Requirement::Optional, &WHEN_REQUIRED).is_empty());
    }
}
