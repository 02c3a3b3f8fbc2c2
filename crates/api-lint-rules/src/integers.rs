//! Rule restricting integer types to `int32` and `int64`.
//!
//! # Rationale
//!
//! `int` changes size with the platform, small integers overflow silently,
//! and unsigned integers are poorly supported by JSON and other languages.
//!
//! # Detected Patterns
//!
//! - `int`, `int8`, `int16`
//! - `uint`, `uint8`, `uint16`, `uint32`, `uint64`, `uintptr`
//!
//! in fields and type declarations, including behind pointers, list
//! elements and map keys/values. `[]byte` is allowed.

use api_lint_core::resolve::BasicKind;
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};

use crate::layers::{check_type_usage, predeclared_basic};

/// Rule code for integers.
pub const CODE: &str = "KAL012";

/// Rule name for integers.
pub const NAME: &str = "integers";

/// Allows only `int32` and `int64`.
#[derive(Debug, Clone)]
pub struct Integers {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for Integers {
    fn default() -> Self {
        Self::new()
    }
}

impl Integers {
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

fn complaint(basic: BasicKind) -> Option<&'static str> {
    match basic {
        BasicKind::Int | BasicKind::Int8 | BasicKind::Int16 => Some(
            "should not use an int, int8 or int16. Use int32 or int64 depending on bounding requirements",
        ),
        b if b.is_unsigned() => Some(
            "should not use unsigned integers, use only int32 or int64 and apply validation to ensure the value is positive",
        ),
        _ => None,
    }
}

impl Rule for Integers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Allows only int32 and int64"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        check_type_usage(self, ctx, |referent| {
            predeclared_basic(referent).and_then(complaint)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, render, structure};
    use api_lint_core::model::{Field, TypeExpr};

    #[test]
    fn classifies_integer_kinds() {
        assert!(complaint(BasicKind::Int).is_some());
        assert!(complaint(BasicKind::Int16).is_some());
        assert!(complaint(BasicKind::Uint64).is_some());
        assert!(complaint(BasicKind::Uint8).is_some());
        assert!(complaint(BasicKind::Int32).is_none());
        assert!(complaint(BasicKind::Int64).is_none());
        assert!(complaint(BasicKind::String).is_none());
    }

    #[test]
    fn reports_fields() {
        let violations = check(
            &Integers::new(),
            vec![structure(
                "Spec",
                vec![
                    Field::new("Replicas", TypeExpr::ident("int")).at(3, 2),
                    Field::new("Port", TypeExpr::pointer(TypeExpr::ident("uint16"))).at(4, 2),
                    Field::new("Data", TypeExpr::slice(TypeExpr::ident("byte"))).at(5, 2),
                    Field::new("Size", TypeExpr::ident("int64")).at(6, 2),
                    Field::new(
                        "Limits",
                        TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("int8")),
                    )
                    .at(7, 2),
                ],
            )],
        );
        insta::assert_snapshot!(render(&violations), @r###"
        3: field Replicas should not use an int, int8 or int16. Use int32 or int64 depending on bounding requirements
        4: field Port pointer should not use unsigned integers, use only int32 or int64 and apply validation to ensure the value is positive
        7: field Limits map value should not use an int, int8 or int16. Use int32 or int64 depending on bounding requirements
        "###);
    }
}
