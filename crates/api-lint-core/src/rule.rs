//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::types::{Severity, Violation};

/// A per-file lint rule over the declaration model.
///
/// Rules receive a [`FileContext`] and usually walk `ctx.file` with a
/// [`Visit`](crate::visit::Visit) implementation. Rules are stateless across
/// files and must not depend on the order files are checked in.
///
/// # Example
///
/// ```ignore
/// use api_lint_core::{FileContext, Rule, Violation};
/// use api_lint_core::visit::{self, Scope, Visit};
///
/// pub struct NoEmbeddedFields;
///
/// impl Rule for NoEmbeddedFields {
///     fn name(&self) -> &'static str { "noembeddedfields" }
///     fn code(&self) -> &'static str { "KAL100" }
///
///     fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
///         let mut visitor = EmbeddedVisitor::new(self, ctx);
///         visitor.visit_file(ctx.file);
///         visitor.violations
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the name of this rule (e.g., "minlength").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "KAL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks a single file and returns any violations found.
    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerRegistry;
    use crate::model::{Package, Program, SourceFile};
    use crate::types::Location;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }

        fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
            vec![Violation::new(
                self.code(),
                self.name(),
                self.default_severity(),
                Location::new(ctx.file.path.clone(), 1, 1),
                "Test violation",
            )]
        }
    }

    #[test]
    fn test_rule_trait() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Warning);

        let program = Program::from(
            Package::new("example.com/a", "a").file(SourceFile::new("a/types.go")),
        );
        let registry = MarkerRegistry::default();
        let package = &program.packages()[0];
        let ctx = FileContext::new(&program, package, &package.files[0], &registry);
        let violations = rule.check(&ctx);
        assert_eq!(violations[0].location.file.to_str(), Some("a/types.go"));
    }
}
