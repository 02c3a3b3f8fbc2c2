//! Builders for rule tests.

use api_lint_core::markers::MarkerRegistry;
use api_lint_core::model::{Field, Package, Program, SourceFile, TypeDecl, TypeExpr};
use api_lint_core::{FileContext, Rule, Violation};

pub(crate) const PACKAGE: &str = "example.com/api/v1";

/// A package with one file, `api/v1/types.go`, holding `decls`.
pub(crate) fn package(decls: Vec<TypeDecl>) -> Package {
    let file = decls
        .into_iter()
        .fold(SourceFile::new("api/v1/types.go"), SourceFile::decl);
    Package::new(PACKAGE, "v1").file(file)
}

/// A struct declaration.
pub(crate) fn structure(name: &str, fields: Vec<Field>) -> TypeDecl {
    TypeDecl::defined(name, TypeExpr::structure(fields))
}

/// Runs `rule` on the first file of the first package.
pub(crate) fn check_program(rule: &dyn Rule, program: &Program) -> Vec<Violation> {
    let registry = MarkerRegistry::default();
    let pkg = &program.packages()[0];
    let ctx = FileContext::new(program, pkg, &pkg.files[0], &registry);
    rule.check(&ctx)
}

/// Runs `rule` on a single file holding `decls`.
pub(crate) fn check(rule: &dyn Rule, decls: Vec<TypeDecl>) -> Vec<Violation> {
    check_program(rule, &Program::from(package(decls)))
}

/// Messages only, in report order.
pub(crate) fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.message.clone()).collect()
}

/// One `line: message` entry per violation, for snapshots.
pub(crate) fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.location.line, v.message))
        .collect::<Vec<_>>()
        .join("\n")
}
