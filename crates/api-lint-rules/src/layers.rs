//! Type-usage checks that look through pointers, list elements and map
//! keys/values.
//!
//! Aliases and type parameters are seen through. Defined types are not: a
//! `type Timeout time.Duration` is reported at its own declaration, and a
//! field of type `Timeout` is not reported again. `[]byte` is never entered.

use api_lint_core::model::TypeExpr;
use api_lint_core::resolve::{BasicKind, Kind, Referent, TypeRef};
use api_lint_core::{FileContext, Rule, Violation};

use crate::support::{self, Subject};

const MAX_DEPTH: usize = 32;

/// Where inside a type expression a match was found, e.g.
/// `map value pointer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Layer(Vec<&'static str>);

impl Layer {
    fn push(&self, part: &'static str) -> Self {
        let mut parts = self.0.clone();
        parts.push(part);
        Self(parts)
    }

    /// Layer description followed by a space, or nothing at the top level.
    pub(crate) fn prefix(&self) -> String {
        match self.name() {
            Some(name) => format!("{name} "),
            None => String::new(),
        }
    }

    /// Layer description, `None` at the top level.
    pub(crate) fn name(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.join(" "))
    }
}

/// Calls `visit` for every identifier reachable from `ty` through pointers,
/// slices, arrays and maps.
pub(crate) fn walk<'a>(
    ctx: &FileContext<'a>,
    ty: TypeRef<'a>,
    visit: &mut dyn FnMut(&Referent<'a>, &Layer),
) {
    walk_at(ctx, ty, &Layer::default(), visit, 0);
}

fn walk_at<'a>(
    ctx: &FileContext<'a>,
    ty: TypeRef<'a>,
    layer: &Layer,
    visit: &mut dyn FnMut(&Referent<'a>, &Layer),
    depth: usize,
) {
    if depth > MAX_DEPTH {
        return;
    }

    let ty = ctx.resolver.peel_aliases(ty);
    match ty.expr {
        TypeExpr::Pointer { elem } => {
            walk_at(ctx, ty.with(elem), &layer.push("pointer"), visit, depth + 1);
        }
        TypeExpr::Slice { elem } | TypeExpr::Array { elem, .. } => {
            if ctx.resolver.resolve(ty.clone()).byte_slice {
                return;
            }
            walk_at(ctx, ty.with(elem), &layer.push("array element"), visit, depth + 1);
        }
        TypeExpr::Map { key, value } => {
            walk_at(ctx, ty.with(key), &layer.push("map key"), visit, depth + 1);
            walk_at(ctx, ty.with(value), &layer.push("map value"), visit, depth + 1);
        }
        TypeExpr::Interface { terms } if terms.len() == 1 => {
            walk_at(ctx, ty.with(&terms[0]), layer, visit, depth + 1);
        }
        TypeExpr::Ident { .. } => {
            if let Some(referent) = ctx.resolver.referent(&ty) {
                visit(&referent, layer);
            }
        }
        TypeExpr::Struct { .. }
        | TypeExpr::Interface { .. }
        | TypeExpr::Func
        | TypeExpr::Chan { .. } => {}
    }
}

/// The basic kind of a predeclared identifier.
pub(crate) fn predeclared_basic(referent: &Referent<'_>) -> Option<BasicKind> {
    match referent {
        Referent::Predeclared(Kind::Basic(basic)) => Some(*basic),
        _ => None,
    }
}

/// Reports every use of a matching type in the file's type declarations
/// and fields. `matcher` returns the message text that follows the subject
/// and layer, e.g. `should not use a bool.`.
pub(crate) fn check_type_usage<'a>(
    rule: &dyn Rule,
    ctx: &FileContext<'a>,
    matcher: impl Fn(&Referent<'a>) -> Option<&'static str>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut report = |subject: Subject<'_>, pos, ty: TypeRef<'a>| {
        walk(ctx, ty, &mut |referent, layer| {
            if let Some(text) = matcher(referent) {
                let mut violation = support::violation(
                    rule,
                    ctx,
                    pos,
                    format!("{subject} {}{text}", layer.prefix()),
                );
                if let Some(name) = layer.name() {
                    violation = violation.with_fact(name);
                }
                violations.push(violation);
            }
        });
    };

    for decl in &ctx.file.decls {
        report(Subject::Type(&decl.name), decl.pos, ctx.decl_type(decl));
    }
    for (field, scope) in support::fields(ctx.file) {
        if field.is_embedded() {
            continue;
        }
        report(
            Subject::Field(field.display_name()),
            field.pos,
            ctx.type_ref(&field.ty, &scope),
        );
    }

    violations.sort_by_key(|v| (v.location.line, v.location.column));
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::package;
    use api_lint_core::markers::MarkerRegistry;
    use api_lint_core::model::{Program, TypeDecl};

    fn layers_of_strings(decl: TypeDecl) -> Vec<Option<String>> {
        let program = Program::from(package(vec![decl]));
        let registry = MarkerRegistry::default();
        let pkg = &program.packages()[0];
        let file = &pkg.files[0];
        let ctx = FileContext::new(&program, pkg, file, &registry);

        let mut found = Vec::new();
        walk(&ctx, ctx.decl_type(&file.decls[0]), &mut |referent, layer| {
            if matches!(referent, Referent::Predeclared(Kind::Basic(BasicKind::String))) {
                found.push(layer.name());
            }
        });
        found
    }

    #[test]
    fn names_each_layer() {
        let top = TypeDecl::defined("A", TypeExpr::ident("string"));
        assert_eq!(layers_of_strings(top), [None]);

        let nested = TypeDecl::defined(
            "B",
            TypeExpr::map(
                TypeExpr::pointer(TypeExpr::ident("string")),
                TypeExpr::slice(TypeExpr::pointer(TypeExpr::ident("string"))),
            ),
        );
        assert_eq!(
            layers_of_strings(nested),
            [
                Some("map key pointer".to_string()),
                Some("map value array element pointer".to_string()),
            ]
        );
    }

    #[test]
    fn skips_byte_slices() {
        let program = Program::from(package(vec![TypeDecl::defined(
            "Raw",
            TypeExpr::slice(TypeExpr::ident("byte")),
        )]));
        let registry = MarkerRegistry::default();
        let pkg = &program.packages()[0];
        let file = &pkg.files[0];
        let ctx = FileContext::new(&program, pkg, file, &registry);

        let mut visited = 0;
        walk(&ctx, ctx.decl_type(&file.decls[0]), &mut |_, _| visited += 1);
        assert_eq!(visited, 0);
    }
}
