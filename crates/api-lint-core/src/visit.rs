//! Read-only traversal of a source file's declarations.
//!
//! Each method of [`Visit`] has a default implementation that calls the free
//! function of the same name, which walks the children. Overriding a method
//! and calling the free function from it keeps the traversal going.
//!
//! Traversal order is source order: file → type declarations → struct
//! fields. Fields of anonymous structs nested anywhere in a type expression
//! (including inside pointers, slices and maps) are visited with the scope of
//! the enclosing declaration.

use crate::model::{Field, SourceFile, TypeDecl, TypeExpr};

/// The declaration a field is reached from.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Enclosing type declaration.
    pub decl: &'a TypeDecl,
}

impl<'a> Scope<'a> {
    /// Creates a scope for a declaration.
    #[must_use]
    pub fn new(decl: &'a TypeDecl) -> Self {
        Self { decl }
    }
}

/// Visitor over declarations.
pub trait Visit<'a> {
    /// Visits a file.
    fn visit_file(&mut self, file: &'a SourceFile) {
        visit_file(self, file);
    }

    /// Visits a type declaration.
    fn visit_type_decl(&mut self, decl: &'a TypeDecl) {
        visit_type_decl(self, decl);
    }

    /// Visits a struct field.
    fn visit_field(&mut self, field: &'a Field, scope: &Scope<'a>) {
        visit_field(self, field, scope);
    }
}

/// Visits every declaration of the file.
pub fn visit_file<'a, V>(v: &mut V, file: &'a SourceFile)
where
    V: Visit<'a> + ?Sized,
{
    for decl in &file.decls {
        v.visit_type_decl(decl);
    }
}

/// Visits the fields of the declaration's type expression.
pub fn visit_type_decl<'a, V>(v: &mut V, decl: &'a TypeDecl)
where
    V: Visit<'a> + ?Sized,
{
    let scope = Scope::new(decl);
    visit_type_expr(v, &decl.ty, &scope);
}

/// Visits the fields of anonymous structs in the field's type.
pub fn visit_field<'a, V>(v: &mut V, field: &'a Field, scope: &Scope<'a>)
where
    V: Visit<'a> + ?Sized,
{
    visit_type_expr(v, &field.ty, scope);
}

fn visit_type_expr<'a, V>(v: &mut V, expr: &'a TypeExpr, scope: &Scope<'a>)
where
    V: Visit<'a> + ?Sized,
{
    match expr {
        TypeExpr::Struct { fields } => {
            for field in fields {
                v.visit_field(field, scope);
            }
        }
        TypeExpr::Pointer { elem }
        | TypeExpr::Slice { elem }
        | TypeExpr::Array { elem, .. }
        | TypeExpr::Chan { elem } => visit_type_expr(v, elem, scope),
        TypeExpr::Map { key, value } => {
            visit_type_expr(v, key, scope);
            visit_type_expr(v, value, scope);
        }
        TypeExpr::Ident { .. } | TypeExpr::Interface { .. } | TypeExpr::Func => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        seen: Vec<String>,
    }

    impl<'a> Visit<'a> for Collect {
        fn visit_type_decl(&mut self, decl: &'a TypeDecl) {
            self.seen.push(format!("type {}", decl.name));
            visit_type_decl(self, decl);
        }

        fn visit_field(&mut self, field: &'a Field, scope: &Scope<'a>) {
            self.seen
                .push(format!("{}.{}", scope.decl.name, field.display_name()));
            visit_field(self, field, scope);
        }
    }

    #[test]
    fn visits_nested_anonymous_structs_in_order() {
        let file = SourceFile::new("types.go")
            .decl(TypeDecl::defined(
                "Spec",
                TypeExpr::structure(vec![
                    Field::new("Name", TypeExpr::ident("string")),
                    Field::new(
                        "Items",
                        TypeExpr::slice(TypeExpr::structure(vec![Field::new(
                            "Value",
                            TypeExpr::ident("int32"),
                        )])),
                    ),
                ]),
            ))
            .decl(TypeDecl::defined("Mode", TypeExpr::ident("string")));

        let mut collect = Collect::default();
        collect.visit_file(&file);

        assert_eq!(
            collect.seen,
            ["type Spec", "Spec.Name", "Spec.Items", "Spec.Value", "type Mode"]
        );
    }
}
