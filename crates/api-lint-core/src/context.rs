//! Context types for rule execution.

use crate::constraints::{ConstraintExtractor, ConstraintSet};
use crate::markers::{MarkerRegistry, MarkerSet, MarkerValueError};
use crate::model::{Field, Package, Position, Program, SourceFile, TypeDecl, TypeExpr};
use crate::resolve::{ResolvedType, Resolver, TypeRef};
use crate::tags::JsonTag;
use crate::types::Location;
use crate::visit::Scope;

/// Context provided to per-file rules.
///
/// Gives rules the file being checked together with the program it belongs
/// to, and the shared substrate: marker parsing, type resolution and
/// constraint extraction.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// All loaded packages.
    pub program: &'a Program,
    /// Package that contains the file.
    pub package: &'a Package,
    /// The file being checked.
    pub file: &'a SourceFile,
    /// Marker registry.
    pub registry: &'a MarkerRegistry,
    /// Type resolver over `program`.
    pub resolver: Resolver<'a>,
}

/// Everything the rules need to know about one field.
#[derive(Debug, Clone)]
pub struct FieldInfo<'a> {
    /// The field.
    pub field: &'a Field,
    /// Markers attached to the field itself.
    pub markers: MarkerSet,
    /// Parsed `json` tag.
    pub json: JsonTag,
    /// Resolved type.
    pub resolved: ResolvedType<'a>,
    /// Constraints, with type-level markers inherited.
    pub constraints: ConstraintSet,
    /// Malformed marker values met during extraction.
    pub errors: Vec<MarkerValueError>,
}

impl FieldInfo<'_> {
    /// Name used in messages.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.display_name()
    }

    /// Returns true for fields that are not serialized as their own
    /// property: embedded, inline or `json:"-"` fields.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.field.is_embedded() || self.json.inline || self.json.ignored
    }
}

/// Everything the rules need to know about one type declaration.
#[derive(Debug, Clone)]
pub struct DeclInfo<'a> {
    /// The declaration.
    pub decl: &'a TypeDecl,
    /// Markers attached to the declaration.
    pub markers: MarkerSet,
    /// Resolved right-hand side.
    pub resolved: ResolvedType<'a>,
    /// Constraints of the declaration and the named types it builds on.
    pub constraints: ConstraintSet,
    /// Malformed marker values met during extraction.
    pub errors: Vec<MarkerValueError>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(
        program: &'a Program,
        package: &'a Package,
        file: &'a SourceFile,
        registry: &'a MarkerRegistry,
    ) -> Self {
        Self {
            program,
            package,
            file,
            registry,
            resolver: Resolver::new(program),
        }
    }

    /// Location of a position in this file.
    #[must_use]
    pub fn location(&self, pos: Position) -> Location {
        Location::from_position(self.file.path.clone(), pos)
    }

    /// Parses a comment block.
    #[must_use]
    pub fn markers(&self, doc: &[String]) -> MarkerSet {
        self.registry.parse(doc)
    }

    /// Constraint extractor sharing this context's resolver and registry.
    #[must_use]
    pub fn extractor(&self) -> ConstraintExtractor<'a> {
        ConstraintExtractor::new(self.resolver, self.registry)
    }

    /// A type expression written inside `scope`, with the enclosing
    /// declaration's type parameters bound to their constraints.
    #[must_use]
    pub fn type_ref(&self, expr: &'a TypeExpr, scope: &Scope<'a>) -> TypeRef<'a> {
        TypeRef {
            expr,
            package: self.package,
            bindings: self.resolver.scope_bindings(scope.decl, self.package),
        }
    }

    /// Right-hand side of a declaration in this file.
    #[must_use]
    pub fn decl_type(&self, decl: &'a TypeDecl) -> TypeRef<'a> {
        self.type_ref(&decl.ty, &Scope::new(decl))
    }

    /// Resolves a type expression written inside `scope`.
    #[must_use]
    pub fn resolve(&self, expr: &'a TypeExpr, scope: &Scope<'a>) -> ResolvedType<'a> {
        self.resolver.resolve(self.type_ref(expr, scope))
    }

    /// Runs marker parsing, resolution and constraint extraction for a field.
    #[must_use]
    pub fn inspect_field(&self, field: &'a Field, scope: &Scope<'a>) -> FieldInfo<'a> {
        let resolved = self.resolve(&field.ty, scope);
        let extraction = self.extractor().for_field(field, &resolved);
        FieldInfo {
            field,
            markers: self.markers(&field.doc),
            json: extraction.constraints.json.clone(),
            resolved,
            constraints: extraction.constraints,
            errors: extraction.errors,
        }
    }

    /// Resolves a declaration and extracts its constraints.
    #[must_use]
    pub fn inspect_decl(&self, decl: &'a TypeDecl) -> DeclInfo<'a> {
        let resolved = self.resolver.resolve(self.decl_type(decl));
        let extraction = self.extractor().for_decl(decl, &resolved);
        DeclInfo {
            decl,
            markers: self.markers(&decl.doc),
            resolved,
            constraints: extraction.constraints,
            errors: extraction.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{BasicKind, Kind};

    #[test]
    fn inspect_field_resolves_through_generic_scope() {
        let decl = TypeDecl::defined(
            "Box",
            TypeExpr::structure(vec![Field::new("Value", TypeExpr::ident("T"))
                .at(4, 2)
                .doc(["// +optional"])
                .tag(r#"json:"value,omitempty""#)]),
        )
        .param("T", TypeExpr::interface(vec![TypeExpr::ident("int64")]));
        let program = Program::from(
            Package::new("example.com/api/v1", "v1")
                .file(SourceFile::new("api/v1/box.go").decl(decl)),
        );
        let registry = MarkerRegistry::default();
        let package = &program.packages()[0];
        let file = &package.files[0];
        let ctx = FileContext::new(&program, package, file, &registry);

        let decl = &file.decls[0];
        let TypeExpr::Struct { fields } = &decl.ty else {
            panic!("expected struct");
        };
        let info = ctx.inspect_field(&fields[0], &Scope::new(decl));

        assert_eq!(info.resolved.kind, Kind::Basic(BasicKind::Int64));
        assert!(info.constraints.optional);
        assert!(info.json.omit_empty);
        assert!(!info.is_skipped());
        assert_eq!(ctx.location(fields[0].pos).line, 4);
    }

    #[test]
    fn inspect_decl_puts_own_markers_first() {
        let program = Program::from(
            Package::new("example.com/api/v1", "v1").file(
                SourceFile::new("api/v1/names.go")
                    .decl(
                        TypeDecl::defined("Base", TypeExpr::ident("string"))
                            .doc(["// +kubebuilder:validation:MinLength=1"]),
                    )
                    .decl(
                        TypeDecl::defined("Name", TypeExpr::ident("Base"))
                            .doc(["// +kubebuilder:validation:MinLength=3"]),
                    ),
            ),
        );
        let registry = MarkerRegistry::default();
        let package = &program.packages()[0];
        let file = &package.files[0];
        let ctx = FileContext::new(&program, package, file, &registry);

        let info = ctx.inspect_decl(&file.decls[1]);
        assert_eq!(info.resolved.names(), ["Base"]);
        assert_eq!(info.constraints.min_length, Some(3));
        assert_eq!(info.markers.len(), 1);
    }
}
