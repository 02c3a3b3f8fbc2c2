//! Type resolution engine.
//!
//! Resolution strips pointer indirection, alias indirection and named-type
//! indirection until a structural kind is reached. Defined types (`type A B`)
//! are recorded in the name chain; aliases (`type A = B`) are transparent.
//!
//! Every step is a pure function of a [`TypeRef`]: the expression plus the
//! package it is written in and the generic bindings in scope.

use std::fmt;
use std::sync::Arc;

use crate::model::{Field, Package, Program, TypeDecl, TypeExpr};

/// Import path of the Kubernetes `metav1` package.
pub const METAV1: &str = "k8s.io/apimachinery/pkg/apis/meta/v1";
/// Import path of the Kubernetes `resource` package.
pub const RESOURCE: &str = "k8s.io/apimachinery/pkg/api/resource";
/// Import path of the standard `time` package.
pub const TIME: &str = "time";

const MAX_STEPS: usize = 64;

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl BasicKind {
    /// Maps a predeclared identifier to its kind. `byte` and `rune` are
    /// aliases of `uint8` and `int32`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            _ => return None,
        })
    }

    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        }
    }

    /// Signed or unsigned integer.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
        )
    }

    /// Unsigned integer.
    #[must_use]
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 | Self::Uintptr
        )
    }

    /// `float32` or `float64`.
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural kind at the end of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Predeclared basic type.
    Basic(BasicKind),
    /// `[]T`
    Slice,
    /// `[N]T`
    Array,
    /// `map[K]V`
    Map,
    /// `struct{...}`
    Struct,
    /// Interface without a single core type.
    Interface,
    /// Function type.
    Func,
    /// Channel type.
    Chan,
    /// A type the resolver cannot see through.
    Opaque,
}

/// A defined (non-alias) named type crossed during resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedLink<'a> {
    /// Import path of the defining package.
    pub package: &'a str,
    /// Type name.
    pub name: &'a str,
    /// The declaration, when it is part of the program.
    pub decl: Option<&'a TypeDecl>,
}

impl NamedLink<'_> {
    /// Returns true if this link is `package.name`.
    #[must_use]
    pub fn is(&self, package: &str, name: &str) -> bool {
        self.package == package && self.name == name
    }
}

/// Generic parameter bindings in scope, as a persistent list.
#[derive(Clone, Default)]
pub struct Bindings<'a> {
    head: Option<Arc<Frame<'a>>>,
}

struct Frame<'a> {
    name: &'a str,
    target: TypeRef<'a>,
    next: Bindings<'a>,
}

impl<'a> Bindings<'a> {
    /// Returns a new list with `name` bound to `target`.
    #[must_use]
    pub fn bind(&self, name: &'a str, target: TypeRef<'a>) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                name,
                target,
                next: self.clone(),
            })),
        }
    }

    /// Looks up the innermost binding of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeRef<'a>> {
        let mut current = self.head.as_deref();
        while let Some(frame) = current {
            if frame.name == name {
                return Some(&frame.target);
            }
            current = frame.next.head.as_deref();
        }
        None
    }
}

impl fmt::Debug for Bindings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut current = self.head.as_deref();
        while let Some(frame) = current {
            list.entry(&frame.name);
            current = frame.next.head.as_deref();
        }
        list.finish()
    }
}

/// A type expression together with the context it is written in.
#[derive(Clone)]
pub struct TypeRef<'a> {
    /// The expression.
    pub expr: &'a TypeExpr,
    /// Package whose scope unqualified identifiers are looked up in.
    pub package: &'a Package,
    /// Generic bindings in scope.
    pub bindings: Bindings<'a>,
}

impl<'a> TypeRef<'a> {
    /// Creates a reference without generic bindings.
    #[must_use]
    pub fn new(expr: &'a TypeExpr, package: &'a Package) -> Self {
        Self {
            expr,
            package,
            bindings: Bindings::default(),
        }
    }

    /// Another expression in the same context.
    #[must_use]
    pub fn with(&self, expr: &'a TypeExpr) -> Self {
        Self {
            expr,
            package: self.package,
            bindings: self.bindings.clone(),
        }
    }
}

impl fmt::Debug for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRef")
            .field("expr", self.expr)
            .field("package", &self.package.path)
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// What an identifier refers to.
#[derive(Debug, Clone)]
pub enum Referent<'a> {
    /// A type parameter bound to an argument or its constraint.
    Param(TypeRef<'a>),
    /// A declaration in the program, instantiated with its arguments.
    Decl {
        /// Package that declares it.
        package: &'a Package,
        /// The declaration.
        decl: &'a TypeDecl,
        /// Bindings of its type parameters.
        bindings: Bindings<'a>,
    },
    /// A predeclared type (`string`, `int64`, `any`, ...).
    Predeclared(Kind),
    /// A well-known external type.
    Known(NamedLink<'a>, Option<BasicKind>),
    /// A named type the program does not contain.
    Unknown(NamedLink<'a>),
}

struct KnownType {
    package: &'static str,
    name: &'static str,
    underlying: Option<BasicKind>,
}

const KNOWN_TYPES: &[KnownType] = &[
    KnownType {
        package: TIME,
        name: "Duration",
        underlying: Some(BasicKind::Int64),
    },
    KnownType {
        package: METAV1,
        name: "Duration",
        underlying: None,
    },
    KnownType {
        package: METAV1,
        name: "Time",
        underlying: None,
    },
    KnownType {
        package: METAV1,
        name: "MicroTime",
        underlying: None,
    },
    KnownType {
        package: RESOURCE,
        name: "Quantity",
        underlying: None,
    },
];

/// Result of resolving a type expression.
#[derive(Debug, Clone)]
pub struct ResolvedType<'a> {
    /// Structural kind.
    pub kind: Kind,
    /// The structural expression and its context.
    pub structure: TypeRef<'a>,
    /// Defined named types crossed, outermost first.
    pub chain: Vec<NamedLink<'a>>,
    /// Number of pointer levels crossed.
    pub pointer_depth: usize,
    /// `[]byte`, directly or through named types and aliases.
    pub byte_slice: bool,
}

impl<'a> ResolvedType<'a> {
    /// Returns true if at least one pointer was crossed.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    /// Names of the chain, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&'a str> {
        self.chain.iter().map(|l| l.name).collect()
    }

    /// Returns true if the chain crosses `package.name`.
    #[must_use]
    pub fn crosses(&self, package: &str, name: &str) -> bool {
        self.chain.iter().any(|l| l.is(package, name))
    }

    /// Element of a slice, array or channel.
    #[must_use]
    pub fn elem(&self) -> Option<TypeRef<'a>> {
        match self.structure.expr {
            TypeExpr::Slice { elem } | TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem } => {
                Some(self.structure.with(elem))
            }
            _ => None,
        }
    }

    /// Key and value of a map.
    #[must_use]
    pub fn map_parts(&self) -> Option<(TypeRef<'a>, TypeRef<'a>)> {
        match self.structure.expr {
            TypeExpr::Map { key, value } => {
                Some((self.structure.with(key), self.structure.with(value)))
            }
            _ => None,
        }
    }

    /// Fields of a struct; empty for other kinds.
    #[must_use]
    pub fn fields(&self) -> &'a [Field] {
        match self.structure.expr {
            TypeExpr::Struct { fields } => fields,
            _ => &[],
        }
    }

    /// Type of one of this struct's fields, in the struct's context.
    #[must_use]
    pub fn field_type(&self, field: &'a Field) -> TypeRef<'a> {
        self.structure.with(&field.ty)
    }
}

/// Resolves type expressions against a [`Program`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    program: &'a Program,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver.
    #[must_use]
    pub fn new(program: &'a Program) -> Self {
        Self { program }
    }

    /// Bindings for the body of a generic declaration analysed on its own:
    /// every parameter is bound to its constraint.
    #[must_use]
    pub fn scope_bindings(&self, decl: &'a TypeDecl, package: &'a Package) -> Bindings<'a> {
        instantiate(decl, package, &[], &TypeRef::new(&decl.ty, package))
    }

    /// Classifies an identifier. Returns `None` for non-identifiers.
    #[must_use]
    pub fn referent(&self, ty: &TypeRef<'a>) -> Option<Referent<'a>> {
        let TypeExpr::Ident {
            name,
            package,
            args,
        } = ty.expr
        else {
            return None;
        };

        let referent = match package.as_deref() {
            None => {
                if let Some(target) = args.is_empty().then(|| ty.bindings.lookup(name)).flatten() {
                    Referent::Param(target.clone())
                } else if let Some(decl) = ty.package.find_type(name) {
                    Referent::Decl {
                        package: ty.package,
                        decl,
                        bindings: instantiate(decl, ty.package, args, ty),
                    }
                } else if let Some(kind) = predeclared(name) {
                    Referent::Predeclared(kind)
                } else {
                    Referent::Unknown(NamedLink {
                        package: &ty.package.path,
                        name: name.as_str(),
                        decl: None,
                    })
                }
            }
            Some(path) => {
                let declared = self
                    .program
                    .package(path)
                    .and_then(|p| p.find_type(name).map(|d| (p, d)));

                if let Some((package, decl)) = declared {
                    Referent::Decl {
                        package,
                        decl,
                        bindings: instantiate(decl, package, args, ty),
                    }
                } else {
                    let link = NamedLink {
                        package: path,
                        name: name.as_str(),
                        decl: None,
                    };
                    match KNOWN_TYPES
                        .iter()
                        .find(|k| k.package == path && k.name == name.as_str())
                    {
                        Some(known) => Referent::Known(link, known.underlying),
                        None => Referent::Unknown(link),
                    }
                }
            }
        };

        Some(referent)
    }

    /// Strips type parameters and alias declarations only. Defined types,
    /// pointers and composite types are returned unchanged.
    #[must_use]
    pub fn peel_aliases(&self, ty: TypeRef<'a>) -> TypeRef<'a> {
        let mut current = ty;
        for _ in 0..MAX_STEPS {
            match self.referent(&current) {
                Some(Referent::Param(target)) => current = target,
                Some(Referent::Decl {
                    package,
                    decl,
                    bindings,
                }) if decl.alias => {
                    current = TypeRef {
                        expr: &decl.ty,
                        package,
                        bindings,
                    };
                }
                _ => break,
            }
        }
        current
    }

    /// Returns true if `ty` names `byte`/`uint8` through parameters, aliases
    /// and defined types, without crossing a pointer or composite type.
    fn is_byte(&self, ty: TypeRef<'a>) -> bool {
        let mut current = ty;
        for _ in 0..MAX_STEPS {
            match self.referent(&current) {
                Some(Referent::Param(target)) => current = target,
                Some(Referent::Decl {
                    package,
                    decl,
                    bindings,
                }) => {
                    current = TypeRef {
                        expr: &decl.ty,
                        package,
                        bindings,
                    };
                }
                Some(Referent::Predeclared(kind)) => return kind == Kind::Basic(BasicKind::Uint8),
                _ => return false,
            }
        }
        false
    }

    /// Resolves a type expression to its structural kind.
    #[must_use]
    pub fn resolve(&self, ty: TypeRef<'a>) -> ResolvedType<'a> {
        let mut chain = Vec::new();
        let mut pointer_depth = 0;
        let mut current = ty;

        for _ in 0..MAX_STEPS {
            let kind = match current.expr {
                TypeExpr::Pointer { elem } => {
                    pointer_depth += 1;
                    current = current.with(elem);
                    continue;
                }
                TypeExpr::Interface { terms } if terms.len() == 1 => {
                    current = current.with(&terms[0]);
                    continue;
                }
                TypeExpr::Ident { .. } => match self.referent(&current) {
                    Some(Referent::Param(target)) => {
                        current = target;
                        continue;
                    }
                    Some(Referent::Decl {
                        package,
                        decl,
                        bindings,
                    }) => {
                        if !decl.alias {
                            chain.push(NamedLink {
                                package: &package.path,
                                name: &decl.name,
                                decl: Some(decl),
                            });
                        }
                        current = TypeRef {
                            expr: &decl.ty,
                            package,
                            bindings,
                        };
                        continue;
                    }
                    Some(Referent::Predeclared(kind)) => kind,
                    Some(Referent::Known(link, underlying)) => {
                        chain.push(link);
                        underlying.map_or(Kind::Opaque, Kind::Basic)
                    }
                    Some(Referent::Unknown(link)) => {
                        chain.push(link);
                        Kind::Opaque
                    }
                    None => Kind::Opaque,
                },
                TypeExpr::Slice { .. } => Kind::Slice,
                TypeExpr::Array { .. } => Kind::Array,
                TypeExpr::Map { .. } => Kind::Map,
                TypeExpr::Struct { .. } => Kind::Struct,
                TypeExpr::Interface { .. } => Kind::Interface,
                TypeExpr::Func => Kind::Func,
                TypeExpr::Chan { .. } => Kind::Chan,
            };

            let byte_slice = match current.expr {
                TypeExpr::Slice { elem } => self.is_byte(current.with(elem)),
                _ => false,
            };

            return ResolvedType {
                kind,
                structure: current,
                chain,
                pointer_depth,
                byte_slice,
            };
        }

        tracing::debug!(
            "Type resolution exceeded {} steps in package {}",
            MAX_STEPS,
            current.package.path
        );
        ResolvedType {
            kind: Kind::Opaque,
            structure: current,
            chain,
            pointer_depth,
            byte_slice: false,
        }
    }
}

fn predeclared(name: &str) -> Option<Kind> {
    match name {
        "any" | "error" | "comparable" => Some(Kind::Interface),
        _ => BasicKind::from_name(name).map(Kind::Basic),
    }
}

/// Binds a declaration's type parameters to `args` (written in `site`'s
/// context); missing arguments fall back to the parameter's constraint.
fn instantiate<'a>(
    decl: &'a TypeDecl,
    package: &'a Package,
    args: &'a [TypeExpr],
    site: &TypeRef<'a>,
) -> Bindings<'a> {
    let mut bindings = Bindings::default();
    for (i, param) in decl.type_params.iter().enumerate() {
        let target = match args.get(i) {
            Some(arg) => site.with(arg),
            None => TypeRef {
                expr: &param.constraint,
                package,
                bindings: bindings.clone(),
            },
        };
        bindings = bindings.bind(&param.name, target);
    }
    bindings
}
