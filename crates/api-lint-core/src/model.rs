//! Declaration model handed to the core by the type-checking front-end.
//!
//! The front-end serializes one package per JSON document. Identifiers in
//! [`TypeExpr::Ident`] are already resolved to their defining package, so the
//! core never performs name lookup beyond the declarations it is given.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::tags::JsonTag;

/// Source position (1-indexed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number.
    #[serde(default)]
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Syntactic type expression of a declaration or field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// A (possibly package-qualified, possibly instantiated) type name.
    Ident {
        /// Type name.
        name: String,
        /// Import path of the defining package; `None` for the current
        /// package, predeclared types and type parameters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        /// Generic type arguments.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeExpr>,
    },
    /// `*T`
    Pointer {
        /// Pointee.
        elem: Box<TypeExpr>,
    },
    /// `[]T`
    Slice {
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `[N]T`
    Array {
        /// Array length.
        len: usize,
        /// Element type.
        elem: Box<TypeExpr>,
    },
    /// `map[K]V`
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// `struct { ... }`
    Struct {
        /// Struct fields in declaration order.
        #[serde(default)]
        fields: Vec<Field>,
    },
    /// `interface { ... }`; `terms` holds the type-set terms of a constraint.
    Interface {
        /// Type-set terms (empty for `any` and method-only interfaces).
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        terms: Vec<TypeExpr>,
    },
    /// Any function type.
    Func,
    /// `chan T`
    Chan {
        /// Element type.
        elem: Box<TypeExpr>,
    },
}

impl TypeExpr {
    /// Unqualified type name, e.g. `string` or a type in the current package.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident {
            name: name.into(),
            package: None,
            args: Vec::new(),
        }
    }

    /// Package-qualified type name, e.g. `time.Duration`.
    #[must_use]
    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Ident {
            name: name.into(),
            package: Some(package.into()),
            args: Vec::new(),
        }
    }

    /// Instantiated generic type in the current package.
    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Ident {
            name: name.into(),
            package: None,
            args,
        }
    }

    /// `*elem`
    #[must_use]
    pub fn pointer(elem: TypeExpr) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
        }
    }

    /// `[]elem`
    #[must_use]
    pub fn slice(elem: TypeExpr) -> Self {
        Self::Slice {
            elem: Box::new(elem),
        }
    }

    /// `[len]elem`
    #[must_use]
    pub fn array(len: usize, elem: TypeExpr) -> Self {
        Self::Array {
            len,
            elem: Box::new(elem),
        }
    }

    /// `map[key]value`
    #[must_use]
    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Anonymous struct type.
    #[must_use]
    pub fn structure(fields: Vec<Field>) -> Self {
        Self::Struct { fields }
    }

    /// Constraint interface with the given type-set terms.
    #[must_use]
    pub fn interface(terms: Vec<TypeExpr>) -> Self {
        Self::Interface { terms }
    }

    /// Returns the identifier name if this is an [`TypeExpr::Ident`].
    #[must_use]
    pub fn ident_name(&self) -> Option<&str> {
        match self {
            Self::Ident { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A struct field. Embedded fields have no name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name; `None` for embedded fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position of the field name (or embedded type).
    #[serde(default)]
    pub pos: Position,
    /// Raw comment lines preceding the field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    /// Field type.
    pub ty: TypeExpr,
    /// Raw struct tag content, without the surrounding backquotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Field {
    /// Creates a named field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            pos: Position::default(),
            doc: Vec::new(),
            ty,
            tag: None,
        }
    }

    /// Creates an embedded field.
    #[must_use]
    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            name: None,
            pos: Position::default(),
            doc: Vec::new(),
            ty,
            tag: None,
        }
    }

    /// Sets the position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.pos = Position::new(line, column);
        self
    }

    /// Sets the comment lines.
    #[must_use]
    pub fn doc<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doc = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the raw struct tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Returns true for embedded fields.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }

    /// Name used in diagnostics: the field name, or the embedded type name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.name {
            return name;
        }
        let mut ty = &self.ty;
        while let TypeExpr::Pointer { elem } = ty {
            ty = elem;
        }
        ty.ident_name().unwrap_or("")
    }

    /// Parses the `json` key of the struct tag.
    #[must_use]
    pub fn json_tag(&self) -> JsonTag {
        JsonTag::from_struct_tag(self.tag.as_deref().unwrap_or(""))
    }

    /// Returns true when the field's members are serialized into the parent
    /// object: an embedded field without a JSON name, or an explicit `inline`.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        let json = self.json_tag();
        json.inline || (self.is_embedded() && !json.ignored && json.name.is_empty())
    }
}

/// A type parameter of a generic declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    /// Parameter name.
    pub name: String,
    /// Constraint.
    pub constraint: TypeExpr,
}

/// A named type declaration: `type A B` or `type A = B`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declared name.
    pub name: String,
    /// Position of the name.
    #[serde(default)]
    pub pos: Position,
    /// Raw comment lines preceding the declaration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    /// `true` for alias declarations (`type A = B`).
    #[serde(default)]
    pub alias: bool,
    /// Generic type parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    /// Right-hand side type.
    pub ty: TypeExpr,
}

impl TypeDecl {
    /// Creates a defined type declaration (`type A B`).
    #[must_use]
    pub fn defined(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            pos: Position::default(),
            doc: Vec::new(),
            alias: false,
            type_params: Vec::new(),
            ty,
        }
    }

    /// Creates an alias declaration (`type A = B`).
    #[must_use]
    pub fn alias(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            alias: true,
            ..Self::defined(name, ty)
        }
    }

    /// Sets the position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.pos = Position::new(line, column);
        self
    }

    /// Sets the comment lines.
    #[must_use]
    pub fn doc<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doc = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a type parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, constraint: TypeExpr) -> Self {
        self.type_params.push(TypeParam {
            name: name.into(),
            constraint,
        });
        self
    }
}

/// One source file of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File path as reported by the front-end.
    pub path: PathBuf,
    /// Type declarations in source order.
    #[serde(default)]
    pub decls: Vec<TypeDecl>,
}

impl SourceFile {
    /// Creates an empty file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            decls: Vec::new(),
        }
    }

    /// Adds a declaration.
    #[must_use]
    pub fn decl(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }
}

/// A type-checked package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Import path.
    pub path: String,
    /// Package name.
    #[serde(default)]
    pub name: String,
    /// Source files.
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

impl Package {
    /// Creates an empty package.
    #[must_use]
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Adds a file.
    #[must_use]
    pub fn file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }

    /// Finds a type declaration by name.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.files
            .iter()
            .flat_map(|f| f.decls.iter())
            .find(|d| d.name == name)
    }
}

/// The set of packages available for cross-package resolution.
#[derive(Debug, Clone, Default)]
pub struct Program {
    packages: Vec<Package>,
    index: HashMap<String, usize>,
}

impl Program {
    /// Creates a program from packages. Later packages with a duplicate
    /// import path replace earlier ones in the index.
    #[must_use]
    pub fn new(packages: Vec<Package>) -> Self {
        let index = packages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.path.clone(), i))
            .collect();
        Self { packages, index }
    }

    /// Looks up a package by import path.
    #[must_use]
    pub fn package(&self, path: &str) -> Option<&Package> {
        self.index.get(path).map(|&i| &self.packages[i])
    }

    /// All packages in load order.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }
}

impl From<Package> for Program {
    fn from(package: Package) -> Self {
        Self::new(vec![package])
    }
}
