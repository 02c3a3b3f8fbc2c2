//! Validation-constraint extraction.
//!
//! Constraints are looked up layer by layer: the field's own markers first,
//! then the markers of each defined type in the resolved chain, outermost
//! first. The first layer that declares a marker wins. Layers are never
//! merged, and a malformed value does not fall through to the next layer: it
//! is reported and the constraint is treated as absent.

use std::fmt;

use crate::markers::{names, Marker, MarkerRegistry, MarkerSet, MarkerValueError};
use crate::model::{Field, TypeDecl};
use crate::resolve::{Kind, ResolvedType, Resolver};
use crate::tags::JsonTag;

/// Marker identifiers that mark a field optional.
pub const OPTIONAL_MARKERS: &[&str] = &[
    names::OPTIONAL,
    names::KUBEBUILDER_OPTIONAL,
    names::K8S_OPTIONAL,
];

/// Marker identifiers that mark a field required.
pub const REQUIRED_MARKERS: &[&str] = &[
    names::REQUIRED,
    names::KUBEBUILDER_REQUIRED,
    names::K8S_REQUIRED,
];

const MAX_SHAPE_DEPTH: usize = 8;

/// Numeric type usable as a validation bound.
pub trait Bound: Copy + PartialOrd + fmt::Display {
    /// The zero value.
    const ZERO: Self;

    /// Reads a bound from a marker value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a number of this type.
    fn parse(marker: &Marker) -> Result<Self, MarkerValueError>;
}

impl Bound for i64 {
    const ZERO: Self = 0;

    fn parse(marker: &Marker) -> Result<Self, MarkerValueError> {
        marker.as_int()
    }
}

impl Bound for f64 {
    const ZERO: Self = 0.0;

    fn parse(marker: &Marker) -> Result<Self, MarkerValueError> {
        marker.as_float()
    }
}

/// Numeric range declared by `Minimum`/`Maximum` markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<N> {
    /// Lower bound.
    pub minimum: Option<N>,
    /// Upper bound.
    pub maximum: Option<N>,
    /// The lower bound itself is excluded.
    pub exclusive_minimum: bool,
    /// The upper bound itself is excluded.
    pub exclusive_maximum: bool,
}

impl<N> Default for Range<N> {
    fn default() -> Self {
        Self {
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
        }
    }
}

impl<N: Bound> Range<N> {
    /// Returns true if zero lies within the range.
    #[must_use]
    pub fn contains_zero(&self) -> bool {
        let above_min = self.minimum.map_or(true, |min| {
            if self.exclusive_minimum {
                min < N::ZERO
            } else {
                min <= N::ZERO
            }
        });
        let below_max = self.maximum.map_or(true, |max| {
            if self.exclusive_maximum {
                max > N::ZERO
            } else {
                max >= N::ZERO
            }
        });
        above_min && below_max
    }

    /// Returns true if the range is closed on the side facing zero: both
    /// bounds set, a non-negative minimum, or a non-positive maximum.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match (self.minimum, self.maximum) {
            (Some(_), Some(_)) => true,
            (Some(min), None) => min >= N::ZERO,
            (None, Some(max)) => max <= N::ZERO,
            (None, None) => false,
        }
    }
}

/// Numeric bounds in the representation matching the field's kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBounds {
    /// Integer kinds.
    Integer(Range<i64>),
    /// Floating point kinds.
    Float(Range<f64>),
}

impl NumericBounds {
    /// See [`Range::contains_zero`].
    #[must_use]
    pub fn contains_zero(&self) -> bool {
        match self {
            Self::Integer(r) => r.contains_zero(),
            Self::Float(r) => r.contains_zero(),
        }
    }

    /// See [`Range::is_complete`].
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Integer(r) => r.is_complete(),
            Self::Float(r) => r.is_complete(),
        }
    }

    /// Returns true if either bound is declared.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        match self {
            Self::Integer(r) => r.minimum.is_some() || r.maximum.is_some(),
            Self::Float(r) => r.minimum.is_some() || r.maximum.is_some(),
        }
    }
}

/// How a struct's members appear in its zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructShape {
    /// Members serialized even at their zero value.
    pub always_present: usize,
    /// Required members that are omitted at their zero value.
    pub omitted_required: Vec<String>,
}

/// Constraints that apply to one field or type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    /// `Minimum`/`Maximum` for numeric kinds.
    pub numeric: Option<NumericBounds>,
    /// `MinLength`.
    pub min_length: Option<i64>,
    /// `MaxLength`.
    pub max_length: Option<i64>,
    /// `MinItems`.
    pub min_items: Option<i64>,
    /// `MaxItems`.
    pub max_items: Option<i64>,
    /// `MinProperties`.
    pub min_properties: Option<i64>,
    /// `MaxProperties`.
    pub max_properties: Option<i64>,
    /// `Enum` members, unquoted.
    pub enum_values: Option<Vec<String>>,
    /// Constraints on list elements.
    pub items: Option<Box<ConstraintSet>>,
    /// Marked optional on the field.
    pub optional: bool,
    /// Marked required on the field.
    pub required: bool,
    /// Parsed `json` tag of the field.
    pub json: JsonTag,
    /// Zero-value composition for struct kinds.
    pub struct_shape: Option<StructShape>,
}

impl ConstraintSet {
    /// `omitempty` or `omitzero` is set.
    #[must_use]
    pub fn has_omit_tag(&self) -> bool {
        self.json.omit_empty || self.json.omit_zero
    }
}

/// Extracted constraints and the malformed markers met on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// The constraints.
    pub constraints: ConstraintSet,
    /// Marker values that could not be coerced.
    pub errors: Vec<MarkerValueError>,
}

/// Extracts [`ConstraintSet`]s from fields and resolved types.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintExtractor<'a> {
    resolver: Resolver<'a>,
    registry: &'a MarkerRegistry,
}

impl<'a> ConstraintExtractor<'a> {
    /// Creates an extractor.
    #[must_use]
    pub fn new(resolver: Resolver<'a>, registry: &'a MarkerRegistry) -> Self {
        Self { resolver, registry }
    }

    /// Constraints of a field whose type resolved to `ty`.
    #[must_use]
    pub fn for_field(&self, field: &Field, ty: &ResolvedType<'a>) -> Extraction {
        let field_markers = self.registry.parse(&field.doc);
        let mut extraction = self.extract(Some(field_markers), ty, 0);
        extraction.constraints.json = field.json_tag();
        extraction
    }

    /// Constraints of a type, from the markers of its named types only.
    #[must_use]
    pub fn for_type(&self, ty: &ResolvedType<'a>) -> Extraction {
        self.extract(None, ty, 0)
    }

    /// Constraints of a declaration whose right-hand side resolved to `ty`.
    /// The declaration's own markers come first.
    #[must_use]
    pub fn for_decl(&self, decl: &TypeDecl, ty: &ResolvedType<'a>) -> Extraction {
        self.extract(Some(self.registry.parse(&decl.doc)), ty, 0)
    }

    /// Marker sets of the defined types crossed by `ty`, outermost first.
    #[must_use]
    pub fn type_layers(&self, ty: &ResolvedType<'a>) -> Vec<MarkerSet> {
        ty.chain
            .iter()
            .filter_map(|link| link.decl)
            .map(|decl| self.registry.parse(&decl.doc))
            .collect()
    }

    fn extract(&self, field: Option<MarkerSet>, ty: &ResolvedType<'a>, depth: usize) -> Extraction {
        let mut layers = Vec::new();
        let (optional, required) = field.as_ref().map_or((false, false), |m| {
            (m.has_any(OPTIONAL_MARKERS), m.has_any(REQUIRED_MARKERS))
        });
        layers.extend(field);
        layers.extend(self.type_layers(ty));

        let mut lookup = Lookup {
            layers: &layers,
            errors: Vec::new(),
        };

        let numeric = match ty.kind {
            Kind::Basic(basic) if basic.is_integer() => {
                Some(NumericBounds::Integer(lookup.range::<i64>()))
            }
            Kind::Basic(basic) if basic.is_float() => {
                Some(NumericBounds::Float(lookup.range::<f64>()))
            }
            _ => None,
        };

        let mut constraints = ConstraintSet {
            numeric,
            min_length: lookup.value(names::MIN_LENGTH, Marker::as_int),
            max_length: lookup.value(names::MAX_LENGTH, Marker::as_int),
            min_items: lookup.value(names::MIN_ITEMS, Marker::as_int),
            max_items: lookup.value(names::MAX_ITEMS, Marker::as_int),
            min_properties: lookup.value(names::MIN_PROPERTIES, Marker::as_int),
            max_properties: lookup.value(names::MAX_PROPERTIES, Marker::as_int),
            enum_values: lookup.value(names::ENUM, Marker::as_list),
            optional,
            required,
            ..ConstraintSet::default()
        };

        if matches!(ty.kind, Kind::Slice | Kind::Array) && !ty.byte_slice && depth < MAX_SHAPE_DEPTH
        {
            if let Some(elem) = ty.elem() {
                let elem = self.resolver.resolve(elem);
                let mut items = self.extract(None, &elem, depth + 1);
                let elem_items = &mut items.constraints;
                if let Some(v) = lookup.value(names::ITEMS_MIN_LENGTH, Marker::as_int) {
                    elem_items.min_length = Some(v);
                }
                if let Some(v) = lookup.value(names::ITEMS_MAX_LENGTH, Marker::as_int) {
                    elem_items.max_length = Some(v);
                }
                if let Some(v) = lookup.value(names::ITEMS_MIN_PROPERTIES, Marker::as_int) {
                    elem_items.min_properties = Some(v);
                }
                if let Some(v) = lookup.value(names::ITEMS_MAX_PROPERTIES, Marker::as_int) {
                    elem_items.max_properties = Some(v);
                }
                if let Some(v) = lookup.value(names::ITEMS_ENUM, Marker::as_list) {
                    elem_items.enum_values = Some(v);
                }
                lookup.errors.append(&mut items.errors);
                constraints.items = Some(Box::new(items.constraints));
            }
        }

        if ty.kind == Kind::Struct {
            constraints.struct_shape = Some(self.struct_shape(ty, depth));
        }

        Extraction {
            constraints,
            errors: lookup.errors,
        }
    }

    /// Counts the members present in a struct's zero value, following
    /// inline embeddings.
    #[must_use]
    pub fn struct_shape(&self, ty: &ResolvedType<'a>, depth: usize) -> StructShape {
        let mut shape = StructShape::default();

        for field in ty.fields() {
            let json = field.json_tag();
            if json.ignored {
                continue;
            }

            let resolved = self.resolver.resolve(ty.field_type(field));
            if field.is_inline() {
                if resolved.kind == Kind::Struct && depth < MAX_SHAPE_DEPTH {
                    let inner = self.struct_shape(&resolved, depth + 1);
                    shape.always_present += inner.always_present;
                    shape.omitted_required.extend(inner.omitted_required);
                }
                continue;
            }

            let omitted = json.omit_zero
                || (json.omit_empty && (resolved.is_pointer() || resolved.kind != Kind::Struct));
            if !omitted {
                shape.always_present += 1;
            } else if self.registry.parse(&field.doc).has_any(REQUIRED_MARKERS) {
                shape.omitted_required.push(field.display_name().to_string());
            }
        }

        shape
    }
}

struct Lookup<'m> {
    layers: &'m [MarkerSet],
    errors: Vec<MarkerValueError>,
}

impl Lookup<'_> {
    fn marker(&self, identifier: &str) -> Option<&Marker> {
        self.layers.iter().find_map(|layer| layer.first(identifier))
    }

    fn value<T>(
        &mut self,
        identifier: &str,
        parse: impl Fn(&Marker) -> Result<T, MarkerValueError>,
    ) -> Option<T> {
        let result = parse(self.marker(identifier)?);
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    fn range<N: Bound>(&mut self) -> Range<N> {
        Range {
            minimum: self.value(names::MINIMUM, N::parse),
            maximum: self.value(names::MAXIMUM, N::parse),
            exclusive_minimum: self
                .value(names::EXCLUSIVE_MINIMUM, Marker::as_bool)
                .unwrap_or(false),
            exclusive_maximum: self
                .value(names::EXCLUSIVE_MAXIMUM, Marker::as_bool)
                .unwrap_or(false),
        }
    }
}
