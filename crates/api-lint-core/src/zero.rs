//! Zero-value validity oracle.
//!
//! Decides whether the zero value of a kind (`""`, `0`, `false`, `[]`, `{}`)
//! satisfies its constraints, and whether the constraints are tight enough
//! for that answer to be meaningful.

use crate::constraints::ConstraintSet;
use crate::resolve::{BasicKind, Kind, ResolvedType};

/// The serialized shape of a resolved type, as far as zero values go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// JSON string.
    String,
    /// `[]byte`, serialized as a base64 string.
    Bytes,
    /// JSON boolean.
    Bool,
    /// Integer kinds.
    Integer,
    /// Floating point kinds.
    Float,
    /// Slices and arrays.
    List,
    /// Maps.
    Map,
    /// Structs.
    Struct,
    /// Interfaces, functions, channels and opaque types.
    Other,
}

impl Shape {
    /// Classifies a resolved type.
    #[must_use]
    pub fn of(ty: &ResolvedType<'_>) -> Self {
        if ty.byte_slice {
            return Self::Bytes;
        }
        match ty.kind {
            Kind::Basic(basic) if basic.is_integer() => Self::Integer,
            Kind::Basic(basic) if basic.is_float() => Self::Float,
            Kind::Basic(BasicKind::String) => Self::String,
            Kind::Basic(BasicKind::Bool) => Self::Bool,
            Kind::Slice | Kind::Array => Self::List,
            Kind::Map => Self::Map,
            Kind::Struct => Self::Struct,
            _ => Self::Other,
        }
    }

    /// The zero value as it appears in messages.
    #[must_use]
    pub fn zero_literal(self) -> &'static str {
        match self {
            Self::String | Self::Bytes => "\"\"",
            Self::Integer | Self::Float => "0",
            Self::Bool => "false",
            Self::List => "[]",
            Self::Map | Self::Struct | Self::Other => "{}",
        }
    }

    /// Returns true for lists and maps.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Map)
    }
}

/// Oracle answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroValidity {
    /// The zero value satisfies the constraints.
    pub valid: bool,
    /// The constraints are complete enough to trust `valid`.
    pub complete: bool,
}

impl ZeroValidity {
    const fn new(valid: bool, complete: bool) -> Self {
        Self { valid, complete }
    }
}

/// Computes zero-value validity for a shape under a constraint set.
#[must_use]
pub fn zero_validity(shape: Shape, constraints: &ConstraintSet) -> ZeroValidity {
    if let Some(values) = &constraints.enum_values {
        let literal = enum_zero_literal(shape);
        return ZeroValidity::new(values.iter().any(|v| v == literal), true);
    }

    match shape {
        Shape::Bool => ZeroValidity::new(true, true),
        Shape::Integer | Shape::Float => match &constraints.numeric {
            Some(bounds) => ZeroValidity::new(bounds.contains_zero(), bounds.is_complete()),
            None => ZeroValidity::new(true, false),
        },
        Shape::String | Shape::Bytes => length_validity(constraints.min_length),
        Shape::List => length_validity(constraints.min_items),
        Shape::Map => length_validity(constraints.min_properties),
        Shape::Struct => struct_validity(constraints),
        Shape::Other => ZeroValidity::new(true, false),
    }
}

fn length_validity(minimum: Option<i64>) -> ZeroValidity {
    match minimum {
        Some(min) => ZeroValidity::new(min <= 0, true),
        None => ZeroValidity::new(true, false),
    }
}

fn struct_validity(constraints: &ConstraintSet) -> ZeroValidity {
    let shape = constraints.struct_shape.clone().unwrap_or_default();
    let present = i64::try_from(shape.always_present).unwrap_or(i64::MAX);
    let properties_ok = constraints.min_properties.map_or(true, |min| present >= min);

    ZeroValidity::new(
        shape.omitted_required.is_empty() && properties_ok,
        constraints.min_properties.is_some() || !shape.omitted_required.is_empty(),
    )
}

/// The member an enumeration has to list for the zero value to be valid.
fn enum_zero_literal(shape: Shape) -> &'static str {
    match shape {
        Shape::String | Shape::Bytes => "",
        other => other.zero_literal(),
    }
}

/// Returns true when the struct's zero value fails `MinProperties` rather
/// than a required member.
#[must_use]
pub fn fails_min_properties(constraints: &ConstraintSet) -> bool {
    let Some(min) = constraints.min_properties else {
        return false;
    };
    let present = constraints
        .struct_shape
        .as_ref()
        .map_or(0, |s| i64::try_from(s.always_present).unwrap_or(i64::MAX));
    present < min
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{NumericBounds, Range, StructShape};

    fn numeric(minimum: Option<i64>, maximum: Option<i64>) -> ConstraintSet {
        ConstraintSet {
            numeric: Some(NumericBounds::Integer(Range {
                minimum,
                maximum,
                ..Range::default()
            })),
            ..ConstraintSet::default()
        }
    }

    #[test]
    fn numeric_grid_is_total_and_consistent() {
        let values = [None, Some(-1), Some(0), Some(1)];
        for minimum in values {
            for maximum in values {
                let result = zero_validity(Shape::Integer, &numeric(minimum, maximum));
                let expected_valid =
                    minimum.map_or(true, |m| m <= 0) && maximum.map_or(true, |m| m >= 0);
                assert_eq!(result.valid, expected_valid, "{minimum:?}..{maximum:?}");
            }
        }

        assert_eq!(
            zero_validity(Shape::Integer, &numeric(Some(1), None)),
            ZeroValidity::new(false, true)
        );
        assert_eq!(
            zero_validity(Shape::Integer, &numeric(Some(-1), None)),
            ZeroValidity::new(true, false)
        );
        assert_eq!(
            zero_validity(Shape::Integer, &numeric(Some(-1), Some(1))),
            ZeroValidity::new(true, true)
        );
        assert_eq!(
            zero_validity(Shape::Integer, &numeric(None, None)),
            ZeroValidity::new(true, false)
        );
    }

    #[test]
    fn float_exclusive_minimum() {
        let constraints = ConstraintSet {
            numeric: Some(NumericBounds::Float(Range {
                minimum: Some(0.0),
                exclusive_minimum: true,
                ..Range::default()
            })),
            ..ConstraintSet::default()
        };
        assert_eq!(
            zero_validity(Shape::Float, &constraints),
            ZeroValidity::new(false, true)
        );
    }

    #[test]
    fn lengths() {
        let none = ConstraintSet::default();
        assert_eq!(zero_validity(Shape::String, &none), ZeroValidity::new(true, false));

        let zero = ConstraintSet {
            min_length: Some(0),
            ..ConstraintSet::default()
        };
        assert_eq!(zero_validity(Shape::String, &zero), ZeroValidity::new(true, true));

        let one = ConstraintSet {
            min_items: Some(1),
            ..ConstraintSet::default()
        };
        assert_eq!(zero_validity(Shape::List, &one), ZeroValidity::new(false, true));
        assert_eq!(zero_validity(Shape::Map, &one), ZeroValidity::new(true, false));
    }

    #[test]
    fn enumerations() {
        let without_empty = ConstraintSet {
            enum_values: Some(vec!["A".into(), "B".into()]),
            ..ConstraintSet::default()
        };
        assert_eq!(
            zero_validity(Shape::String, &without_empty),
            ZeroValidity::new(false, true)
        );

        let with_empty = ConstraintSet {
            enum_values: Some(vec!["A".into(), String::new()]),
            ..ConstraintSet::default()
        };
        assert_eq!(
            zero_validity(Shape::String, &with_empty),
            ZeroValidity::new(true, true)
        );
    }

    #[test]
    fn structs() {
        let empty = ConstraintSet {
            struct_shape: Some(StructShape::default()),
            ..ConstraintSet::default()
        };
        assert_eq!(zero_validity(Shape::Struct, &empty), ZeroValidity::new(true, false));

        let min_one = ConstraintSet {
            min_properties: Some(1),
            ..empty.clone()
        };
        assert_eq!(zero_validity(Shape::Struct, &min_one), ZeroValidity::new(false, true));
        assert!(fails_min_properties(&min_one));

        let present = ConstraintSet {
            struct_shape: Some(StructShape {
                always_present: 1,
                omitted_required: Vec::new(),
            }),
            ..min_one
        };
        assert_eq!(zero_validity(Shape::Struct, &present), ZeroValidity::new(true, true));

        let omitted = ConstraintSet {
            struct_shape: Some(StructShape {
                always_present: 0,
                omitted_required: vec!["Name".into()],
            }),
            ..ConstraintSet::default()
        };
        assert_eq!(zero_validity(Shape::Struct, &omitted), ZeroValidity::new(false, true));
        assert!(!fails_min_properties(&omitted));
    }

    #[test]
    fn bool_and_other() {
        let none = ConstraintSet::default();
        assert_eq!(zero_validity(Shape::Bool, &none), ZeroValidity::new(true, true));
        assert_eq!(zero_validity(Shape::Other, &none), ZeroValidity::new(true, false));
    }
}
