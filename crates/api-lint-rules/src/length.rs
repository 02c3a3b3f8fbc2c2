//! Presence checks for length, item and property bounds, shared by
//! `minlength` and `maxlength`.

use api_lint_core::constraints::ConstraintSet;
use api_lint_core::markers::MarkerValueError;
use api_lint_core::model::Position;
use api_lint_core::resolve::ResolvedType;
use api_lint_core::zero::{zero_validity, Shape};
use api_lint_core::{FileContext, Rule, Violation};

use crate::support::{self, Subject};

/// Which bound a rule asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Minimum,
    Maximum,
}

impl Side {
    fn word(self) -> &'static str {
        match self {
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
        }
    }

    fn abbreviation(self) -> &'static str {
        match self {
            Self::Minimum => "Min",
            Self::Maximum => "Max",
        }
    }

    fn length(self, c: &ConstraintSet) -> Option<i64> {
        match self {
            Self::Minimum => c.min_length,
            Self::Maximum => c.max_length,
        }
    }

    fn items(self, c: &ConstraintSet) -> Option<i64> {
        match self {
            Self::Minimum => c.min_items,
            Self::Maximum => c.max_items,
        }
    }

    fn properties(self, c: &ConstraintSet) -> Option<i64> {
        match self {
            Self::Minimum => c.min_properties,
            Self::Maximum => c.max_properties,
        }
    }

    /// Malformed markers are reported by the side they bound: `Max*` and
    /// `ExclusiveMaximum` by `maxlength`, every other marker by `minlength`.
    fn owns(self, error: &MarkerValueError) -> bool {
        let name = error
            .identifier
            .rsplit(':')
            .next()
            .unwrap_or(&error.identifier);
        let maximum = name.starts_with("Max") || name.starts_with("ExclusiveMax");
        match self {
            Self::Minimum => !maximum,
            Self::Maximum => maximum,
        }
    }

    /// Struct values only need a bound when their empty object is accepted
    /// without one.
    fn wants_struct_bound(self, c: &ConstraintSet) -> bool {
        if self == Self::Maximum {
            return false;
        }
        let zero = zero_validity(Shape::Struct, c);
        zero.valid && !zero.complete
    }
}

struct Report<'r, 'c, 'a> {
    rule: &'r dyn Rule,
    ctx: &'c FileContext<'a>,
    side: Side,
    violations: Vec<Violation>,
}

impl<'a> Report<'_, '_, 'a> {
    /// Reports the malformed markers this side owns. Returns false when
    /// there were any, so the presence check is not run on a bound that
    /// is only absent because it could not be read.
    fn readable(
        &mut self,
        pos: Position,
        subject: Subject<'_>,
        errors: &[MarkerValueError],
        report: bool,
    ) -> bool {
        let owned: Vec<_> = errors.iter().filter(|e| self.side.owns(e)).collect();
        if report {
            self.violations.extend(support::marker_errors(
                self.rule,
                self.ctx,
                pos,
                subject,
                owned.iter().copied(),
            ));
        }
        owned.is_empty()
    }

    fn missing(&mut self, pos: Position, subject: Subject<'_>, what: &str, marker: &str) {
        let side = self.side;
        self.violations.push(support::violation(
            self.rule,
            self.ctx,
            pos,
            format!(
                "{subject} must have a {} {what}, add kubebuilder:validation:{marker} marker",
                side.word()
            ),
        ));
    }

    fn check(
        &mut self,
        pos: Position,
        subject: Subject<'_>,
        resolved: &ResolvedType<'a>,
        constraints: &ConstraintSet,
        include_structs: bool,
    ) {
        let side = self.side;
        let abbr = side.abbreviation();

        match Shape::of(resolved) {
            Shape::String | Shape::Bytes => {
                if constraints.enum_values.is_none() && side.length(constraints).is_none() {
                    self.missing(pos, subject, "length", &format!("{abbr}Length"));
                }
            }
            Shape::List => {
                if side.items(constraints).is_none() {
                    self.missing(pos, subject, "items", &format!("{abbr}Items"));
                }
                self.check_elements(pos, subject, resolved, constraints);
            }
            Shape::Map => {
                if side.properties(constraints).is_none() {
                    self.missing(pos, subject, "properties", &format!("{abbr}Properties"));
                }
            }
            Shape::Struct if include_structs => {
                if side.properties(constraints).is_none() && side.wants_struct_bound(constraints) {
                    self.missing(pos, subject, "properties", &format!("{abbr}Properties"));
                }
            }
            _ => {}
        }
    }

    fn check_elements(
        &mut self,
        pos: Position,
        subject: Subject<'_>,
        resolved: &ResolvedType<'a>,
        constraints: &ConstraintSet,
    ) {
        let Some(elem) = resolved.elem() else {
            return;
        };
        let elem = self.ctx.resolver.resolve(elem);
        let items = constraints.items.as_deref().cloned().unwrap_or_default();
        let side = self.side;
        let abbr = side.abbreviation();

        let missing = match Shape::of(&elem) {
            Shape::String => {
                (items.enum_values.is_none() && side.length(&items).is_none()).then_some("length")
            }
            Shape::Map => side.properties(&items).is_none().then_some("properties"),
            Shape::Struct => (side.properties(&items).is_none()
                && side.wants_struct_bound(&items))
            .then_some("properties"),
            _ => None,
        };

        if let Some(what) = missing {
            let marker = if what == "length" {
                format!("items:{abbr}Length")
            } else {
                format!("items:{abbr}Properties")
            };
            self.violations.push(support::violation(
                self.rule,
                self.ctx,
                pos,
                format!(
                    "{subject} array element must have a {} {what}, add kubebuilder:validation:{marker} marker",
                    side.word()
                ),
            ));
        }
    }
}

/// Runs the presence check over every field and defined, non-struct type
/// declaration of the file. Malformed markers on declarations and on fields
/// marked neither optional nor required are reported here; the others are
/// reported by `optionalfields` and `requiredfields`.
pub(crate) fn check_bounds(rule: &dyn Rule, ctx: &FileContext<'_>, side: Side) -> Vec<Violation> {
    let mut report = Report {
        rule,
        ctx,
        side,
        violations: Vec::new(),
    };

    for decl in &ctx.file.decls {
        if decl.alias || !decl.type_params.is_empty() {
            continue;
        }
        let info = ctx.inspect_decl(decl);
        let subject = Subject::Type(&decl.name);
        if report.readable(decl.pos, subject, &info.errors, true) {
            report.check(decl.pos, subject, &info.resolved, &info.constraints, false);
        }
    }

    for (field, scope) in support::fields(ctx.file) {
        let info = ctx.inspect_field(field, &scope);
        if info.is_skipped() {
            continue;
        }
        let subject = Subject::Field(info.name());
        let unmarked = !info.constraints.optional && !info.constraints.required;
        if report.readable(field.pos, subject, &info.errors, unmarked) {
            report.check(field.pos, subject, &info.resolved, &info.constraints, true);
        }
    }

    let mut violations = report.violations;
    violations.sort_by_key(|v| (v.location.line, v.location.column));
    violations
}
