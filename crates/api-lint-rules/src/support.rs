//! Helpers shared by the rules.

use std::fmt;

use api_lint_core::markers::MarkerValueError;
use api_lint_core::model::{Field, Position, SourceFile};
use api_lint_core::visit::{self, Scope, Visit};
use api_lint_core::{FileContext, Rule, Violation};

/// What a diagnostic is about: `field X` or `type X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Subject<'n> {
    Field(&'n str),
    Type(&'n str),
}

impl fmt::Display for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "field {name}"),
            Self::Type(name) => write!(f, "type {name}"),
        }
    }
}

/// Builds a violation for `rule` at `pos` in the current file.
pub(crate) fn violation(
    rule: &dyn Rule,
    ctx: &FileContext<'_>,
    pos: Position,
    message: impl Into<String>,
) -> Violation {
    Violation::new(
        rule.code(),
        rule.name(),
        rule.default_severity(),
        ctx.location(pos),
        message,
    )
}

/// Violations for marker values that could not be read.
pub(crate) fn marker_errors<'e>(
    rule: &dyn Rule,
    ctx: &FileContext<'_>,
    pos: Position,
    subject: Subject<'_>,
    errors: impl IntoIterator<Item = &'e MarkerValueError>,
) -> Vec<Violation> {
    errors
        .into_iter()
        .map(|error| {
            violation(
                rule,
                ctx,
                pos,
                format!("{subject} has an invalid validation marker: {error}"),
            )
        })
        .collect()
}

/// Every struct field of a file in source order, nested anonymous structs
/// included, with the declaration it belongs to.
pub(crate) fn fields(file: &SourceFile) -> Vec<(&Field, Scope<'_>)> {
    let mut collector = FieldCollector { fields: Vec::new() };
    collector.visit_file(file);
    collector.fields
}

struct FieldCollector<'a> {
    fields: Vec<(&'a Field, Scope<'a>)>,
}

impl<'a> Visit<'a> for FieldCollector<'a> {
    fn visit_field(&mut self, field: &'a Field, scope: &Scope<'a>) {
        self.fields.push((field, *scope));
        visit::visit_field(self, field, scope);
    }
}

/// Splits a Go identifier into its camel-case words. Runs of capitals form
/// one word, except that the last capital of a run starts the next word
/// when a lowercase letter follows (`IDReference` is `ID`, `Reference`).
pub(crate) fn words(name: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (at, current) = chars[i];
        let previous = chars[i - 1].1;
        let next = chars.get(i + 1).map(|&(_, c)| c);

        let boundary = (current.is_uppercase() && !previous.is_uppercase())
            || (current.is_uppercase()
                && previous.is_uppercase()
                && next.is_some_and(char::is_lowercase));

        if boundary {
            words.push(&name[start..at]);
            start = at;
        }
    }

    if start < name.len() {
        words.push(&name[start..]);
    }
    words
}
