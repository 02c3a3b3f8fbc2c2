//! Rule reporting repeated markers.
//!
//! # Rationale
//!
//! A marker repeated with the same value is noise at best and hides a
//! conflicting edit at worst.
//!
//! # Detected Patterns
//!
//! The same identifier with the same value more than once on one type
//! declaration or field. Each repeated marker is reported once, however
//! often it appears. The same identifier with different values is left to
//! the rules that read it.

use api_lint_core::markers::MarkerSet;
use api_lint_core::model::Position;
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

use crate::support::{self, Subject};

/// Rule code for duplicatemarkers.
pub const CODE: &str = "KAL013";

/// Rule name for duplicatemarkers.
pub const NAME: &str = "duplicatemarkers";

/// Reports markers repeated with identical values.
#[derive(Debug, Clone)]
pub struct DuplicateMarkers {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for DuplicateMarkers {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateMarkers {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new().severity(config.severity.unwrap_or(Severity::Warning))
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn report(
        &self,
        ctx: &FileContext<'_>,
        pos: Position,
        subject: Subject<'_>,
        markers: &MarkerSet,
    ) -> Vec<Violation> {
        markers
            .duplicates()
            .into_iter()
            .map(|marker| {
                support::violation(
                    self,
                    ctx,
                    pos,
                    format!("{subject} has duplicated markers {}", marker.raw),
                )
                .with_suggestion(Suggestion::new(format!(
                    "keep a single +{}",
                    marker.raw
                )))
            })
            .collect()
    }
}

impl Rule for DuplicateMarkers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Reports markers repeated with the same value"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for decl in &ctx.file.decls {
            let markers = ctx.markers(&decl.doc);
            violations.extend(self.report(ctx, decl.pos, Subject::Type(&decl.name), &markers));
        }
        for (field, _) in support::fields(ctx.file) {
            let markers = ctx.markers(&field.doc);
            violations.extend(self.report(
                ctx,
                field.pos,
                Subject::Field(field.display_name()),
                &markers,
            ));
        }

        violations.sort_by_key(|v| (v.location.line, v.location.column));
        violations
    }
}
