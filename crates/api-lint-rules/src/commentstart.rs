//! Rule requiring field comments to start with the serialized name.
//!
//! # Rationale
//!
//! Field comments become the descriptions of the generated schema, where
//! users see the JSON name, not the Go one.
//!
//! # Detected Patterns
//!
//! - Serialized fields without a comment
//! - Comments whose text does not start with the JSON name followed by a
//!   space

use api_lint_core::markers::doc_text;
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

use crate::support;

/// Rule code for commentstart.
pub const CODE: &str = "KAL015";

/// Rule name for commentstart.
pub const NAME: &str = "commentstart";

/// Requires field comments to start with the JSON name.
#[derive(Debug, Clone)]
pub struct CommentStart {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for CommentStart {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentStart {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Info,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new().severity(config.severity.unwrap_or(Severity::Info))
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for CommentStart {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires field comments to start with the JSON name"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (field, _) in support::fields(ctx.file) {
            let json = field.json_tag();
            if field.is_embedded() || json.inline || json.ignored || json.name.is_empty() {
                continue;
            }
            let name = field.display_name();
            let text = doc_text(&field.doc)
                .into_iter()
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            if text.is_empty() {
                violations.push(support::violation(
                    self,
                    ctx,
                    field.pos,
                    format!("field {name} is missing godoc comment"),
                ));
            } else if text != json.name && !text.starts_with(&format!("{} ", json.name)) {
                violations.push(
                    support::violation(
                        self,
                        ctx,
                        field.pos,
                        format!("godoc for field {name} should start with '{} ...'", json.name),
                    )
                    .with_suggestion(Suggestion::new(format!(
                        "start the comment with '{}'",
                        json.name
                    ))),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, messages, structure};
    use api_lint_core::model::{Field, TypeExpr};

    fn field(name: &str, json: &str, doc: &[&str]) -> Field {
        Field::new(name, TypeExpr::ident("string"))
            .doc(doc.iter().copied())
            .tag(format!(r#"json:"{json}""#))
    }

    #[test]
    fn comments_start_with_json_name() {
        let violations = check(
            &CommentStart::new(),
            vec![structure(
                "Spec",
                vec![
                    field("Name", "name", &["// name is the object name.", "// +required"]),
                    field("Mode", "mode,omitempty", &["// +optional"]),
                    field("Image", "image", &["// Image is the container image."]),
                    field("Tag", "tag", &["//", "// tag"]),
                    field("Hidden", "-", &[]),
                    Field::new("Plain", TypeExpr::ident("string")),
                ],
            )],
        );
        assert_eq!(
            messages(&violations),
            [
                "field Mode is missing godoc comment",
                "godoc for field Image should start with 'image ...'",
            ]
        );
        assert_eq!(
            violations[1].suggestion.as_ref().map(|s| s.message.as_str()),
            Some("start the comment with 'image'")
        );
    }
}
