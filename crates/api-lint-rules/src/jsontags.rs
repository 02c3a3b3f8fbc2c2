//! Rule checking JSON tags on fields.
//!
//! # Rationale
//!
//! The JSON name is the API. It must be spelled out rather than left to
//! the Go field name, and follow the lower camel case convention.
//!
//! # Detected Patterns
//!
//! - Fields without a `json` tag
//! - Fields whose tag has no name, e.g. `json:",omitempty"`
//! - Names that do not match the configured pattern
//!
//! Embedded, inline and `json:"-"` fields are skipped.
//!
//! # Configuration
//!
//! - `json_tag_regex`: pattern the name must match, default
//!   `^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)*$`. An invalid pattern is logged
//!   and the default is used.

use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::support;

/// Rule code for jsontags.
pub const CODE: &str = "KAL014";

/// Rule name for jsontags.
pub const NAME: &str = "jsontags";

/// Lower camel case.
pub const DEFAULT_PATTERN: &str = "^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)*$";

#[allow(clippy::expect_used)]
static DEFAULT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_PATTERN).expect("default json tag pattern compiles"));

/// Checks presence and spelling of JSON tags.
#[derive(Debug, Clone)]
pub struct JsonTags {
    /// Pattern JSON names must match.
    pub pattern: Regex,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for JsonTags {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonTags {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_REGEX.clone(),
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let rule = Self::new().severity(config.severity.unwrap_or(Severity::Warning));
        let pattern = config.get_str("json_tag_regex", DEFAULT_PATTERN);
        match rule.clone().pattern(pattern) {
            Ok(rule) => rule,
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Invalid json_tag_regex, using the default");
                rule
            }
        }
    }

    /// Sets the pattern JSON names must match.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Regex::new(pattern)?;
        Ok(self)
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for JsonTags {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires lower camel case json tags on fields"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (field, _) in support::fields(ctx.file) {
            let json = field.json_tag();
            if field.is_embedded() || json.inline || json.ignored {
                continue;
            }
            let name = field.display_name();

            let message = if !json.present {
                format!("field {name} is missing json tag")
            } else if json.name.is_empty() {
                format!("field {name} has empty json tag")
            } else if !self.pattern.is_match(&json.name) {
                format!(
                    "field {name} json tag does not match pattern \"{}\": {}",
                    self.pattern.as_str(),
                    json.name
                )
            } else {
                continue;
            };
            violations.push(support::violation(self, ctx, field.pos, message));
        }

        violations
    }
}
