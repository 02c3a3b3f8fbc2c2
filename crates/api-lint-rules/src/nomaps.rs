//! Rule forbidding map types.
//!
//! # Rationale
//!
//! Maps cannot be merged with Server-Side Apply and their keys carry no
//! schema. A list of objects with a unique name is the preferred shape.
//!
//! # Detected Patterns
//!
//! Fields and defined types whose type resolves to a map, through pointers,
//! aliases, named types and generic instantiation.
//!
//! # Configuration
//!
//! - `policy`: `Enforce` (default) reports every map,
//!   `AllowStringToStringMaps` allows `map[string]string`, `Ignore` allows
//!   maps whose keys and values are both basic types
//! - `allowed_field_names`: field names that may be maps
//!   (default `Labels`, `Annotations`)

use api_lint_core::model::Position;
use api_lint_core::resolve::{BasicKind, Kind, ResolvedType};
use api_lint_core::{FileContext, Rule, RuleConfig, Severity, Violation};
use serde::Deserialize;

use crate::support::{self, Subject};

/// Rule code for nomaps.
pub const CODE: &str = "KAL003";

/// Rule name for nomaps.
pub const NAME: &str = "nomaps";

/// Which maps are tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum MapPolicy {
    /// Every map is reported.
    #[default]
    Enforce,
    /// `map[string]string` is allowed.
    AllowStringToStringMaps,
    /// Maps of basic keys and values are allowed.
    Ignore,
}

/// Forbids map types.
#[derive(Debug, Clone)]
pub struct NoMaps {
    /// Which maps are tolerated.
    pub policy: MapPolicy,
    /// Field names that may be maps.
    pub allowed_field_names: Vec<String>,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoMaps {
    fn default() -> Self {
        Self::new()
    }
}

impl NoMaps {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: MapPolicy::Enforce,
            allowed_field_names: vec!["Labels".to_string(), "Annotations".to_string()],
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new().severity(config.severity.unwrap_or(Severity::Warning));
        if let Some(policy) = config.get_option::<MapPolicy>("policy") {
            rule.policy = policy;
        }
        if config.options.contains_key("allowed_field_names") {
            rule.allowed_field_names = config.get_str_array("allowed_field_names");
        }
        rule
    }

    /// Sets the map policy.
    #[must_use]
    pub fn policy(mut self, policy: MapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the allowed field names.
    #[must_use]
    pub fn allowed_field_names(mut self, names: &[&str]) -> Self {
        self.allowed_field_names = names.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_reported<'a>(&self, ctx: &FileContext<'a>, ty: &ResolvedType<'a>) -> bool {
        if ty.kind != Kind::Map {
            return false;
        }
        let Some((key, value)) = ty.map_parts() else {
            return false;
        };
        let key = ctx.resolver.resolve(key).kind;
        let value = ctx.resolver.resolve(value).kind;

        match self.policy {
            MapPolicy::Enforce => true,
            MapPolicy::AllowStringToStringMaps => {
                let string = Kind::Basic(BasicKind::String);
                !(key == string && value == string)
            }
            MapPolicy::Ignore => {
                !(matches!(key, Kind::Basic(_)) && matches!(value, Kind::Basic(_)))
            }
        }
    }

    fn report(&self, ctx: &FileContext<'_>, pos: Position, subject: Subject<'_>) -> Violation {
        support::violation(
            self,
            ctx,
            pos,
            format!("{subject} should not use a map type, use a list type with a unique name/identifier instead"),
        )
    }
}

impl Rule for NoMaps {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids map types in favour of keyed lists"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for decl in &ctx.file.decls {
            if decl.alias {
                continue;
            }
            let resolved = ctx.resolver.resolve(ctx.decl_type(decl));
            if self.is_reported(ctx, &resolved) {
                violations.push(self.report(ctx, decl.pos, Subject::Type(&decl.name)));
            }
        }

        for (field, scope) in support::fields(ctx.file) {
            if field.is_embedded()
                || self
                    .allowed_field_names
                    .iter()
                    .any(|n| n == field.display_name())
            {
                continue;
            }
            let resolved = ctx.resolve(&field.ty, &scope);
            if self.is_reported(ctx, &resolved) {
                violations.push(self.report(ctx, field.pos, Subject::Field(field.display_name())));
            }
        }

        violations.sort_by_key(|v| (v.location.line, v.location.column));
        violations
    }
}
