//! Rule for Server-Side Apply list markers.
//!
//! # Rationale
//!
//! Server-Side Apply merges lists according to their `listType`. Without
//! one, a list is replaced wholesale; with a wrong one, merges either fail
//! or lose entries.
//!
//! # Detected Patterns
//!
//! - List fields without a `listType` marker, or with a value other than
//!   `atomic`, `set` or `map`
//! - `listType=set` on lists of objects (configurable)
//! - `listType=map` on lists of primitives
//! - `listType=map` without `listMapKey`, or with a key that is not a field
//!   of the element struct. Fields of inline embeddings count; fields of a
//!   named embedding do not.
//! - Any `listType` on a `[]byte` field
//!
//! `listType` and `listMapKey` are read from the field first, then from the
//! named list types it resolves through.
//!
//! # Configuration
//!
//! - `list_type_set_usage`: `Warn` (default) or `Ignore`

use api_lint_core::markers::{names, MarkerSet};
use api_lint_core::resolve::{Kind, ResolvedType};
use api_lint_core::{FieldInfo, FileContext, Rule, RuleConfig, Severity, Violation};
use serde::Deserialize;

use crate::support;

/// Rule code for ssatags.
pub const CODE: &str = "KAL007";

/// Rule name for ssatags.
pub const NAME: &str = "ssatags";

const LIST_TYPES: &[&str] = &["atomic", "set", "map"];
const MAX_EMBEDDING_DEPTH: usize = 8;

/// How `listType=set` on object lists is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SetUsage {
    /// Report it.
    #[default]
    Warn,
    /// Allow it.
    Ignore,
}

/// Checks `listType` and `listMapKey` markers.
#[derive(Debug, Clone)]
pub struct SsaTags {
    /// Treatment of `listType=set` on object lists.
    pub list_type_set_usage: SetUsage,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for SsaTags {
    fn default() -> Self {
        Self::new()
    }
}

impl SsaTags {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list_type_set_usage: SetUsage::Warn,
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its configuration section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new().severity(config.severity.unwrap_or(Severity::Warning));
        if let Some(usage) = config.get_option("list_type_set_usage") {
            rule.list_type_set_usage = usage;
        }
        rule
    }

    /// Sets the treatment of `listType=set` on object lists.
    #[must_use]
    pub fn list_type_set_usage(mut self, usage: SetUsage) -> Self {
        self.list_type_set_usage = usage;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_field<'a>(&self, ctx: &FileContext<'a>, info: &FieldInfo<'a>) -> Vec<String> {
        let name = info.name();
        let mut layers = vec![info.markers.clone()];
        layers.extend(ctx.extractor().type_layers(&info.resolved));
        let list_layer = layers.iter().find(|m| m.has(names::LIST_TYPE));

        if info.resolved.byte_slice {
            return list_layer
                .map(|_| {
                    format!("field {name} is a byte array, which does not support the listType marker. Remove the listType marker")
                })
                .into_iter()
                .collect();
        }
        if !matches!(info.resolved.kind, Kind::Slice | Kind::Array) {
            return Vec::new();
        }

        let Some(layer) = list_layer else {
            return vec![format!(
                "field {name} should have a listType marker for proper Server-Side Apply behavior (atomic, set, or map)"
            )];
        };
        let list_type = layer
            .first(names::LIST_TYPE)
            .and_then(|m| m.as_string().ok())
            .unwrap_or_default();
        if !LIST_TYPES.contains(&list_type.as_str()) {
            return vec![format!(
                "field {name} has invalid listType \"{list_type}\", must be one of: atomic, set, map"
            )];
        }

        let Some(elem) = info.resolved.elem().map(|e| ctx.resolver.resolve(e)) else {
            return Vec::new();
        };

        match (list_type.as_str(), Element::of(&elem)) {
            ("set", Element::Object) if self.list_type_set_usage == SetUsage::Warn => vec![format!(
                "field {name} with listType=set is not recommended due to Server-Side Apply compatibility issues. Consider using listType=atomic or listType=map instead"
            )],
            ("map", Element::Primitive) => vec![format!(
                "field {name} with listType=map can only be used for object lists, not primitive lists"
            )],
            ("map", Element::Object) => check_map_keys(ctx, name, layer, &elem),
            _ => Vec::new(),
        }
    }
}

/// What a list holds, as far as the program shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Object,
    Primitive,
    /// External or interface types; nothing is reported for them.
    Unknown,
}

impl Element {
    fn of(elem: &ResolvedType<'_>) -> Self {
        match elem.kind {
            Kind::Struct => Self::Object,
            Kind::Opaque | Kind::Interface => Self::Unknown,
            _ => Self::Primitive,
        }
    }
}

fn check_map_keys<'a>(
    ctx: &FileContext<'a>,
    name: &str,
    layer: &MarkerSet,
    elem: &ResolvedType<'a>,
) -> Vec<String> {
    let keys: Vec<String> = layer
        .get(names::LIST_MAP_KEY)
        .filter_map(|m| m.as_string().ok())
        .collect();
    if keys.is_empty() {
        return vec![format!(
            "field {name} with listType=map must have at least one listMapKey marker"
        )];
    }

    let mut members = Vec::new();
    collect_members(ctx, elem, &mut members, 0);

    keys.iter()
        .filter(|&key| !members.contains(key))
        .map(|key| format!("field {name} listMapKey \"{key}\" does not exist as a field in the struct"))
        .collect()
}

/// Serialized member names of a struct, with inline embeddings promoted.
fn collect_members<'a>(
    ctx: &FileContext<'a>,
    ty: &ResolvedType<'a>,
    members: &mut Vec<String>,
    depth: usize,
) {
    for field in ty.fields() {
        let json = field.json_tag();
        if json.ignored {
            continue;
        }
        if field.is_inline() {
            if depth < MAX_EMBEDDING_DEPTH {
                let embedded = ctx.resolver.resolve(ty.field_type(field));
                collect_members(ctx, &embedded, members, depth + 1);
            }
            continue;
        }
        members.push(if json.name.is_empty() {
            field.display_name().to_string()
        } else {
            json.name
        });
    }
}

impl Rule for SsaTags {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks listType and listMapKey markers on lists"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (field, scope) in support::fields(ctx.file) {
            let info = ctx.inspect_field(field, &scope);
            if info.is_skipped() {
                continue;
            }
            violations.extend(
                self.check_field(ctx, &info)
                    .into_iter()
                    .map(|message| support::violation(self, ctx, field.pos, message)),
            );
        }
        violations
    }
}
