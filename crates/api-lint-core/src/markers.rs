//! Marker registry and parser.
//!
//! A marker is a comment line of the form `+[namespace:]key[=value]`:
//!
//! ```text
//! // +kubebuilder:validation:MinLength=1
//! // +kubebuilder:validation:Enum=Foo;Bar;""
//! // +listType=map
//! // +optional
//! // +kubebuilder:validation:XValidation:rule="self.size() > 0",message="must not be empty"
//! ```
//!
//! Values are kept raw. Consumers coerce them on demand with
//! [`Marker::as_int`], [`Marker::as_float`], [`Marker::as_bool`],
//! [`Marker::as_string`] and [`Marker::as_list`], which return a
//! [`MarkerValueError`] instead of defaulting.

use std::collections::HashSet;
use std::fmt;

/// Well-known marker identifiers.
pub mod names {
    /// `+optional`
    pub const OPTIONAL: &str = "optional";
    /// `+required`
    pub const REQUIRED: &str = "required";
    /// `+kubebuilder:validation:Optional`
    pub const KUBEBUILDER_OPTIONAL: &str = "kubebuilder:validation:Optional";
    /// `+kubebuilder:validation:Required`
    pub const KUBEBUILDER_REQUIRED: &str = "kubebuilder:validation:Required";
    /// `+k8s:optional`
    pub const K8S_OPTIONAL: &str = "k8s:optional";
    /// `+k8s:required`
    pub const K8S_REQUIRED: &str = "k8s:required";

    /// Numeric lower bound.
    pub const MINIMUM: &str = "kubebuilder:validation:Minimum";
    /// Numeric upper bound.
    pub const MAXIMUM: &str = "kubebuilder:validation:Maximum";
    /// Makes the lower bound exclusive.
    pub const EXCLUSIVE_MINIMUM: &str = "kubebuilder:validation:ExclusiveMinimum";
    /// Makes the upper bound exclusive.
    pub const EXCLUSIVE_MAXIMUM: &str = "kubebuilder:validation:ExclusiveMaximum";
    /// Minimum string length.
    pub const MIN_LENGTH: &str = "kubebuilder:validation:MinLength";
    /// Maximum string length.
    pub const MAX_LENGTH: &str = "kubebuilder:validation:MaxLength";
    /// Minimum list length.
    pub const MIN_ITEMS: &str = "kubebuilder:validation:MinItems";
    /// Maximum list length.
    pub const MAX_ITEMS: &str = "kubebuilder:validation:MaxItems";
    /// Minimum object property count.
    pub const MIN_PROPERTIES: &str = "kubebuilder:validation:MinProperties";
    /// Maximum object property count.
    pub const MAX_PROPERTIES: &str = "kubebuilder:validation:MaxProperties";
    /// Enumeration.
    pub const ENUM: &str = "kubebuilder:validation:Enum";

    /// Minimum length of each list element.
    pub const ITEMS_MIN_LENGTH: &str = "kubebuilder:validation:items:MinLength";
    /// Maximum length of each list element.
    pub const ITEMS_MAX_LENGTH: &str = "kubebuilder:validation:items:MaxLength";
    /// Minimum property count of each list element.
    pub const ITEMS_MIN_PROPERTIES: &str = "kubebuilder:validation:items:MinProperties";
    /// Maximum property count of each list element.
    pub const ITEMS_MAX_PROPERTIES: &str = "kubebuilder:validation:items:MaxProperties";
    /// Enumeration of each list element.
    pub const ITEMS_ENUM: &str = "kubebuilder:validation:items:Enum";

    /// CEL validation rule.
    pub const XVALIDATION: &str = "kubebuilder:validation:XValidation";
    /// CEL validation rule on each list element.
    pub const ITEMS_XVALIDATION: &str = "kubebuilder:validation:items:XValidation";
    /// Printer column declaration.
    pub const PRINT_COLUMN: &str = "kubebuilder:printcolumn";

    /// List merge strategy.
    pub const LIST_TYPE: &str = "listType";
    /// Key of a map-strategy list.
    pub const LIST_MAP_KEY: &str = "listMapKey";
}

/// The typed representation a consumer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Signed integer.
    Integer,
    /// Floating point number.
    Float,
    /// `true` / `false`.
    Boolean,
    /// Quoted or bare string.
    String,
    /// Semicolon-delimited list.
    StringList,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
            Self::StringList => write!(f, "string list"),
        }
    }
}

/// A marker value could not be coerced to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value \"{raw}\" for marker {identifier}: not a valid {expected}")]
pub struct MarkerValueError {
    /// Marker identifier.
    pub identifier: String,
    /// Raw value as written.
    pub raw: String,
    /// Requested representation.
    pub expected: ValueKind,
}

/// One marker occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Identifier, e.g. `kubebuilder:validation:MinLength`.
    pub identifier: String,
    /// Raw value after `=`, or the argument list of an expression marker.
    pub value: Option<String>,
    /// `name=value` arguments of registered expression markers, in order.
    pub expressions: Vec<(String, String)>,
    /// The full marker text without the leading `+`.
    pub raw: String,
}

impl Marker {
    fn error(&self, expected: ValueKind) -> MarkerValueError {
        MarkerValueError {
            identifier: self.identifier.clone(),
            raw: self.value.clone().unwrap_or_default(),
            expected,
        }
    }

    /// Coerces the value to an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing or not an integer.
    pub fn as_int(&self) -> Result<i64, MarkerValueError> {
        self.value
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or_else(|| self.error(ValueKind::Integer))
    }

    /// Coerces the value to a finite float.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing or not a number.
    pub fn as_float(&self) -> Result<f64, MarkerValueError> {
        self.value
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(ValueKind::Float))
    }

    /// Coerces the value to a boolean. A marker without value is `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither `true` nor `false`.
    pub fn as_bool(&self) -> Result<bool, MarkerValueError> {
        match self.value.as_deref().map(str::trim) {
            None | Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(_) => Err(self.error(ValueKind::Boolean)),
        }
    }

    /// Returns the value with surrounding quotes removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker has no value.
    pub fn as_string(&self) -> Result<String, MarkerValueError> {
        self.value
            .as_deref()
            .map(|v| unquote(v.trim()))
            .ok_or_else(|| self.error(ValueKind::String))
    }

    /// Splits the value on `;`, respecting quotes, and unquotes each member.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker has no value or a quote is unterminated.
    pub fn as_list(&self) -> Result<Vec<String>, MarkerValueError> {
        let value = self
            .value
            .as_deref()
            .ok_or_else(|| self.error(ValueKind::StringList))?;
        split_quoted(value, ';')
            .map(|parts| parts.iter().map(|p| unquote(p.trim())).collect())
            .ok_or_else(|| self.error(ValueKind::StringList))
    }

    /// Looks up a named argument of an expression marker.
    #[must_use]
    pub fn expression(&self, name: &str) -> Option<&str> {
        self.expressions
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Splits on `sep` outside of double or back quotes. Returns `None` when a
/// quote is left open.
fn split_quoted(s: &str, sep: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('"'), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '`') => quote = Some(c),
            (None, c) if c == sep => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

fn unquote(s: &str) -> String {
    let inner = s
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| s.strip_prefix('`').and_then(|r| r.strip_suffix('`')));

    match inner {
        Some(inner) if s.len() >= 2 => inner.replace("\\\"", "\""),
        _ => s.to_string(),
    }
}

/// Ordered multimap of markers attached to one declaration.
///
/// Repeated identifiers keep their source order; nothing is merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    /// Returns true if no markers were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Number of marker occurrences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if at least one marker has this identifier.
    #[must_use]
    pub fn has(&self, identifier: &str) -> bool {
        self.markers.iter().any(|m| m.identifier == identifier)
    }

    /// Returns true if any of the identifiers is present.
    #[must_use]
    pub fn has_any(&self, identifiers: &[&str]) -> bool {
        identifiers.iter().any(|id| self.has(id))
    }

    /// All occurrences of an identifier in source order.
    pub fn get<'s>(&'s self, identifier: &'s str) -> impl Iterator<Item = &'s Marker> + 's {
        self.markers
            .iter()
            .filter(move |m| m.identifier == identifier)
    }

    /// First occurrence of an identifier.
    #[must_use]
    pub fn first(&self, identifier: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.identifier == identifier)
    }

    /// Last occurrence of an identifier.
    #[must_use]
    pub fn last(&self, identifier: &str) -> Option<&Marker> {
        self.markers.iter().rev().find(|m| m.identifier == identifier)
    }

    /// Iterates all markers in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Markers that repeat an earlier marker with the same identifier and
    /// value. Each duplicated pair is returned once.
    #[must_use]
    pub fn duplicates(&self) -> Vec<&Marker> {
        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();
        let mut reported: HashSet<(&str, Option<&str>)> = HashSet::new();
        let mut out = Vec::new();

        for marker in &self.markers {
            let key = (marker.identifier.as_str(), marker.value.as_deref());
            if !seen.insert(key) && reported.insert(key) {
                out.push(marker);
            }
        }

        out
    }
}

impl<'s> IntoIterator for &'s MarkerSet {
    type Item = &'s Marker;
    type IntoIter = std::slice::Iter<'s, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Self {
            markers: iter.into_iter().collect(),
        }
    }
}

/// Knows which markers take `name=value` argument lists.
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    expression_markers: HashSet<String>,
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(names::XVALIDATION);
        registry.register(names::ITEMS_XVALIDATION);
        registry.register(names::PRINT_COLUMN);
        registry
    }
}

impl MarkerRegistry {
    /// Creates a registry without expression markers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            expression_markers: HashSet::new(),
        }
    }

    /// Registers an identifier whose arguments are `name=value` pairs.
    pub fn register(&mut self, identifier: impl Into<String>) {
        self.expression_markers.insert(identifier.into());
    }

    /// Parses every marker line of a comment block.
    #[must_use]
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> MarkerSet {
        lines
            .iter()
            .filter_map(|line| self.parse_line(line.as_ref()))
            .collect()
    }

    /// Parses a single comment line. Returns `None` for non-marker lines.
    #[must_use]
    pub fn parse_line(&self, line: &str) -> Option<Marker> {
        let text = comment_text(line);
        let body = text.strip_prefix('+')?.trim();
        if body.is_empty() || body.starts_with(['-', '+']) {
            return None;
        }

        if let Some(marker) = self.parse_expression_marker(body) {
            return Some(marker);
        }

        let (identifier, value) = match body.split_once('=') {
            Some((id, value)) => (id.trim().trim_end_matches(':'), Some(value.to_string())),
            None => (body, None),
        };

        if identifier.is_empty() || identifier.contains(char::is_whitespace) {
            return None;
        }

        Some(Marker {
            identifier: identifier.to_string(),
            value,
            expressions: Vec::new(),
            raw: body.to_string(),
        })
    }

    fn parse_expression_marker(&self, body: &str) -> Option<Marker> {
        let identifier = self
            .expression_markers
            .iter()
            .filter(|id| {
                body.strip_prefix(id.as_str())
                    .is_some_and(|rest| rest.starts_with(':'))
            })
            .max_by_key(|id| id.len())?;

        let args = &body[identifier.len() + 1..];
        let expressions = split_quoted(args, ',')
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| {
                let (k, v) = part.split_once('=')?;
                Some((k.trim().to_string(), unquote(v.trim())))
            })
            .collect();

        Some(Marker {
            identifier: identifier.clone(),
            value: Some(args.to_string()),
            expressions,
            raw: body.to_string(),
        })
    }
}

/// Strips comment delimiters from a raw comment line.
#[must_use]
pub fn comment_text(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("//")
        .or_else(|| line.strip_prefix("/*"))
        .map_or(line, |rest| rest.trim_end_matches("*/"))
        .trim()
}

/// Returns the non-marker text lines of a comment block.
#[must_use]
pub fn doc_text<S: AsRef<str>>(lines: &[S]) -> Vec<&str> {
    lines
        .iter()
        .map(|l| comment_text(l.as_ref()))
        .filter(|l| !l.starts_with('+'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> MarkerSet {
        MarkerRegistry::default().parse(lines)
    }

    #[test]
    fn parses_value_and_presence_markers() {
        let set = parse(&[
            "// Name is the name.",
            "// +kubebuilder:validation:MinLength=1",
            "// +optional",
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.first(names::MIN_LENGTH).and_then(|m| m.as_int().ok()),
            Some(1)
        );
        assert!(set.has(names::OPTIONAL));
        assert!(set.first(names::OPTIONAL).is_some_and(|m| m.value.is_none()));
    }

    #[test]
    fn namespaced_and_plain_keys_are_distinct() {
        let set = parse(&["// +k8s:optional", "// +kubebuilder:validation:Required"]);
        assert!(set.has(names::K8S_OPTIONAL));
        assert!(!set.has(names::OPTIONAL));
        assert!(set.has(names::KUBEBUILDER_REQUIRED));
        assert!(!set.has(names::REQUIRED));
    }

    #[test]
    fn colon_before_equals_is_dropped() {
        let set = parse(&["// +kubebuilder:validation:MaxLength:=10"]);
        assert_eq!(
            set.first(names::MAX_LENGTH).and_then(|m| m.as_int().ok()),
            Some(10)
        );
    }

    #[test]
    fn repeated_keys_keep_source_order() {
        let set = parse(&["// +listMapKey=name", "// +listMapKey=namespace"]);
        let keys: Vec<_> = set
            .get(names::LIST_MAP_KEY)
            .filter_map(|m| m.as_string().ok())
            .collect();
        assert_eq!(keys, ["name", "namespace"]);
        assert_eq!(
            set.last(names::LIST_MAP_KEY).and_then(|m| m.value.clone()),
            Some("namespace".to_string())
        );
    }

    #[test]
    fn enum_list_respects_quotes() {
        let set = parse(&[r#"// +kubebuilder:validation:Enum=Foo;"Bar;Baz";"""#]);
        let values = set
            .first(names::ENUM)
            .map(Marker::as_list)
            .and_then(Result::ok)
            .unwrap_or_default();
        assert_eq!(values, ["Foo", "Bar;Baz", ""]);
    }

    #[test]
    fn malformed_numbers_report_context() {
        let set = parse(&[
            "// +kubebuilder:validation:Minimum=abc",
            "// +kubebuilder:validation:Maximum=1.5x",
        ]);
        let min = set.first(names::MINIMUM).map(Marker::as_int);
        assert_eq!(
            min.and_then(Result::err).map(|e| e.to_string()).as_deref(),
            Some(r#"invalid value "abc" for marker kubebuilder:validation:Minimum: not a valid integer"#)
        );
        let max = set.first(names::MAXIMUM).map(Marker::as_float);
        assert_eq!(
            max.and_then(Result::err).map(|e| e.to_string()).as_deref(),
            Some(r#"invalid value "1.5x" for marker kubebuilder:validation:Maximum: not a valid float"#)
        );
    }

    #[test]
    fn expression_markers_are_split() {
        let set = parse(&[
            r#"// +kubebuilder:validation:XValidation:rule="self.a == self.b, really",message="a must equal b""#,
        ]);
        let marker = set.first(names::XVALIDATION).expect("xvalidation parsed");
        assert_eq!(marker.expression("rule"), Some("self.a == self.b, really"));
        assert_eq!(marker.expression("message"), Some("a must equal b"));
    }

    #[test]
    fn ignores_non_marker_lines() {
        let set = parse(&["// plain text", "// +", "// ---", "// + not a marker"]);
        assert!(set.is_empty());
    }

    #[test]
    fn duplicates_report_identical_pairs_once() {
        let set = parse(&[
            "// +optional",
            "// +optional",
            "// +optional",
            "// +kubebuilder:validation:MaxLength=10",
            "// +kubebuilder:validation:MaxLength=11",
        ]);
        let dups: Vec<_> = set.duplicates().iter().map(|m| m.raw.clone()).collect();
        assert_eq!(dups, ["optional"]);
    }

    #[test]
    fn doc_text_skips_markers() {
        let lines = ["// Foo is a thing.", "// +optional", "// More text."];
        assert_eq!(doc_text(&lines), ["Foo is a thing.", "More text."]);
    }
}
