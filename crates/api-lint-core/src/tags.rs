//! Struct tag parsing.
//!
//! Follows the conventional `key:"value" key2:"value2"` layout of struct
//! tags. Only the `json` key carries meaning for the rules.

/// Looks up the value associated with `key` in a raw struct tag.
///
/// Returns `None` when the key is absent or the tag is malformed before the
/// key is reached.
#[must_use]
pub fn lookup(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let colon = rest.find(':')?;
        let name = &rest[..colon];
        if name.is_empty() || name.contains(|c: char| c <= ' ' || c == '"') {
            return None;
        }
        rest = &rest[colon + 1..];

        let value = rest.strip_prefix('"')?;
        let (raw, consumed) = quoted_body(value)?;
        rest = &value[consumed..];

        if name == key {
            return Some(unescape(raw));
        }
    }
}

/// Returns the quoted body and the number of bytes consumed including the
/// closing quote.
fn quoted_body(s: &str) -> Option<(&str, usize)> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some((&s[..i], i + 1)),
            _ => escaped = false,
        }
    }
    None
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parsed `json` struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonTag {
    /// Whether a `json` key was present at all.
    pub present: bool,
    /// Serialized name; empty when the tag leaves it to the field name.
    pub name: String,
    /// `omitempty` option.
    pub omit_empty: bool,
    /// `omitzero` option.
    pub omit_zero: bool,
    /// `inline` option.
    pub inline: bool,
    /// `json:"-"`: never serialized.
    pub ignored: bool,
    /// The raw tag value.
    pub raw: String,
}

impl JsonTag {
    /// Parses the `json` entry of a raw struct tag.
    #[must_use]
    pub fn from_struct_tag(tag: &str) -> Self {
        lookup(tag, "json").map_or_else(Self::default, |value| Self::parse(&value))
    }

    /// Parses a `json` tag value such as `name,omitempty`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(',');
        let name = parts.next().unwrap_or_default().to_string();
        let mut tag = Self {
            present: true,
            ignored: value == "-",
            name,
            raw: value.to_string(),
            ..Self::default()
        };

        for option in parts {
            match option.trim() {
                "omitempty" => tag.omit_empty = true,
                "omitzero" => tag.omit_zero = true,
                "inline" => tag.inline = true,
                _ => {}
            }
        }

        tag
    }
}
