//! # api-lint-rules
//!
//! Built-in API convention rules for api-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | KAL001 | `minlength` | Requires minimum length, items or properties bounds |
//! | KAL002 | `nodurations` | Forbids `time.Duration` and `metav1.Duration` |
//! | KAL003 | `nomaps` | Forbids map types in favour of keyed lists |
//! | KAL004 | `noreferences` | Prefers `Ref` over `Reference` in field names |
//! | KAL005 | `optionalfields` | Checks pointers and `omitempty` on optional fields |
//! | KAL006 | `requiredfields` | Checks pointers and `omitempty` on required fields |
//! | KAL007 | `ssatags` | Checks `listType` and `listMapKey` markers |
//! | KAL008 | `optionalorrequired` | Requires fields to be marked optional or required |
//! | KAL009 | `maxlength` | Requires maximum length, items or properties bounds |
//! | KAL010 | `nofloats` | Forbids `float32` and `float64` |
//! | KAL011 | `nobools` | Forbids `bool` |
//! | KAL012 | `integers` | Allows only `int32` and `int64` |
//! | KAL013 | `duplicatemarkers` | Reports markers repeated with the same value |
//! | KAL014 | `jsontags` | Requires lower camel case json tags |
//! | KAL015 | `commentstart` | Requires field comments to start with the JSON name |
//!
//! ## Usage
//!
//! ```ignore
//! use api_lint_core::Analyzer;
//! use api_lint_rules::{NoMaps, SsaTags};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./dumps")
//!     .rule(NoMaps::new())
//!     .rule(SsaTags::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod layers;
mod length;
mod presets;
mod support;
#[cfg(test)]
mod test_support;

pub mod commentstart;
pub mod duplicatemarkers;
pub mod integers;
pub mod jsontags;
pub mod maxlength;
pub mod minlength;
pub mod nobools;
pub mod nodurations;
pub mod nofloats;
pub mod nomaps;
pub mod noreferences;
pub mod optionalfields;
pub mod optionalorrequired;
pub mod requiredfields;
pub mod ssatags;

pub use commentstart::CommentStart;
pub use duplicatemarkers::DuplicateMarkers;
pub use integers::Integers;
pub use jsontags::JsonTags;
pub use maxlength::MaxLength;
pub use minlength::MinLength;
pub use nobools::NoBools;
pub use nodurations::NoDurations;
pub use nofloats::NoFloats;
pub use nomaps::{MapPolicy, NoMaps};
pub use noreferences::{NoReferences, ReferencePolicy};
pub use optionalfields::OptionalFields;
pub use optionalorrequired::OptionalOrRequired;
pub use presets::{
    all_rules, minimal_rules, recommended_rules, rule_by_name, rules_from_config, strict_rules,
    Preset, RULES,
};
pub use requiredfields::RequiredFields;
pub use ssatags::{SetUsage, SsaTags};

/// Re-export core types for convenience.
pub use api_lint_core::{Rule, Severity, Violation};
