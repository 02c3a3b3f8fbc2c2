//! Rule presets and rule construction from configuration.

use api_lint_core::{Config, RuleBox, RuleConfig};

use crate::{
    commentstart, duplicatemarkers, integers, jsontags, maxlength, minlength, nobools,
    nodurations, nofloats, nomaps, noreferences, optionalfields, optionalorrequired,
    requiredfields, ssatags, CommentStart, DuplicateMarkers, Integers, JsonTags, MaxLength,
    MinLength, NoBools, NoDurations, NoFloats, NoMaps, NoReferences, OptionalFields,
    OptionalOrRequired, RequiredFields, SsaTags,
};

/// Every rule as `(code, name)`, in code order.
pub const RULES: &[(&str, &str)] = &[
    (minlength::CODE, minlength::NAME),
    (nodurations::CODE, nodurations::NAME),
    (nomaps::CODE, nomaps::NAME),
    (noreferences::CODE, noreferences::NAME),
    (optionalfields::CODE, optionalfields::NAME),
    (requiredfields::CODE, requiredfields::NAME),
    (ssatags::CODE, ssatags::NAME),
    (optionalorrequired::CODE, optionalorrequired::NAME),
    (maxlength::CODE, maxlength::NAME),
    (nofloats::CODE, nofloats::NAME),
    (nobools::CODE, nobools::NAME),
    (integers::CODE, integers::NAME),
    (duplicatemarkers::CODE, duplicatemarkers::NAME),
    (jsontags::CODE, jsontags::NAME),
    (commentstart::CODE, commentstart::NAME),
];

const RECOMMENDED: &[&str] = &[
    nodurations::NAME,
    nomaps::NAME,
    optionalfields::NAME,
    requiredfields::NAME,
    ssatags::NAME,
    optionalorrequired::NAME,
    maxlength::NAME,
    nofloats::NAME,
    nobools::NAME,
    integers::NAME,
    duplicatemarkers::NAME,
    jsontags::NAME,
    commentstart::NAME,
];

const MINIMAL: &[&str] = &[
    optionalorrequired::NAME,
    requiredfields::NAME,
    ssatags::NAME,
    jsontags::NAME,
];

/// Preset configurations for api-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with sensible defaults.
    Recommended,
    /// Every rule.
    Strict,
    /// Minimal rules for gradual adoption.
    Minimal,
}

impl Preset {
    /// Looks up a preset by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Configuration name of the preset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Names of the rules in this preset.
    #[must_use]
    pub fn rule_names(self) -> Vec<&'static str> {
        match self {
            Self::Recommended => RECOMMENDED.to_vec(),
            Self::Strict => RULES.iter().map(|(_, name)| *name).collect(),
            Self::Minimal => MINIMAL.to_vec(),
        }
    }

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        self.rule_names()
            .into_iter()
            .filter_map(|name| rule_by_name(name, None))
            .collect()
    }
}

/// Builds a rule by name or code, configured from `config` when given.
#[must_use]
pub fn rule_by_name(name_or_code: &str, config: Option<&RuleConfig>) -> Option<RuleBox> {
    let (_, name) = RULES
        .iter()
        .find(|(code, name)| *code == name_or_code || *name == name_or_code)?;
    let default = RuleConfig::default();
    let config = config.unwrap_or(&default);

    let rule: RuleBox = match *name {
        minlength::NAME => Box::new(MinLength::from_config(config)),
        nodurations::NAME => Box::new(NoDurations::from_config(config)),
        nomaps::NAME => Box::new(NoMaps::from_config(config)),
        noreferences::NAME => Box::new(NoReferences::from_config(config)),
        optionalfields::NAME => Box::new(OptionalFields::from_config(config)),
        requiredfields::NAME => Box::new(RequiredFields::from_config(config)),
        ssatags::NAME => Box::new(SsaTags::from_config(config)),
        optionalorrequired::NAME => Box::new(OptionalOrRequired::from_config(config)),
        maxlength::NAME => Box::new(MaxLength::from_config(config)),
        nofloats::NAME => Box::new(NoFloats::from_config(config)),
        nobools::NAME => Box::new(NoBools::from_config(config)),
        integers::NAME => Box::new(Integers::from_config(config)),
        duplicatemarkers::NAME => Box::new(DuplicateMarkers::from_config(config)),
        jsontags::NAME => Box::new(JsonTags::from_config(config)),
        commentstart::NAME => Box::new(CommentStart::from_config(config)),
        _ => return None,
    };
    Some(rule)
}

/// Returns the recommended set of rules.
///
/// Everything except `minlength` and `noreferences`, which are opinionated
/// enough to be opt-in.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    Preset::Recommended.rules()
}

/// Returns the strict set of rules: every rule.
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    Preset::Strict.rules()
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes:
/// - `optionalorrequired` (KAL008)
/// - `requiredfields` (KAL006)
/// - `ssatags` (KAL007)
/// - `jsontags` (KAL014)
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    Preset::Minimal.rules()
}

/// Returns all available rules with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    strict_rules()
}

/// Builds the rules a configuration selects: the rules of its preset
/// (`recommended` when unset) plus any rule with `enabled = true`, each
/// configured from its section. Rules with `enabled = false` are dropped.
///
/// Returns `None` if the preset name is unknown.
#[must_use]
pub fn rules_from_config(config: &Config) -> Option<Vec<RuleBox>> {
    let preset = match config.preset.as_deref() {
        Some(name) => Preset::from_name(name)?,
        None => Preset::Recommended,
    };
    let selected = preset.rule_names();

    let rules = RULES
        .iter()
        .map(|(_, name)| *name)
        .filter(|name| {
            let section = config.rule(name);
            match section.and_then(|c| c.enabled) {
                Some(enabled) => enabled,
                None => selected.contains(name),
            }
        })
        .filter_map(|name| rule_by_name(name, config.rule(name)))
        .collect();
    Some(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_lint_core::Severity;

    fn names(rules: &[RuleBox]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Strict.rules().len(), 15);
        assert_eq!(Preset::Recommended.rules().len(), 13);
        assert_eq!(
            names(&Preset::Minimal.rules()),
            ["optionalorrequired", "requiredfields", "ssatags", "jsontags"]
        );
        assert!(!names(&recommended_rules()).contains(&"minlength"));
    }

    #[test]
    fn rule_table_matches_rules() {
        for (code, name) in RULES {
            let rule = rule_by_name(code, None).expect("rule for code");
            assert_eq!(rule.name(), *name);
            assert_eq!(rule.code(), *code);
            assert!(!rule.description().is_empty());
        }
        assert!(rule_by_name("KAL999", None).is_none());
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("lenient"), None);
    }

    #[test]
    fn config_selects_and_configures_rules() {
        let config = Config::parse(
            r#"
preset = "minimal"

[rules.nobools]
enabled = true
severity = "error"

[rules.jsontags]
enabled = false
"#,
        )
        .expect("valid config");
        let rules = rules_from_config(&config).expect("known preset");
        assert_eq!(
            names(&rules),
            ["requiredfields", "ssatags", "optionalorrequired", "nobools"]
        );
        let nobools = rules.iter().find(|r| r.name() == "nobools").expect("nobools");
        assert_eq!(nobools.default_severity(), Severity::Error);
    }

    #[test]
    fn unknown_preset() {
        let config = Config::parse(r#"preset = "lenient""#).expect("valid config");
        assert!(rules_from_config(&config).is_none());
    }
}
