//! Check command implementation.

use anyhow::{bail, Context, Result};
use api_lint_core::{Analyzer, Config, RuleBox};
use api_lint_rules::{rule_by_name, rules_from_config, RULES};
use std::path::Path;

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Runs the check command. Returns `false` when violations at or above the
/// configured `fail_on` severity were found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<&str>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let config = config_resolver::load(source)?;
    let fail_on = config
        .fail_on_severity()
        .context("Invalid fail_on in configuration")?;

    let rules = match rules_filter {
        Some(filter) => filter_rules(filter, &config),
        None => rules_from_config(&config).with_context(|| {
            format!(
                "Unknown preset \"{}\"",
                config.preset.as_deref().unwrap_or_default()
            )
        })?,
    };
    if rules.is_empty() {
        bail!("No rules selected");
    }

    let mut builder = Analyzer::builder()
        .root(path)
        .config(config)
        .excludes(exclude);
    for rule in rules {
        builder = builder.rule_box(rule);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        path.display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    super::output::print(&result, format)?;

    Ok(!result.has_violations_at(fail_on))
}

/// Builds the rules named in a comma-separated list of names or codes,
/// each configured from its section.
fn filter_rules(filter: &str, config: &Config) -> Vec<RuleBox> {
    let mut rules = Vec::new();

    for requested in filter.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let Some((_, name)) = RULES
            .iter()
            .find(|(code, name)| *code == requested || *name == requested)
        else {
            tracing::warn!("Unknown rule: {}", requested);
            continue;
        };
        rules.extend(rule_by_name(name, config.rule(name)));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_names_and_codes() {
        let config = Config::parse(
            r#"
[rules.nomaps]
severity = "error"
"#,
        )
        .unwrap();
        let rules = filter_rules("KAL003, ssatags,bogus,", &config);
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["nomaps", "ssatags"]);
        assert_eq!(rules[0].default_severity(), api_lint_core::Severity::Error);
    }
}
