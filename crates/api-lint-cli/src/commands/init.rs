//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config_resolver::PROJECT_CONFIG_NAMES;

const DEFAULT_CONFIG: &str = r#"# api-lint configuration

# Rule preset: "recommended" (default), "strict" or "minimal"
preset = "recommended"

# Lowest severity that fails the run: "info", "warning" or "error"
fail_on = "error"

[analyzer]
# Directory holding the package dumps (default: current directory)
# root = "./dumps"

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/testdata/**",
]

# Respect .gitignore files
respect_gitignore = true

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.nomaps]
policy = "AllowStringToStringMaps"
# allowed_field_names = ["Labels", "Annotations"]

[rules.optionalfields]
pointers = { preference = "Always" }
omitempty = { policy = "SuggestFix" }

[rules.requiredfields]
omitempty = { policy = "SuggestFix" }

[rules.ssatags]
list_type_set_usage = "Warn"

# [rules.minlength]
# enabled = true
# severity = "warning"

# [rules.jsontags]
# json_tag_regex = "^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)*$"
"#;

/// Writes a starter `api-lint.toml` into `dir`. Returns its path.
pub fn run(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(PROJECT_CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {} to configure rules", PROJECT_CONFIG_NAMES[0]);
    println!("  2. Run: api-lint check");

    Ok(config_path)
}
