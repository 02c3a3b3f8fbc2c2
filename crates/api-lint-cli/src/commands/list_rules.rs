//! List rules command implementation.

use api_lint_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<20} {:<8} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<8} {:<20} {:<8} {}",
            rule.code(),
            rule.name(),
            rule.default_severity(),
            rule.description()
        );
    }

    println!("\nPresets:");
    for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
        let default = if preset == Preset::Recommended {
            " (default)"
        } else {
            ""
        };
        println!("  {:<12} {}{}", preset.name(), preset.rule_names().join(", "), default);
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  api-lint check --rules nomaps,ssatags");
    println!("  api-lint check --rules KAL003,KAL007");
}
