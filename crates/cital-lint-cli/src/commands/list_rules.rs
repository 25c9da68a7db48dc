//! List rules command implementation.

use cital_lint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<9} {:<30} {:<12} Description", "Code", "Name", "Category");
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        let descriptor = rule.descriptor();
        println!(
            "{:<9} {:<30} {:<12} {}",
            descriptor.id, descriptor.name, descriptor.category, descriptor.title
        );
    }

    println!("\nPresets:");
    println!("  recommended  - all rules enabled by default (default)");
    println!("  strict       - all rules");
    println!("  minimal      - CIG0011, CIG0015, CIG0000 (for gradual adoption)");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  cital-lint check --rules set-load-fields,project-structure");
    println!("  cital-lint check --rules CIG0011,CIG0015");
}
