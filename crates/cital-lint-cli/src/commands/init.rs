//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "cital-lint.toml";

const DEFAULT_CONFIG: &str = r#"# cital-lint configuration

# Rule preset: "recommended" (default), "strict" or "minimal"
preset = "recommended"

# Lowest severity that makes `cital-lint check` exit with code 1
fail_on = "error"

[analyzer]
# Directory holding the *.model.json files dumped by the compiler
# root = "./.output/models"

# Glob patterns to exclude from analysis
exclude = [
    "**/.alpackages/**",
    "**/.snapshots/**",
]

# Respect .gitignore files
respect_gitignore = true

# Rule configurations, keyed by name or code.
# Each rule can be enabled/disabled and have its severity overridden.

[rules.set-load-fields]
enabled = true
# Records reading more distinct fields than this are exempt
field_threshold = 10

[rules.project-structure]
enabled = true
# First namespace segment and affix prefix in AL-Go settings
organization = "CIG"

# [rules.prefer-text-builder]
# severity = "info"
"#;

/// Runs the init command, writing the config into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = write_default_config(dir, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: cital-lint check <model-dir>");

    Ok(())
}

fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}
