//! The `tadrib init` command.

use anyhow::Result;

use tadrib_providers::TadribConfig;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("tadrib.toml");
    if path.exists() {
        println!("tadrib.toml already exists, skipping.");
        return Ok(());
    }

    let mut config = TadribConfig::default();
    config.gemini.api_key = "${GEMINI_API_KEY}".to_string();
    let body = toml::to_string_pretty(&config)?;
    std::fs::write(path, format!("{HEADER}{body}"))?;
    println!("Created tadrib.toml");

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or set assistant = \"mock\")");
    println!("  2. Run: tadrib seed");
    println!("  3. Run: tadrib quiz --context 1");

    Ok(())
}

const HEADER: &str = "# tadrib configuration
#
# assistant: \"gemini\" or \"mock\"
# ${VAR} references are expanded from the environment;
# TADRIB_GEMINI_KEY overrides gemini.api_key.

";
