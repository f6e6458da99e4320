//! Config command handlers

use crate::cli::ConfigInitArgs;

const EXAMPLE_CONFIG: &str = include_str!("../../gridboard.example.toml");

/// Handle `gridboard config init`, writing the commented example config.
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    std::fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit this file to customize your Gridboard instance.");
    Ok(())
}
