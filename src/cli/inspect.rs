//! Inspect and plugins command handlers

use crate::cli::{output, InspectArgs, PluginsArgs};
use crate::plugin::PluginRegistry;

/// Handle `gridboard inspect`
pub fn handle_inspect(args: &InspectArgs) -> Result<String, Box<dyn std::error::Error>> {
    let document = super::run::read_document(&args.dashboard)?;

    if args.json {
        return Ok(output::format_document_json(&document));
    }

    let mut report = format!(
        "{} (version {}, {} columns)\n",
        args.dashboard.display(),
        document.version,
        document.columns_or_default()
    );
    report.push_str("\nDatasources:\n");
    report.push_str(&output::format_datasources_table(&document));
    report.push_str("\n\nPanes:\n");
    report.push_str(&output::format_panes_table(&document));
    Ok(report)
}

/// Handle `gridboard plugins`
pub fn handle_plugins(args: &PluginsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let registry = PluginRegistry::with_builtins();
    let datasources = registry.datasource_types();
    let widgets = registry.widget_types();

    if args.json {
        Ok(output::format_plugins_json(&datasources, &widgets))
    } else {
        Ok(output::format_plugins_table(&datasources, &widgets))
    }
}
