//! Output formatting helpers for CLI commands

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

use crate::dashboard::DashboardDocument;
use crate::plugin::PluginType;

/// Format the datasources of a document as a table
pub fn format_datasources_table(document: &DashboardDocument) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Type", "Settings"]);

    for ds in &document.datasources {
        table.add_row(vec![
            Cell::new(&ds.name),
            Cell::new(&ds.type_name),
            Cell::new(ds.settings.len()),
        ]);
    }

    table.to_string()
}

/// Format the panes and widgets of a document as a table
pub fn format_panes_table(document: &DashboardDocument) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Pane", "Row", "Col", "Width", "Widgets"]);

    for pane in &document.panes {
        let widgets = pane
            .widgets
            .iter()
            .map(|w| w.type_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&pane.title),
            Cell::new(pane.row.for_columns(document.columns_or_default())),
            Cell::new(pane.col.for_columns(document.columns_or_default())),
            Cell::new(pane.col_width),
            Cell::new(widgets),
        ]);
    }

    table.to_string()
}

/// Format a whole document as pretty JSON
pub fn format_document_json(document: &DashboardDocument) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
}

/// Format plugin type lists as a table
pub fn format_plugins_table(datasources: &[PluginType], widgets: &[PluginType]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Kind", "Type", "Display Name"]);

    for plugin in datasources {
        table.add_row(vec![
            Cell::new("datasource".cyan().to_string()),
            Cell::new(&plugin.name),
            Cell::new(&plugin.display_name),
        ]);
    }
    for plugin in widgets {
        table.add_row(vec![
            Cell::new("widget".green().to_string()),
            Cell::new(&plugin.name),
            Cell::new(&plugin.display_name),
        ]);
    }

    table.to_string()
}

/// Format plugin type lists as JSON
pub fn format_plugins_json(datasources: &[PluginType], widgets: &[PluginType]) -> String {
    let names = |types: &[PluginType]| {
        types
            .iter()
            .map(|t| json!({"type": t.name, "display_name": t.display_name}))
            .collect::<Vec<_>>()
    };
    serde_json::to_string_pretty(&json!({
        "datasources": names(datasources),
        "widgets": names(widgets),
    }))
    .unwrap_or_else(|_| "{}".to_string())
}
