//! Validate command implementation

use crate::cli::ValidateArgs;
use crate::dashboard::SERIALIZATION_VERSION;
use crate::plugin::PluginRegistry;

/// Handle `gridboard validate`
///
/// Parses the document and cross-checks every datasource and widget type
/// against the built-in registry, without starting any instance.
pub fn handle_validate(args: &ValidateArgs) -> Result<String, Box<dyn std::error::Error>> {
    let document = super::run::read_document(&args.dashboard)?;

    if document.version > SERIALIZATION_VERSION {
        return Err(format!(
            "document version {} is newer than this engine supports ({})",
            document.version, SERIALIZATION_VERSION
        )
        .into());
    }

    let registry = PluginRegistry::with_builtins();
    let mut warnings = Vec::new();

    for ds in &document.datasources {
        if registry.datasource(&ds.type_name).is_none() {
            warnings.push(format!(
                "datasource '{}' has unknown type '{}'",
                ds.name, ds.type_name
            ));
        }
    }
    for (index, pane) in document.panes.iter().enumerate() {
        for widget in &pane.widgets {
            if registry.widget(&widget.type_name).is_none() {
                warnings.push(format!(
                    "pane {} ('{}') has widget of unknown type '{}'",
                    index, pane.title, widget.type_name
                ));
            }
        }
    }
    if !document.plugins.is_empty() {
        warnings.push(format!(
            "{} external plugin source(s) cannot be checked offline",
            document.plugins.len()
        ));
    }

    let mut report = format!(
        "{}: version {}, {} datasource(s), {} pane(s)",
        args.dashboard.display(),
        document.version,
        document.datasources.len(),
        document.panes.len()
    );
    if warnings.is_empty() {
        report.push_str("\nOK");
    } else {
        for warning in &warnings {
            report.push_str(&format!("\nwarning: {}", warning));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_doc(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("board.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_clean_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(
            &dir,
            r#"{"version": 1, "datasources": [{"name": "t", "type": "clock"}], "panes": []}"#,
        );

        let report = handle_validate(&ValidateArgs { dashboard: path }).unwrap();
        assert!(report.contains("OK"));
        assert!(report.contains("1 datasource(s)"));
    }

    #[test]
    fn test_validate_flags_unknown_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(
            &dir,
            r#"{"version": 1, "datasources": [{"name": "x", "type": "mystery"}]}"#,
        );

        let report = handle_validate(&ValidateArgs { dashboard: path }).unwrap();
        assert!(report.contains("unknown type 'mystery'"));
    }

    #[test]
    fn test_validate_rejects_newer_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir, r#"{"version": 99}"#);

        let result = handle_validate(&ValidateArgs { dashboard: path });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir, "{not json");

        let result = handle_validate(&ValidateArgs { dashboard: path });
        assert!(result.is_err());
    }
}
