//! Logging helpers shared by the CLI entry points.

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and any component-specific log levels configured in the LoggingConfig.
///
/// # Examples
///
/// ```
/// use gridboard::config::logging::LoggingConfig;
/// use gridboard::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("expr".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     component_levels: Some(component_levels),
///     format: gridboard::config::logging::LogFormat::Pretty,
/// };
///
/// let filter_str = build_filter_directives(&config);
/// assert_eq!(filter_str, "info,gridboard::expr=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        for (component, level) in component_levels {
            filter_str.push_str(&format!(",gridboard::{}={}", component, level));
        }
    }

    filter_str
}
