//! Engine settings loaded from TOML.
//!
//! ```toml
//! placeholder = "dollar"
//! optional_expr = "suppress"
//!
//! [limits]
//! max_input_bytes = 65536
//! max_depth = 10
//! ```
//!
//! Every key is optional; omitted keys keep the library defaults.

use anyhow::{Context, Result};
use qsql::EngineSettings;
use std::path::Path;

/// Read settings from `path`, or the defaults when no file was given.
pub fn load(path: Option<&Path>) -> Result<EngineSettings> {
    let Some(path) = path else {
        return Ok(EngineSettings::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let settings = parse(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    tracing::debug!(path = %path.display(), ?settings, "loaded engine settings");
    Ok(settings)
}

fn parse(contents: &str) -> Result<EngineSettings> {
    Ok(toml::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsql::{OptionalExpr, Placeholder};

    #[test]
    fn test_defaults_without_file() {
        assert_eq!(load(None).unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse("").unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_full_settings() {
        let settings = parse(
            r#"
placeholder = "dollar"
optional_expr = "suppress"

[limits]
max_input_bytes = 65536
max_depth = 10
"#,
        )
        .unwrap();

        assert_eq!(settings.placeholder, Placeholder::Dollar);
        assert_eq!(settings.optional_expr, OptionalExpr::Suppress);
        assert_eq!(settings.limits.max_input_bytes, 65536);
        assert_eq!(settings.limits.max_depth, 10);
    }

    #[test]
    fn test_partial_limits_keep_defaults() {
        let settings = parse("[limits]\nmax_depth = 4\n").unwrap();
        assert_eq!(settings.limits.max_depth, 4);
        assert_eq!(
            settings.limits.max_input_bytes,
            qsql::Limits::default().max_input_bytes
        );
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        assert!(parse(r#"placeholder = "colon""#).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load(Some(Path::new("/nonexistent/qsql.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/qsql.toml"));
    }
}
