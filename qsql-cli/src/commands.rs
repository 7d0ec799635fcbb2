//! Subcommand implementations.
//!
//! File reading happens here; rendering and formatting are split out so
//! they can be tested on in-memory inputs.

use crate::cli::{Format, RenderArgs};
use anyhow::{Context, Result, bail};
use qsql::{Engine, EngineConfig, EngineSettings, SqlStmt};
use std::path::Path;

/// `qsql render`
pub fn render(args: &RenderArgs, settings: EngineSettings) -> Result<()> {
    let template = read(&args.template)?;
    let params = match (&args.params, &args.json) {
        (Some(path), _) => read(path)?,
        (None, Some(json)) => json.clone(),
        (None, None) => "{}".to_string(),
    };

    let name = template_name(&args.template);
    let stmt = render_text(&name, &template, &params, settings)?;
    for diagnostic in &stmt.errors {
        eprintln!("warning: {diagnostic}");
    }
    for failure in &stmt.validator_errors {
        eprintln!("invalid: {} [{}] {}", failure.field_name, failure.code, failure.message);
    }

    println!("{}", format_stmt(&stmt, args.format)?);

    if args.strict && (stmt.has_errors() || stmt.has_validator_errors()) {
        bail!(
            "{name}: {} diagnostics, {} validator errors",
            stmt.errors.len(),
            stmt.validator_errors.len()
        );
    }
    Ok(())
}

/// `qsql check`
pub fn check(path: &Path, settings: EngineSettings) -> Result<()> {
    let template = read(path)?;
    let name = template_name(path);
    Engine::new(EngineConfig::from_settings(settings)).compile(&name, &template)?;
    println!("{name}: ok");
    Ok(())
}

fn render_text(
    name: &str,
    template: &str,
    params: &str,
    settings: EngineSettings,
) -> Result<SqlStmt> {
    let engine = Engine::new(EngineConfig::from_settings(settings));
    let tpl = engine.compile(name, template)?;
    let stmt = tpl
        .execute(params)
        .with_context(|| format!("Failed to render {name}"))?;
    Ok(stmt)
}

fn format_stmt(stmt: &SqlStmt, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            serde_json::to_string_pretty(stmt).context("Failed to serialize statement as JSON")
        },
        Format::Text => {
            let args =
                serde_json::to_string(&stmt.args).context("Failed to serialize arguments")?;
            Ok(format!("{}\n{args}", stmt.sql))
        },
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "template".to_string(), |stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsql::Placeholder;

    const TEMPLATE: &str = r#"SELECT * FROM users WHERE {and (expr "id" "IN" "params.ids") (expr "name" "=" "params.name")}"#;

    #[test]
    fn test_render_text_format() {
        let stmt = render_text(
            "users",
            TEMPLATE,
            r#"{"params": {"ids": [1, 2], "name": "a"}}"#,
            EngineSettings::default(),
        )
        .unwrap();

        assert_eq!(
            format_stmt(&stmt, Format::Text).unwrap(),
            "SELECT * FROM users WHERE (id IN (?, ?) and name = ?)\n[1,2,\"a\"]"
        );
    }

    #[test]
    fn test_render_uses_settings() {
        let settings = EngineSettings {
            placeholder: Placeholder::Dollar,
            ..EngineSettings::default()
        };
        let stmt = render_text("users", TEMPLATE, r#"{"params": {"ids": [1]}}"#, settings).unwrap();

        assert_eq!(stmt.sql, "SELECT * FROM users WHERE (id IN ($1) and name = $2)");
        assert!(stmt.has_errors());
    }

    #[test]
    fn test_render_json_format() {
        let stmt = render_text("users", TEMPLATE, "{}", EngineSettings::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&format_stmt(&stmt, Format::Json).unwrap()).unwrap();

        assert_eq!(json["args"], serde_json::json!([null, null]));
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_compile_error_surfaces() {
        let err = render_text("bad", "{expr", "{}", EngineSettings::default()).unwrap_err();
        assert!(err.to_string().starts_with("bad:1:"));
    }

    #[test]
    fn test_invalid_params_have_context() {
        let err = render_text("users", TEMPLATE, "{", EngineSettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to render users");
    }

    #[test]
    fn test_template_name_from_path() {
        assert_eq!(template_name(Path::new("sql/find_users.sql")), "find_users");
        assert_eq!(template_name(Path::new("/")), "template");
    }
}
