//! Property-based tests for rendering using proptest.
//!
//! These check the invariants every rendered statement must hold regardless
//! of the parameter values supplied.

use proptest::prelude::*;
use qsql::{Engine, EngineConfig, Placeholder, Value, clean_sql, compile};
use serde_json::json;

const FILTER_TEMPLATE: &str = r#"SELECT * FROM t
WHERE {and (expr "id" "IN" "params.ids") (optExpr "name" "=" "params.name") (expr "age" "BETWEEN" "params.ages")}
LIMIT {val "params.limit"}"#;

// =============================================================================
// Output Formatter Property Tests
// =============================================================================

proptest! {
    /// Cleaning already cleaned SQL changes nothing
    #[test]
    fn clean_sql_is_idempotent(s in "[a-zA-Z0-9 \t\n=?(),']{0,120}") {
        let once = clean_sql(&s);
        prop_assert_eq!(clean_sql(&once), once);
    }

    /// Cleaned SQL is a single line without doubled or edge spaces
    #[test]
    fn clean_sql_is_single_compact_line(s in "[a-z \n]{0,80}") {
        let out = clean_sql(&s);
        prop_assert!(!out.contains('\n'), "newline left in {:?}", out);
        prop_assert!(!out.contains("  "), "double space left in {:?}", out);
        prop_assert_eq!(out.trim(), out.as_str());
    }
}

// =============================================================================
// Placeholder/Argument Invariants
// =============================================================================

proptest! {
    /// Every placeholder has exactly one argument, for both styles
    #[test]
    fn placeholder_count_matches_args(
        ids in prop::collection::vec(any::<i32>(), 0..10),
        name in prop::option::of("[a-z?' ]{0,8}"),
        ages in prop::collection::vec(0..120i32, 0..4),
        limit in prop::option::of(1..100u32),
        dollar in any::<bool>(),
    ) {
        let placeholder = if dollar { Placeholder::Dollar } else { Placeholder::Question };
        let engine = Engine::new(EngineConfig::default().placeholder(placeholder));
        let tpl = engine.compile("filter", FILTER_TEMPLATE).unwrap();

        let mut params = json!({"ids": ids, "ages": ages});
        if let Some(name) = &name {
            params["name"] = json!(name);
        }
        if let Some(limit) = limit {
            params["limit"] = json!(limit);
        }
        let stmt = tpl.execute(&json!({"params": params}).to_string()).unwrap();

        prop_assert_eq!(
            stmt.placeholder_count(),
            stmt.args.len(),
            "SQL: {}", stmt.sql
        );
    }

    /// IN binds one placeholder per element, in element order
    #[test]
    fn in_expands_to_one_placeholder_per_element(
        ids in prop::collection::vec(any::<i32>(), 1..50)
    ) {
        let tpl = compile("in", r#"{expr "id" "IN" "params.ids"}"#).unwrap();
        let stmt = tpl.execute(&json!({"params": {"ids": ids}}).to_string()).unwrap();

        let expected = format!("id IN ({})", vec!["?"; ids.len()].join(", "));
        prop_assert_eq!(&stmt.sql, &expected);

        let bound: Vec<Value> = ids.iter().map(|&id| Value::Number(f64::from(id))).collect();
        prop_assert_eq!(stmt.args, bound);
    }

    /// Dollar placeholders are numbered by argument position
    #[test]
    fn dollar_placeholders_are_sequential(n in 1usize..20) {
        let engine = Engine::new(EngineConfig::default().placeholder(Placeholder::Dollar));
        let tpl = engine.compile("in", r#"{expr "id" "IN" "params.ids"}"#).unwrap();
        let ids: Vec<usize> = (0..n).collect();
        let stmt = tpl.execute(&json!({"params": {"ids": ids}}).to_string()).unwrap();

        let numbered: Vec<String> = (1..=n).map(|i| format!("${i}")).collect();
        prop_assert_eq!(stmt.sql, format!("id IN ({})", numbered.join(", ")));
    }

    /// Parameter values never reach the SQL text
    #[test]
    fn values_are_bound_not_spliced(name in "[a-z]{12,20}") {
        let tpl = compile("eq", r#"SELECT 1 WHERE {expr "name" "=" "params.name"} AND x = {val "params.name"}"#)
            .unwrap();
        let stmt = tpl.execute(&json!({"params": {"name": name}}).to_string()).unwrap();

        prop_assert!(!stmt.sql.contains(&name));
        prop_assert_eq!(stmt.args.len(), 2);
    }
}
