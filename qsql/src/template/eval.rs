//! Tree-walking evaluator.
//!
//! Arguments are evaluated left to right before each call, so nested calls
//! bind their placeholders depth-first in source order.

use super::ast::{Call, Expr, Node};
use super::printf;
use crate::expr::build_expr;
use crate::funcs::{Builtin, Function};
use crate::inject;
use crate::logic::{Logic, combine};
use crate::state::{Diagnostic, ExecutionState};
use crate::validate::{self, CheckKind};
use crate::value::Value;
use regex::Regex;

/// What `.` refers to.
#[derive(Clone, Copy)]
enum Dot<'v> {
    /// The whole parameter document.
    Root,
    /// The current `range` element.
    Item(&'v Value),
}

/// Renders nodes into text, threading one [`ExecutionState`].
pub struct Evaluator {
    state: ExecutionState,
    out: String,
    locals: Vec<(String, Value)>,
}

impl Evaluator {
    pub const fn new(state: ExecutionState) -> Self {
        Self {
            state,
            out: String::new(),
            locals: Vec::new(),
        }
    }

    /// Render the template body, returning the raw text and the final state.
    pub fn run(mut self, nodes: &[Node]) -> (String, ExecutionState) {
        self.render(nodes, Dot::Root);
        (self.out, self.state)
    }

    fn render(&mut self, nodes: &[Node], dot: Dot<'_>) {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Output(expr) => {
                    let value = self.eval(expr, dot);
                    self.out.push_str(&value.to_string());
                },
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut taken = None;
                    for branch in branches {
                        if self.eval(&branch.condition, dot).is_truthy() {
                            taken = Some(&branch.body);
                            break;
                        }
                    }
                    self.render(taken.unwrap_or(otherwise), dot);
                },
                Node::Range {
                    key,
                    value,
                    source,
                    body,
                    otherwise,
                } => {
                    let collection = self.eval(source, dot);
                    let entries = self.entries(collection);
                    if entries.is_empty() {
                        self.render(otherwise, dot);
                        continue;
                    }
                    for (k, v) in &entries {
                        let mark = self.locals.len();
                        if let Some(name) = key {
                            self.locals.push((name.clone(), k.clone()));
                        }
                        if let Some(name) = value {
                            self.locals.push((name.clone(), v.clone()));
                        }
                        self.render(body, Dot::Item(v));
                        self.locals.truncate(mark);
                    }
                },
            }
        }
    }

    /// `(key, element)` pairs to iterate; scalars are diagnosed.
    fn entries(&mut self, collection: Value) -> Vec<(Value, Value)> {
        match collection {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Value::from(i), item))
                .collect(),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, item)| (Value::String(k), item))
                .collect(),
            Value::Null => Vec::new(),
            scalar => {
                self.state.diagnose(Diagnostic::RangeOverScalar {
                    kind: scalar.type_name(),
                });
                Vec::new()
            },
        }
    }

    fn eval(&mut self, expr: &Expr, dot: Dot<'_>) -> Value {
        match expr {
            Expr::Literal(value) => value.clone(),
            Expr::Variable { name, fields } if name.is_empty() => {
                field_path(self.state.document(), fields)
            },
            Expr::Variable { name, fields } => self
                .locals
                .iter()
                .rev()
                .find(|(local, _)| local == name)
                .map_or(Value::Null, |(_, value)| field_path(value, fields)),
            Expr::Dot { fields } => match dot {
                Dot::Root => field_path(self.state.document(), fields),
                Dot::Item(item) => field_path(item, fields),
            },
            Expr::Call(call) => self.call(call, dot),
        }
    }

    fn call(&mut self, call: &Call, dot: Dot<'_>) -> Value {
        let args: Vec<Value> = call.args.iter().map(|arg| self.eval(arg, dot)).collect();
        tracing::trace!(function = %call.name, args = args.len(), "dispatch");

        match &call.function {
            Function::Builtin(builtin) => self.builtin(*builtin, &args, call.pattern.as_ref()),
            Function::Custom { func, .. } => func(&mut self.state, &args),
        }
    }

    fn builtin(&mut self, builtin: Builtin, args: &[Value], pattern: Option<&Regex>) -> Value {
        let state = &mut self.state;
        match builtin {
            Builtin::Expr => build_expr(state, true, args).into(),
            Builtin::OptExpr => build_expr(state, false, args).into(),
            Builtin::And => combine(state, Logic::And, args).into(),
            Builtin::Or => combine(state, Logic::Or, args).into(),
            Builtin::Val => inject::inject(state, args).into(),
            Builtin::GetValue => inject::get_value(state, args),
            Builtin::IsEmpty => Value::Bool(args.first().is_none_or(inject::is_empty)),
            Builtin::Not => Value::Bool(!args.first().is_some_and(Value::is_truthy)),
            Builtin::Eq => Value::Bool(
                args.split_first()
                    .is_some_and(|(first, rest)| rest.contains(first)),
            ),
            Builtin::Ne => Value::Bool(args.first() != args.get(1)),
            Builtin::Len => {
                let value = args.first().unwrap_or(&Value::Null);
                value.len().map_or_else(
                    || {
                        state.diagnose(Diagnostic::NoLength {
                            kind: value.type_name(),
                        });
                        Value::Number(0.0)
                    },
                    Value::from,
                )
            },
            Builtin::Printf => printf::sprintf(args).into(),
            Builtin::RequiredCheck => validate::check_type(state, CheckKind::Required, args).into(),
            Builtin::StrCheck => validate::check_type(state, CheckKind::Str, args).into(),
            Builtin::IntCheck => validate::check_type(state, CheckKind::Int, args).into(),
            Builtin::FloatCheck => validate::check_type(state, CheckKind::Float, args).into(),
            Builtin::RegexCheck => validate::check_regex(state, args, pattern).into(),
            Builtin::StrLenCheck => validate::check_len(state, CheckKind::StrLen, args).into(),
            Builtin::ArrLenCheck => validate::check_len(state, CheckKind::ArrLen, args).into(),
        }
    }
}

/// Follow `.field` accessors through objects; anything missing is `Null`.
fn field_path(value: &Value, fields: &[String]) -> Value {
    fields
        .iter()
        .try_fold(value, |current, field| match current {
            Value::Object(map) => map.get(field),
            _ => None,
        })
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionalExpr;
    use crate::dialect::Placeholder;
    use crate::funcs::FunctionTable;
    use crate::template::parser;
    use serde_json::json;

    fn render(source: &str, doc: serde_json::Value) -> (String, ExecutionState) {
        let nodes = parser::parse("t", source, &FunctionTable::standard()).unwrap();
        let state =
            ExecutionState::new(Value::from(doc), Placeholder::Question, OptionalExpr::Emit);
        Evaluator::new(state).run(&nodes)
    }

    #[test]
    fn test_text_passthrough() {
        let (out, state) = render("SELECT 1", json!({}));
        assert_eq!(out, "SELECT 1");
        assert!(state.args().is_empty());
    }

    #[test]
    fn test_output_renders_values() {
        let (out, _) = render(
            r#"{getValue "params.n"}|{getValue "params.s"}|{getValue "params.none"}|{getValue "params.a"}"#,
            json!({"params": {"n": 3, "s": "x", "a": [1, 2]}}),
        );
        assert_eq!(out, "3|x||[1,2]");
    }

    #[test]
    fn test_dot_and_root_variable() {
        let (out, _) = render("{.params.name}-{$.params.name}", json!({"params": {"name": "a"}}));
        assert_eq!(out, "a-a");
    }

    #[test]
    fn test_if_chain() {
        let source = "{if .a}A{else if .b}B{else}C{end}";
        assert_eq!(render(source, json!({"a": 1})).0, "A");
        assert_eq!(render(source, json!({"b": "x"})).0, "B");
        assert_eq!(render(source, json!({"a": 0, "b": ""})).0, "C");
    }

    #[test]
    fn test_range_over_array_binds_index_and_element() {
        let (out, _) = render(
            "{range $i, $v := .items}{if $i},{end}{$i}:{$v.id}{end}",
            json!({"items": [{"id": "a"}, {"id": "b"}]}),
        );
        assert_eq!(out, "0:a,1:b");
    }

    #[test]
    fn test_range_single_variable_and_dot() {
        let (out, _) = render("{range $v := .xs}{$v}{.}{end}", json!({"xs": [1, 2]}));
        assert_eq!(out, "1122");
    }

    #[test]
    fn test_range_over_object_in_key_order() {
        let (out, _) = render(
            "{range $k, $v := .m}{$k}={$v};{end}",
            json!({"m": {"b": 2, "a": 1}}),
        );
        assert_eq!(out, "a=1;b=2;");
    }

    #[test]
    fn test_range_else_on_empty_and_missing() {
        let source = "{range .xs}x{else}none{end}";
        assert_eq!(render(source, json!({"xs": []})).0, "none");
        assert_eq!(render(source, json!({})).0, "none");
    }

    #[test]
    fn test_range_over_scalar_is_diagnosed() {
        let (out, state) = render("{range .xs}x{else}none{end}", json!({"xs": 5}));
        assert_eq!(out, "none");
        assert_eq!(state.diagnostics(), &[Diagnostic::RangeOverScalar { kind: "number" }]);
    }

    #[test]
    fn test_range_binds_in_iteration_order() {
        let (out, state) = render(
            r#"{range $i, $v := .params.items}{expr "id" "=" (printf "params.items.%d.id" $i)} {end}"#,
            json!({"params": {"items": [{"id": 7}, {"id": 8}]}}),
        );
        assert_eq!(out, "id = ? id = ? ");
        assert_eq!(state.args(), &[Value::Number(7.0), Value::Number(8.0)]);
    }

    #[test]
    fn test_helpers() {
        let (out, _) = render(
            r#"{eq 1 2 1}{ne "a" "a"}{not ""}{len .xs}{isEmpty .none}"#,
            json!({"xs": [1, 2, 3]}),
        );
        assert_eq!(out, "truefalsetrue3true");
    }

    #[test]
    fn test_len_of_scalar_is_diagnosed() {
        let (out, state) = render("{len 5}", json!({}));
        assert_eq!(out, "0");
        assert_eq!(state.diagnostics(), &[Diagnostic::NoLength { kind: "number" }]);
    }

    #[test]
    fn test_nested_calls_bind_depth_first() {
        let (out, state) = render(
            r#"{and (expr "a" "=" "p.a") (or (expr "b" "=" "p.b") (expr "c" "=" "p.c"))}"#,
            json!({"p": {"a": 1, "b": 2, "c": 3}}),
        );
        assert_eq!(out, "(a = ? and (b = ? or c = ?))");
        assert_eq!(
            state.args(),
            &[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]
        );
    }

    #[test]
    fn test_custom_function() {
        let table = FunctionTable::standard().register(
            "bindTwice",
            crate::funcs::Arity::exactly(1),
            |state, args| {
                let value = args.first().cloned().unwrap_or_default();
                let a = state.bind(value.clone());
                let b = state.bind(value);
                Value::from(format!("{a}, {b}"))
            },
        );
        let nodes = parser::parse("t", r#"({bindTwice "x"})"#, &table).unwrap();
        let state = ExecutionState::new(Value::Null, Placeholder::Dollar, OptionalExpr::Emit);
        let (out, state) = Evaluator::new(state).run(&nodes);
        assert_eq!(out, "($1, $2)");
        assert_eq!(state.args().len(), 2);
    }
}
