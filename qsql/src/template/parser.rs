//! Recursive-descent parser from tokens to [`Node`]s.

use super::ast::{Branch, Call, Expr, Node};
use super::lexer::{self, Token, TokenKind};
use crate::error::{CompileError, find_similar};
use crate::funcs::{Builtin, Function, FunctionTable};
use crate::value::Value;
use regex::Regex;

/// Parse template text against a function table.
pub fn parse(
    name: &str,
    source: &str,
    functions: &FunctionTable,
) -> Result<Vec<Node>, CompileError> {
    let tokens = lexer::tokenize(name, source)?;
    let mut parser = Parser {
        name,
        source,
        tokens,
        pos: 0,
        functions,
        scope: Vec::new(),
    };

    let (nodes, stop) = parser.parse_list()?;
    match stop {
        Stop::Eof => Ok(nodes),
        Stop::End(offset) => Err(parser.unbalanced(offset, "unexpected {end}")),
        Stop::Else(offset) => Err(parser.unbalanced(offset, "unexpected {else}")),
    }
}

/// Why a node list ended.
enum Stop {
    Eof,
    End(usize),
    Else(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    If,
    Else,
    End,
    Range,
}

/// A command before arity checking, so a pipe can still append its input.
enum Command {
    Call { name: String, args: Vec<Expr> },
    Value(Expr),
}

struct Parser<'a> {
    name: &'a str,
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    functions: &'a FunctionTable,
    scope: Vec<String>,
}

impl Parser<'_> {
    // =========================================================================
    // Token access
    // =========================================================================

    fn peek(&self) -> Option<&TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.offset)
    }

    fn keyword(&self) -> Option<Keyword> {
        match self.peek()? {
            TokenKind::Ident(word) => match word.as_str() {
                "if" => Some(Keyword::If),
                "else" => Some(Keyword::Else),
                "end" => Some(Keyword::End),
                "range" => Some(Keyword::Range),
                _ => None,
            },
            _ => None,
        }
    }

    fn operand_follows(&self) -> bool {
        self.peek().is_some_and(|kind| {
            !matches!(
                kind,
                TokenKind::RightDelim | TokenKind::RightParen | TokenKind::Pipe
            )
        })
    }

    fn expect_close(&mut self) -> Result<(), CompileError> {
        match self.tokens.get(self.pos) {
            Some(Token {
                kind: TokenKind::RightDelim,
                ..
            }) => {
                self.pos += 1;
                Ok(())
            },
            Some(token) => Err(self.syntax(
                token.offset,
                format!("unexpected {} in action", describe(&token.kind)),
            )),
            None => Err(self.syntax(self.source.len(), "unclosed action")),
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    fn syntax(&self, offset: usize, message: impl Into<String>) -> CompileError {
        let (line, column) = lexer::position(self.source, offset);
        CompileError::Syntax {
            name: self.name.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    fn unbalanced(&self, offset: usize, message: &str) -> CompileError {
        let (line, column) = lexer::position(self.source, offset);
        CompileError::UnbalancedBlock {
            name: self.name.to_string(),
            message: format!("{message} at {line}:{column}"),
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    fn parse_list(&mut self) -> Result<(Vec<Node>, Stop), CompileError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            match token.kind {
                TokenKind::Text(text) => nodes.push(Node::Text(text)),
                TokenKind::LeftDelim => match self.keyword() {
                    Some(Keyword::End) => {
                        self.pos += 1;
                        self.expect_close()?;
                        return Ok((nodes, Stop::End(token.offset)));
                    },
                    Some(Keyword::Else) => {
                        self.pos += 1;
                        return Ok((nodes, Stop::Else(token.offset)));
                    },
                    Some(Keyword::If) => {
                        self.pos += 1;
                        nodes.push(self.parse_if(token.offset)?);
                    },
                    Some(Keyword::Range) => {
                        self.pos += 1;
                        nodes.push(self.parse_range(token.offset)?);
                    },
                    None => {
                        let expr = self.parse_pipeline()?;
                        self.expect_close()?;
                        nodes.push(Node::Output(expr));
                    },
                },
                other => {
                    let message = format!("unexpected {}", describe(&other));
                    return Err(self.syntax(token.offset, message));
                },
            }
        }

        Ok((nodes, Stop::Eof))
    }

    fn parse_if(&mut self, open: usize) -> Result<Node, CompileError> {
        let mut branches = Vec::new();
        loop {
            let condition = self.parse_pipeline()?;
            self.expect_close()?;
            let (body, stop) = self.parse_list()?;
            branches.push(Branch { condition, body });

            match stop {
                Stop::End(_) => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                },
                Stop::Else(_) if self.keyword() == Some(Keyword::If) => {
                    self.pos += 1;
                },
                Stop::Else(_) => {
                    self.expect_close()?;
                    let otherwise = self.parse_else_body(open, "unclosed {if}")?;
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                },
                Stop::Eof => return Err(self.unbalanced(open, "unclosed {if}")),
            }
        }
    }

    fn parse_range(&mut self, open: usize) -> Result<Node, CompileError> {
        let (key, value) = self.parse_declarations()?;
        let source = self.parse_pipeline()?;
        self.expect_close()?;

        let mark = self.scope.len();
        self.scope.extend(key.iter().chain(value.iter()).cloned());
        let parsed = self.parse_list();
        self.scope.truncate(mark);
        let (body, stop) = parsed?;

        let otherwise = match stop {
            Stop::End(_) => Vec::new(),
            Stop::Else(_) => {
                self.expect_close()?;
                self.parse_else_body(open, "unclosed {range}")?
            },
            Stop::Eof => return Err(self.unbalanced(open, "unclosed {range}")),
        };

        Ok(Node::Range {
            key,
            value,
            source,
            body,
            otherwise,
        })
    }

    fn parse_else_body(&mut self, open: usize, unclosed: &str) -> Result<Vec<Node>, CompileError> {
        let (nodes, stop) = self.parse_list()?;
        match stop {
            Stop::End(_) => Ok(nodes),
            Stop::Else(offset) => Err(self.unbalanced(offset, "expected {end} after {else}")),
            Stop::Eof => Err(self.unbalanced(open, unclosed)),
        }
    }

    /// `$v :=` or `$k, $v :=`, if present.
    fn parse_declarations(&mut self) -> Result<(Option<String>, Option<String>), CompileError> {
        let Some(first) = self.declared_name(0) else {
            return Ok((None, None));
        };

        match self.peek_at(1) {
            Some(TokenKind::Declare) => {
                self.pos += 2;
                Ok((None, Some(first)))
            },
            Some(TokenKind::Comma) => {
                let offset = self.offset();
                let Some(second) = self.declared_name(2) else {
                    return Err(self.syntax(offset, "range can only initialize variables"));
                };
                if self.peek_at(3) != Some(&TokenKind::Declare) {
                    return Err(self.syntax(offset, "expected := after range variables"));
                }
                self.pos += 4;
                Ok((Some(first), Some(second)))
            },
            _ => Ok((None, None)),
        }
    }

    fn declared_name(&self, ahead: usize) -> Option<String> {
        match self.peek_at(ahead)? {
            TokenKind::Variable { name, fields } if !name.is_empty() && fields.is_empty() => {
                Some(name.clone())
            },
            _ => None,
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// `command | command ...`; each stage gets the previous result as its
    /// last argument.
    fn parse_pipeline(&mut self) -> Result<Expr, CompileError> {
        let mut expr = match self.parse_command()? {
            Command::Call { name, args } => self.finish_call(name, args)?,
            Command::Value(expr) => expr,
        };

        while self.peek() == Some(&TokenKind::Pipe) {
            let offset = self.offset();
            self.pos += 1;
            match self.parse_command()? {
                Command::Call { name, mut args } => {
                    args.push(expr);
                    expr = self.finish_call(name, args)?;
                },
                Command::Value(_) => return Err(self.syntax(offset, "non-function in pipeline")),
            }
        }

        Ok(expr)
    }

    fn parse_command(&mut self) -> Result<Command, CompileError> {
        let start = self.offset();

        if let Some(TokenKind::Ident(word)) = self.peek() {
            if !is_literal_word(word) {
                let name = word.clone();
                self.pos += 1;
                let mut args = Vec::new();
                while let Some(arg) = self.parse_operand()? {
                    args.push(arg);
                }
                return Ok(Command::Call { name, args });
            }
        }

        let Some(expr) = self.parse_operand()? else {
            return Err(self.syntax(start, "missing value for command"));
        };
        if self.operand_follows() {
            return Err(self.syntax(self.offset(), "can't give argument to non-function"));
        }
        Ok(Command::Value(expr))
    }

    /// One argument, or `None` at the end of the command.
    fn parse_operand(&mut self) -> Result<Option<Expr>, CompileError> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Ok(None);
        };

        let expr = match token.kind {
            TokenKind::RightDelim | TokenKind::RightParen | TokenKind::Pipe => return Ok(None),
            TokenKind::String(s) => Expr::Literal(Value::String(s)),
            TokenKind::Number(n) => Expr::Literal(Value::Number(n)),
            TokenKind::Ident(word) => match word.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "nil" => Expr::Literal(Value::Null),
                _ => {
                    self.pos += 1;
                    return self.finish_call(word, Vec::new()).map(Some);
                },
            },
            TokenKind::Variable { name, fields } => {
                if !name.is_empty() && !self.scope.contains(&name) {
                    return Err(CompileError::UndefinedVariable {
                        name: self.name.to_string(),
                        variable: name,
                    });
                }
                Expr::Variable { name, fields }
            },
            TokenKind::Dot(fields) => Expr::Dot { fields },
            TokenKind::LeftParen => {
                self.pos += 1;
                let inner = self.parse_pipeline()?;
                if self.peek() != Some(&TokenKind::RightParen) {
                    return Err(self.syntax(token.offset, "unclosed left paren"));
                }
                self.pos += 1;
                return Ok(Some(inner));
            },
            other => {
                let message = format!("unexpected {} in operand", describe(&other));
                return Err(self.syntax(token.offset, message));
            },
        };

        self.pos += 1;
        Ok(Some(expr))
    }

    /// Resolve the function, check arity, precompile a literal pattern.
    fn finish_call(&self, name: String, args: Vec<Expr>) -> Result<Expr, CompileError> {
        let Some(function) = self.functions.get(&name) else {
            let suggestion = find_similar(&name, &self.functions.names()).map(str::to_string);
            return Err(CompileError::UnknownFunction {
                name: self.name.to_string(),
                function: name,
                suggestion,
            });
        };

        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(CompileError::Arity {
                name: self.name.to_string(),
                function: name,
                expected: arity.to_string(),
                got: args.len(),
            });
        }

        let pattern = match (function, args.first()) {
            (Function::Builtin(Builtin::RegexCheck), Some(Expr::Literal(Value::String(p)))) => {
                let regex = Regex::new(p).map_err(|e| CompileError::InvalidRegex {
                    name: self.name.to_string(),
                    pattern: p.clone(),
                    message: e.to_string(),
                })?;
                Some(regex)
            },
            _ => None,
        };

        Ok(Expr::Call(Call {
            name,
            function: function.clone(),
            args,
            pattern,
        }))
    }
}

fn is_literal_word(word: &str) -> bool {
    matches!(word, "true" | "false" | "nil")
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Text(_) => "text".to_string(),
        TokenKind::LeftDelim => "\"{\"".to_string(),
        TokenKind::RightDelim => "\"}\"".to_string(),
        TokenKind::Ident(word) => format!("<{word}>"),
        TokenKind::Variable { name, .. } => format!("<${name}>"),
        TokenKind::Dot(_) => "<.>".to_string(),
        TokenKind::String(s) => format!("{s:?}"),
        TokenKind::Number(n) => format!("<{n}>"),
        TokenKind::LeftParen => "\"(\"".to_string(),
        TokenKind::RightParen => "\")\"".to_string(),
        TokenKind::Pipe => "\"|\"".to_string(),
        TokenKind::Declare => "\":=\"".to_string(),
        TokenKind::Comma => "\",\"".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_std(source: &str) -> Result<Vec<Node>, CompileError> {
        parse("t", source, &FunctionTable::standard())
    }

    fn call_of(node: &Node) -> &Call {
        match node {
            Node::Output(Expr::Call(call)) => call,
            other => panic!("expected call output, got {other:?}"),
        }
    }

    #[test]
    fn test_text_and_call() {
        let nodes = parse_std(r#"WHERE {expr "name" "=" "params.name"}"#).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0], Node::Text(t) if t == "WHERE "));
        let call = call_of(&nodes[1]);
        assert_eq!(call.name, "expr");
        assert_eq!(call.args.len(), 3);
    }

    #[test]
    fn test_nested_calls() {
        let nodes = parse_std(r#"{and (expr "a" "=" "p.a") (or (expr "b" "=" "p.b"))}"#).unwrap();
        let call = call_of(&nodes[0]);
        assert_eq!(call.name, "and");
        assert!(matches!(&call.args[1], Expr::Call(inner) if inner.name == "or"));
    }

    #[test]
    fn test_pipe_appends_last_argument() {
        let nodes = parse_std(r#"{getValue "params.name" | isEmpty}"#).unwrap();
        let call = call_of(&nodes[0]);
        assert_eq!(call.name, "isEmpty");
        assert!(matches!(&call.args[0], Expr::Call(inner) if inner.name == "getValue"));
    }

    #[test]
    fn test_pipe_counts_toward_arity() {
        let err = parse_std(r#"{"a" | isEmpty "b"}"#).unwrap_err();
        assert!(matches!(err, CompileError::Arity { got: 2, .. }));
    }

    #[test]
    fn test_if_else_if_else() {
        let nodes = parse_std("{if .a}A{else if .b}B{else}C{end}").unwrap();
        match &nodes[0] {
            Node::If {
                branches,
                otherwise,
            } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(otherwise.len(), 1);
            },
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_range_declarations() {
        let nodes = parse_std("{range $i, $v := .items}{$i}{$v}{else}none{end}").unwrap();
        match &nodes[0] {
            Node::Range {
                key,
                value,
                body,
                otherwise,
                ..
            } => {
                assert_eq!(key.as_deref(), Some("i"));
                assert_eq!(value.as_deref(), Some("v"));
                assert_eq!(body.len(), 2);
                assert_eq!(otherwise.len(), 1);
            },
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn test_range_single_variable_is_element() {
        let nodes = parse_std("{range $v := .items}{$v}{end}").unwrap();
        assert!(matches!(
            &nodes[0],
            Node::Range { key: None, value: Some(v), .. } if v == "v"
        ));
    }

    #[test]
    fn test_variable_out_of_scope() {
        let err = parse_std("{range $v := .items}{end}{$v}").unwrap_err();
        assert_eq!(
            err,
            CompileError::UndefinedVariable {
                name: "t".into(),
                variable: "v".into(),
            }
        );
    }

    #[test]
    fn test_unknown_function_suggests() {
        let err = parse_std(r#"{exrp "a" "=" "p.a"}"#).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownFunction {
                name: "t".into(),
                function: "exrp".into(),
                suggestion: Some("expr".into()),
            }
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let err = parse_std(r#"{isEmpty "a" "b"}"#).unwrap_err();
        assert_eq!(
            err,
            CompileError::Arity {
                name: "t".into(),
                function: "isEmpty".into(),
                expected: "1".into(),
                got: 2,
            }
        );
        assert!(parse_std(r#"{strLenCheck 1 2 "f" "c"}"#).is_err());
    }

    #[test]
    fn test_literal_regex_is_precompiled() {
        let nodes = parse_std(r#"{regexCheck "^[a-z]+$" "f" "c" "m" "p.x"}"#).unwrap();
        assert!(call_of(&nodes[0]).pattern.is_some());

        let nodes = parse_std(r#"{regexCheck (getValue "p.re") "f" "c" "m" "p.x"}"#).unwrap();
        assert!(call_of(&nodes[0]).pattern.is_none());
    }

    #[test]
    fn test_invalid_literal_regex() {
        let err = parse_std(r#"{regexCheck "([" "f" "c" "m" "p.x"}"#).unwrap_err();
        assert!(matches!(err, CompileError::InvalidRegex { pattern, .. } if pattern == "(["));
    }

    #[test]
    fn test_unbalanced_blocks() {
        assert!(matches!(
            parse_std("{if .a}x"),
            Err(CompileError::UnbalancedBlock { .. })
        ));
        assert!(matches!(
            parse_std("x{end}"),
            Err(CompileError::UnbalancedBlock { .. })
        ));
        assert!(matches!(
            parse_std("{if .a}x{else}y{else}z{end}"),
            Err(CompileError::UnbalancedBlock { .. })
        ));
        assert!(matches!(
            parse_std("{range .a}x"),
            Err(CompileError::UnbalancedBlock { .. })
        ));
    }

    #[test]
    fn test_argument_to_non_function() {
        let err = parse_std(r#"{"a" "b"}"#).unwrap_err();
        assert!(err.to_string().contains("can't give argument to non-function"));
    }

    #[test]
    fn test_non_function_in_pipeline() {
        let err = parse_std(r#"{"a" | "b"}"#).unwrap_err();
        assert!(err.to_string().contains("non-function in pipeline"));
    }

    #[test]
    fn test_empty_action() {
        let err = parse_std("{}").unwrap_err();
        assert!(err.to_string().contains("missing value for command"));
    }

    #[test]
    fn test_unclosed_paren() {
        let err = parse_std(r#"{and (expr "a" "=" "p.a"}"#).unwrap_err();
        assert!(err.to_string().contains("unclosed left paren"));
    }

    #[test]
    fn test_custom_table_rejects_removed_builtin() {
        let table = FunctionTable::standard().remove("val");
        let err = parse("t", r#"{val "p.a"}"#, &table).unwrap_err();
        assert!(matches!(err, CompileError::UnknownFunction { .. }));
    }
}
