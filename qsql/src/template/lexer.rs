//! Tokenizer for template text.
//!
//! Text outside `{ }` becomes [`TokenKind::Text`]; inside an action the usual
//! literals, identifiers, variables and punctuation are produced. `{- ` and
//! ` -}` trim whitespace on the outer side of the action, and `{/* ... */}`
//! is a comment.

use crate::constants::{LEFT_DELIM, RIGHT_DELIM};
use crate::error::CompileError;

const TRIM_MARKER: char = '-';
const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

/// A lexical item.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Verbatim text between actions.
    Text(String),
    /// Start of an action.
    LeftDelim,
    /// End of an action.
    RightDelim,
    /// Function name or keyword.
    Ident(String),
    /// `$name.field...`; the bare `$` has an empty name.
    Variable { name: String, fields: Vec<String> },
    /// `.` or `.field.field...`.
    Dot(Vec<String>),
    /// Quoted or raw string, unescaped.
    String(String),
    /// Numeric literal.
    Number(f64),
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `|`
    Pipe,
    /// `:=`
    Declare,
    /// `,`
    Comma,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// 1-based line and column (in characters) of a byte offset.
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    (line, column)
}

/// Tokenize a whole template.
pub fn tokenize(name: &str, source: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer {
        name,
        source,
        pos: 0,
        tokens: Vec::new(),
        trim_next_text: false,
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    name: &'a str,
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    trim_next_text: bool,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> CompileError {
        let (line, column) = position(self.source, offset);
        CompileError::Syntax {
            name: self.name.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    fn push(&mut self, kind: TokenKind, offset: usize) {
        self.tokens.push(Token { kind, offset });
    }

    fn run(&mut self) -> Result<(), CompileError> {
        while self.pos < self.source.len() {
            self.lex_text();
            if self.pos < self.source.len() {
                self.lex_action()?;
            }
        }
        Ok(())
    }

    /// Consume text up to the next left delimiter.
    fn lex_text(&mut self) {
        let start = self.pos;
        let rest = self.rest();
        let end = rest.find(LEFT_DELIM).unwrap_or(rest.len());
        let mut text = rest.get(..end).unwrap_or_default();
        self.pos += end;

        if std::mem::take(&mut self.trim_next_text) {
            text = text.trim_start();
        }
        if self.has_left_trim() {
            text = text.trim_end();
        }
        if !text.is_empty() {
            self.push(TokenKind::Text(text.to_string()), start);
        }
    }

    /// At a left delimiter: is it `{- ` ?
    fn has_left_trim(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some(LEFT_DELIM)
            && chars.next() == Some(TRIM_MARKER)
            && chars.next().is_some_and(char::is_whitespace)
    }

    /// At whitespace: does ` -}` follow?
    fn at_right_trim(&self) -> bool {
        self.rest()
            .trim_start()
            .strip_prefix(TRIM_MARKER)
            .is_some_and(|after| after.starts_with(RIGHT_DELIM))
    }

    fn lex_action(&mut self) -> Result<(), CompileError> {
        let open = self.pos;
        let trim_left = self.has_left_trim();
        self.bump();
        if trim_left {
            self.bump();
        }

        let body = if trim_left {
            self.rest().trim_start()
        } else {
            self.rest()
        };
        if body.starts_with(COMMENT_OPEN) {
            return self.lex_comment(open);
        }

        self.push(TokenKind::LeftDelim, open);
        loop {
            let offset = self.pos;
            let Some(c) = self.peek() else {
                return Err(self.error(open, "unclosed action"));
            };

            match c {
                c if c.is_whitespace() => {
                    if self.at_right_trim() {
                        self.pos += self.rest().len() - self.rest().trim_start().len();
                        self.bump();
                        self.bump();
                        self.push(TokenKind::RightDelim, offset);
                        self.trim_next_text = true;
                        return Ok(());
                    }
                    self.bump();
                },
                RIGHT_DELIM => {
                    self.bump();
                    self.push(TokenKind::RightDelim, offset);
                    return Ok(());
                },
                '"' => {
                    let s = self.lex_quoted()?;
                    self.push(TokenKind::String(s), offset);
                },
                '`' => {
                    let s = self.lex_raw()?;
                    self.push(TokenKind::String(s), offset);
                },
                '$' => {
                    self.bump();
                    let name = self.lex_word();
                    let fields = self.lex_fields();
                    self.push(TokenKind::Variable { name, fields }, offset);
                },
                '.' => {
                    let fields = self.lex_fields();
                    if fields.is_empty() {
                        self.bump();
                    }
                    self.push(TokenKind::Dot(fields), offset);
                },
                '0'..='9' => self.lex_number(offset)?,
                '-' | '+' if self.peek_second().is_some_and(|d| d.is_ascii_digit()) => {
                    self.lex_number(offset)?;
                },
                c if is_word_start(c) => {
                    let word = self.lex_word();
                    self.push(TokenKind::Ident(word), offset);
                },
                '(' => {
                    self.bump();
                    self.push(TokenKind::LeftParen, offset);
                },
                ')' => {
                    self.bump();
                    self.push(TokenKind::RightParen, offset);
                },
                '|' => {
                    self.bump();
                    self.push(TokenKind::Pipe, offset);
                },
                ',' => {
                    self.bump();
                    self.push(TokenKind::Comma, offset);
                },
                ':' if self.peek_second() == Some('=') => {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Declare, offset);
                },
                other => {
                    return Err(self.error(
                        offset,
                        format!("unrecognized character in action: {other:?}"),
                    ));
                },
            }
        }
    }

    /// `{/* ... */}`, with optional trim markers on either side.
    fn lex_comment(&mut self, open: usize) -> Result<(), CompileError> {
        let body = self.rest().trim_start();
        self.pos = self.source.len() - body.len();
        let Some(end) = body.find(COMMENT_CLOSE) else {
            return Err(self.error(open, "unclosed comment"));
        };
        self.pos += end + COMMENT_CLOSE.len();

        if self.rest().starts_with(RIGHT_DELIM) {
            self.bump();
            return Ok(());
        }
        if self.at_right_trim() {
            self.pos += self.rest().len() - self.rest().trim_start().len();
            self.bump();
            self.bump();
            self.trim_next_text = true;
            return Ok(());
        }
        Err(self.error(open, "comment ends before closing delimiter"))
    }

    fn lex_quoted(&mut self) -> Result<String, CompileError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(start, "unterminated quoted string")),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some(other) => {
                            return Err(self.error(
                                start,
                                format!("unknown escape sequence: \\{other}"),
                            ));
                        },
                        None => return Err(self.error(start, "unterminated quoted string")),
                    };
                    out.push(escaped);
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn lex_raw(&mut self) -> Result<String, CompileError> {
        let start = self.pos;
        self.bump();
        let rest = self.rest();
        let Some(end) = rest.find('`') else {
            return Err(self.error(start, "unterminated raw quoted string"));
        };
        let raw = rest.get(..end).unwrap_or_default().to_string();
        self.pos += end + 1;
        Ok(raw)
    }

    fn lex_number(&mut self, offset: usize) -> Result<(), CompileError> {
        let rest = self.rest();
        let mut end = 0;
        let mut prev = '\0';
        for (i, c) in rest.char_indices() {
            let sign_ok = i == 0 || matches!(prev, 'e' | 'E');
            let accepted = c.is_ascii_digit()
                || c == '.'
                || matches!(c, 'e' | 'E')
                || (matches!(c, '-' | '+') && sign_ok);
            if !accepted {
                break;
            }
            end = i + c.len_utf8();
            prev = c;
        }

        let literal = rest.get(..end).unwrap_or_default();
        let number: f64 = literal
            .parse()
            .map_err(|_| self.error(offset, format!("bad number syntax: {literal:?}")))?;
        self.pos += end;
        self.push(TokenKind::Number(number), offset);
        Ok(())
    }

    fn lex_word(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        rest.get(..end).unwrap_or_default().to_string()
    }

    /// A chain of `.field` accessors; empty if the dot is not followed by a word.
    fn lex_fields(&mut self) -> Vec<String> {
        let mut fields = Vec::new();
        while self.peek() == Some('.') && self.peek_second().is_some_and(is_word_start) {
            self.bump();
            fields.push(self.lex_word());
        }
        fields
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
