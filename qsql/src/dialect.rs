//! Placeholder styles for the generated SQL.
//!
//! The default style is the bare `?` accepted by `MySQL` and `SQLite` drivers.
//! Postgres drivers expect numbered `$1, $2, ...` markers; those are numbered
//! by argument position, so the placeholder-to-argument correspondence is the
//! same for both styles.

use serde::{Deserialize, Serialize};

/// Placeholder style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholder {
    /// Positional `?`.
    #[default]
    Question,
    /// Numbered `$1`, `$2`, ... (Postgres).
    Dollar,
}

impl Placeholder {
    /// Format the placeholder for the argument at 1-based `position`.
    #[inline]
    #[must_use]
    pub fn param(self, position: usize) -> String {
        match self {
            Self::Question => "?".to_string(),
            Self::Dollar => format!("${position}"),
        }
    }

    /// Count placeholders in rendered SQL.
    ///
    /// Quoted literals (`'...'`), quoted identifiers (`"..."`), line comments
    /// (`-- ...`) and block comments (`/* ... */`) are skipped.
    #[must_use]
    pub fn count(self, sql: &str) -> usize {
        let mut count = 0;
        let mut chars = sql.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\'' | '"' => {
                    // A doubled quote inside reopens, which nets out the same.
                    for inner in chars.by_ref() {
                        if inner == c {
                            break;
                        }
                    }
                },
                '-' if chars.next_if_eq(&'-').is_some() => {
                    for inner in chars.by_ref() {
                        if inner == '\n' {
                            break;
                        }
                    }
                },
                '/' if chars.next_if_eq(&'*').is_some() => {
                    let mut star = false;
                    for inner in chars.by_ref() {
                        if star && inner == '/' {
                            break;
                        }
                        star = inner == '*';
                    }
                },
                '?' if self == Self::Question => count += 1,
                '$' if self == Self::Dollar => {
                    if chars.peek().is_some_and(char::is_ascii_digit) {
                        count += 1;
                        while chars.next_if(char::is_ascii_digit).is_some() {}
                    }
                },
                _ => {},
            }
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_param() {
        assert_eq!(Placeholder::Question.param(1), "?");
        assert_eq!(Placeholder::Question.param(7), "?");
    }

    #[test]
    fn test_dollar_param() {
        assert_eq!(Placeholder::Dollar.param(1), "$1");
        assert_eq!(Placeholder::Dollar.param(12), "$12");
    }

    #[test]
    fn test_count_skips_literals() {
        assert_eq!(Placeholder::Question.count("a = ? AND b = '?' AND c IN (?, ?)"), 3);
        assert_eq!(Placeholder::Dollar.count("a = $1 AND b = '$2' AND c = $10"), 2);
        assert_eq!(Placeholder::Dollar.count("price > $ AND x = ?"), 0);
    }

    #[test]
    fn test_count_skips_identifiers_and_comments() {
        let sql = r#"SELECT "a?b" FROM t -- why?
WHERE x = ? /* ? or $1 */ AND y = 'it''s ?' AND z = ?"#;
        assert_eq!(Placeholder::Question.count(sql), 2);
        assert_eq!(Placeholder::Dollar.count(r#"SELECT "$1" FROM t WHERE a = $1 -- $2"#), 1);
        assert_eq!(Placeholder::Question.count("a = 5 - ? AND b = ?"), 2);
        assert_eq!(Placeholder::Question.count("a = 10 / ?"), 1);
    }

    #[test]
    fn test_deserialize_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            placeholder: Placeholder,
        }
        let w: Wrapper = serde_json::from_str(r#"{"placeholder":"dollar"}"#).unwrap();
        assert_eq!(w.placeholder, Placeholder::Dollar);
    }
}
