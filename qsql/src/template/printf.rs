//! `printf` for building path strings inside templates.
//!
//! Supports `%s`, `%v`, `%d`, `%f` (with optional `.N` precision), `%q` and
//! `%%`. Bad verbs and missing arguments render inline as `%!d(MISSING)`
//! style markers rather than failing.

use crate::value::Value;
use std::fmt::Write;

/// Format `args[0]` with the remaining arguments.
pub fn sprintf(args: &[Value]) -> String {
    let Some((format, rest)) = args.split_first() else {
        return String::new();
    };
    let format = format.to_string();
    let mut values = rest.iter();
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut precision = None;
        if chars.next_if_eq(&'.').is_some() {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            precision = Some(digits.parse::<usize>().unwrap_or(0));
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(value) = values.next() else {
            let _ = write!(out, "%!{verb}(MISSING)");
            continue;
        };

        let _ = match verb {
            's' | 'v' => write!(out, "{value}"),
            'd' => match value.as_integer() {
                Some(i) => write!(out, "{i}"),
                None => bad_verb(&mut out, verb, value),
            },
            'f' => match value.as_f64() {
                Some(n) => write!(out, "{:.*}", precision.unwrap_or(6), n),
                None => bad_verb(&mut out, verb, value),
            },
            'q' => write!(out, "{:?}", value.to_string()),
            _ => bad_verb(&mut out, verb, value),
        };
    }

    out
}

fn bad_verb(out: &mut String, verb: char, value: &Value) -> std::fmt::Result {
    write!(out, "%!{verb}({}={value})", value.type_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[Value]) -> String {
        sprintf(args)
    }

    #[test]
    fn test_path_building() {
        let out = run(&[Value::from("params.items.%d.id"), Value::Number(2.0)]);
        assert_eq!(out, "params.items.2.id");
    }

    #[test]
    fn test_verbs() {
        assert_eq!(run(&[Value::from("%s-%v"), Value::from("a"), Value::Number(1.5)]), "a-1.5");
        assert_eq!(run(&[Value::from("%f"), Value::Number(1.5)]), "1.500000");
        assert_eq!(run(&[Value::from("%.2f"), Value::Number(1.0)]), "1.00");
        assert_eq!(run(&[Value::from("%q"), Value::from("a\"b")]), r#""a\"b""#);
        assert_eq!(run(&[Value::from("100%%")]), "100%");
    }

    #[test]
    fn test_bad_verbs_and_missing_args() {
        assert_eq!(run(&[Value::from("%d"), Value::Number(1.5)]), "%!d(number=1.5)");
        assert_eq!(run(&[Value::from("%d")]), "%!d(MISSING)");
        assert_eq!(run(&[Value::from("%x"), Value::from("a")]), "%!x(string=a)");
        assert_eq!(run(&[Value::from("%")]), "%!(NOVERB)");
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(run(&[]), "");
    }
}
