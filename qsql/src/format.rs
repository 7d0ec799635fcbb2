//! Whitespace normalization of rendered SQL.

/// Collapse rendered template text into a single compact line.
///
/// Lines are trimmed, blank lines dropped, the rest joined with one space,
/// and runs of spaces collapsed. Idempotent.
///
/// # Examples
///
/// ```
/// use qsql::clean_sql;
///
/// let sql = clean_sql("SELECT *\n   FROM users\n\n  WHERE  id = ?  \n");
/// assert_eq!(sql, "SELECT * FROM users WHERE id = ?");
/// assert_eq!(clean_sql(&sql), sql);
/// ```
#[must_use]
pub fn clean_sql(sql: &str) -> String {
    let joined = sql
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(joined.len());
    let mut previous_space = false;
    for c in joined.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(c);
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }

    out.trim().to_string()
}
