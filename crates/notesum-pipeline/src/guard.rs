//! Read-only check applied to synthesized SQL before it reaches the store.

use thiserror::Error;

use notesum_core::models::sql::SqlStatement;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardViolation {
    #[error("statement is empty")]
    Empty,

    #[error("expected a single statement")]
    MultipleStatements,

    #[error("statement must start with SELECT or WITH, got `{0}`")]
    NotAQuery(String),
}

/// Accept exactly one statement that starts with `SELECT` or `WITH`. A
/// `WITH` statement must end in a `SELECT` once its common table
/// expressions are skipped. Trailing semicolons are dropped from the
/// returned statement.
pub fn ensure_read_only(sql: &SqlStatement) -> Result<SqlStatement, GuardViolation> {
    let body = sql.as_str().trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if body.is_empty() {
        return Err(GuardViolation::Empty);
    }
    if has_unquoted_semicolon(body) {
        return Err(GuardViolation::MultipleStatements);
    }

    let keyword: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    match keyword.as_str() {
        "SELECT" => {}
        "WITH" => {
            let verb = statement_verb(body).unwrap_or_else(|| "WITH".to_string());
            if verb != "SELECT" {
                return Err(GuardViolation::NotAQuery(verb));
            }
        }
        _ => {
            let shown = if keyword.is_empty() {
                body.chars().take(16).collect()
            } else {
                keyword
            };
            return Err(GuardViolation::NotAQuery(shown));
        }
    }

    Ok(SqlStatement::new(body))
}

const VERBS: [&str; 6] = ["SELECT", "INSERT", "UPDATE", "DELETE", "REPLACE", "VALUES"];

/// The first statement verb outside parentheses. CTE bodies sit inside
/// parentheses, so for a `WITH` statement this is the main statement.
fn statement_verb(sql: &str) -> Option<String> {
    let mut word = String::new();
    let mut verb = None;
    scan(sql, |depth, c| {
        if depth == 0 && (c.is_ascii_alphanumeric() || c == '_') {
            word.push(c.to_ascii_uppercase());
            return true;
        }
        if VERBS.contains(&word.as_str()) {
            verb = Some(std::mem::take(&mut word));
            return false;
        }
        word.clear();
        true
    });
    if verb.is_none() && VERBS.contains(&word.as_str()) {
        verb = Some(word);
    }
    verb
}

/// Whether `sql` contains a `;` outside string literals, quoted identifiers
/// and comments.
fn has_unquoted_semicolon(sql: &str) -> bool {
    let mut found = false;
    scan(sql, |_, c| {
        found = c == ';';
        !found
    });
    found
}

/// Feed `f` every character of `sql` outside string literals, quoted
/// identifiers and comments, with the parenthesis depth it sits at. A
/// skipped span is reported as a single space. Stops when `f` returns false.
fn scan(sql: &str, mut f: impl FnMut(usize, char) -> bool) {
    let mut depth = 0usize;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        let visible = match c {
            '\'' | '"' | '`' => {
                // Doubled quotes inside a literal re-enter the same arm.
                for inner in chars.by_ref() {
                    if inner == c {
                        break;
                    }
                }
                ' '
            }
            '[' => {
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                }
                ' '
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
                ' '
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                ' '
            }
            other => other,
        };

        if visible == ')' {
            depth = depth.saturating_sub(1);
        }
        if !f(depth, visible) {
            return;
        }
        if visible == '(' {
            depth += 1;
        }
    }
}
