use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sql;

/// Query text with `$n` placeholders and the values bound to them, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlResult {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self { query: query.into(), params }
    }

    /// Render the query with every placeholder replaced by an escaped literal.
    ///
    /// Used for audit logs and previews only; statements sent to the storage
    /// engine always keep their bound parameters.
    pub fn inline(&self) -> String {
        let mut out = String::with_capacity(self.query.len());
        let mut chars = self.query.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(|d| d.is_ascii_digit()) {
                digits.push(d);
                chars.next();
            }

            let param = digits
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.params.get(i));

            match param {
                Some(value) => out.push_str(&sql::literal(value)),
                None => {
                    out.push('$');
                    out.push_str(&digits);
                }
            }
        }

        out
    }
}

/// Outcome of compiling a grant set or a cohort specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// No filtering needed.
    Empty,
    /// A concrete filter.
    Expression(SqlResult),
    /// No rows may be returned.
    Deny,
}

impl Predicate {
    pub fn is_deny(&self) -> bool {
        matches!(self, Predicate::Deny)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::Empty)
    }

    pub fn expression(&self) -> Option<&SqlResult> {
        match self {
            Predicate::Expression(sql) => Some(sql),
            _ => None,
        }
    }

    pub fn into_expression(self) -> Option<SqlResult> {
        match self {
            Predicate::Expression(sql) => Some(sql),
            _ => None,
        }
    }

    /// Inline rendering of the expression, if there is one.
    pub fn inline(&self) -> Option<String> {
        self.expression().map(SqlResult::inline)
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Predicate::Empty => "empty",
            Predicate::Expression(_) => "expression",
            Predicate::Deny => "deny",
        }
    }
}
