//! SQL templates: raw text with positional `@N` markers plus the argument
//! values they refer to.
//!
//! Templates are plain values. Composition never mutates a shared instance; it
//! consumes `self` and returns the combined template, renumbering the markers of
//! the appended part so the result is still one flat argument list.
//!
//! ```
//! use tidepool::{sql, Sql};
//!
//! let query = Sql::empty()
//!     .where_clause(sql!("\"Age\" = @0", 18))
//!     .where_clause(sql!("\"Name\" = @0", "Peta"))
//!     .order_by(&["\"Name\""]);
//!
//! assert_eq!(
//!     query.text(),
//!     "WHERE (\"Age\" = @0) AND (\"Name\" = @1) ORDER BY \"Name\""
//! );
//! assert_eq!(query.args().len(), 2);
//! ```

use crate::params;
use sea_query::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenClause {
    Where,
    OrderBy,
}

/// Immutable parameterized SQL fragment
#[derive(Debug, Clone, Default)]
pub struct Sql {
    text: String,
    args: Vec<Value>,
    open: Option<OpenClause>,
}

impl Sql {
    /// Template from text and its positional arguments.
    pub fn new<I>(text: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            text: text.into(),
            args: args.into_iter().collect(),
            open: None,
        }
    }

    /// Template with no arguments.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// Empty template, the usual starting point for composition.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.args)
    }

    /// `true` when the template carries no SQL text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Concatenate `other` after this template.
    pub fn append(self, other: Sql) -> Self {
        self.push(other.text.trim(), other.args, None)
    }

    /// Add a `WHERE` condition. A second call directly after a first joins the
    /// conditions with `AND`; each condition is parenthesised.
    pub fn where_clause(self, condition: Sql) -> Self {
        let keyword = if self.open == Some(OpenClause::Where) {
            "AND"
        } else {
            "WHERE"
        };
        let text = format!("{keyword} ({})", condition.text.trim());
        self.push(&text, condition.args, Some(OpenClause::Where))
    }

    /// Add `ORDER BY` columns; consecutive calls extend the same list.
    pub fn order_by(self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            return self;
        }
        let list = columns.join(", ");
        let text = if self.open == Some(OpenClause::OrderBy) {
            format!(", {list}")
        } else {
            format!("ORDER BY {list}")
        };
        self.push(&text, Vec::new(), Some(OpenClause::OrderBy))
    }

    fn push(mut self, text: &str, args: Vec<Value>, open: Option<OpenClause>) -> Self {
        let text = params::renumber(text, self.args.len());
        if !text.is_empty() {
            if !self.text.is_empty() && !text.starts_with(',') {
                self.text.push(' ');
            }
            self.text.push_str(&text);
        }
        self.args.extend(args);
        self.open = open;
        self
    }
}

impl PartialEq for Sql {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.args == other.args
    }
}

impl From<&str> for Sql {
    fn from(text: &str) -> Self {
        Sql::raw(text)
    }
}

impl From<String> for Sql {
    fn from(text: String) -> Self {
        Sql::raw(text)
    }
}
