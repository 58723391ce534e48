//! The selector every lookup accepts: a primary key, a bare SQL fragment or a
//! full template.

use crate::sql::Sql;
use sea_query::Value;

/// Caller-supplied selector for a query
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Primary key value(s), one per key column in declaration order
    Key(Vec<Value>),
    /// Bare predicate text with positional `@N` arguments. May omit the
    /// leading `WHERE`.
    Fragment {
        text: String,
        args: Vec<Value>,
    },
    /// Structured template, normalised the same way as a fragment
    Template(Sql),
}

impl Predicate {
    /// Single-column primary key lookup.
    pub fn key(value: impl Into<Value>) -> Self {
        Predicate::Key(vec![value.into()])
    }

    /// Composite primary key lookup; values follow the key's column order.
    pub fn composite_key<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Predicate::Key(values.into_iter().collect())
    }

    /// Fragment with positional arguments.
    pub fn fragment<I>(text: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Predicate::Fragment {
            text: text.into(),
            args: args.into_iter().collect(),
        }
    }
}

impl From<Sql> for Predicate {
    fn from(sql: Sql) -> Self {
        Predicate::Template(sql)
    }
}

impl From<&str> for Predicate {
    fn from(text: &str) -> Self {
        Predicate::fragment(text, Vec::new())
    }
}

impl From<String> for Predicate {
    fn from(text: String) -> Self {
        Predicate::fragment(text, Vec::new())
    }
}

impl<S, I> From<(S, I)> for Predicate
where
    S: Into<String>,
    I: IntoIterator<Item = Value>,
{
    fn from((text, args): (S, I)) -> Self {
        Predicate::fragment(text, args)
    }
}
