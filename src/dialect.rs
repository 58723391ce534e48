//! Provider-specific SQL dialect: identifier escaping, native placeholder
//! syntax and dispatch to the matching sea-query builder.

use sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, SelectStatement, SqliteQueryBuilder, Values};
use std::fmt;
use std::str::FromStr;

/// Database backend a statement is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbBackend {
    /// PostgreSQL: `"ident"`, `$1` placeholders
    #[default]
    Postgres,
    /// MySQL / MariaDB: `` `ident` ``, `?` placeholders
    MySql,
    /// SQLite: `"ident"`, `?` placeholders
    Sqlite,
}

impl DbBackend {
    /// Quote a single column or table identifier for this backend.
    ///
    /// Embedded quote characters are doubled, so the result is always a single
    /// identifier token.
    ///
    /// ```
    /// use tidepool::DbBackend;
    ///
    /// assert_eq!(DbBackend::Postgres.escape_identifier("Age"), "\"Age\"");
    /// assert_eq!(DbBackend::MySql.escape_identifier("Age"), "`Age`");
    /// ```
    pub fn escape_identifier(self, identifier: &str) -> String {
        let quote = self.quote_char();
        let mut escaped = String::with_capacity(identifier.len() + 2);
        escaped.push(quote);
        for c in identifier.chars() {
            if c == quote {
                escaped.push(quote);
            }
            escaped.push(c);
        }
        escaped.push(quote);
        escaped
    }

    /// Quote a possibly schema-qualified table name (`schema.table`), one part
    /// at a time.
    pub fn escape_table_name(self, table: &str) -> String {
        table
            .split('.')
            .map(|part| self.escape_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Native placeholder for the `n`th bound parameter (zero based).
    pub fn placeholder(self, n: usize) -> String {
        match self {
            DbBackend::Postgres => format!("${}", n + 1),
            DbBackend::MySql | DbBackend::Sqlite => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            DbBackend::Postgres | DbBackend::Sqlite => '"',
            DbBackend::MySql => '`',
        }
    }

    /// Render a sea-query select with this backend's builder.
    pub(crate) fn build_select(self, select: &SelectStatement) -> (String, Values) {
        match self {
            DbBackend::Postgres => select.build(PostgresQueryBuilder),
            DbBackend::MySql => select.build(MysqlQueryBuilder),
            DbBackend::Sqlite => select.build(SqliteQueryBuilder),
        }
    }
}

impl fmt::Display for DbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DbBackend::Postgres => "postgres",
            DbBackend::MySql => "mysql",
            DbBackend::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

impl FromStr for DbBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DbBackend::Postgres),
            "mysql" | "mariadb" => Ok(DbBackend::MySql),
            "sqlite" | "sqlite3" => Ok(DbBackend::Sqlite),
            other => Err(format!("unknown database backend: {other}")),
        }
    }
}
