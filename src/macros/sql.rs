/// Build an [`Sql`](crate::Sql) template from text and positional arguments.
///
/// Each argument is converted with `sea_query::Value::from`, so anything sea-query
/// can bind (integers, strings, `uuid::Uuid`, `chrono` types, `Option<T>`) works.
///
/// ```
/// use tidepool::sql;
///
/// let template = sql!("WHERE \"Age\" = @0 AND \"Name\" = @1", 18, "Peta");
/// assert_eq!(template.args().len(), 2);
/// ```
#[macro_export]
macro_rules! sql {
    ($text:expr $(,)?) => {
        $crate::Sql::raw($text)
    };
    ($text:expr, $($arg:expr),+ $(,)?) => {
        $crate::Sql::new($text, ::std::vec![$($crate::sea_query::Value::from($arg)),+])
    };
}
