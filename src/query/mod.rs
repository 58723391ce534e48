//! Query building and cardinality-checked retrieval.
//!
//! - **Predicate**: what the caller selects by (key, fragment, template)
//! - **Builder**: predicate plus record descriptor into a [`Statement`]
//! - **Materialize**: raw rows into records
//! - **Execution**: the `single`/`first` rules and the exists probe

pub mod builder;
pub mod execution;
pub mod materialize;
pub mod predicate;

pub use builder::{build_exists, build_select, Statement};
pub use execution::Cardinality;
pub use materialize::{materialize, ColumnMap, MappedRow};
pub use predicate::Predicate;
