pub mod error;
pub mod filter;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::{parse_date, Filter};
pub use types::{ColumnScope, FilterField, FilterValue, Predicate, SqlResult};
