pub mod pool;
pub mod queries;
pub mod query;

pub use pool::create_pool;
pub use query::{FilterOp, FilterValue, PgRowSource, RowSource, TableQuery};
