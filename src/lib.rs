pub mod executor;
pub mod planner;
pub mod storage;
pub mod types;
pub mod utils;

pub use storage::table::{Table, TableConfig};
pub use types::{error::DatabaseError, row::Row};
