use tracing::debug;

use crate::{
    executor::ExecuteResult,
    storage::table::Table,
    types::{error::DatabaseError, row::Row},
};

/// Insert `row`, reporting a duplicate id as a result rather than an error.
///
/// Any other failure leaves the table in a state the caller should not
/// keep writing to, so it is returned as an error.
pub fn execute_insert(table: &mut Table, row: &Row) -> Result<ExecuteResult, DatabaseError> {
    match table.insert(row) {
        Ok(()) => Ok(ExecuteResult::Inserted),
        Err(DatabaseError::DuplicateKey { key }) => {
            debug!(key, "rejected duplicate key");
            Ok(ExecuteResult::DuplicateKey)
        }
        Err(e) => Err(e),
    }
}
