use std::fmt;

use crate::{
    planner::types::Statement,
    storage::table::Table,
    types::{error::DatabaseError, row::Row},
};

pub mod insert;
pub mod scan;

/// Outcome of a statement the REPL can print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    DuplicateKey,
    Rows(Vec<Row>),
}

impl fmt::Display for ExecuteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteResult::Inserted => write!(f, "Executed."),
            ExecuteResult::DuplicateKey => write!(f, "Error: Duplicate key."),
            ExecuteResult::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{}", row)?;
                }
                write!(f, "Executed.")
            }
        }
    }
}

pub fn execute_statement(
    table: &mut Table,
    statement: &Statement,
) -> Result<ExecuteResult, DatabaseError> {
    match statement {
        Statement::Insert(row) => insert::execute_insert(table, row),
        Statement::Select { id } => scan::execute_select(table, *id),
    }
}
