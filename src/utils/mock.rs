use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{
    storage::table::{Table, TableConfig},
    types::error::DatabaseError,
};

/// A database file in its own temporary directory, removed on drop.
pub struct TempDatabase {
    // Dropped before `dir`, so the file is closed before its directory goes.
    // A table dropped without `close` loses its unflushed pages.
    pub table: Option<Table>,
    pub config: TableConfig,
    path: PathBuf,
    dir: TempDir,
}

impl TempDatabase {
    pub fn new() -> Result<Self, DatabaseError> {
        Self::with_prefix("treedb_test")
    }

    pub fn with_prefix(prefix: &str) -> Result<Self, DatabaseError> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        let path = dir.path().join(format!("{}.db", prefix));
        Ok(Self {
            table: None,
            config: TableConfig::default(),
            path,
            dir,
        })
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Open (or reopen) the table, closing any table already open.
    pub fn open(&mut self) -> Result<&mut Table, DatabaseError> {
        self.close()?;
        let table = Table::open_with_config(&self.path, self.config)?;
        Ok(self.table.insert(table))
    }

    /// Flush and close the open table, if any.
    pub fn close(&mut self) -> Result<(), DatabaseError> {
        match self.table.take() {
            Some(table) => table.close(),
            None => Ok(()),
        }
    }

    pub fn table(&mut self) -> Option<&mut Table> {
        self.table.as_mut()
    }
}
