use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    executor::scan::ScanIterator,
    storage::{
        cursor::Cursor,
        internal_node::INTERNAL_NODE_MAX_CELLS,
        layout::Constants,
        leaf_node::{LEAF_NODE_MAX_CELLS, LeafNode},
        pager::Pager,
    },
    types::{PageNum, TABLE_MAX_PAGES, error::DatabaseError, row::Row},
};

/// Capacity limits a table runs with.
///
/// The defaults are what a 4096-byte page physically holds. Smaller cell
/// limits produce deeper trees from fewer rows, which is handy for
/// exercising splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub max_pages: usize,
    pub leaf_max_cells: u32,
    pub internal_max_cells: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_pages: TABLE_MAX_PAGES,
            leaf_max_cells: LEAF_NODE_MAX_CELLS,
            internal_max_cells: INTERNAL_NODE_MAX_CELLS,
        }
    }
}

impl TableConfig {
    pub fn with_leaf_max_cells(mut self, leaf_max_cells: u32) -> Self {
        self.leaf_max_cells = leaf_max_cells;
        self
    }

    pub fn with_internal_max_cells(mut self, internal_max_cells: u32) -> Self {
        self.internal_max_cells = internal_max_cells;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.max_pages == 0 {
            return Err(DatabaseError::InvalidConfig {
                reason: "max_pages must be at least 1".to_string(),
            });
        }
        if self.leaf_max_cells == 0 || self.leaf_max_cells > LEAF_NODE_MAX_CELLS {
            return Err(DatabaseError::InvalidConfig {
                reason: format!(
                    "leaf_max_cells must be between 1 and {}, got {}",
                    LEAF_NODE_MAX_CELLS, self.leaf_max_cells
                ),
            });
        }
        if self.internal_max_cells == 0 || self.internal_max_cells > INTERNAL_NODE_MAX_CELLS {
            return Err(DatabaseError::InvalidConfig {
                reason: format!(
                    "internal_max_cells must be between 1 and {}, got {}",
                    INTERNAL_NODE_MAX_CELLS, self.internal_max_cells
                ),
            });
        }
        Ok(())
    }
}

/// A single table stored as a B+Tree whose root always lives on page 0.
pub struct Table {
    pub(crate) pager: Pager,
    pub(crate) root_page_num: PageNum,
    pub(crate) config: TableConfig,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        Self::open_with_config(path, TableConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: TableConfig,
    ) -> Result<Self, DatabaseError> {
        config.validate()?;
        let mut pager = Pager::open(path, config.max_pages)?;
        let root_page_num = 0;

        if pager.num_pages() == 0 {
            // Fresh file: page 0 becomes an empty leaf that is also the root
            let mut root = LeafNode::new(root_page_num, pager.get_page(root_page_num)?);
            root.initialize();
            root.set_root(true);
            info!("initialized empty table");
        } else {
            debug!(num_pages = pager.num_pages(), "opened existing table");
        }

        Ok(Self {
            pager,
            root_page_num,
            config,
        })
    }

    /// Flush every cached page and release the file.
    pub fn close(self) -> Result<(), DatabaseError> {
        self.pager.close()
    }

    pub fn root_page_num(&self) -> PageNum {
        self.root_page_num
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    pub fn constants(&self) -> Constants {
        Constants::with_limits(
            self.config.leaf_max_cells,
            self.config.internal_max_cells,
            self.config.max_pages,
        )
    }

    /// Cursor at the first row in key order.
    pub fn start(&mut self) -> Result<Cursor<'_>, DatabaseError> {
        Cursor::start(self)
    }

    /// Iterator over every row in ascending key order.
    pub fn rows(&mut self) -> Result<ScanIterator<Cursor<'_>>, DatabaseError> {
        Ok(ScanIterator::new(Cursor::start(self)?))
    }

    pub fn scan_all(&mut self) -> Result<Vec<Row>, DatabaseError> {
        self.rows()?.collect()
    }
}
