use std::fmt;

use serde::Serialize;

use crate::{
    storage::{
        internal_node::{INTERNAL_NODE_CELL_SIZE, INTERNAL_NODE_HEADER_SIZE, INTERNAL_NODE_MAX_CELLS},
        leaf_node::{
            LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
            LEAF_NODE_SPACE_FOR_CELLS,
        },
        node::COMMON_NODE_HEADER_SIZE,
    },
    types::{PAGE_SIZE, TABLE_MAX_PAGES, row::ROW_SIZE},
};

/// Size constants of the on-disk format, as reported by `.constants`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Constants {
    pub row_size: usize,
    pub common_node_header_size: usize,
    pub leaf_node_header_size: usize,
    pub leaf_node_cell_size: usize,
    pub leaf_node_space_for_cells: usize,
    pub leaf_node_max_cells: u32,
    pub internal_node_header_size: usize,
    pub internal_node_cell_size: usize,
    pub internal_node_max_cells: u32,
    pub page_size: usize,
    pub table_max_pages: usize,
}

impl Constants {
    /// Report with the cell and page limits a table actually runs with.
    pub fn with_limits(leaf_max_cells: u32, internal_max_cells: u32, max_pages: usize) -> Self {
        Self {
            leaf_node_max_cells: leaf_max_cells,
            internal_node_max_cells: internal_max_cells,
            table_max_pages: max_pages,
            ..Self::default()
        }
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            row_size: ROW_SIZE,
            common_node_header_size: COMMON_NODE_HEADER_SIZE,
            leaf_node_header_size: LEAF_NODE_HEADER_SIZE,
            leaf_node_cell_size: LEAF_NODE_CELL_SIZE,
            leaf_node_space_for_cells: LEAF_NODE_SPACE_FOR_CELLS,
            leaf_node_max_cells: LEAF_NODE_MAX_CELLS,
            internal_node_header_size: INTERNAL_NODE_HEADER_SIZE,
            internal_node_cell_size: INTERNAL_NODE_CELL_SIZE,
            internal_node_max_cells: INTERNAL_NODE_MAX_CELLS,
            page_size: PAGE_SIZE,
            table_max_pages: TABLE_MAX_PAGES,
        }
    }
}

impl fmt::Display for Constants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ROW_SIZE: {}", self.row_size)?;
        writeln!(f, "COMMON_NODE_HEADER_SIZE: {}", self.common_node_header_size)?;
        writeln!(f, "LEAF_NODE_HEADER_SIZE: {}", self.leaf_node_header_size)?;
        writeln!(f, "LEAF_NODE_CELL_SIZE: {}", self.leaf_node_cell_size)?;
        writeln!(f, "LEAF_NODE_SPACE_FOR_CELLS: {}", self.leaf_node_space_for_cells)?;
        writeln!(f, "LEAF_NODE_MAX_CELLS: {}", self.leaf_node_max_cells)?;
        writeln!(f, "INTERNAL_NODE_HEADER_SIZE: {}", self.internal_node_header_size)?;
        writeln!(f, "INTERNAL_NODE_CELL_SIZE: {}", self.internal_node_cell_size)?;
        writeln!(f, "INTERNAL_NODE_MAX_CELLS: {}", self.internal_node_max_cells)?;
        writeln!(f, "PAGE_SIZE: {}", self.page_size)?;
        write!(f, "TABLE_MAX_PAGES: {}", self.table_max_pages)
    }
}
