//! Leaf node layout.
//!
//! ```text
//! ┌──────────────────────┬────────────────┬────────────────┐
//! │ common header (6)    │ num_cells (4)  │ next_leaf (4)  │
//! ├──────────────────────┴────────────────┴────────────────┤
//! │ cell 0: key (4) | row (ROW_SIZE)                       │
//! │ cell 1: key (4) | row (ROW_SIZE)                       │
//! │ ...                                                    │
//! └────────────────────────────────────────────────────────┘
//! ```

use std::borrow::{Borrow, BorrowMut};

use crate::{
    storage::node::{self, COMMON_NODE_HEADER_SIZE},
    types::{
        Key, NO_PARENT, NO_SIBLING, PAGE_SIZE, PageNum,
        error::DatabaseError,
        page::{NodeType, Page},
        row::{ROW_SIZE, Row},
    },
};

pub const LEAF_NODE_NUM_CELLS_SIZE: usize = 4;
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_NEXT_LEAF_SIZE: usize = 4;
pub const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE + LEAF_NODE_NEXT_LEAF_SIZE;

pub const LEAF_NODE_KEY_SIZE: usize = 4;
pub const LEAF_NODE_KEY_OFFSET: usize = 0;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_VALUE_OFFSET: usize = LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: u32 = (LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE) as u32;

fn cell_offset(cell_num: u32) -> usize {
    LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
}

/// Typed view of a page holding a leaf node.
pub struct LeafNode<P> {
    page_num: PageNum,
    page: P,
}

impl<P: Borrow<Page>> LeafNode<P> {
    pub fn new(page_num: PageNum, page: P) -> Self {
        Self { page_num, page }
    }

    fn page(&self) -> &Page {
        self.page.borrow()
    }

    pub fn page_num(&self) -> PageNum {
        self.page_num
    }

    pub fn is_root(&self) -> bool {
        node::is_root(self.page())
    }

    pub fn parent(&self) -> PageNum {
        node::parent(self.page())
    }

    pub fn num_cells(&self) -> u32 {
        self.page().read_u32(LEAF_NODE_NUM_CELLS_OFFSET)
    }

    pub fn next_leaf(&self) -> PageNum {
        self.page().read_u32(LEAF_NODE_NEXT_LEAF_OFFSET)
    }

    /// Key plus serialized row.
    pub fn cell(&self, cell_num: u32) -> &[u8] {
        self.page().bytes(cell_offset(cell_num), LEAF_NODE_CELL_SIZE)
    }

    pub fn key(&self, cell_num: u32) -> Key {
        self.page().read_u32(cell_offset(cell_num) + LEAF_NODE_KEY_OFFSET)
    }

    pub fn value(&self, cell_num: u32) -> &[u8] {
        self.page()
            .bytes(cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET, LEAF_NODE_VALUE_SIZE)
    }

    pub fn row(&self, cell_num: u32) -> Row {
        Row::deserialize(self.value(cell_num))
    }

    /// Key of the last cell, or `None` for an empty leaf.
    pub fn max_key(&self) -> Option<Key> {
        self.num_cells().checked_sub(1).map(|last| self.key(last))
    }

    /// Binary search for `key`. Returns the cell holding it, or the slot
    /// where it would be inserted.
    pub fn find(&self, key: Key) -> u32 {
        let mut min = 0;
        let mut max = self.num_cells();
        while min != max {
            let mid = (min + max) / 2;
            let key_at_mid = self.key(mid);
            if key == key_at_mid {
                return mid;
            }
            if key < key_at_mid {
                max = mid;
            } else {
                min = mid + 1;
            }
        }
        min
    }
}

impl<P: BorrowMut<Page>> LeafNode<P> {
    fn page_mut(&mut self) -> &mut Page {
        self.page.borrow_mut()
    }

    pub fn initialize(&mut self) {
        let page = self.page_mut();
        node::set_node_type(page, NodeType::Leaf);
        node::set_root(page, false);
        node::set_parent(page, NO_PARENT);
        page.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, 0);
        page.write_u32(LEAF_NODE_NEXT_LEAF_OFFSET, NO_SIBLING);
    }

    pub fn set_root(&mut self, is_root: bool) {
        node::set_root(self.page_mut(), is_root);
    }

    pub fn set_parent(&mut self, parent: PageNum) {
        node::set_parent(self.page_mut(), parent);
    }

    pub fn set_num_cells(&mut self, num_cells: u32) {
        self.page_mut().write_u32(LEAF_NODE_NUM_CELLS_OFFSET, num_cells);
    }

    pub fn increment_num_cells(&mut self, max_cells: u32) -> Result<(), DatabaseError> {
        let num_cells = self.num_cells();
        if num_cells >= max_cells {
            return Err(DatabaseError::LeafNodeFull {
                page_num: self.page_num,
            });
        }
        self.set_num_cells(num_cells + 1);
        Ok(())
    }

    pub fn decrement_num_cells(&mut self) {
        let num_cells = self.num_cells();
        if num_cells > 0 {
            self.set_num_cells(num_cells - 1);
        }
    }

    pub fn set_next_leaf(&mut self, next_leaf: PageNum) {
        self.page_mut().write_u32(LEAF_NODE_NEXT_LEAF_OFFSET, next_leaf);
    }

    pub fn set_key(&mut self, cell_num: u32, key: Key) {
        self.page_mut()
            .write_u32(cell_offset(cell_num) + LEAF_NODE_KEY_OFFSET, key);
    }

    pub fn set_cell(&mut self, cell_num: u32, cell: &[u8]) {
        self.page_mut()
            .write_bytes(cell_offset(cell_num), &cell[..LEAF_NODE_CELL_SIZE]);
    }

    pub fn value_mut(&mut self, cell_num: u32) -> &mut [u8] {
        self.page_mut()
            .bytes_mut(cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET, LEAF_NODE_VALUE_SIZE)
    }

    /// Copy cell `src` over cell `dest` within this node.
    pub fn move_cell(&mut self, dest: u32, src: u32) {
        self.page_mut()
            .copy_within(cell_offset(src), cell_offset(dest), LEAF_NODE_CELL_SIZE);
    }

    pub fn write_cell(&mut self, cell_num: u32, key: Key, row: &Row) {
        self.set_key(cell_num, key);
        row.serialize(self.value_mut(cell_num));
    }
}
