//! Internal node layout.
//!
//! ```text
//! ┌──────────────────────┬───────────────┬──────────────────┐
//! │ common header (6)    │ num_keys (4)  │ right_child (4)  │
//! ├──────────────────────┴───────────────┴──────────────────┤
//! │ cell 0: child (4) | key (4)                             │
//! │ cell 1: child (4) | key (4)                             │
//! │ ...                                                     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Key `i` is the max key reachable through child `i`. The right child
//! has no key cell of its own.

use std::borrow::{Borrow, BorrowMut};

use crate::{
    storage::node::{self, COMMON_NODE_HEADER_SIZE},
    types::{
        Key, NO_PARENT, PAGE_SIZE, PageNum,
        error::DatabaseError,
        page::{NodeType, Page},
    },
};

pub const INTERNAL_NODE_NUM_KEYS_SIZE: usize = 4;
pub const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
pub const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + INTERNAL_NODE_NUM_KEYS_SIZE + INTERNAL_NODE_RIGHT_CHILD_SIZE;

pub const INTERNAL_NODE_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_KEY_SIZE: usize = 4;
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
pub const INTERNAL_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_MAX_CELLS: u32 =
    (INTERNAL_NODE_SPACE_FOR_CELLS / INTERNAL_NODE_CELL_SIZE) as u32;

fn cell_offset(cell_num: u32) -> usize {
    INTERNAL_NODE_HEADER_SIZE + cell_num as usize * INTERNAL_NODE_CELL_SIZE
}

/// Typed view of a page holding an internal node.
pub struct InternalNode<P> {
    page_num: PageNum,
    page: P,
}

impl<P: Borrow<Page>> InternalNode<P> {
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

    pub fn num_keys(&self) -> u32 {
        self.page().read_u32(INTERNAL_NODE_NUM_KEYS_OFFSET)
    }

    pub fn right_child(&self) -> PageNum {
        self.page().read_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET)
    }

    pub fn key(&self, key_num: u32) -> Key {
        self.page()
            .read_u32(cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE)
    }

    /// Child `child_num`, where `child_num == num_keys` addresses the right child.
    pub fn child(&self, child_num: u32) -> Result<PageNum, DatabaseError> {
        let num_keys = self.num_keys();
        if child_num > num_keys {
            Err(DatabaseError::ChildIndexOutOfBounds {
                index: child_num,
                key_count: num_keys,
            })
        } else if child_num == num_keys {
            Ok(self.right_child())
        } else {
            Ok(self.page().read_u32(cell_offset(child_num)))
        }
    }

    /// Last explicit key. The right child's subtree may hold larger keys.
    pub fn max_key(&self) -> Option<Key> {
        self.num_keys().checked_sub(1).map(|last| self.key(last))
    }

    /// Index of the first key `>= key`, or `num_keys` (the right child)
    /// when every key is smaller.
    pub fn find_child_index(&self, key: Key) -> u32 {
        let mut min = 0;
        let mut max = self.num_keys();
        while min != max {
            let mid = (min + max) / 2;
            if self.key(mid) >= key {
                max = mid;
            } else {
                min = mid + 1;
            }
        }
        min
    }
}

impl<P: BorrowMut<Page>> InternalNode<P> {
    fn page_mut(&mut self) -> &mut Page {
        self.page.borrow_mut()
    }

    pub fn initialize(&mut self) {
        let page = self.page_mut();
        node::set_node_type(page, NodeType::Internal);
        node::set_root(page, false);
        node::set_parent(page, NO_PARENT);
        page.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, 0);
        page.write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, 0);
    }

    pub fn set_root(&mut self, is_root: bool) {
        node::set_root(self.page_mut(), is_root);
    }

    pub fn set_parent(&mut self, parent: PageNum) {
        node::set_parent(self.page_mut(), parent);
    }

    pub fn set_num_keys(&mut self, num_keys: u32) {
        self.page_mut()
            .write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, num_keys);
    }

    pub fn set_right_child(&mut self, child: PageNum) {
        self.page_mut()
            .write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, child);
    }

    pub fn set_key(&mut self, key_num: u32, key: Key) {
        self.page_mut()
            .write_u32(cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE, key);
    }

    pub fn set_child(&mut self, child_num: u32, child: PageNum) -> Result<(), DatabaseError> {
        let num_keys = self.num_keys();
        if child_num > num_keys {
            return Err(DatabaseError::ChildIndexOutOfBounds {
                index: child_num,
                key_count: num_keys,
            });
        }
        if child_num == num_keys {
            self.set_right_child(child);
        } else {
            self.page_mut().write_u32(cell_offset(child_num), child);
        }
        Ok(())
    }

    /// Copy cell `src` over cell `dest`.
    pub fn move_cell(&mut self, dest: u32, src: u32) {
        self.page_mut()
            .copy_within(cell_offset(src), cell_offset(dest), INTERNAL_NODE_CELL_SIZE);
    }
}
