//! Common node header shared by leaf and internal nodes.
//!
//! ```text
//! ┌───────────────┬──────────────┬──────────────────────┐
//! │ node_type (1) │ is_root (1)  │ parent page num (4)  │
//! └───────────────┴──────────────┴──────────────────────┘
//! ```

use crate::types::{
    PageNum,
    error::DatabaseError,
    page::{NodeType, Page},
};

pub const NODE_TYPE_SIZE: usize = 1;
pub const NODE_TYPE_OFFSET: usize = 0;
pub const IS_ROOT_SIZE: usize = 1;
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
pub const PARENT_POINTER_SIZE: usize = 4;
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

pub fn node_type(page: &Page) -> Result<NodeType, DatabaseError> {
    NodeType::from_u8(page.read_u8(NODE_TYPE_OFFSET))
}

pub fn set_node_type(page: &mut Page, node_type: NodeType) {
    page.write_u8(NODE_TYPE_OFFSET, node_type.as_u8());
}

pub fn is_root(page: &Page) -> bool {
    page.read_u8(IS_ROOT_OFFSET) != 0
}

pub fn set_root(page: &mut Page, is_root: bool) {
    page.write_u8(IS_ROOT_OFFSET, is_root as u8);
}

pub fn parent(page: &Page) -> PageNum {
    page.read_u32(PARENT_POINTER_OFFSET)
}

pub fn set_parent(page: &mut Page, parent: PageNum) {
    page.write_u32(PARENT_POINTER_OFFSET, parent);
}
