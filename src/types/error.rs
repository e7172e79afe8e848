use thiserror::Error;

use crate::types::{Key, PageNum};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page {page_num} is out of bounds (max pages: {max_pages})")]
    PageOutOfBounds { page_num: PageNum, max_pages: usize },

    #[error("Tried to flush page {page_num} which was never loaded")]
    FlushUnloadedPage { page_num: PageNum },

    #[error("Internal node {page_num} is full ({max_cells} keys); splitting internal nodes is not supported")]
    InternalNodeFull { page_num: PageNum, max_cells: u32 },

    #[error("Leaf node {page_num} is full")]
    LeafNodeFull { page_num: PageNum },

    #[error("Tried to access child {index} of a node with {key_count} keys")]
    ChildIndexOutOfBounds { index: u32, key_count: u32 },

    #[error("Duplicate key: {key}")]
    DuplicateKey { key: Key },

    #[error("Invalid node type: {0}")]
    InvalidNodeType(u8),

    #[error("Corrupted page: page_num={page_num}, reason={reason}")]
    CorruptedPage { page_num: PageNum, reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl DatabaseError {
    /// Whether the table is still consistent and usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DatabaseError::DuplicateKey { .. })
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
