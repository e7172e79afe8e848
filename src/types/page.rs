use serde::{Deserialize, Serialize};

use crate::types::{PAGE_SIZE, error::DatabaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Internal = 0,
    Leaf = 1,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Result<Self, DatabaseError> {
        match value {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            _ => Err(DatabaseError::InvalidNodeType(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            NodeType::Internal => 0,
            NodeType::Leaf => 1,
        }
    }
}

/*
 * A page is a raw 4096-byte block plus a logical length:
 * ┌──────────────────────────────────────────────┬──────────────────┐
 * │        bytes written so far (len)            │  zero-filled     │
 * └──────────────────────────────────────────────┴──────────────────┘
 * Only the written prefix is sent to disk on flush. Node layouts on
 * top of the buffer live in `storage::leaf_node` / `storage::internal_node`.
 */

#[derive(Clone)]
pub struct Page {
    data: Box<[u8; PAGE_SIZE]>,
    len: usize,
}

impl Page {
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
            len: 0,
        }
    }

    /// Build a page from bytes read off disk. A short slice leaves the
    /// remaining tail zero-filled.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() > PAGE_SIZE {
            return Err(DatabaseError::CorruptedPage {
                page_num: 0,
                reason: format!("{} bytes do not fit in a page", bytes.len()),
            });
        }
        let mut page = Self::new();
        page.data[..bytes.len()].copy_from_slice(bytes);
        page.len = bytes.len();
        Ok(page)
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }

    /// The prefix that gets flushed to disk.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn read_u8(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
        self.touch(offset + 1);
    }

    pub fn read_u32(&self, offset: usize) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.data[offset..offset + 4]);
        u32::from_be_bytes(buf)
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
        self.touch(offset + 4);
    }

    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Mutable view of a region; the region counts as written.
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        self.touch(offset + len);
        &mut self.data[offset..offset + len]
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.bytes_mut(offset, bytes.len()).copy_from_slice(bytes);
    }

    /// Copy `len` bytes inside the page; ranges may overlap.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        self.data.copy_within(src..src + len, dst);
        self.touch(dst + len);
    }

    /// Replace this page's contents with another page's, length included.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data[..]);
        self.len = other.len;
    }

    fn touch(&mut self, end: usize) {
        if end > self.len {
            self.len = end;
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("len", &self.len).finish()
    }
}
