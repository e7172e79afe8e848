pub mod error;
pub mod page;
pub mod row;

// Common type aliases
pub type PageNum = u32;
pub type Key = u32;

// Constants following the on-disk page layout
pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;

/// Page number written into a next-leaf slot when a leaf has no right sibling.
pub const NO_SIBLING: PageNum = 0;

/// Parent pointer value for the root node.
pub const NO_PARENT: PageNum = 0;
