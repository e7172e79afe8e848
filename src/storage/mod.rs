pub mod bplus_tree;
pub mod cursor;
pub mod internal_node;
pub mod layout;
pub mod leaf_node;
pub mod node;
pub mod pager;
pub mod table;
