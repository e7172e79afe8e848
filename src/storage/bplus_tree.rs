//! Search, insert and split over the pages of a [`Table`].
//!
//! The tree is at most two levels of routing deep in practice: leaves split
//! and push a key into their parent, the root promotes itself into an
//! internal node on its first split, and internal nodes never split. An
//! insert that would overflow an internal node fails with
//! [`DatabaseError::InternalNodeFull`] before touching any page.

use tracing::{debug, trace};

use crate::{
    storage::{
        cursor::Cursor,
        internal_node::InternalNode,
        leaf_node::LeafNode,
        node,
        table::Table,
    },
    types::{
        Key, PageNum,
        error::DatabaseError,
        page::{NodeType, Page},
        row::Row,
    },
};

impl Table {
    /// Position of `key`: the leaf holding it and its cell, or the cell
    /// where it would be inserted.
    pub(crate) fn find_position(&mut self, key: Key) -> Result<(PageNum, u32), DatabaseError> {
        let mut page_num = self.root_page_num;
        // Each hop goes to a distinct page, so a well-formed tree never
        // needs more hops than there are pages.
        for _ in 0..=self.pager.num_pages() {
            match self.pager.node_type(page_num)? {
                NodeType::Leaf => {
                    let cell_num = self.pager.leaf(page_num)?.find(key);
                    return Ok((page_num, cell_num));
                }
                NodeType::Internal => {
                    let node = self.pager.internal(page_num)?;
                    let child = node.child(node.find_child_index(key))?;
                    self.check_child(page_num, child)?;
                    page_num = child;
                }
            }
        }
        Err(DatabaseError::CorruptedPage {
            page_num,
            reason: "cycle while descending the tree".to_string(),
        })
    }

    fn check_child(&self, parent: PageNum, child: PageNum) -> Result<(), DatabaseError> {
        if child >= self.pager.num_pages() || child == parent || child == self.root_page_num {
            return Err(DatabaseError::CorruptedPage {
                page_num: parent,
                reason: format!("invalid child pointer {}", child),
            });
        }
        Ok(())
    }

    /// Cursor at `key`, or at the slot where `key` would go.
    pub fn find(&mut self, key: Key) -> Result<Cursor<'_>, DatabaseError> {
        let (page_num, cell_num) = self.find_position(key)?;
        Ok(Cursor::new(self, page_num, cell_num))
    }

    /// The row stored under `key`, if any.
    pub fn get(&mut self, key: Key) -> Result<Option<Row>, DatabaseError> {
        let (page_num, cell_num) = self.find_position(key)?;
        let leaf = self.pager.leaf(page_num)?;
        if cell_num < leaf.num_cells() && leaf.key(cell_num) == key {
            Ok(Some(leaf.row(cell_num)))
        } else {
            Ok(None)
        }
    }

    /// Insert `row` keyed by its id.
    ///
    /// Fails with [`DatabaseError::DuplicateKey`] when the id is already
    /// present, leaving the table untouched.
    pub fn insert(&mut self, row: &Row) -> Result<(), DatabaseError> {
        let key = row.id;
        let (page_num, cell_num) = self.find_position(key)?;

        let num_cells = {
            let leaf = self.pager.leaf(page_num)?;
            let num_cells = leaf.num_cells();
            if cell_num < num_cells && leaf.key(cell_num) == key {
                return Err(DatabaseError::DuplicateKey { key });
            }
            num_cells
        };

        if num_cells >= self.config.leaf_max_cells {
            return self.split_leaf_and_insert(page_num, cell_num, key, row);
        }

        let max_cells = self.config.leaf_max_cells;
        let mut leaf = self.pager.leaf_mut(page_num)?;
        for i in (cell_num + 1..=num_cells).rev() {
            leaf.move_cell(i, i - 1);
        }
        leaf.increment_num_cells(max_cells)?;
        leaf.write_cell(cell_num, key, row);
        trace!(page_num, cell_num, key, "inserted into leaf");
        Ok(())
    }

    /// Split a full leaf into itself and a new right sibling, placing the
    /// new cell at logical position `cell_num` of the combined cells.
    fn split_leaf_and_insert(
        &mut self,
        old_page_num: PageNum,
        cell_num: u32,
        key: Key,
        row: &Row,
    ) -> Result<(), DatabaseError> {
        // A file written with a larger cell limit may hold leaves past the
        // current one, so the split covers every cell actually present.
        let (num_cells, old_is_root, parent_page_num, old_max) = {
            let old = self.pager.leaf(old_page_num)?;
            (old.num_cells(), old.is_root(), old.parent(), leaf_max_key(&old)?)
        };
        let right_count = (num_cells + 1) / 2;
        let left_count = (num_cells + 1) - right_count;
        self.check_split_capacity(old_is_root, parent_page_num)?;

        let new_page_num = self.pager.unused_page_num();
        debug!(
            old_page_num,
            new_page_num,
            left_count,
            right_count,
            "splitting leaf"
        );
        {
            let (old_page, new_page) = self.pager.get_page_pair(old_page_num, new_page_num)?;
            let mut old = LeafNode::new(old_page_num, old_page);
            let mut new = LeafNode::new(new_page_num, new_page);
            new.initialize();
            new.set_parent(parent_page_num);
            new.set_next_leaf(old.next_leaf());
            old.set_next_leaf(new_page_num);

            // Walk downward so no cell in the old leaf is overwritten
            // before it has been copied.
            for i in (0..=num_cells).rev() {
                let to_new = i >= left_count;
                let dest = if to_new { i - left_count } else { i };
                if i == cell_num {
                    if to_new {
                        new.write_cell(dest, key, row);
                    } else {
                        old.write_cell(dest, key, row);
                    }
                } else {
                    let src = if i > cell_num { i - 1 } else { i };
                    if to_new {
                        new.set_cell(dest, old.cell(src));
                    } else {
                        old.move_cell(dest, src);
                    }
                }
            }
            old.set_num_cells(left_count);
            new.set_num_cells(right_count);
        }

        if old_is_root {
            self.create_new_root(new_page_num)
        } else {
            let new_max = {
                let old = self.pager.leaf(old_page_num)?;
                leaf_max_key(&old)?
            };
            self.update_internal_key(parent_page_num, old_max, new_max)?;
            self.internal_insert(parent_page_num, new_page_num)
        }
    }

    /// Refuse a split up front when it could not complete, so a failed
    /// insert leaves the tree as it was.
    fn check_split_capacity(
        &mut self,
        splitting_root: bool,
        parent_page_num: PageNum,
    ) -> Result<(), DatabaseError> {
        let pages_needed = if splitting_root { 2 } else { 1 };
        let last_new_page = self.pager.unused_page_num() + pages_needed - 1;
        if last_new_page as usize >= self.pager.max_pages() {
            return Err(DatabaseError::PageOutOfBounds {
                page_num: last_new_page,
                max_pages: self.pager.max_pages(),
            });
        }
        if !splitting_root {
            let max_cells = self.config.internal_max_cells;
            let parent = self.pager.internal(parent_page_num)?;
            if parent.num_keys() >= max_cells {
                return Err(DatabaseError::InternalNodeFull {
                    page_num: parent_page_num,
                    max_cells,
                });
            }
        }
        Ok(())
    }

    /// Move the root's contents to a new left child and turn the root page
    /// into an internal node over that child and `right_child_page_num`.
    fn create_new_root(&mut self, right_child_page_num: PageNum) -> Result<(), DatabaseError> {
        let root_page_num = self.root_page_num;
        let left_child_page_num = self.pager.unused_page_num();
        {
            let (root, left_child) = self
                .pager
                .get_page_pair(root_page_num, left_child_page_num)?;
            left_child.copy_from(root);
            node::set_root(left_child, false);
        }

        // Only a leaf root ever splits; internal nodes are never pushed down.
        debug_assert_eq!(
            self.pager.node_type(left_child_page_num)?,
            NodeType::Leaf
        );

        let left_max = self.node_max_key(left_child_page_num)?;
        {
            let mut root = InternalNode::new(root_page_num, self.pager.get_page(root_page_num)?);
            root.initialize();
            root.set_root(true);
            root.set_num_keys(1);
            root.set_child(0, left_child_page_num)?;
            root.set_key(0, left_max);
            root.set_right_child(right_child_page_num);
        }
        node::set_parent(self.pager.get_page(left_child_page_num)?, root_page_num);
        node::set_parent(self.pager.get_page(right_child_page_num)?, root_page_num);

        debug!(
            root_page_num,
            left_child_page_num, right_child_page_num, left_max, "created new root"
        );
        Ok(())
    }

    /// Add `child_page_num` to the internal node `parent_page_num`.
    fn internal_insert(
        &mut self,
        parent_page_num: PageNum,
        child_page_num: PageNum,
    ) -> Result<(), DatabaseError> {
        let child_max = self.node_max_key(child_page_num)?;
        let (index, original_num_keys, right_child_page_num) = {
            let parent = self.pager.internal(parent_page_num)?;
            (
                parent.find_child_index(child_max),
                parent.num_keys(),
                parent.right_child(),
            )
        };
        if original_num_keys >= self.config.internal_max_cells {
            return Err(DatabaseError::InternalNodeFull {
                page_num: parent_page_num,
                max_cells: self.config.internal_max_cells,
            });
        }
        let right_max = self.node_max_key(right_child_page_num)?;

        let mut parent = self.pager.internal_mut(parent_page_num)?;
        parent.set_num_keys(original_num_keys + 1);
        if child_max > right_max {
            // New child becomes the right child; the old one gets a key cell
            parent.set_child(original_num_keys, right_child_page_num)?;
            parent.set_key(original_num_keys, right_max);
            parent.set_right_child(child_page_num);
        } else {
            for i in (index + 1..=original_num_keys).rev() {
                parent.move_cell(i, i - 1);
            }
            parent.set_child(index, child_page_num)?;
            parent.set_key(index, child_max);
        }
        trace!(parent_page_num, child_page_num, child_max, "inserted child");
        Ok(())
    }

    /// Rewrite the key that routes to a child whose max key changed from
    /// `old_key` to `new_key`.
    fn update_internal_key(
        &mut self,
        page_num: PageNum,
        old_key: Key,
        new_key: Key,
    ) -> Result<(), DatabaseError> {
        let mut node = self.pager.internal_mut(page_num)?;
        let index = node.find_child_index(old_key);
        if index >= node.num_keys() {
            // Routed to the right child, which has no key cell
            trace!(page_num, old_key, new_key, "no key cell to update");
            return Ok(());
        }
        node.set_key(index, new_key);
        trace!(page_num, index, old_key, new_key, "updated internal key");
        Ok(())
    }

    /// Max key of a node: a leaf's last key, or an internal node's last
    /// explicit key.
    pub fn node_max_key(&mut self, page_num: PageNum) -> Result<Key, DatabaseError> {
        let max = match self.pager.node_type(page_num)? {
            NodeType::Leaf => self.pager.leaf(page_num)?.max_key(),
            NodeType::Internal => self.pager.internal(page_num)?.max_key(),
        };
        max.ok_or(DatabaseError::CorruptedPage {
            page_num,
            reason: "empty node has no max key".to_string(),
        })
    }

    /// Indented dump of the tree shape, one node or key per line.
    pub fn describe_tree(&mut self) -> Result<String, DatabaseError> {
        let mut out = String::new();
        self.describe_node(self.root_page_num, 0, &mut out)?;
        Ok(out)
    }

    fn describe_node(
        &mut self,
        page_num: PageNum,
        depth: usize,
        out: &mut String,
    ) -> Result<(), DatabaseError> {
        if depth > self.pager.num_pages() as usize {
            return Err(DatabaseError::CorruptedPage {
                page_num,
                reason: "cycle while describing the tree".to_string(),
            });
        }
        let indent = "  ".repeat(depth);
        match self.pager.node_type(page_num)? {
            NodeType::Leaf => {
                let leaf = self.pager.leaf(page_num)?;
                out.push_str(&format!("{}- leaf (size {})\n", indent, leaf.num_cells()));
                for i in 0..leaf.num_cells() {
                    out.push_str(&format!("{}  - {}\n", indent, leaf.key(i)));
                }
            }
            NodeType::Internal => {
                let (num_keys, children, keys) = {
                    let node = self.pager.internal(page_num)?;
                    let children = (0..=node.num_keys())
                        .map(|i| node.child(i))
                        .collect::<Result<Vec<_>, _>>()?;
                    let keys: Vec<Key> = (0..node.num_keys()).map(|i| node.key(i)).collect();
                    (node.num_keys(), children, keys)
                };
                out.push_str(&format!("{}- internal (size {})\n", indent, num_keys));
                for (i, child) in children.iter().enumerate() {
                    self.check_child(page_num, *child)?;
                    self.describe_node(*child, depth + 1, out)?;
                    if let Some(key) = keys.get(i) {
                        out.push_str(&format!("{}  - key {}\n", indent, key));
                    }
                }
            }
        }
        Ok(())
    }
}

fn leaf_max_key(leaf: &LeafNode<&Page>) -> Result<Key, DatabaseError> {
    leaf.max_key().ok_or(DatabaseError::CorruptedPage {
        page_num: leaf.page_num(),
        reason: "empty leaf has no max key".to_string(),
    })
}
