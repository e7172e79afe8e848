use tracing::trace;

use crate::{
    executor::scan::Scanner,
    storage::table::Table,
    types::{Key, NO_SIBLING, PageNum, error::DatabaseError, row::Row},
};

/// A position in the table: a leaf page and a cell within it.
///
/// A cursor only moves forward. Once it reaches the end of the table it
/// stays there; start a new one to scan again.
pub struct Cursor<'a> {
    table: &'a mut Table,
    page_num: PageNum,
    cell_num: u32,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(table: &'a mut Table, page_num: PageNum, cell_num: u32) -> Self {
        Self {
            table,
            page_num,
            cell_num,
            end_of_table: false,
        }
    }

    /// Cursor at the leftmost leaf's first cell.
    pub fn start(table: &'a mut Table) -> Result<Self, DatabaseError> {
        let (page_num, cell_num) = table.find_position(0)?;
        let num_cells = table.pager.leaf(page_num)?.num_cells();
        let mut cursor = Self::new(table, page_num, cell_num);
        cursor.end_of_table = num_cells == 0;
        Ok(cursor)
    }

    pub fn page_num(&self) -> PageNum {
        self.page_num
    }

    pub fn cell_num(&self) -> u32 {
        self.cell_num
    }

    pub fn is_end(&self) -> bool {
        self.end_of_table
    }

    /// Key under the cursor, or `None` past the last cell of its leaf.
    pub fn key(&mut self) -> Result<Option<Key>, DatabaseError> {
        if self.end_of_table {
            return Ok(None);
        }
        let leaf = self.table.pager.leaf(self.page_num)?;
        if self.cell_num >= leaf.num_cells() {
            return Ok(None);
        }
        Ok(Some(leaf.key(self.cell_num)))
    }

    /// Row under the cursor, or `None` past the last cell of its leaf.
    pub fn value(&mut self) -> Result<Option<Row>, DatabaseError> {
        if self.end_of_table {
            return Ok(None);
        }
        let leaf = self.table.pager.leaf(self.page_num)?;
        if self.cell_num >= leaf.num_cells() {
            return Ok(None);
        }
        Ok(Some(leaf.row(self.cell_num)))
    }

    /// Step to the next cell, following the sibling chain across leaves.
    pub fn advance(&mut self) -> Result<(), DatabaseError> {
        if self.end_of_table {
            return Ok(());
        }
        let (num_cells, next_leaf) = {
            let leaf = self.table.pager.leaf(self.page_num)?;
            (leaf.num_cells(), leaf.next_leaf())
        };

        self.cell_num += 1;
        if self.cell_num >= num_cells {
            if next_leaf == NO_SIBLING {
                self.end_of_table = true;
            } else {
                if next_leaf >= self.table.pager.num_pages() || next_leaf == self.page_num {
                    return Err(DatabaseError::CorruptedPage {
                        page_num: self.page_num,
                        reason: format!("invalid next leaf pointer {}", next_leaf),
                    });
                }
                trace!(from = self.page_num, to = next_leaf, "cursor moved to next leaf");
                self.page_num = next_leaf;
                self.cell_num = 0;
            }
        }
        Ok(())
    }
}

impl Scanner for Cursor<'_> {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError> {
        // A cursor from `find` may sit on an insertion slot past the
        // leaf's last cell; step over it before reading.
        while !self.end_of_table {
            if let Some(row) = self.value()? {
                self.advance()?;
                return Ok(Some(row));
            }
            self.advance()?;
        }
        Ok(None)
    }
}
