use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
};

use tracing::{debug, trace};

use crate::{
    storage::{
        internal_node::{INTERNAL_NODE_MAX_CELLS, InternalNode},
        leaf_node::{LEAF_NODE_MAX_CELLS, LeafNode},
        node,
    },
    types::{
        PAGE_SIZE, PageNum,
        error::DatabaseError,
        page::{NodeType, Page},
    },
};

/// Page cache and disk I/O for a single database file.
///
/// Pages live in a fixed-size arena indexed by page number and are loaded
/// on first access. Page N sits at file offset `N * PAGE_SIZE`. Nothing
/// reaches the disk until [`Pager::flush`] or [`Pager::close`].
pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: Vec<Option<Page>>,
}

impl Pager {
    /// Open `path` for read/write, creating it if absent.
    pub fn open<P: AsRef<Path>>(path: P, max_pages: usize) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let file_length = file.metadata()?.len();
        let num_pages = file_length.div_ceil(PAGE_SIZE as u64) as u32;
        debug!(
            path = %path.display(),
            file_length,
            num_pages,
            "opened database file"
        );

        let mut pages = Vec::with_capacity(max_pages);
        pages.resize_with(max_pages, || None);
        Ok(Self {
            file,
            file_length,
            num_pages,
            pages,
        })
    }

    /// Pages allocated so far, on disk or in the cache.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn max_pages(&self) -> usize {
        self.pages.len()
    }

    /// File length observed at open time.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn is_loaded(&self, page_num: PageNum) -> bool {
        matches!(self.pages.get(page_num as usize), Some(Some(_)))
    }

    /// Next page number to hand out. Touching it through `get_page`
    /// allocates it.
    pub fn unused_page_num(&self) -> PageNum {
        self.num_pages
    }

    fn check_bounds(&self, page_num: PageNum) -> Result<(), DatabaseError> {
        if page_num as usize >= self.pages.len() {
            return Err(DatabaseError::PageOutOfBounds {
                page_num,
                max_pages: self.pages.len(),
            });
        }
        Ok(())
    }

    fn load(&mut self, page_num: PageNum) -> Result<(), DatabaseError> {
        self.check_bounds(page_num)?;
        let slot = page_num as usize;
        if self.pages[slot].is_some() {
            return Ok(());
        }

        let on_disk_pages = self.file_length.div_ceil(PAGE_SIZE as u64);
        let page = if (page_num as u64) < on_disk_pages {
            let mut buffer = vec![0u8; PAGE_SIZE];
            self.file
                .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
            let read = read_up_to(&mut self.file, &mut buffer)?;
            trace!(page_num, bytes = read, "page read from disk");
            Page::from_bytes(&buffer[..read])?
        } else {
            Page::new()
        };

        self.pages[slot] = Some(page);
        if page_num >= self.num_pages {
            self.num_pages = page_num + 1;
            debug!(page_num, num_pages = self.num_pages, "allocated page");
        }
        Ok(())
    }

    /// Fetch a page, loading or allocating it on a cache miss.
    pub fn get_page(&mut self, page_num: PageNum) -> Result<&mut Page, DatabaseError> {
        self.load(page_num)?;
        self.pages[page_num as usize]
            .as_mut()
            .ok_or(DatabaseError::CorruptedPage {
                page_num,
                reason: "page missing after load".to_string(),
            })
    }

    /// Fetch two distinct pages at once.
    pub fn get_page_pair(
        &mut self,
        first: PageNum,
        second: PageNum,
    ) -> Result<(&mut Page, &mut Page), DatabaseError> {
        if first == second {
            return Err(DatabaseError::CorruptedPage {
                page_num: first,
                reason: "page paired with itself".to_string(),
            });
        }
        self.load(first)?;
        self.load(second)?;

        let (low, high) = (first.min(second) as usize, first.max(second) as usize);
        let (head, tail) = self.pages.split_at_mut(high);
        let missing = |page_num: usize| DatabaseError::CorruptedPage {
            page_num: page_num as PageNum,
            reason: "page missing after load".to_string(),
        };
        let low_page = head[low].as_mut().ok_or_else(|| missing(low))?;
        let high_page = tail[0].as_mut().ok_or_else(|| missing(high))?;
        if first < second {
            Ok((low_page, high_page))
        } else {
            Ok((high_page, low_page))
        }
    }

    pub fn node_type(&mut self, page_num: PageNum) -> Result<NodeType, DatabaseError> {
        node::node_type(self.get_page(page_num)?)
    }

    pub fn leaf(&mut self, page_num: PageNum) -> Result<LeafNode<&Page>, DatabaseError> {
        let page = self.get_page(page_num)?;
        check_leaf(page_num, page)?;
        Ok(LeafNode::new(page_num, &*page))
    }

    pub fn leaf_mut(&mut self, page_num: PageNum) -> Result<LeafNode<&mut Page>, DatabaseError> {
        let page = self.get_page(page_num)?;
        check_leaf(page_num, page)?;
        Ok(LeafNode::new(page_num, page))
    }

    pub fn internal(&mut self, page_num: PageNum) -> Result<InternalNode<&Page>, DatabaseError> {
        let page = self.get_page(page_num)?;
        check_internal(page_num, page)?;
        Ok(InternalNode::new(page_num, &*page))
    }

    pub fn internal_mut(
        &mut self,
        page_num: PageNum,
    ) -> Result<InternalNode<&mut Page>, DatabaseError> {
        let page = self.get_page(page_num)?;
        check_internal(page_num, page)?;
        Ok(InternalNode::new(page_num, page))
    }

    /// Write the written prefix of a cached page to its slot in the file.
    pub fn flush(&mut self, page_num: PageNum) -> Result<(), DatabaseError> {
        let page = self
            .pages
            .get(page_num as usize)
            .and_then(Option::as_ref)
            .ok_or(DatabaseError::FlushUnloadedPage { page_num })?;
        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(page.written())?;
        trace!(page_num, bytes = page.len(), "flushed page");
        Ok(())
    }

    /// Flush every cached page and release the file handle.
    pub fn close(mut self) -> Result<(), DatabaseError> {
        for page_num in 0..self.num_pages {
            if self.is_loaded(page_num) {
                self.flush(page_num)?;
            }
        }
        self.file.sync_all()?;
        debug!(num_pages = self.num_pages, "closed database file");
        Ok(())
    }
}

/// Read until `buffer` is full or the file ends. Hitting end-of-file is
/// not an error: the unread tail stays zeroed.
fn read_up_to(file: &mut File, buffer: &mut [u8]) -> Result<usize, DatabaseError> {
    let mut filled = 0;
    while filled < buffer.len() {
        match file.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn check_leaf(page_num: PageNum, page: &Page) -> Result<(), DatabaseError> {
    if node::node_type(page)? != NodeType::Leaf {
        return Err(DatabaseError::CorruptedPage {
            page_num,
            reason: "expected a leaf node".to_string(),
        });
    }
    let num_cells = LeafNode::new(page_num, page).num_cells();
    if num_cells > LEAF_NODE_MAX_CELLS {
        return Err(DatabaseError::CorruptedPage {
            page_num,
            reason: format!("leaf claims {} cells", num_cells),
        });
    }
    Ok(())
}

fn check_internal(page_num: PageNum, page: &Page) -> Result<(), DatabaseError> {
    if node::node_type(page)? != NodeType::Internal {
        return Err(DatabaseError::CorruptedPage {
            page_num,
            reason: "expected an internal node".to_string(),
        });
    }
    let num_keys = InternalNode::new(page_num, page).num_keys();
    if num_keys > INTERNAL_NODE_MAX_CELLS {
        return Err(DatabaseError::CorruptedPage {
            page_num,
            reason: format!("internal node claims {} keys", num_keys),
        });
    }
    Ok(())
}
