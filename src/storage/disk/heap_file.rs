use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::common::types::{Page, PageId, PageNo, TableId, TransactionId};
use crate::storage::buffer::{BufferPool, BufferPoolError};
use crate::storage::disk::{DiskError, PageStore};
use crate::storage::page::{PageError, PageManager};
use crate::storage::tuple::{RecordId, Tuple};
use crate::transaction::concurrency::LockMode;

/// A table stored as an unordered sequence of fixed-size slotted pages.
/// Page `k` lives at byte offset `k * page_size`; the logical page count may
/// run ahead of the physical file until the extended pages are written.
pub struct HeapFile {
    table_id: TableId,
    page_size: usize,
    layout: PageManager,
    inner: Mutex<FileInner>,
}

struct FileInner {
    file: File,
    num_pages: u64,
}

impl HeapFile {
    pub fn open(path: impl AsRef<Path>, page_size: usize) -> Result<Self, DiskError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let num_pages = file.metadata()?.len() / page_size as u64;

        Ok(Self {
            table_id: table_id_for_path(path),
            page_size,
            layout: PageManager::new(page_size),
            inner: Mutex::new(FileInner { file, num_pages }),
        })
    }

    /// Identity of page `page_no` within this table.
    pub fn page_id(&self, page_no: PageNo) -> PageId {
        PageId::new(self.table_id, page_no)
    }

    fn fresh_page(&self, pid: PageId) -> Page {
        let mut page = Page::new(pid, self.page_size);
        self.layout.init_page(&mut page);
        page.set_before_image();
        page
    }
}

impl PageStore for HeapFile {
    fn table_id(&self) -> TableId {
        self.table_id
    }

    fn num_pages(&self) -> PageNo {
        self.inner.lock().num_pages as PageNo
    }

    fn read_page(&self, pid: PageId) -> Result<Page, DiskError> {
        if pid.table_id != self.table_id {
            return Err(DiskError::ForeignPage(pid));
        }

        let mut inner = self.inner.lock();
        let page_no = pid.page_no as u64;

        if page_no > inner.num_pages {
            return Err(DiskError::PageOutOfBounds(pid));
        }
        if page_no == inner.num_pages {
            // Reading one past the end extends the table by an empty page;
            // the file itself grows only when the page is written.
            inner.num_pages += 1;
            return Ok(self.fresh_page(pid));
        }

        let offset = page_no * self.page_size as u64;
        let file_len = inner.file.metadata()?.len();
        if offset >= file_len {
            // Logically extended earlier but never written.
            return Ok(self.fresh_page(pid));
        }

        let mut page = Page::new(pid, self.page_size);
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.read_exact(&mut page.data)?;
        page.set_before_image();
        Ok(page)
    }

    fn write_page(&self, page: &Page) -> Result<(), DiskError> {
        if page.id.table_id != self.table_id {
            return Err(DiskError::ForeignPage(page.id));
        }

        let mut inner = self.inner.lock();
        let page_no = page.id.page_no as u64;
        let offset = page_no * self.page_size as u64;

        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(&page.data)?;
        inner.file.flush()?;

        inner.num_pages = inner.num_pages.max(page_no + 1);
        Ok(())
    }

    fn insert_tuple(
        &self,
        txn: TransactionId,
        pool: &BufferPool,
        tuple: &mut Tuple,
    ) -> Result<Vec<PageId>, BufferPoolError> {
        // Scan for a page with room, extending the file by one page once the
        // existing ones are exhausted. Locks taken along the way are held
        // until the transaction completes.
        let mut page_no = 0;
        loop {
            let pid = self.page_id(page_no);
            let page = pool.get_page(txn, pid, LockMode::Exclusive)?;
            {
                let mut guard = page.write();
                match self.layout.insert_tuple(&mut guard, tuple.data()) {
                    Ok(slot) => {
                        tuple.set_rid(RecordId::new(pid, slot));
                        return Ok(vec![pid]);
                    }
                    Err(PageError::InsufficientSpace) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            page_no += 1;
        }
    }

    fn delete_tuple(
        &self,
        txn: TransactionId,
        pool: &BufferPool,
        tuple: &Tuple,
    ) -> Result<Vec<PageId>, BufferPoolError> {
        let rid = tuple
            .rid()
            .ok_or_else(|| BufferPoolError::InvalidOperation("tuple has no record id".into()))?;
        if rid.page_id.table_id != self.table_id {
            return Err(DiskError::ForeignPage(rid.page_id).into());
        }

        let page = pool.get_page(txn, rid.page_id, LockMode::Exclusive)?;
        self.layout.delete_tuple(&mut page.write(), rid.slot)?;
        Ok(vec![rid.page_id])
    }
}

/// Stable table id: FNV-1a over the canonical backing file path.
fn table_id_for_path(path: &Path) -> TableId {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let mut hash = FNV_OFFSET;
    for byte in canonical.to_string_lossy().as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
