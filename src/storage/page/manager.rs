use crate::common::types::{Page, SlotId};
use crate::storage::page::error::PageError;
use crate::storage::page::header::PageHeader;
use crate::storage::page::layout::{TupleSlot, HEADER_SIZE, SLOT_SIZE};

/// Packs tuples into slotted pages of a fixed size. Slots grow from the end
/// of the page toward the header; tuple data grows forward from the header.
pub struct PageManager {
    page_size: usize,
}

impl PageManager {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    pub fn init_page(&self, page: &mut Page) {
        let header = PageHeader::new(self.page_size);
        page.data[0..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    }

    /// Insert a tuple, reusing a dead slot when one exists. Returns the slot
    /// id the tuple landed in.
    pub fn insert_tuple(&self, page: &mut Page, data: &[u8]) -> Result<SlotId, PageError> {
        if data.len() + SLOT_SIZE > self.page_size - HEADER_SIZE {
            return Err(PageError::TupleTooLarge);
        }

        let mut header = self.header(page);
        let length = data.len() as u32;

        // A dead slot costs only the payload bytes; its slot entry already
        // exists at the page tail.
        for slot_id in 0..header.slot_count {
            let slot_pos = self.slot_position(slot_id);
            let slot = TupleSlot::from_bytes(&page.data[slot_pos..slot_pos + SLOT_SIZE]);
            if slot.length != 0 || header.free_space_size < length {
                continue;
            }

            let start = header.free_space_offset as usize;
            page.data[start..start + data.len()].copy_from_slice(data);
            let slot = TupleSlot {
                offset: header.free_space_offset,
                length,
            };
            page.data[slot_pos..slot_pos + SLOT_SIZE].copy_from_slice(&slot.to_bytes());

            header.free_space_offset += length;
            header.free_space_size -= length;
            page.data[0..HEADER_SIZE].copy_from_slice(&header.to_bytes());
            return Ok(slot_id);
        }

        if (header.free_space_size as usize) < data.len() + SLOT_SIZE {
            return Err(PageError::InsufficientSpace);
        }

        let start = header.free_space_offset as usize;
        page.data[start..start + data.len()].copy_from_slice(data);

        let slot_pos = self.slot_position(header.slot_count);
        let slot = TupleSlot {
            offset: header.free_space_offset,
            length,
        };
        page.data[slot_pos..slot_pos + SLOT_SIZE].copy_from_slice(&slot.to_bytes());

        header.free_space_offset += length;
        header.free_space_size -= length + SLOT_SIZE as u32;
        header.slot_count += 1;
        page.data[0..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        Ok(header.slot_count - 1)
    }

    /// Delete a tuple by zeroing its slot length. The payload bytes are not
    /// reclaimed; the slot itself is reused by later inserts.
    pub fn delete_tuple(&self, page: &mut Page, slot_id: SlotId) -> Result<(), PageError> {
        let header = self.header(page);
        if slot_id >= header.slot_count {
            return Err(PageError::InvalidSlot);
        }

        let slot_pos = self.slot_position(slot_id);
        let mut slot = TupleSlot::from_bytes(&page.data[slot_pos..slot_pos + SLOT_SIZE]);
        if slot.length == 0 {
            return Err(PageError::TupleNotFound);
        }

        slot.length = 0;
        page.data[slot_pos..slot_pos + SLOT_SIZE].copy_from_slice(&slot.to_bytes());
        Ok(())
    }

    pub fn get_tuple(&self, page: &Page, slot_id: SlotId) -> Result<Vec<u8>, PageError> {
        let header = self.header(page);
        if slot_id >= header.slot_count {
            return Err(PageError::InvalidSlot);
        }

        let slot_pos = self.slot_position(slot_id);
        let slot = TupleSlot::from_bytes(&page.data[slot_pos..slot_pos + SLOT_SIZE]);
        if slot.length == 0 {
            return Err(PageError::TupleNotFound);
        }

        let start = slot.offset as usize;
        let end = start + slot.length as usize;
        Ok(page.data[start..end].to_vec())
    }

    /// All live tuples on the page, in slot order.
    pub fn tuples(&self, page: &Page) -> Vec<(SlotId, Vec<u8>)> {
        let header = self.header(page);
        let mut out = Vec::new();
        for slot_id in 0..header.slot_count {
            let slot_pos = self.slot_position(slot_id);
            let slot = TupleSlot::from_bytes(&page.data[slot_pos..slot_pos + SLOT_SIZE]);
            if slot.length == 0 {
                continue;
            }
            let start = slot.offset as usize;
            let end = start + slot.length as usize;
            out.push((slot_id, page.data[start..end].to_vec()));
        }
        out
    }

    pub fn free_space(&self, page: &Page) -> u32 {
        self.header(page).free_space_size
    }

    pub fn header(&self, page: &Page) -> PageHeader {
        PageHeader::from_bytes(&page.data[0..HEADER_SIZE])
    }

    fn slot_position(&self, slot_id: SlotId) -> usize {
        self.page_size - SLOT_SIZE * (slot_id as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::PageId;

    const PAGE_SIZE: usize = 4096;

    fn empty_page() -> (PageManager, Page) {
        let manager = PageManager::new(PAGE_SIZE);
        let mut page = Page::new(PageId::new(1, 0), PAGE_SIZE);
        manager.init_page(&mut page);
        (manager, page)
    }

    #[test]
    fn test_init_page_free_space() {
        let (manager, page) = empty_page();
        assert_eq!(manager.free_space(&page), (PAGE_SIZE - HEADER_SIZE) as u32);
        assert_eq!(manager.header(&page).slot_count, 0);
    }

    #[test]
    fn test_insert_and_get_tuple() {
        let (manager, mut page) = empty_page();
        let slot = manager.insert_tuple(&mut page, b"hello").unwrap();
        assert_eq!(slot, 0);
        assert_eq!(manager.get_tuple(&page, slot).unwrap(), b"hello");

        let other = manager.insert_tuple(&mut page, b"world").unwrap();
        assert_eq!(other, 1);
        assert_eq!(manager.tuples(&page).len(), 2);
    }

    #[test]
    fn test_delete_tuple() {
        let (manager, mut page) = empty_page();
        let slot = manager.insert_tuple(&mut page, b"hello").unwrap();
        manager.delete_tuple(&mut page, slot).unwrap();

        assert!(matches!(
            manager.get_tuple(&page, slot),
            Err(PageError::TupleNotFound)
        ));
        assert!(matches!(
            manager.delete_tuple(&mut page, slot),
            Err(PageError::TupleNotFound)
        ));
        assert!(manager.tuples(&page).is_empty());
    }

    #[test]
    fn test_insert_reuses_dead_slot() {
        let (manager, mut page) = empty_page();
        manager.insert_tuple(&mut page, b"aaa").unwrap();
        let slot = manager.insert_tuple(&mut page, b"bbb").unwrap();
        manager.insert_tuple(&mut page, b"ccc").unwrap();

        manager.delete_tuple(&mut page, slot).unwrap();
        let reused = manager.insert_tuple(&mut page, b"ddd").unwrap();
        assert_eq!(reused, slot);
        assert_eq!(manager.get_tuple(&page, reused).unwrap(), b"ddd");
        assert_eq!(manager.header(&page).slot_count, 3);
    }

    #[test]
    fn test_insert_fills_page() {
        let (manager, mut page) = empty_page();
        let data = vec![7u8; 512];
        let mut inserted = 0;
        loop {
            match manager.insert_tuple(&mut page, &data) {
                Ok(_) => inserted += 1,
                Err(PageError::InsufficientSpace) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(inserted > 0);
        assert_eq!(manager.tuples(&page).len(), inserted);
    }

    #[test]
    fn test_oversized_tuple_rejected() {
        let (manager, mut page) = empty_page();
        let data = vec![0u8; PAGE_SIZE];
        assert!(matches!(
            manager.insert_tuple(&mut page, &data),
            Err(PageError::TupleTooLarge)
        ));
    }

    #[test]
    fn test_invalid_slot() {
        let (manager, page) = empty_page();
        assert!(matches!(
            manager.get_tuple(&page, 3),
            Err(PageError::InvalidSlot)
        ));
    }
}
