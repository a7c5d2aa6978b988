use anyhow::Result;

mod common;
use common::create_heap_file;

use shaledb::{DiskError, HeapFile, PageId, PageManager, PageStore};

const PAGE_SIZE: usize = 4096;

#[test]
fn test_write_then_read_round_trip() -> Result<()> {
    let (heap, file) = create_heap_file(PAGE_SIZE)?;

    let mut page = heap.read_page(heap.page_id(0))?;
    page.data[100..108].copy_from_slice(b"RoundTrp");
    heap.write_page(&page)?;

    let reread = heap.read_page(heap.page_id(0))?;
    assert_eq!(&reread.data[..], &page.data[..]);
    assert_eq!(heap.num_pages(), 1);
    assert_eq!(std::fs::metadata(file.path())?.len(), PAGE_SIZE as u64);

    Ok(())
}

#[test]
fn test_read_past_end_extends_logically() -> Result<()> {
    let (heap, file) = create_heap_file(PAGE_SIZE)?;
    assert_eq!(heap.num_pages(), 0);

    // Reading page 0 of an empty file yields a fresh empty page and bumps
    // the logical count; nothing is persisted yet.
    let page = heap.read_page(heap.page_id(0))?;
    assert_eq!(heap.num_pages(), 1);
    assert_eq!(std::fs::metadata(file.path())?.len(), 0);

    let layout = PageManager::new(PAGE_SIZE);
    assert!(layout.tuples(&page).is_empty());

    // The extended-but-unwritten page reads as empty again.
    let again = heap.read_page(heap.page_id(0))?;
    assert!(layout.tuples(&again).is_empty());
    assert_eq!(heap.num_pages(), 1);

    Ok(())
}

#[test]
fn test_read_out_of_bounds() -> Result<()> {
    let (heap, _file) = create_heap_file(PAGE_SIZE)?;
    assert!(matches!(
        heap.read_page(heap.page_id(3)),
        Err(DiskError::PageOutOfBounds(_))
    ));
    Ok(())
}

#[test]
fn test_foreign_page_rejected() -> Result<()> {
    let (heap, _file) = create_heap_file(PAGE_SIZE)?;
    let foreign = PageId::new(heap.table_id().wrapping_add(1), 0);
    assert!(matches!(
        heap.read_page(foreign),
        Err(DiskError::ForeignPage(_))
    ));
    Ok(())
}

#[test]
fn test_table_id_stable_across_opens() -> Result<()> {
    let (heap, file) = create_heap_file(PAGE_SIZE)?;
    let reopened = HeapFile::open(file.path(), PAGE_SIZE)?;
    assert_eq!(heap.table_id(), reopened.table_id());
    Ok(())
}

#[test]
fn test_reopen_sees_written_pages() -> Result<()> {
    let (heap, file) = create_heap_file(PAGE_SIZE)?;

    let layout = PageManager::new(PAGE_SIZE);
    let mut page = heap.read_page(heap.page_id(0))?;
    layout.insert_tuple(&mut page, b"persisted")?;
    heap.write_page(&page)?;

    let reopened = HeapFile::open(file.path(), PAGE_SIZE)?;
    assert_eq!(reopened.num_pages(), 1);
    let reread = reopened.read_page(reopened.page_id(0))?;
    let tuples = layout.tuples(&reread);
    assert_eq!(tuples.len(), 1);
    assert_eq!(tuples[0].1, b"persisted");

    Ok(())
}
