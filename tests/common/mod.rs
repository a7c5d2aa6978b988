use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tempfile::NamedTempFile;

use shaledb::{BufferPool, HeapFile, StorageConfig};

// Short deadlock timeout so contention tests fail fast.
#[allow(dead_code)]
pub fn test_config(pool_capacity: usize) -> StorageConfig {
    StorageConfig {
        pool_capacity,
        deadlock_timeout: Duration::from_millis(300),
        ..StorageConfig::default()
    }
}

// Create a heap file backed by a temporary database file
#[allow(dead_code)]
pub fn create_heap_file(page_size: usize) -> Result<(Arc<HeapFile>, NamedTempFile)> {
    let file = NamedTempFile::new()?;
    let heap = Arc::new(HeapFile::open(file.path(), page_size)?);
    Ok((heap, file))
}

// Create a buffer pool with one registered table on a temporary file
#[allow(dead_code)]
pub fn create_test_pool(capacity: usize) -> Result<(Arc<BufferPool>, Arc<HeapFile>, NamedTempFile)> {
    let config = test_config(capacity);
    let (heap, file) = create_heap_file(config.page_size)?;
    let pool = Arc::new(BufferPool::new(&config));
    pool.register_file(heap.clone());
    Ok((pool, heap, file))
}

// Encode a row-shaped payload; the core treats it as opaque bytes
#[allow(dead_code)]
pub fn tuple_bytes(id: i64, name: &str) -> Vec<u8> {
    bincode::serialize(&(id, name.to_string())).expect("serialize tuple payload")
}
