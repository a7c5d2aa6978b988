use crate::common::types::{PageId, SlotId};

/// Where a tuple lives: its page plus the slot within that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: SlotId,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: SlotId) -> Self {
        Self { page_id, slot }
    }
}

/// An opaque tuple payload. Field encoding is the executor's concern; the
/// storage core only moves bytes and tracks where they landed.
#[derive(Debug, Clone)]
pub struct Tuple {
    data: Vec<u8>,
    rid: Option<RecordId>,
}

impl Tuple {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, rid: None }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Set once the tuple has been placed on a page.
    pub fn set_rid(&mut self, rid: RecordId) {
        self.rid = Some(rid);
    }

    pub fn rid(&self) -> Option<RecordId> {
        self.rid
    }
}
