use byteorder::{ByteOrder, LittleEndian};

pub const HEADER_SIZE: usize = 12; // 4 bytes per field * 3 fields
pub const SLOT_SIZE: usize = 8; // 4 bytes for offset + 4 bytes for length

/// Location of one tuple within the page. Slots are stored from the end of
/// the page; tuple data is stored from the beginning (after the header).
/// A length of zero marks a dead slot.
#[derive(Debug, Clone, Copy)]
pub struct TupleSlot {
    pub offset: u32,
    pub length: u32,
}

impl TupleSlot {
    pub fn to_bytes(&self) -> [u8; SLOT_SIZE] {
        let mut bytes = [0u8; SLOT_SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.offset);
        LittleEndian::write_u32(&mut bytes[4..8], self.length);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let offset = LittleEndian::read_u32(&bytes[0..4]);
        let length = LittleEndian::read_u32(&bytes[4..8]);
        Self { offset, length }
    }
}
