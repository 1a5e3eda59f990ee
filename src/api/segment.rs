//! Byte-segment views over parameter blocks
//!
//! The vendor driver hands out foreign memory holding its parameter
//! structures. This mirror keeps one owned block per device and exposes the
//! same addressing model: typed little-endian field accessors, sub-structure
//! slicing, and repetition indexing over arrays of fixed-stride records.
//!
//! Access outside the mapped range is a contract violation, not a
//! recoverable error - it panics the way a wild pointer would fault.

use std::sync::{Arc, Mutex};

/// Bounds-checked view over a shared parameter byte block.
///
/// Cloning a segment yields another view over the same bytes; a slice shares
/// storage with its parent block, so a write through a sub-structure view is
/// observed through the composite view and vice versa.
#[derive(Clone)]
pub struct Segment {
    block: Arc<Mutex<Box<[u8]>>>,
    offset: usize,
    len: usize,
}

impl Segment {
    /// Allocates a zero-filled block of `len` bytes.
    pub fn allocate(len: usize) -> Self {
        Self {
            block: Arc::new(Mutex::new(vec![0u8; len].into_boxed_slice())),
            offset: 0,
            len,
        }
    }

    /// Length of this view in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when both views address the same underlying block.
    pub fn shares_block(&self, other: &Segment) -> bool {
        Arc::ptr_eq(&self.block, &other.block)
    }

    /// Exposes an embedded sub-structure as an independently addressable view.
    pub fn slice(&self, offset: usize, len: usize) -> Segment {
        assert!(
            offset + len <= self.len,
            "slice {}..{} outside mapped segment of {} bytes",
            offset,
            offset + len,
            self.len
        );

        Segment {
            block: Arc::clone(&self.block),
            offset: self.offset + offset,
            len,
        }
    }

    /// Addresses the `index`-th record in an array of `stride`-byte records.
    pub fn index(&self, index: usize, stride: usize) -> Segment {
        self.slice(index * stride, stride)
    }

    pub fn get_u8(&self, offset: usize) -> u8 {
        let mut bytes = [0u8; 1];
        self.read(offset, &mut bytes);
        bytes[0]
    }

    pub fn set_u8(&self, offset: usize, value: u8) {
        self.write(offset, &[value]);
    }

    /// Single-byte flag accessor; any non-zero byte reads as set.
    pub fn get_flag(&self, offset: usize) -> bool {
        self.get_u8(offset) != 0
    }

    pub fn set_flag(&self, offset: usize, value: bool) {
        self.set_u8(offset, u8::from(value));
    }

    pub fn get_u16(&self, offset: usize) -> u16 {
        let mut bytes = [0u8; 2];
        self.read(offset, &mut bytes);
        u16::from_le_bytes(bytes)
    }

    pub fn set_u16(&self, offset: usize, value: u16) {
        self.write(offset, &value.to_le_bytes());
    }

    pub fn get_u32(&self, offset: usize) -> u32 {
        let mut bytes = [0u8; 4];
        self.read(offset, &mut bytes);
        u32::from_le_bytes(bytes)
    }

    pub fn set_u32(&self, offset: usize, value: u32) {
        self.write(offset, &value.to_le_bytes());
    }

    pub fn get_i32(&self, offset: usize) -> i32 {
        let mut bytes = [0u8; 4];
        self.read(offset, &mut bytes);
        i32::from_le_bytes(bytes)
    }

    pub fn set_i32(&self, offset: usize, value: i32) {
        self.write(offset, &value.to_le_bytes());
    }

    pub fn get_f32(&self, offset: usize) -> f32 {
        let mut bytes = [0u8; 4];
        self.read(offset, &mut bytes);
        f32::from_le_bytes(bytes)
    }

    pub fn set_f32(&self, offset: usize, value: f32) {
        self.write(offset, &value.to_le_bytes());
    }

    pub fn get_f64(&self, offset: usize) -> f64 {
        let mut bytes = [0u8; 8];
        self.read(offset, &mut bytes);
        f64::from_le_bytes(bytes)
    }

    pub fn set_f64(&self, offset: usize, value: f64) {
        self.write(offset, &value.to_le_bytes());
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        self.check(offset, out.len());
        let block = self.block.lock().expect("parameter block lock poisoned");
        let start = self.offset + offset;
        out.copy_from_slice(&block[start..start + out.len()]);
    }

    fn write(&self, offset: usize, bytes: &[u8]) {
        self.check(offset, bytes.len());
        let mut block = self.block.lock().expect("parameter block lock poisoned");
        let start = self.offset + offset;
        block[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn check(&self, offset: usize, size: usize) {
        if offset + size > self.len {
            panic!(
                "field access at {}+{} outside mapped segment of {} bytes",
                offset, size, self.len
            );
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trips() {
        let seg = Segment::allocate(64);

        seg.set_u32(0, 0xDEAD_BEEF);
        assert_eq!(seg.get_u32(0), 0xDEAD_BEEF);

        seg.set_i32(4, -42);
        assert_eq!(seg.get_i32(4), -42);

        seg.set_f32(8, 19.25);
        assert_eq!(seg.get_f32(8), 19.25);

        seg.set_f64(16, 100_300_000.0);
        assert_eq!(seg.get_f64(16), 100_300_000.0);

        seg.set_flag(24, true);
        assert!(seg.get_flag(24));
        seg.set_flag(24, false);
        assert!(!seg.get_flag(24));

        seg.set_u16(26, 0xBEEF);
        assert_eq!(seg.get_u16(26), 0xBEEF);
    }

    #[test]
    fn test_slice_shares_storage_with_parent() {
        let parent = Segment::allocate(32);
        let child = parent.slice(8, 8);

        child.set_u32(0, 1234);
        assert_eq!(parent.get_u32(8), 1234);

        parent.set_u32(12, 5678);
        assert_eq!(child.get_u32(4), 5678);

        assert!(parent.shares_block(&child));
    }

    #[test]
    fn test_repetition_indexing() {
        let array = Segment::allocate(4 * 12);

        for i in 0..4 {
            array.index(i, 12).set_u32(0, i as u32 * 10);
            array.index(i, 12).set_f32(4, i as f32 + 0.5);
        }

        for i in 0..4 {
            let record = array.index(i, 12);
            assert_eq!(record.get_u32(0), i as u32 * 10);
            assert_eq!(record.get_f32(4), i as f32 + 0.5);
        }
    }

    #[test]
    #[should_panic(expected = "outside mapped segment")]
    fn test_unmapped_access_is_fatal() {
        let seg = Segment::allocate(8);
        seg.get_u32(6);
    }

    #[test]
    #[should_panic(expected = "outside mapped segment")]
    fn test_slice_beyond_block_is_fatal() {
        let seg = Segment::allocate(16);
        seg.slice(8, 12);
    }
}
