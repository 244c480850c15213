//! Page-table entry encoding.
//!
//! The bit layout matches the hardware TLB low register for this
//! architecture, so a [`Pte`] can be written directly into the TLB with no
//! repacking: `PFN` occupies bits 31..12, `VALID` is bit 9, `DIRTY` is bit
//! 10 (MIPS overloads "dirty" to mean "writable" — its absence traps any
//! store).

use core::fmt;

use bitflags::bitflags;

use crate::types::{PhysFrameNum, PAGE_SHIFT};

bitflags! {
    struct PteFlags: u32 {
        const VALID = 1 << 9;
        const DIRTY = 1 << 10;
    }
}

const PFN_SHIFT: u32 = PAGE_SHIFT;
const PFN_MASK: u32 = !((1 << PFN_SHIFT) - 1);

/// A raw page-table entry. Zero means "no mapping"; any other value has
/// `VALID` set and a nonzero PFN.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Pte(u32);

impl Pte {
    /// The entry meaning "no mapping here".
    pub const EMPTY: Self = Self(0);

    /// Build a populated entry pointing at `frame`, readable, and writable
    /// iff `writable`.
    pub fn new(frame: PhysFrameNum, writable: bool) -> Self {
        let mut flags = PteFlags::VALID;
        flags.set(PteFlags::DIRTY, writable);
        let raw = (frame.as_u32() << PFN_SHIFT) | flags.bits();
        debug_assert!(raw & PFN_MASK != 0, "populated PTE must have a nonzero PFN");
        Self(raw)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_valid(self) -> bool {
        PteFlags::from_bits_truncate(self.0).contains(PteFlags::VALID)
    }

    pub fn is_writable(self) -> bool {
        PteFlags::from_bits_truncate(self.0).contains(PteFlags::DIRTY)
    }

    pub const fn frame(self) -> PhysFrameNum {
        PhysFrameNum::new((self.0 & PFN_MASK) >> PFN_SHIFT)
    }

    /// Clear the writable (`DIRTY`) bit, leaving `VALID` and the PFN
    /// untouched. A no-op on an already-empty entry.
    pub fn clear_dirty(self) -> Self {
        Self(self.0 & !PteFlags::DIRTY.bits())
    }

    /// The raw 32-bit word, laid out exactly as the hardware TLB low
    /// register expects it.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Pte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Pte(empty)");
        }
        f.debug_struct("Pte")
            .field("frame", &self.frame())
            .field("valid", &self.is_valid())
            .field("writable", &self.is_writable())
            .finish()
    }
}
