//! Address/page-number newtypes and the hardware-layout constants they're
//! built from.

use core::fmt;

use bitflags::bitflags;

/// Bytes in a page. Also the alignment of every physical frame and every
/// region boundary after rounding.
pub const PAGE_SIZE: usize = 4096;
pub const PAGE_SHIFT: u32 = 12;

/// Entries in each level of the two-level page table.
pub const TABLE_SIZE: usize = 1024;

/// Fixed top-of-stack virtual address for a freshly defined user stack.
pub const USERSTACK: u32 = 0x8000_0000;

/// Pages reserved for the user stack by [`crate::aspace::AddressSpace::define_stack`].
pub const STACK_NPAGES: u32 = 16;

/// Lowest virtual address of the kernel's direct-mapped window. No user
/// region may extend past this boundary.
pub const KSEG0_BASE: u32 = 0x8000_0000;

/// A physical address. Opaque outside frame-granular arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(u32);

impl PhysAddr {
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn containing_frame(self) -> PhysFrameNum {
        PhysFrameNum(self.0 >> PAGE_SHIFT)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#010x})", self.0)
    }
}

/// A virtual address. Opaque outside page-granular arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u32);

impl VirtAddr {
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn containing_page(self) -> VirtPageNum {
        VirtPageNum(self.0 >> PAGE_SHIFT)
    }

    pub const fn page_offset(self) -> u32 {
        self.0 & (PAGE_SIZE as u32 - 1)
    }

    pub const fn is_page_aligned(self) -> bool {
        self.page_offset() == 0
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#010x})", self.0)
    }
}

/// A physical frame number: a physical address with the page offset bits
/// shifted out. The unit the frame allocator deals in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysFrameNum(u32);

impl PhysFrameNum {
    pub const fn new(pfn: u32) -> Self {
        Self(pfn)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn addr(self) -> PhysAddr {
        PhysAddr(self.0 << PAGE_SHIFT)
    }
}

impl fmt::Debug for PhysFrameNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysFrameNum({:#x})", self.0)
    }
}

/// A virtual page number: the first- and second-level page-table indices
/// packed together, with the page offset bits shifted out.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtPageNum(u32);

impl VirtPageNum {
    pub const fn new(vpn: u32) -> Self {
        Self(vpn)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn addr(self) -> VirtAddr {
        VirtAddr(self.0 << PAGE_SHIFT)
    }

    /// First-level (top-level) index, bits 9..0 of the page number (bits
    /// 31..22 of the address).
    pub const fn level1_index(self) -> usize {
        (self.0 >> 10) as usize & (TABLE_SIZE - 1)
    }

    /// Second-level (leaf) index, bits 19..10 of the page number (bits
    /// 21..12 of the address).
    pub const fn level2_index(self) -> usize {
        self.0 as usize & (TABLE_SIZE - 1)
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The first page number whose `level2_index` is zero and which is
    /// `>= self`. Used by `clear_dirty_range` to skip over absent
    /// second-level tables in one jump.
    pub const fn next_level1_boundary(self) -> Self {
        Self((self.0 | (TABLE_SIZE as u32 - 1)) + 1)
    }
}

impl fmt::Debug for VirtPageNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtPageNum({:#x})", self.0)
    }
}

bitflags! {
    /// Access permissions a region grants, and by extension the subset of
    /// accesses a populated PTE in that region should permit.
    pub struct PermSet: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXEC = 1 << 2;
    }
}
