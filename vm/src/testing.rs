//! A fake implementation of [`crate::hal`]'s traits, backed by a `Vec`
//! arena of fixed-size frames. Grounded in the bump-allocator-plus-fake-RAM
//! pattern this corpus uses to exercise `no_std` paging code on the host;
//! not part of the public surface a real kernel would link against.

use alloc::vec::Vec;

use crate::hal::{DirectMap, FrameAllocator, InterruptControl, TlbDevice};
use crate::pte::Pte;
use crate::types::{PhysFrameNum, VirtPageNum, PAGE_SIZE};

#[derive(Clone, Copy)]
#[repr(align(4096))]
struct Frame([u8; PAGE_SIZE]);

/// An in-memory stand-in for physical RAM, the frame allocator, the TLB,
/// and interrupt-priority control, all in one.
pub struct FakeHal {
    arena: Vec<Frame>,
    free_list: Vec<u32>,
    in_use: usize,
    tlb: Vec<Option<(VirtPageNum, Pte)>>,
    irq_level: u32,
}

impl FakeHal {
    /// `capacity` physical frames' worth of backing storage. Frame number
    /// `0` is never handed out: it's the PTE "no mapping" sentinel, and a
    /// real frame allocator would never return it either.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: alloc::vec![Frame([0; PAGE_SIZE]); capacity + 1],
            free_list: (1..=capacity as u32).rev().collect(),
            in_use: 0,
            tlb: alloc::vec![None; 16],
            irq_level: 0,
        }
    }

    pub fn frames_in_use(&self) -> usize {
        self.in_use
    }

    pub fn set_irq_level(&mut self, level: u32) {
        self.irq_level = level;
    }

    pub fn irq_level(&self) -> u32 {
        self.irq_level
    }

    pub fn tlb_is_empty(&self) -> bool {
        self.tlb.iter().all(Option::is_none)
    }
}

impl FrameAllocator for FakeHal {
    fn alloc_frame(&mut self) -> Option<PhysFrameNum> {
        let idx = self.free_list.pop()?;
        self.in_use += 1;
        Some(PhysFrameNum::new(idx))
    }

    fn free_frame(&mut self, frame: PhysFrameNum) {
        self.in_use -= 1;
        self.free_list.push(frame.as_u32());
    }
}

impl DirectMap for FakeHal {
    unsafe fn frame_bytes_mut(&self, frame: PhysFrameNum) -> &mut [u8; PAGE_SIZE] {
        let idx = frame.as_u32() as usize;
        let ptr = self.arena.as_ptr().add(idx) as *mut Frame;
        // SAFETY: caller guarantees exclusive access to this frame's
        // contents for the lifetime of the returned reference; `idx` is a
        // frame this allocator handed out, so it is in bounds.
        unsafe { &mut (*ptr).0 }
    }
}

impl TlbDevice for FakeHal {
    fn write_random(&mut self, vpn: VirtPageNum, pte: Pte) {
        let slot = (vpn.as_u32() as usize) % self.tlb.len();
        self.tlb[slot] = Some((vpn, pte));
    }

    fn flush_all(&mut self) {
        self.tlb.fill(None);
    }
}

impl InterruptControl for FakeHal {
    fn splhigh(&mut self) -> u32 {
        core::mem::replace(&mut self.irq_level, u32::MAX)
    }

    fn splx(&mut self, level: u32) {
        self.irq_level = level;
    }
}
