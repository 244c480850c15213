//! Per-process virtual memory: a two-level software-managed page table, a
//! region-based permission model, demand-paged TLB-refill fault handling,
//! and the load-time read-only relaxation protocol an executable loader
//! needs while populating a fresh address space.
//!
//! Hardware and allocator collaborators ([`hal::FrameAllocator`],
//! [`hal::DirectMap`], [`hal::TlbDevice`], [`hal::InterruptControl`]) are
//! consumed as trait parameters rather than globals; nothing in this crate
//! reaches for a "current CPU" or "current process" outside what callers
//! pass in explicitly.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod aspace;
pub mod err;
pub mod fault;
pub mod hal;
pub mod pagetable;
pub mod pte;
pub mod region;
#[cfg(test)]
pub mod testing;
pub mod tlb;
pub mod types;

pub use aspace::AddressSpace;
pub use err::{Error, Result};
pub use fault::{vm_fault, FaultKind};
pub use pte::Pte;
pub use types::{PermSet, PhysAddr, PhysFrameNum, VirtAddr, VirtPageNum};
