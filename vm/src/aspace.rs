//! A process's address space: its page table, its regions, and (through
//! the page table) the physical frames it owns.

use log::debug;

use crate::err::{Error, Result};
use crate::hal::Hal;
use crate::pagetable::PageTable;
use crate::pte::Pte;
use crate::region::RegionList;
use crate::tlb;
use crate::types::{PermSet, VirtAddr};

/// Owns a page table, a region list, and transitively every physical
/// frame referenced by a valid entry in that page table.
pub struct AddressSpace {
    page_table: PageTable,
    regions: RegionList,
}

impl AddressSpace {
    /// An empty address space: no regions, no populated page-table
    /// entries.
    pub fn create() -> Result<Self> {
        Ok(Self {
            page_table: PageTable::new()?,
            regions: RegionList::new(),
        })
    }

    /// A degenerate, unusable placeholder that allocates nothing. Handed
    /// back on the error path of [`Self::copy`] when the failure occurred
    /// before any frame was copied, so the caller still has something to
    /// pass to [`Self::destroy`].
    fn stub() -> Self {
        Self {
            page_table: PageTable::empty_stub(),
            regions: RegionList::new(),
        }
    }

    pub fn define_region(&mut self, vaddr: u32, memsize: u32, perms: PermSet) -> Result<()> {
        self.regions.define(vaddr, memsize, perms)
    }

    /// Append the fixed user stack region and return its top-of-stack
    /// address.
    pub fn define_stack(&mut self) -> Result<VirtAddr> {
        self.regions.define_stack()?;
        Ok(VirtAddr::new(crate::types::USERSTACK))
    }

    pub fn prepare_load(&mut self) {
        self.regions.prepare_load();
    }

    /// Restore saved permissions and, for regions that became read-only,
    /// re-enforce that on already-populated PTEs before flushing the TLB.
    /// The ordering — PTE update before TLB flush — is mandatory; a stale
    /// writable TLB entry would otherwise outlive the permission change.
    pub fn complete_load<H: Hal + ?Sized>(&mut self, hal: &mut H) {
        self.regions.complete_load(&mut self.page_table);
        tlb::flush_all(hal);
    }

    /// Flush the TLB for a context switch into this address space.
    pub fn activate<H: Hal + ?Sized>(hal: &mut H) {
        tlb::flush_all(hal);
    }

    /// Flush the TLB for a context switch away from this address space.
    pub fn deactivate<H: Hal + ?Sized>(hal: &mut H) {
        tlb::flush_all(hal);
    }

    pub(crate) fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub(crate) fn page_table_mut(&mut self) -> &mut PageTable {
        &mut self.page_table
    }

    pub(crate) fn regions(&self) -> &RegionList {
        &self.regions
    }

    /// Deep-copy this address space: new frames for every populated page,
    /// identical region metadata and PTE status bits. On failure, returns
    /// the partially constructed target alongside the error so the caller
    /// can still [`Self::destroy`] it.
    pub fn copy<H: Hal + ?Sized>(&self, hal: &mut H) -> core::result::Result<Self, (Self, Error)> {
        let regions = match self.regions.try_clone() {
            Ok(r) => r,
            Err(e) => return Err((Self::stub(), e)),
        };
        let page_table = match PageTable::new() {
            Ok(pt) => pt,
            Err(e) => return Err((Self::stub(), e)),
        };
        let mut target = Self { page_table, regions };

        let mut failure: Option<Error> = None;
        self.page_table.for_each_populated(|vpn, src_pte| {
            if failure.is_some() {
                return;
            }
            let outcome: Result<()> = (|| {
                let dst_frame = hal.alloc_frame().ok_or(Error::OUT_OF_MEMORY)?;
                // SAFETY: `src_pte.frame()` is owned by `self` and `dst_frame`
                // was just allocated fresh, so the two frames are distinct.
                unsafe {
                    let src_bytes = *hal.frame_bytes_mut(src_pte.frame());
                    *hal.frame_bytes_mut(dst_frame) = src_bytes;
                }
                let result = target
                    .page_table
                    .insert(vpn, Pte::new(dst_frame, src_pte.is_writable()));
                if result.is_err() {
                    hal.free_frame(dst_frame);
                }
                result
            })();
            if let Err(e) = outcome {
                failure = Some(e);
            }
        });

        match failure {
            Some(e) => Err((target, e)),
            None => {
                debug!("vm: as_copy completed");
                Ok(target)
            }
        }
    }

    /// Free every frame this address space owns, then its page table and
    /// region list. Tolerates a partially constructed address space (an
    /// empty or stub page table, an empty region list).
    pub fn destroy<H: Hal + ?Sized>(self, hal: &mut H) {
        self.page_table
            .for_each_populated(|_vpn, pte| hal.free_frame(pte.frame()));
        debug!("vm: as_destroy complete");
    }
}
