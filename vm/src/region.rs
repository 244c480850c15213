//! The ordered list of virtual regions belonging to an address space, and
//! the load-time permission relaxation protocol (`prepare_load` /
//! `complete_load`).

use alloc::vec::Vec;

use log::{debug, trace};
use num_utils::align_up;

use crate::err::{Error, Result};
use crate::pagetable::PageTable;
use crate::types::{PermSet, VirtPageNum, PAGE_SIZE};

/// A single virtual region: a page-aligned base, a page count, the live
/// permission set, and — while a load is in progress — the permissions to
/// restore once it completes.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    vbase: VirtPageNum,
    npages: u32,
    perms: PermSet,
    saved_perms: Option<PermSet>,
}

impl Region {
    pub fn vbase(&self) -> VirtPageNum {
        self.vbase
    }

    pub fn npages(&self) -> u32 {
        self.npages
    }

    pub fn perms(&self) -> PermSet {
        self.perms
    }

    fn end(&self) -> VirtPageNum {
        VirtPageNum::new(self.vbase.as_u32() + self.npages)
    }

    fn contains(&self, vpn: VirtPageNum) -> bool {
        self.vbase <= vpn && vpn < self.end()
    }
}

/// The regions belonging to one address space, in definition order.
#[derive(Default)]
pub struct RegionList {
    regions: Vec<Region>,
}

impl RegionList {
    pub fn new() -> Self {
        Self { regions: Vec::new() }
    }

    /// Define a region covering `[vaddr, vaddr + memsize)`, rounded out to
    /// whole pages. Rejects an empty permission set.
    pub fn define(&mut self, vaddr: u32, memsize: u32, perms: PermSet) -> Result<()> {
        if perms.is_empty() {
            return Err(Error::INVALID_ARGUMENT);
        }
        let misalign = vaddr & (PAGE_SIZE as u32 - 1);
        let vbase = vaddr - misalign;
        let size = align_up((memsize + misalign) as usize, PAGE_SIZE) as u32;
        let npages = size / PAGE_SIZE as u32;

        self.regions.try_reserve(1)?;
        self.regions.push(Region {
            vbase: crate::types::VirtAddr::new(vbase).containing_page(),
            npages,
            perms,
            saved_perms: None,
        });
        debug!(
            "vm: defined region base={:#x} npages={} perms={:?}",
            vbase, npages, perms
        );
        Ok(())
    }

    /// Append a fixed-size stack region ending at `crate::types::USERSTACK`.
    pub fn define_stack(&mut self) -> Result<()> {
        use crate::types::{STACK_NPAGES, USERSTACK};
        let vbase = USERSTACK - STACK_NPAGES * PAGE_SIZE as u32;
        self.regions.try_reserve(1)?;
        self.regions.push(Region {
            vbase: crate::types::VirtAddr::new(vbase).containing_page(),
            npages: STACK_NPAGES,
            perms: PermSet::READ | PermSet::WRITE,
            saved_perms: None,
        });
        Ok(())
    }

    /// The region containing `vpn`, if any.
    pub fn find(&self, vpn: VirtPageNum) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(vpn))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn try_clone(&self) -> Result<Self> {
        let mut regions = Vec::new();
        regions.try_reserve_exact(self.regions.len())?;
        regions.extend_from_slice(&self.regions);
        Ok(Self { regions })
    }

    /// Save each region's permissions and make every region readable and
    /// writable (but not executable) for the duration of a load.
    pub fn prepare_load(&mut self) {
        trace!("vm: prepare_load over {} regions", self.regions.len());
        for r in &mut self.regions {
            r.saved_perms = Some(r.perms);
            r.perms = PermSet::READ | PermSet::WRITE;
        }
    }

    /// Restore each region's saved permissions, and for any region that
    /// ends up non-writable, clear the writable bit on every PTE already
    /// populated within it so the hardware will trap future writes.
    pub fn complete_load(&mut self, page_table: &mut PageTable) {
        for r in &mut self.regions {
            let restored = r.saved_perms.take().unwrap_or(r.perms);
            r.perms = restored;
            if !restored.contains(PermSet::WRITE) {
                trace!(
                    "vm: complete_load re-enforcing read-only on base={:?} npages={}",
                    r.vbase, r.npages
                );
                page_table.clear_dirty_range(r.vbase, r.npages);
            }
        }
    }
}
