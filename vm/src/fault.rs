//! TLB-refill fault servicing.

use log::{trace, warn};

use crate::aspace::AddressSpace;
use crate::err::{Error, Result};
use crate::hal::Hal;
use crate::pte::Pte;
use crate::tlb;
use crate::types::{PermSet, VirtAddr};

/// The hardware condition that produced a fault. Note that there is no
/// `Other` variant: an unrecognized fault kind simply isn't representable,
/// which replaces the source's `INVALID_ARGUMENT` runtime check with a
/// compile-time guarantee.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FaultKind {
    Read,
    Write,
    /// The hardware itself rejected a store to a read-only page before
    /// this subsystem was consulted.
    ReadOnlyViolation,
}

/// Service a TLB-refill fault at `vaddr`. `aspace` is `None` when there is
/// no current process (e.g. during early boot), which is always a
/// protection fault.
pub fn vm_fault<H>(
    hal: &mut H,
    aspace: Option<&mut AddressSpace>,
    kind: FaultKind,
    vaddr: VirtAddr,
) -> Result<()>
where
    H: Hal + ?Sized,
{
    if kind == FaultKind::ReadOnlyViolation {
        warn!("vm: read-only violation at {vaddr:?}");
        return Err(Error::PROTECTION_FAULT);
    }

    let aspace = aspace.ok_or(Error::PROTECTION_FAULT)?;
    let vpn = vaddr.containing_page();

    let existing = aspace.page_table().lookup(vpn);
    if !existing.is_empty() {
        trace!("vm: fault at {vaddr:?} hit existing mapping");
        tlb::refill(hal, vpn, existing);
        return Ok(());
    }

    let region = aspace.regions().find(vpn).ok_or(Error::PROTECTION_FAULT)?;
    let writable = region.perms().contains(PermSet::WRITE);

    let frame = hal.alloc_frame().ok_or(Error::OUT_OF_MEMORY)?;
    // SAFETY: `frame` was just allocated and is not yet referenced by any
    // PTE, so this subsystem has exclusive access to its contents.
    unsafe {
        hal.frame_bytes_mut(frame).fill(0);
    }

    let pte = Pte::new(frame, writable);
    if let Err(e) = aspace.page_table_mut().insert(vpn, pte) {
        hal.free_frame(frame);
        return Err(e);
    }

    trace!("vm: fault at {vaddr:?} first-touch allocated {frame:?}");
    tlb::refill(hal, vpn, pte);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHal;
    use crate::types::PermSet;

    #[test]
    fn fault_with_no_current_address_space_is_protection_fault() {
        let mut hal = FakeHal::new(4);
        let err = vm_fault(&mut hal, None, FaultKind::Read, VirtAddr::new(0x400000)).unwrap_err();
        assert_eq!(err, Error::PROTECTION_FAULT);
    }

    #[test]
    fn readonly_violation_kind_is_always_rejected() {
        let mut hal = FakeHal::new(4);
        let mut aspace = AddressSpace::create().unwrap();
        aspace.define_region(0x400000, 4096, PermSet::READ).unwrap();
        let err = vm_fault(
            &mut hal,
            Some(&mut aspace),
            FaultKind::ReadOnlyViolation,
            VirtAddr::new(0x400000),
        )
        .unwrap_err();
        assert_eq!(err, Error::PROTECTION_FAULT);
    }

    #[test]
    fn first_touch_zero_fills_the_frame() {
        let mut hal = FakeHal::new(4);
        let mut aspace = AddressSpace::create().unwrap();
        aspace
            .define_region(0x400000, 4096, PermSet::READ | PermSet::WRITE)
            .unwrap();
        vm_fault(&mut hal, Some(&mut aspace), FaultKind::Write, VirtAddr::new(0x400005)).unwrap();

        let vpn = VirtAddr::new(0x400005).containing_page();
        let frame = aspace.page_table().lookup(vpn).frame();
        unsafe {
            assert!(hal.frame_bytes_mut(frame).iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn out_of_memory_propagates_and_does_not_insert() {
        let mut hal = FakeHal::new(0);
        let mut aspace = AddressSpace::create().unwrap();
        aspace
            .define_region(0x400000, 4096, PermSet::READ | PermSet::WRITE)
            .unwrap();
        let err = vm_fault(&mut hal, Some(&mut aspace), FaultKind::Read, VirtAddr::new(0x400000))
            .unwrap_err();
        assert_eq!(err, Error::OUT_OF_MEMORY);
        assert!(aspace.page_table().lookup(VirtAddr::new(0x400000).containing_page()).is_empty());
    }
}
