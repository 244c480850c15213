//! TLB gateway: flush-all, random-replacement refill, and the
//! interrupt-level scoping every TLB access must be bracketed by.

use core::ops::{Deref, DerefMut};

use crate::hal::{InterruptControl, TlbDevice};
use crate::pte::Pte;
use crate::types::VirtPageNum;

/// Holds the highest interrupt priority for as long as it's alive, and
/// restores the saved level on drop — including on an early return or a
/// panic unwinding out of the guarded section. Derefs to the wrapped HAL so
/// TLB operations can be issued directly through the guard.
pub struct IrqGuard<'h, H: ?Sized> {
    hal: &'h mut H,
    saved: u32,
}

impl<'h, H: InterruptControl + ?Sized> IrqGuard<'h, H> {
    pub fn enter(hal: &'h mut H) -> Self {
        let saved = hal.splhigh();
        Self { hal, saved }
    }
}

impl<H: InterruptControl + ?Sized> Drop for IrqGuard<'_, H> {
    fn drop(&mut self) {
        self.hal.splx(self.saved);
    }
}

impl<H: ?Sized> Deref for IrqGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.hal
    }
}

impl<H: ?Sized> DerefMut for IrqGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.hal
    }
}

/// Invalidate every TLB entry. Used on context switch (`activate` /
/// `deactivate`) and at the end of [`crate::region::RegionList::complete_load`].
pub fn flush_all<H>(hal: &mut H)
where
    H: InterruptControl + TlbDevice + ?Sized,
{
    let mut guard = IrqGuard::enter(hal);
    guard.flush_all();
}

/// Install `pte` for `vpn` via hardware random replacement.
pub fn refill<H>(hal: &mut H, vpn: VirtPageNum, pte: Pte)
where
    H: InterruptControl + TlbDevice + ?Sized,
{
    let mut guard = IrqGuard::enter(hal);
    guard.write_random(vpn, pte);
}

/// Multiprocessor TLB shootdown is a programming error in this
/// single-CPU-only design: there is never another CPU to notify.
pub fn shootdown() -> ! {
    panic!("vm: unexpected TLB shootdown request on a uniprocessor build")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHal;

    #[test]
    fn refill_restores_interrupt_level() {
        let mut hal = FakeHal::new(16);
        hal.set_irq_level(7);
        refill(&mut hal, VirtPageNum::new(3), Pte::EMPTY);
        assert_eq!(hal.irq_level(), 7);
    }

    #[test]
    fn flush_all_clears_every_slot() {
        use crate::hal::FrameAllocator;

        let mut hal = FakeHal::new(16);
        let frame = hal.alloc_frame().unwrap();
        refill(&mut hal, VirtPageNum::new(1), Pte::new(frame, true));
        flush_all(&mut hal);
        assert!(hal.tlb_is_empty());
    }

    #[test]
    #[should_panic]
    fn shootdown_panics() {
        shootdown();
    }
}
