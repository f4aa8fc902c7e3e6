//! Link controller shared between the main loop and the radio interrupt.
//!
//! Both sides lock the controller inside a critical section, so a snapshot or
//! transmit never interleaves with interrupt handling.

use core::cell::RefCell;

use defmt::{trace, warn};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal_async::digital::Wait;
use link_core::{
    LinkController, LinkError, LinkEvent, LinkHandle, LinkPacket, LinkSnapshot, Transceiver,
};

/// [`LinkController`] behind a critical-section mutex.
pub struct SharedLink<R> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<LinkController<R>>>,
}

impl<R: Transceiver> SharedLink<R> {
    pub const fn new(link: LinkController<R>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(link)),
        }
    }

    /// Service one interrupt edge.
    ///
    /// Returns `None` if the controller was borrowed, which only happens if a
    /// caller re-enters from inside another access.
    pub fn handle_interrupt(&self) -> Option<LinkEvent> {
        self.inner.lock(|cell| {
            cell.try_borrow_mut()
                .ok()
                .map(|mut link| link.handle_interrupt())
        })
    }
}

impl<R: Transceiver> LinkHandle for SharedLink<R> {
    type Error = LinkError<R::Error>;

    fn transmit(&self, packet: &LinkPacket) -> Result<(), Self::Error> {
        self.inner.lock(|cell| LinkHandle::transmit(cell, packet))
    }

    fn snapshot(&self) -> LinkSnapshot {
        self.inner.lock(|cell| LinkHandle::snapshot(cell))
    }
}

/// Service the active-low IRQ line for as long as it is asserted.
///
/// The line is level-triggered: it stays low until every flag is cleared, so
/// this waits for the level rather than an edge. Never returns.
pub async fn service_interrupts<W, R>(irq: &mut W, link: &SharedLink<R>)
where
    W: Wait,
    R: Transceiver,
{
    loop {
        if let Err(e) = irq.wait_for_low().await {
            warn!("IRQ line error: {:?}", defmt::Debug2Format(&e));
            continue;
        }

        match link.handle_interrupt() {
            Some(event) if event.stalled => warn!("Radio status stalled"),
            Some(event) => trace!(
                "IRQ status={=u8:#x} sample={} quality={}",
                event.status.raw(),
                event.sample,
                event.link_quality
            ),
            None => warn!("Link busy, interrupt dropped"),
        }

        // A line still held low must not starve the main loop
        yield_now().await;
    }
}
