use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use tracing::debug;
use tracing::warn;

use crate::errors::PinError;
use crate::errors::Result;
use crate::factory::PinFactory;
use crate::handle::CpuPin;
use crate::CpuId;

/// Identifier list that yields a selector which never pins
pub const NO_PINS: &[CpuId] = &[];

/// Round-robin selector over a fixed list of pre-materialized CPU pins
///
/// The identifier and handle lists are immutable after construction. The only
/// mutable state is `cursor`, advanced with a single `fetch_add` per consume, so
/// the selector can be shared across threads (e.g. behind an `Arc`) without
/// any external locking.
///
/// `current` and `peek_next` read the cursor with a plain load. They are
/// snapshots and may be stale by the time they return if other threads are
/// consuming concurrently; callers that need a definite slot must use
/// `next_pin` / `next_ticket`.
pub struct CyclicPinSelector<H> {
    /// CPU identifiers in caller order
    cpu_ids: Box<[CpuId]>,

    /// One handle per identifier, same order
    pins: Box<[H]>,

    /// Number of consumes so far (wrapping)
    cursor: AtomicUsize,
}

/// The outcome of a single consume: which ticket was drawn and where it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinTicket<'a, H> {
    /// Pre-increment cursor value owned by this call
    pub ticket: usize,

    /// Index into the handle list (`ticket % len`)
    pub slot: usize,

    pub cpu_id: CpuId,
    pub handle: &'a H,
}

impl<H> CyclicPinSelector<H> {
    /// Build a selector, materializing one handle per identifier in order
    ///
    /// Stops at the first factory failure; no selector is returned and the
    /// factory is not called for the remaining identifiers.
    pub fn new<F>(cpu_ids: &[CpuId], factory: &F) -> Result<Self>
    where
        F: PinFactory<Handle = H>,
    {
        let pins = cpu_ids
            .iter()
            .enumerate()
            .map(|(index, &cpu_id)| {
                factory.materialize(cpu_id).map_err(|err| {
                    warn!("Pin factory rejected CPU {} at position {}: {}", cpu_id, index, err);
                    PinError::Materialize { cpu_id, index, source: Box::new(err) }
                })
            })
            .collect::<Result<Box<[H]>>>()?;

        debug!("Materialized {} CPU pins from {:?}", pins.len(), cpu_ids);

        Ok(Self { cpu_ids: cpu_ids.into(), pins, cursor: AtomicUsize::new(0) })
    }

    /// A selector with no pins; every query yields `CpuPin::Noop`
    pub fn empty() -> Self {
        Self { cpu_ids: NO_PINS.into(), pins: Box::new([]), cursor: AtomicUsize::new(0) }
    }

    /// True while there is anything to select from
    ///
    /// This never turns false for a non-empty selector: pins are reused forever.
    #[inline]
    pub fn has_next(&self) -> bool {
        !self.pins.is_empty()
    }

    /// Consume the next pin in round-robin order
    #[inline]
    pub fn next_pin(&self) -> CpuPin<&H> {
        match self.next_ticket() {
            Some(ticket) => CpuPin::Cpu(ticket.handle),
            None => CpuPin::Noop,
        }
    }

    /// Consume the next pin and report the ticket it was drawn with
    ///
    /// Returns `None` without touching the cursor when there are no pins.
    #[inline]
    pub fn next_ticket(&self) -> Option<PinTicket<'_, H>> {
        if !self.has_next() {
            return None;
        }

        let ticket = self.cursor.fetch_add(1, Ordering::Relaxed);
        let slot = self.slot_of(ticket);

        Some(PinTicket { ticket, slot, cpu_id: self.cpu_ids[slot], handle: &self.pins[slot] })
    }

    /// The pin the most recent `next_pin` returned, or the first pin before any consume
    pub fn current(&self) -> CpuPin<&H> {
        if !self.has_next() {
            return CpuPin::Noop;
        }

        // A zero cursor means nothing has been consumed yet (or the counter
        // wrapped exactly onto zero); both report the first slot.
        let consumed = self.cursor.load(Ordering::Relaxed);
        let slot = if consumed == 0 { 0 } else { self.slot_of(consumed.wrapping_sub(1)) };

        CpuPin::Cpu(&self.pins[slot])
    }

    /// The pin the next `next_pin` would return, without consuming it
    pub fn peek_next(&self) -> CpuPin<&H> {
        if !self.has_next() {
            return CpuPin::Noop;
        }

        // (last consumed + 1) mod len, where the cursor already holds last + 1
        let slot = self.slot_of(self.cursor.load(Ordering::Relaxed));

        CpuPin::Cpu(&self.pins[slot])
    }

    /// Removal is meaningless on an immutable pin list and always fails
    pub fn remove(&self) -> Result<()> {
        warn!("Attempted to remove a pin from a cyclic selector over {} CPUs", self.pins.len());
        Err(PinError::Unsupported("remove"))
    }

    /// Infinite round-robin iterator consuming from this selector
    pub fn iter(&self) -> PinIter<'_, H> {
        PinIter { selector: self }
    }

    pub fn cpu_ids(&self) -> &[CpuId] {
        &self.cpu_ids
    }

    pub fn pins(&self) -> &[H] {
        &self.pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Raw cursor snapshot: the ticket the next consume will draw
    pub fn consumed(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Only valid for a non-empty selector; an unsigned cursor keeps the
    /// result in `0..len` even after wrapping.
    #[inline(always)]
    fn slot_of(&self, ticket: usize) -> usize {
        ticket % self.pins.len()
    }

    #[cfg(test)]
    pub(crate) fn with_cursor(self, cursor: usize) -> Self {
        self.cursor.store(cursor, Ordering::Relaxed);
        self
    }
}

impl<H> Default for CyclicPinSelector<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H> fmt::Debug for CyclicPinSelector<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CyclicPinSelector").field("cpu_ids", &self.cpu_ids).field("cursor", &self.consumed()).finish()
    }
}

/// Iterator view of a selector
///
/// Yields nothing for an empty selector and never ends otherwise. Every item
/// is a real consume, so iterating from several threads interleaves with
/// `next_pin` calls made elsewhere.
pub struct PinIter<'a, H> {
    selector: &'a CyclicPinSelector<H>,
}

impl<'a, H> Iterator for PinIter<'a, H> {
    type Item = &'a H;

    #[inline]
    fn next(&mut self) -> Option<&'a H> {
        self.selector.next_ticket().map(|ticket| ticket.handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.selector.has_next() { (usize::MAX, None) } else { (0, Some(0)) }
    }
}

impl<H> FusedIterator for PinIter<'_, H> {}

impl<'a, H> IntoIterator for &'a CyclicPinSelector<H> {
    type Item = &'a H;
    type IntoIter = PinIter<'a, H>;

    fn into_iter(self) -> PinIter<'a, H> {
        self.iter()
    }
}
