//! Request tickets for views whose requests may outlive them.
//!
//! A view hands out a [`Ticket`] when it starts a request and presents it
//! again when the request settles. [`RequestGate::finish`] answers whether
//! the result may still be applied: not if the view was unmounted, and not
//! if a newer request superseded it.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct RequestGate {
    generation: u64,
    in_flight: Option<u64>,
    mounted: bool,
}

impl Default for RequestGate {
    fn default() -> Self {
        Self { generation: 0, in_flight: None, mounted: true }
    }
}

impl RequestGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request unless one is already outstanding or the view is gone.
    pub fn try_begin(&mut self) -> Option<Ticket> {
        if self.in_flight.is_some() || !self.mounted {
            return None;
        }
        Some(self.issue())
    }

    /// Start a request, invalidating any outstanding one.
    pub fn begin_superseding(&mut self) -> Ticket {
        self.issue()
    }

    /// Settle `ticket`. Returns `true` if its result should be applied.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if self.in_flight != Some(ticket.0) {
            return false;
        }
        self.in_flight = None;
        self.mounted
    }

    /// The view is going away; nothing outstanding may apply.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = None;
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn issue(&mut self) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = Some(self.generation);
        Ticket(self.generation)
    }
}
