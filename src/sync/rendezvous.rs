//! Lock-step hand-off between the generator and dispatcher loops.
//!
//! Each side owns a binary "done" signal. Entering a turn acquires the
//! partner's signal; leaving it releases the side's own. With exactly one
//! signal available at any time the two sides strictly alternate and never
//! poll.

use super::semaphore::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Generator,
    Dispatcher,
}

impl Side {
    pub fn partner(self) -> Side {
        match self {
            Side::Generator => Side::Dispatcher,
            Side::Dispatcher => Side::Generator,
        }
    }
}

#[derive(Debug)]
pub struct Rendezvous {
    generator_done: Semaphore,
    dispatcher_done: Semaphore,
}

impl Rendezvous {
    /// The generator takes the first turn.
    pub fn new() -> Self {
        Self::starting_with(Side::Generator)
    }

    pub fn starting_with(first: Side) -> Self {
        let rendezvous = Self {
            generator_done: Semaphore::new(0),
            dispatcher_done: Semaphore::new(0),
        };
        // The first side may enter because its partner is "done".
        rendezvous.done(first.partner()).release();
        rendezvous
    }

    /// Block until it is `side`'s turn.
    pub fn enter(&self, side: Side) -> Turn<'_> {
        self.done(side.partner()).acquire();
        tracing::trace!(side = ?side, "turn acquired");
        Turn {
            rendezvous: self,
            side,
        }
    }

    fn done(&self, side: Side) -> &Semaphore {
        match side {
            Side::Generator => &self.generator_done,
            Side::Dispatcher => &self.dispatcher_done,
        }
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive turn held by one side. Dropping it hands the turn over.
#[derive(Debug)]
pub struct Turn<'a> {
    rendezvous: &'a Rendezvous,
    side: Side,
}

impl Turn<'_> {
    pub fn side(&self) -> Side {
        self.side
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        self.rendezvous.done(self.side).release();
    }
}
