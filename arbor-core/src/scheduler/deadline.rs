//! Deadlines
//!
//! The work loop asks a [`Deadline`] how much time is left in the current
//! slice after every unit of work. Callers pick the source: wall-clock idle
//! periods, an unbounded budget for synchronous flushing, or a fixed unit
//! count for deterministic tests.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of the remaining time in a scheduling slice.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

impl<F> Deadline for F
where
    F: Fn() -> Duration,
{
    fn time_remaining(&self) -> Duration {
        self()
    }
}

/// A wall-clock deadline, like a browser idle callback's.
#[derive(Debug, Clone, Copy)]
pub struct IdleDeadline {
    end: Instant,
}

impl IdleDeadline {
    /// A slice of `budget` starting now.
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }

    /// A slice ending at `end`.
    pub fn until(end: Instant) -> Self {
        Self { end }
    }
}

impl Deadline for IdleDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Allows a fixed number of units of work per slice.
///
/// Each query consumes one unit. The work loop queries once per completed
/// unit, so a budget of `n` yields after exactly `n` units (at least one unit
/// always runs).
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Units left before the budget reports exhaustion.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left == 0 {
            Duration::ZERO
        } else {
            Duration::MAX
        }
    }
}
