//! Shared test infrastructure for isr-timer integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use isr_timer::{TimeSource, TimerTable};

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock millisecond counter with controllable, wrapping time advancement
pub struct MockTimeSource {
    current_time: Cell<u32>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(millis: u32) -> Self {
        Self {
            current_time: Cell::new(millis),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u32) {
        let current = self.current_time.get();
        self.current_time.set(current.wrapping_add(millis));
    }

    pub fn set_time(&self, millis: u32) {
        self.current_time.set(millis);
    }
}

impl TimeSource<u32> for MockTimeSource {
    fn now(&self) -> u32 {
        self.current_time.get()
    }
}

// ============================================================================
// Firing Recorder
// ============================================================================

/// Callback parameter that counts firings
pub type Hits<'h> = &'h Cell<u32>;

/// Table type used by most tests: default capacity, counting callbacks
pub type Table<'t, 'h> = TimerTable<'t, u32, MockTimeSource, Hits<'h>>;

pub fn bump(hits: &Cell<u32>) {
    hits.set(hits.get() + 1);
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Simulates a 1ms interrupt: advance one tick, then poll, `millis` times
pub fn tick<C: Copy>(
    table: &mut TimerTable<'_, u32, MockTimeSource, C>,
    timer: &MockTimeSource,
    millis: u32,
) {
    for _ in 0..millis {
        timer.advance(1);
        table.run();
    }
}
