#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`TimerTable`**: Fixed array of timer slots polled by one interrupt through `run()`
//! - **`TimerId`**: Stable slot index returned at registration
//! - **`RunCount`**: How many times a timer fires (`Finite(n)` or `Forever`)
//! - **`MissedTickPolicy`**: How a timer that missed whole periods catches up
//! - **`TimeSource`**: Trait to implement for your tick counter
//! - **`TimerAction`**: Commands that can be queued for a timer
//! - **`SharedTimerTable`**: Critical-section wrapper for a `static` table (feature `critical-section`)
//!
//! Callbacks come in two shapes, `fn()` and `fn(C)` with a parameter copied in
//! at registration. Raw `u32`/`u64` millisecond counters implement the time
//! traits with wrapping arithmetic, so counter rollover needs no special care.

pub mod time;
pub mod types;
pub mod table;
pub mod command;
mod callback;

#[cfg(feature = "critical-section")]
pub mod shared;

pub use types::{MissedTickPolicy, RunCount, TimerError, TimerId};
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use table::TimerTable;
pub use command::{TimerAction, TimerCommand};

#[cfg(feature = "critical-section")]
pub use shared::SharedTimerTable;

/// Default number of timer slots.
pub const MAX_TIMERS: usize = 16;

/// Raw run count for a timer that never expires.
pub const RUN_FOREVER: u32 = 0;

/// Raw run count for a timeout.
pub const RUN_ONCE: u32 = 1;
