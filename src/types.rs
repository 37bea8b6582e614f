//! Core types shared by the timer table and its wrappers.

use core::num::NonZeroU32;

/// An identifier for a timer slot.
///
/// Returned by every registration call and valid until the timer is deleted,
/// either explicitly or automatically after its last run. A freed slot can be
/// handed out again by a later registration, so holding on to an id after the
/// timer is gone is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub usize);

impl From<usize> for TimerId {
    fn from(id: usize) -> Self {
        TimerId(id)
    }
}

impl From<TimerId> for usize {
    fn from(id: TimerId) -> Self {
        id.0
    }
}

impl core::fmt::Display for TimerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "timer #{}", self.0)
    }
}

/// How many times a timer fires before it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCount {
    /// Fire until deleted.
    Forever,

    /// Fire this many times, then free the slot.
    Finite(NonZeroU32),
}

impl RunCount {
    /// A single run, i.e. a timeout.
    pub const ONCE: Self = RunCount::Finite(NonZeroU32::MIN);

    /// Returns the raw count, `0` meaning forever.
    #[inline]
    pub fn as_u32(self) -> u32 {
        match self {
            RunCount::Forever => 0,
            RunCount::Finite(n) => n.get(),
        }
    }
}

impl Default for RunCount {
    fn default() -> Self {
        RunCount::Forever
    }
}

/// Raw run counts: `0` runs forever, anything else is a finite count.
impl From<u32> for RunCount {
    fn from(runs: u32) -> Self {
        match NonZeroU32::new(runs) {
            Some(n) => RunCount::Finite(n),
            None => RunCount::Forever,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RunCount {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RunCount::Forever => defmt::write!(f, "forever"),
            RunCount::Finite(n) => defmt::write!(f, "{}", n.get()),
        }
    }
}

/// What a timer does when a poll finds it more than one period overdue.
///
/// Both policies advance the timer from its previous firing time rather than
/// from the current time, so a timer polled with jitter stays on its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissedTickPolicy {
    /// Fire once and drop the missed periods, staying on the initial phase.
    #[default]
    Skip,

    /// Advance by a single period per firing. A starved timer fires on every
    /// following poll until it has caught up.
    CatchUp,
}

/// Timer table errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Every slot is occupied.
    NoFreeSlot,
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimerError::NoFreeSlot => {
                write!(f, "no free timer slot available")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimerError {}
