//! Time abstraction traits for platform-agnostic timing.
//!
//! Tick counters are expected to wrap at their integer width. All arithmetic
//! the timer table performs goes through [`TimeInstant::duration_since`] and
//! [`TimeInstant::wrapping_add`], so a counter that rolls over keeps producing
//! correct elapsed times.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
///
/// The timer table compares and schedules in whole milliseconds through
/// [`as_millis`](Self::as_millis) and [`from_millis`](Self::from_millis). A
/// finer-grained duration (e.g. microseconds) loses its sub-millisecond
/// remainder there: a timer may fire up to 1 ms late, and under
/// `MissedTickPolicy::Skip` the firing grid can shift by up to 1 ms per period.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    ///
    /// Must wrap like unsigned subtraction: when the counter rolled over
    /// between `earlier` and `self`, the result is still the true elapsed time.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, wrapping at the counter width.
    fn wrapping_add(self, duration: Self::Duration) -> Self;
}

// Raw tick counters, e.g. a millisecond counter bumped by SysTick.
macro_rules! impl_tick_counter {
    ($($ticks:ty),*) => {
        $(
            impl TimeDuration for $ticks {
                const ZERO: Self = 0;

                #[inline]
                fn as_millis(&self) -> u64 {
                    *self as u64
                }

                #[inline]
                fn from_millis(millis: u64) -> Self {
                    millis as $ticks
                }
            }

            impl TimeInstant for $ticks {
                type Duration = $ticks;

                #[inline]
                fn duration_since(&self, earlier: Self) -> Self::Duration {
                    <$ticks>::wrapping_sub(*self, earlier)
                }

                #[inline]
                fn wrapping_add(self, duration: Self::Duration) -> Self {
                    <$ticks>::wrapping_add(self, duration)
                }
            }
        )*
    };
}

impl_tick_counter!(u32, u64);
