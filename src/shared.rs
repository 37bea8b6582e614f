//! Interrupt-safe wrapper around [`TimerTable`].
//!
//! The interrupt handler calls [`SharedTimerTable::run`]; foreground code goes
//! through [`SharedTimerTable::with`], which holds a critical section for the
//! duration of the closure. Callbacks run outside the critical section, so they
//! may use `with` themselves to register, delete or restart timers. Deleting a
//! timer from a callback takes effect at once, even for a timer that is due
//! later in the same pass.
//!
//! Only the interrupt handler calls `run`. Calling it from foreground code
//! inside a `with` closure panics, because the table is already borrowed; from
//! foreground code outside `with`, callbacks would race with the handler's pass.
//!
//! ```ignore
//! static MILLIS: SysTickMillis = SysTickMillis::new();
//! static TIMERS: SharedTimerTable<'static, u32, SysTickMillis> =
//!     SharedTimerTable::new(&MILLIS);
//!
//! #[exception]
//! fn SysTick() {
//!     MILLIS.tick();
//!     TIMERS.run();
//! }
//!
//! let blink = TIMERS.with(|timers| timers.set_interval(500, toggle_led))?;
//! ```

use core::cell::RefCell;
use critical_section::Mutex;

use crate::MAX_TIMERS;
use crate::table::TimerTable;
use crate::time::{TimeInstant, TimeSource};

/// A [`TimerTable`] guarded by a `critical_section::Mutex`, suitable for a
/// `static` shared between an interrupt handler and foreground code.
pub struct SharedTimerTable<'t, I, T, C = (), const N: usize = MAX_TIMERS>
where
    I: TimeInstant,
    T: TimeSource<I>,
    C: Copy,
{
    table: Mutex<RefCell<TimerTable<'t, I, T, C, N>>>,
}

impl<'t, I, T, C, const N: usize> SharedTimerTable<'t, I, T, C, N>
where
    I: TimeInstant,
    T: TimeSource<I>,
    C: Copy,
{
    /// Creates a shared table with every slot free.
    pub const fn new(time_source: &'t T) -> Self {
        Self::from_table(TimerTable::new(time_source))
    }

    /// Wraps an existing table.
    pub const fn from_table(table: TimerTable<'t, I, T, C, N>) -> Self {
        Self {
            table: Mutex::new(RefCell::new(table)),
        }
    }

    /// Runs `f` on the table inside a critical section.
    ///
    /// # Panics
    /// If called from inside another `with` closure on the same table.
    pub fn with<R>(&self, f: impl FnOnce(&mut TimerTable<'t, I, T, C, N>) -> R) -> R {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            f(&mut *table)
        })
    }

    /// Runs one poll pass.
    ///
    /// Due timers are picked and retired inside critical sections. Their
    /// callbacks run in between, outside any critical section. A timer that an
    /// earlier callback of the same pass deleted or replaced is skipped.
    pub fn run(&self) {
        let pass = self.with(|table| table.scan());

        for dispatch in pass.iter() {
            if self.with(|table| table.still_pending(dispatch)) {
                dispatch.invoke();
            }
        }

        self.with(|table| table.retire(&pass));
    }
}
