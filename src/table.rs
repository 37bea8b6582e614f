//! Fixed-capacity timer table driven by a single periodic interrupt.
//!
//! Provides [`TimerTable`], which multiplexes up to `N` logical timers onto one
//! polling entry point. The hardware timer's interrupt handler calls
//! [`TimerTable::run`] at a fixed cadence; foreground code registers, mutates
//! and queries timers between passes.
//!
//! All methods take `&mut self` or `&self`, so sharing one table between an
//! interrupt handler and foreground code needs exclusive access around every
//! call. See `SharedTimerTable` (feature `critical-section`) for a ready-made
//! wrapper.

use heapless::Vec;

use crate::MAX_TIMERS;
use crate::callback::Callback;
use crate::command::{TimerAction, TimerCommand};
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::{MissedTickPolicy, RunCount, TimerError, TimerId};

/// One armed timer.
struct Slot<I: TimeInstant, C> {
    last_fire: I,
    callback: Callback<C>,
    interval: I::Duration,
    max_runs: RunCount,
    runs: u32,
    enabled: bool,
    /// Distinguishes this arming from earlier timers that used the same slot.
    generation: u32,
}

impl<I: TimeInstant, C> Slot<I, C> {
    /// True once a finite timer has used up its runs and only awaits removal.
    fn is_exhausted(&self) -> bool {
        match self.max_runs {
            RunCount::Forever => false,
            RunCount::Finite(max) => self.runs >= max.get(),
        }
    }
}

/// What a poll pass does with a due timer after the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingAction {
    Invoke,
    InvokeAndRemove,
}

/// A due timer picked by the scan, with its callback copied out of the slot.
pub(crate) struct Dispatch<C> {
    id: TimerId,
    generation: u32,
    callback: Callback<C>,
    action: PendingAction,
}

impl<C: Copy> Dispatch<C> {
    #[inline]
    pub(crate) fn invoke(&self) {
        self.callback.invoke();
    }
}

/// Timers due in a single poll pass, at most one entry per slot.
pub(crate) type Pass<C, const N: usize> = Vec<Dispatch<C>, N>;

/// Multiplexes up to `N` software timers onto one periodic interrupt.
///
/// Each timer has its own period, run count and callback. Callbacks are plain
/// `fn()` or `fn(C)` with a parameter stored at registration time.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type (`u32` for a raw millisecond counter)
/// * `T` - Time source implementation type
/// * `C` - Callback parameter type
/// * `N` - Number of timer slots
pub struct TimerTable<'t, I, T, C = (), const N: usize = MAX_TIMERS>
where
    I: TimeInstant,
    T: TimeSource<I>,
    C: Copy,
{
    slots: [Option<Slot<I, C>>; N],
    used: usize,
    armed: u32,
    policy: MissedTickPolicy,
    time_source: &'t T,
}

impl<'t, I, T, C, const N: usize> TimerTable<'t, I, T, C, N>
where
    I: TimeInstant,
    T: TimeSource<I>,
    C: Copy,
{
    /// Creates a table with every slot free.
    pub const fn new(time_source: &'t T) -> Self {
        Self {
            slots: [const { None }; N],
            used: 0,
            armed: 0,
            policy: MissedTickPolicy::Skip,
            time_source,
        }
    }

    /// Sets how overdue timers are advanced.
    pub fn with_policy(mut self, policy: MissedTickPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Changes how overdue timers are advanced. Takes effect on the next pass.
    pub fn set_policy(&mut self, policy: MissedTickPolicy) {
        self.policy = policy;
    }

    /// Returns the missed-tick policy.
    pub fn policy(&self) -> MissedTickPolicy {
        self.policy
    }

    /// Calls `callback` every `interval` until the timer is deleted.
    ///
    /// # Errors
    /// `NoFreeSlot` if every slot is occupied.
    pub fn set_interval(
        &mut self,
        interval: I::Duration,
        callback: fn(),
    ) -> Result<TimerId, TimerError> {
        self.setup_timer(interval, Callback::Plain(callback), RunCount::Forever)
    }

    /// Calls `callback(param)` every `interval` until the timer is deleted.
    ///
    /// # Errors
    /// `NoFreeSlot` if every slot is occupied.
    pub fn set_interval_with(
        &mut self,
        interval: I::Duration,
        callback: fn(C),
        param: C,
    ) -> Result<TimerId, TimerError> {
        self.setup_timer(
            interval,
            Callback::WithParam(callback, param),
            RunCount::Forever,
        )
    }

    /// Calls `callback` once after `interval`, then frees the slot.
    ///
    /// # Errors
    /// `NoFreeSlot` if every slot is occupied.
    pub fn set_timeout(
        &mut self,
        interval: I::Duration,
        callback: fn(),
    ) -> Result<TimerId, TimerError> {
        self.setup_timer(interval, Callback::Plain(callback), RunCount::ONCE)
    }

    /// Calls `callback(param)` once after `interval`, then frees the slot.
    ///
    /// # Errors
    /// `NoFreeSlot` if every slot is occupied.
    pub fn set_timeout_with(
        &mut self,
        interval: I::Duration,
        callback: fn(C),
        param: C,
    ) -> Result<TimerId, TimerError> {
        self.setup_timer(
            interval,
            Callback::WithParam(callback, param),
            RunCount::ONCE,
        )
    }

    /// Calls `callback` every `interval`, `runs` times.
    ///
    /// A raw count of `0` runs forever, like [`set_interval`](Self::set_interval).
    ///
    /// # Errors
    /// `NoFreeSlot` if every slot is occupied.
    pub fn set_timer(
        &mut self,
        interval: I::Duration,
        callback: fn(),
        runs: impl Into<RunCount>,
    ) -> Result<TimerId, TimerError> {
        self.setup_timer(interval, Callback::Plain(callback), runs.into())
    }

    /// Calls `callback(param)` every `interval`, `runs` times.
    ///
    /// # Errors
    /// `NoFreeSlot` if every slot is occupied.
    pub fn set_timer_with(
        &mut self,
        interval: I::Duration,
        callback: fn(C),
        param: C,
        runs: impl Into<RunCount>,
    ) -> Result<TimerId, TimerError> {
        self.setup_timer(
            interval,
            Callback::WithParam(callback, param),
            runs.into(),
        )
    }

    fn setup_timer(
        &mut self,
        interval: I::Duration,
        callback: Callback<C>,
        max_runs: RunCount,
    ) -> Result<TimerId, TimerError> {
        let Some(idx) = self.find_first_free_slot() else {
            #[cfg(feature = "defmt")]
            defmt::warn!("timer table full ({} slots in use)", self.used);
            return Err(TimerError::NoFreeSlot);
        };

        self.slots[idx] = Some(Slot {
            last_fire: self.time_source.now(),
            callback,
            interval,
            max_runs,
            runs: 0,
            enabled: true,
            generation: self.armed,
        });
        self.used += 1;
        self.armed = self.armed.wrapping_add(1);

        let id = TimerId(idx);
        #[cfg(feature = "defmt")]
        defmt::trace!("armed {} with {} runs", id, max_runs);
        Ok(id)
    }

    fn find_first_free_slot(&self) -> Option<usize> {
        if self.used >= N {
            return None;
        }

        self.slots.iter().position(Option::is_none)
    }

    fn slot(&self, id: TimerId) -> Option<&Slot<I, C>> {
        self.slots.get(id.0)?.as_ref()
    }

    fn slot_mut(&mut self, id: TimerId) -> Option<&mut Slot<I, C>> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Changes the period of a timer without resetting its elapsed progress.
    ///
    /// Returns `false` if `id` does not refer to an armed timer.
    pub fn change_interval(&mut self, id: TimerId, interval: I::Duration) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.interval = interval;
                true
            }
            None => false,
        }
    }

    /// Frees the slot immediately. Unknown ids are ignored.
    pub fn delete_timer(&mut self, id: TimerId) {
        let Some(entry) = self.slots.get_mut(id.0) else {
            return;
        };

        // Don't decrease the count for a slot that is already empty
        if entry.take().is_some() {
            self.used -= 1;

            #[cfg(feature = "defmt")]
            defmt::trace!("deleted {}", id);
        }
    }

    /// Restarts the current period from now. The run count is kept.
    pub fn restart_timer(&mut self, id: TimerId) {
        let now = self.time_source.now();
        if let Some(slot) = self.slot_mut(id) {
            slot.last_fire = now;
        }
    }

    /// Returns true if `id` is an armed, enabled timer.
    pub fn is_enabled(&self, id: TimerId) -> bool {
        self.slot(id).is_some_and(|slot| slot.enabled)
    }

    /// Enables a timer.
    pub fn enable(&mut self, id: TimerId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.enabled = true;
        }
    }

    /// Disables a timer. It keeps its configuration and phase.
    pub fn disable(&mut self, id: TimerId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.enabled = false;
        }
    }

    /// Enables a disabled timer and vice versa.
    pub fn toggle(&mut self, id: TimerId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.enabled = !slot.enabled;
        }
    }

    /// Enables every armed timer.
    pub fn enable_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.enabled = true;
        }
    }

    /// Disables every armed timer.
    pub fn disable_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.enabled = false;
        }
    }

    /// Frees every slot.
    pub fn clear(&mut self) {
        for entry in &mut self.slots {
            *entry = None;
        }
        self.used = 0;
    }

    /// Returns the number of armed timers.
    pub fn num_timers(&self) -> usize {
        self.used
    }

    /// Returns the number of free slots.
    pub fn num_available_timers(&self) -> usize {
        N - self.used
    }

    /// Returns the total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true if `id` refers to an armed timer.
    pub fn contains(&self, id: TimerId) -> bool {
        self.slot(id).is_some()
    }

    /// Returns how many times the timer has fired.
    pub fn runs(&self, id: TimerId) -> Option<u32> {
        self.slot(id).map(|slot| slot.runs)
    }

    /// Returns the timer's period.
    pub fn interval(&self, id: TimerId) -> Option<I::Duration> {
        self.slot(id).map(|slot| slot.interval)
    }

    /// Applies an action to a timer.
    ///
    /// Returns `false` if `id` did not refer to an armed timer, in which case
    /// nothing changed.
    pub fn handle_action(&mut self, id: TimerId, action: TimerAction<I::Duration>) -> bool {
        if !self.contains(id) {
            return false;
        }

        match action {
            TimerAction::ChangeInterval(interval) => {
                self.change_interval(id, interval);
            }
            TimerAction::Restart => self.restart_timer(id),
            TimerAction::Enable => self.enable(id),
            TimerAction::Disable => self.disable(id),
            TimerAction::Toggle => self.toggle(id),
            TimerAction::Delete => self.delete_timer(id),
        }
        true
    }

    /// Applies a command to the timer it targets.
    pub fn handle_command(&mut self, command: TimerCommand<I::Duration>) -> bool {
        self.handle_action(command.timer_id, command.action)
    }

    /// Runs one poll pass: fires every due timer and retires finished ones.
    ///
    /// Meant to be called from the hardware timer's interrupt handler at a
    /// fixed cadence. The current time is read once per pass.
    pub fn run(&mut self) {
        let pass = self.scan();

        for dispatch in pass.iter() {
            if self.still_pending(dispatch) {
                dispatch.invoke();
            }
        }

        self.retire(&pass);
    }

    /// Returns true while the slot of `dispatch` still holds the timer the
    /// scan picked. A deleted timer, or a new one armed in its slot, fails.
    pub(crate) fn still_pending(&self, dispatch: &Dispatch<C>) -> bool {
        self.slot(dispatch.id)
            .is_some_and(|slot| slot.generation == dispatch.generation)
    }

    /// Decides which timers are due and advances their phase.
    ///
    /// No callback runs here, so the slot array is never observed half-updated
    /// by user code.
    pub(crate) fn scan(&mut self) -> Pass<C, N> {
        let now = self.time_source.now();
        let policy = self.policy;
        let mut pass: Pass<C, N> = Vec::new();

        for (idx, entry) in self.slots.iter_mut().enumerate() {
            let Some(slot) = entry else {
                continue;
            };

            let elapsed = now.duration_since(slot.last_fire);
            if elapsed.as_millis() < slot.interval.as_millis() {
                continue;
            }

            // Disabled timers keep their phase so that enabling resumes on it
            slot.last_fire = next_fire_time(policy, slot.last_fire, slot.interval, elapsed);

            if !slot.enabled || slot.is_exhausted() {
                continue;
            }

            slot.runs = slot.runs.saturating_add(1);
            let action = if slot.is_exhausted() {
                PendingAction::InvokeAndRemove
            } else {
                PendingAction::Invoke
            };

            // Cannot overflow: one entry per slot at most
            let _ = pass.push(Dispatch {
                id: TimerId(idx),
                generation: slot.generation,
                callback: slot.callback,
                action,
            });
        }

        pass
    }

    /// Frees the slots whose last run happened in `pass`.
    ///
    /// A callback may have deleted its own timer and the slot may since have
    /// been reused, so only slots still holding the same exhausted timer are
    /// freed.
    pub(crate) fn retire(&mut self, pass: &Pass<C, N>) {
        for dispatch in pass
            .iter()
            .filter(|dispatch| dispatch.action == PendingAction::InvokeAndRemove)
        {
            if self.still_pending(dispatch)
                && self.slot(dispatch.id).is_some_and(Slot::is_exhausted)
            {
                #[cfg(feature = "defmt")]
                defmt::debug!("{} finished its runs", dispatch.id);

                self.delete_timer(dispatch.id);
            }
        }
    }
}

/// Computes the new `last_fire` of a due timer.
///
/// `elapsed` is at least `interval`. A zero interval is due on every pass and
/// simply follows the current time.
fn next_fire_time<I: TimeInstant>(
    policy: MissedTickPolicy,
    last_fire: I,
    interval: I::Duration,
    elapsed: I::Duration,
) -> I {
    let interval_millis = interval.as_millis();
    if interval_millis == 0 {
        return last_fire.wrapping_add(elapsed);
    }

    match policy {
        MissedTickPolicy::CatchUp => last_fire.wrapping_add(interval),
        MissedTickPolicy::Skip => {
            let periods = elapsed.as_millis() / interval_millis;
            last_fire.wrapping_add(<I::Duration as TimeDuration>::from_millis(
                periods * interval_millis,
            ))
        }
    }
}
