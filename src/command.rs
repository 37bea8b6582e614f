//! Command-based control for timer tables.
//!
//! Lets foreground code queue changes (e.g. through a channel) that the owner
//! of the table applies with [`TimerTable::handle_command`].
//!
//! [`TimerTable::handle_command`]: crate::TimerTable::handle_command

use crate::time::TimeDuration;
use crate::types::TimerId;

/// Actions for controlling a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerAction<D: TimeDuration> {
    /// Change the period, keeping elapsed progress.
    ChangeInterval(D),
    /// Restart the period from now.
    Restart,
    /// Enable timer.
    Enable,
    /// Disable timer.
    Disable,
    /// Flip the enabled flag.
    Toggle,
    /// Delete timer.
    Delete,
}

/// Command targeting a specific timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerCommand<D: TimeDuration> {
    pub timer_id: TimerId,
    pub action: TimerAction<D>,
}

impl<D: TimeDuration> TimerCommand<D> {
    /// Creates command.
    pub fn new(timer_id: TimerId, action: TimerAction<D>) -> Self {
        Self { timer_id, action }
    }
}
