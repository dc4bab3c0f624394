//! One-shot software timers driven by the system tick.
use core::fmt::{Display, Formatter, Result};

use crate::rf::{RatTicks, RAT_TICKS_PER_US};

/// Identifies which timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTag {
    /// Fires shortly before an advertising chain starts.
    AboutToAdvertise,
    /// Fires if an advertising chain did not complete in time.
    AdvInterval,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for TimerTag {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerTag::AboutToAdvertise => defmt::write!(fmt, "AboutToAdvertise"),
            TimerTag::AdvInterval => defmt::write!(fmt, "AdvInterval"),
        }
    }
}

impl Display for TimerTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TimerTag::AboutToAdvertise => write!(f, "AboutToAdvertise"),
            TimerTag::AdvInterval => write!(f, "AdvInterval"),
        }
    }
}

/// A restartable one-shot timer counting system ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OneShotTimer {
    tag: TimerTag,
    running: bool,
    remaining: u32,
}

impl OneShotTimer {
    pub const fn new(tag: TimerTag) -> Self {
        Self {
            tag,
            running: false,
            remaining: 0,
        }
    }

    pub const fn tag(&self) -> TimerTag {
        self.tag
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks left before the timer fires. `0` if the timer is stopped.
    pub const fn remaining(&self) -> u32 {
        if self.running {
            self.remaining
        } else {
            0
        }
    }

    /// Arm the timer to fire after `ticks` system ticks, restarting it if running.
    pub fn start(&mut self, ticks: u32) {
        self.remaining = ticks;
        self.running = true;
    }

    /// Disarm the timer. Stopping a stopped timer does nothing.
    pub fn stop(&mut self) {
        self.running = false;
        self.remaining = 0;
    }

    /// Advance the timer by `elapsed` system ticks.
    ///
    /// Returns the timer's tag if it fired. A timer fires once, then is stopped.
    pub fn tick(&mut self, elapsed: u32) -> Option<TimerTag> {
        if !self.running {
            return None;
        }
        if elapsed >= self.remaining {
            self.stop();
            Some(self.tag)
        } else {
            self.remaining -= elapsed;
            None
        }
    }
}

/// Convert radio timer ticks to system ticks of `tick_period_us` microseconds each.
///
/// The result is truncated. Callers add or subtract their own bias.
pub const fn rat_to_system_ticks(rat: RatTicks, tick_period_us: u32) -> u32 {
    let period = if tick_period_us == 0 { 1 } else { tick_period_us };
    rat / (RAT_TICKS_PER_US * period)
}
