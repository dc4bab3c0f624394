//! The radio abstraction consumed by the link layer.
//!
//! A platform implements [`RfDriver`] on top of its radio peripheral (or RF driver
//! library). The link layer only ever describes what it wants done with a
//! [`RadioCommand`]; when the radio reports progress, the platform forwards the
//! reported [`RfEvents`] and [`CommandStatus`]es to
//! [`LinkLayer::radio_callback()`](fn@crate::ll::LinkLayer::radio_callback).
use bitfield_struct::bitfield;
use core::fmt::{Display, Formatter, Result};

mod command;
pub mod front_end;
mod events;
mod codes;

pub use command::{
    AdvChain, AdvPacket, AdvSubCommand, MonitorParams, Operation, RadioCommand, ScanParams,
    ADV_CHANNELS, ADV_DATA_MAX,
};
pub use events::RfEvents;
pub use codes::{status, CommandStatus};

/// A point in time (or a duration) measured by the radio timer.
///
/// The radio timer wraps around, so arithmetic on these values is always wrapping.
pub type RatTicks = u32;

/// The radio timer runs at 4 MHz.
pub const RAT_TICKS_PER_US: u32 = 4;

/// Convert microseconds to radio timer ticks.
pub const fn us_to_rat(us: u32) -> RatTicks {
    us.wrapping_mul(RAT_TICKS_PER_US)
}

/// Convert milliseconds to radio timer ticks.
pub const fn ms_to_rat(ms: u32) -> RatTicks {
    us_to_rat(ms.wrapping_mul(1000))
}

/// The signed distance from `now` to `then`, taking timer wrap into account.
///
/// A negative result means `then` is in the past.
pub const fn rat_diff(then: RatTicks, now: RatTicks) -> i32 {
    then.wrapping_sub(now) as i32
}

/// An identifier for a command accepted by a [`RfDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandHandle(pub i16);

/// The priority with which a command competes for the radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
    Highest,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for Priority {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Priority::Normal => defmt::write!(fmt, "Normal"),
            Priority::High => defmt::write!(fmt, "High"),
            Priority::Highest => defmt::write!(fmt, "Highest"),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Priority::Normal => write!(f, "Normal"),
            Priority::High => write!(f, "High"),
            Priority::Highest => write!(f, "Highest"),
        }
    }
}

/// When a command should start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartTrigger {
    /// As soon as the radio is free.
    Now,
    /// At an absolute radio time.
    ///
    /// If `past_allowed` is `true`, the command still runs (immediately) if
    /// `time` has already passed when the radio gets to it.
    Absolute { time: RatTicks, past_allowed: bool },
}

/// When a command should end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndTrigger {
    /// End immediately. A receive command with this trigger ends without listening.
    Now,
    /// End a number of ticks after the command started.
    Relative(RatTicks),
    /// Run until stopped.
    Never,
}

/// Flags passed to [`RfDriver::cancel()`].
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct CancelFlags {
    /// Let the command finish its current operation before stopping.
    pub gracefully: bool,

    #[bits(1)]
    _padding: u8,

    /// The cancellation is caused by preemption.
    pub preemption: bool,

    #[bits(5)]
    _reserved: u8,
}

/// Timing hints for [`RfDriver::schedule()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ScheduleParams {
    /// The absolute radio time by which the command is expected to be done.
    ///
    /// A scheduling driver uses this to arbitrate the radio between several users.
    pub end_time: Option<RatTicks>,
    pub priority: Priority,
    /// May the driver start the command later than requested?
    pub allow_delay: bool,
}

/// A collection of methods that the link layer expects from a radio driver.
///
/// None of these methods may block.
pub trait RfDriver {
    type Error;

    /// Open the radio for use. Called once from [`UllInit::init()`](fn@crate::prelude::UllInit::init).
    fn open(&mut self) -> core::result::Result<(), Self::Error>;

    /// The current radio time.
    fn now(&self) -> RatTicks;

    /// Submit a command to run as soon as its start trigger allows.
    ///
    /// `events` is the set of events the link layer wants to be notified about.
    fn post(
        &mut self,
        cmd: &RadioCommand,
        priority: Priority,
        events: RfEvents,
    ) -> core::result::Result<CommandHandle, Self::Error>;

    /// Submit a command with explicit timing, so that a driver shared with other
    /// protocols can arbitrate the radio.
    fn schedule(
        &mut self,
        cmd: &RadioCommand,
        params: &ScheduleParams,
        events: RfEvents,
    ) -> core::result::Result<CommandHandle, Self::Error>;

    /// Cancel a previously submitted command. This is a best-effort request;
    /// the command may have already finished.
    fn cancel(&mut self, handle: CommandHandle, flags: CancelFlags);
}
