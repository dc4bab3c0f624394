use bitfield_struct::bitfield;
use core::fmt::{Display, Formatter, Result};

/// The set of events a radio driver reports when a command (or part of one) completes.
///
/// The bit positions match the event word of TI's CC13xx/CC26xx RF driver, so a driver
/// for that family can pass its raw event mask through [`RfEvents::from_bits()`].
///
/// The same type is used as the subscription mask handed to the driver when a
/// command is submitted.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct RfEvents {
    /// A radio operation command in a chain finished.
    pub cmd_done: bool,

    /// The last radio operation command in a chain finished.
    pub last_cmd_done: bool,

    #[bits(13)]
    _reserved0: u16,

    /// Direction finding samples were copied into the sample queue.
    pub samples_entry_done: bool,

    /// A packet was received with CRC OK.
    pub rx_ok: bool,

    /// A packet was received with a CRC error.
    pub rx_nok: bool,

    /// A packet was received, but ignored by the address filter.
    pub rx_ignored: bool,

    /// An empty packet was received.
    pub rx_empty: bool,

    #[bits(2)]
    _reserved1: u8,

    /// A packet was received, but the receive queue had no room for it.
    pub rx_buf_full: bool,

    /// A receive queue entry was completed (status `Finished`).
    pub rx_entry_done: bool,

    #[bits(7)]
    _reserved2: u8,

    /// The radio CPU reported an internal error.
    pub internal_error: bool,

    #[bits(24)]
    _reserved3: u32,

    /// The command was preempted by a command of higher priority.
    pub cmd_preempted: bool,

    #[bits(3)]
    _reserved4: u8,

    /// The command was cancelled before it started.
    pub cmd_cancelled: bool,

    /// The command was aborted (hard stop).
    pub cmd_aborted: bool,

    /// The command was stopped (graceful stop).
    pub cmd_stopped: bool,

    #[bits(1)]
    _reserved5: u8,
}

impl RfEvents {
    /// The events the link layer subscribes to for an advertising chain.
    pub const fn advertise_mask() -> Self {
        Self::new()
            .with_last_cmd_done(true)
            .with_internal_error(true)
            .with_cmd_preempted(true)
            .with_cmd_cancelled(true)
            .with_cmd_aborted(true)
            .with_cmd_stopped(true)
    }

    /// The events the link layer subscribes to for a scan or monitor command.
    pub const fn receive_mask() -> Self {
        Self::advertise_mask()
            .with_rx_entry_done(true)
            .with_rx_buf_full(true)
            .with_samples_entry_done(true)
    }

    /// Does this set of events contain any that terminate a command?
    ///
    /// After a terminating event, the driver will not report anything else for the same
    /// command handle.
    pub const fn is_termination(&self) -> bool {
        self.last_cmd_done()
            || self.internal_error()
            || self.cmd_cancelled()
            || self.cmd_aborted()
            || self.cmd_stopped()
            || self.cmd_preempted()
    }

    /// Does this set of events describe an interrupted command (aborted, stopped,
    /// cancelled or preempted)?
    pub const fn is_interrupted(&self) -> bool {
        self.cmd_cancelled() || self.cmd_aborted() || self.cmd_stopped() || self.cmd_preempted()
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for RfEvents {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "RfEvents {=u64:#X}", self.into_bits())
    }
}

impl Display for RfEvents {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "RfEvents {:#X}", self.into_bits())
    }
}
