use core::fmt::{Display, Formatter, Result};

/// Radio command status codes, as written by the radio into a command's status field.
pub mod status {
    pub const IDLE: u16 = 0x0000;
    pub const PENDING: u16 = 0x0001;
    pub const ACTIVE: u16 = 0x0002;
    pub const SKIPPED: u16 = 0x0003;

    pub const DONE_OK: u16 = 0x0400;
    pub const DONE_RXERR: u16 = 0x0402;
    pub const DONE_TIMEOUT: u16 = 0x0403;
    pub const DONE_STOPPED: u16 = 0x0404;
    pub const DONE_ABORT: u16 = 0x0405;

    pub const ERROR_PAST_START: u16 = 0x0800;
    pub const ERROR_SYNTH_PROG: u16 = 0x0809;
    pub const ERROR_RXOVF: u16 = 0x080B;

    pub const BLE_DONE_OK: u16 = 0x1400;
    pub const BLE_DONE_RXTIMEOUT: u16 = 0x1401;
    pub const BLE_DONE_NOSYNC: u16 = 0x1402;
    pub const BLE_DONE_RXERR: u16 = 0x1403;
    pub const BLE_DONE_CONNECT: u16 = 0x1404;
    pub const BLE_DONE_MAXNACK: u16 = 0x1405;
    pub const BLE_DONE_ENDED: u16 = 0x1406;
    pub const BLE_DONE_ABORT: u16 = 0x1407;
    pub const BLE_DONE_STOPPED: u16 = 0x1408;

    pub const BLE_ERROR_PAR: u16 = 0x1800;
    pub const BLE_ERROR_RXBUF: u16 = 0x1801;
    pub const BLE_ERROR_NO_SETUP: u16 = 0x1802;
    pub const BLE_ERROR_NO_FS: u16 = 0x1803;
    pub const BLE_ERROR_SYNTH_PROG: u16 = 0x1804;
    pub const BLE_ERROR_RXOVF: u16 = 0x1805;
    pub const BLE_ERROR_TXUNF: u16 = 0x1806;
}

/// The status of a radio command.
///
/// Reset to [`status::IDLE`] before every submission and
/// overwritten by the radio when the command finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CommandStatus(pub u16);

impl CommandStatus {
    pub const IDLE: Self = Self(status::IDLE);

    /// Did the command run to completion without error?
    pub const fn is_ok(&self) -> bool {
        matches!(self.0, status::DONE_OK | status::BLE_DONE_OK)
    }

    /// Was the command interrupted by an abort or stop request?
    pub const fn is_aborted(&self) -> bool {
        matches!(
            self.0,
            status::DONE_ABORT | status::DONE_STOPPED | status::BLE_DONE_ABORT | status::BLE_DONE_STOPPED
        )
    }

    /// Did the receiver run out of room in its data queue?
    pub const fn is_overflow(&self) -> bool {
        matches!(
            self.0,
            status::BLE_ERROR_RXBUF | status::BLE_ERROR_RXOVF | status::ERROR_RXOVF
        )
    }

    /// Is this an error code (as opposed to an idle or done code)?
    pub const fn is_error(&self) -> bool {
        self.0 & 0x0800 == 0x0800
    }

    /// Has the command finished (successfully or not)?
    pub const fn is_finished(&self) -> bool {
        self.0 & 0x0C00 != 0
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for CommandStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u16:#06X}", self.0)
    }
}

impl Display for CommandStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{:#06X}", self.0)
    }
}
