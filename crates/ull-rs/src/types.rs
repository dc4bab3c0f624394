//! This module defines types shared by the link layer, its clients and its radio driver.
//! These types are meant to be agnostic of the radio implementation.

use core::{
    fmt::{Display, Formatter, Result},
    write,
};

/// The link layer role that is currently active.
///
/// Only one role is active at a time because there is only one radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LinkLayerState {
    /// No role is active. The radio is idle (from the link layer's point of view).
    #[default]
    Standby,
    /// Broadcasting advertisements on the primary advertising channels.
    Advertising,
    /// Receiving advertisements on one primary advertising channel.
    Scanning,
    /// Passively receiving packets of a connection that this device is not part of.
    Monitoring,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for LinkLayerState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LinkLayerState::Standby => defmt::write!(fmt, "Standby"),
            LinkLayerState::Advertising => defmt::write!(fmt, "Advertising"),
            LinkLayerState::Scanning => defmt::write!(fmt, "Scanning"),
            LinkLayerState::Monitoring => defmt::write!(fmt, "Monitoring"),
        }
    }
}

impl Display for LinkLayerState {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            LinkLayerState::Standby => write!(f, "Standby"),
            LinkLayerState::Advertising => write!(f, "Advertising"),
            LinkLayerState::Scanning => write!(f, "Scanning"),
            LinkLayerState::Monitoring => write!(f, "Monitoring"),
        }
    }
}

/// The state of the outstanding advertising chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PendingTxStatus {
    /// Nothing is outstanding.
    #[default]
    Done,
    /// A chain was accepted by the radio driver and has not completed yet.
    Scheduled,
    /// The radio driver rejected (or preempted) the chain.
    /// A "radio available" event will retry it.
    NoRadioResource,
    /// The current advertising cycle failed.
    Failed,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for PendingTxStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PendingTxStatus::Done => defmt::write!(fmt, "Done"),
            PendingTxStatus::Scheduled => defmt::write!(fmt, "Scheduled"),
            PendingTxStatus::NoRadioResource => defmt::write!(fmt, "NoRadioResource"),
            PendingTxStatus::Failed => defmt::write!(fmt, "Failed"),
        }
    }
}

impl Display for PendingTxStatus {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            PendingTxStatus::Done => write!(f, "Done"),
            PendingTxStatus::Scheduled => write!(f, "Scheduled"),
            PendingTxStatus::NoRadioResource => write!(f, "NoRadioResource"),
            PendingTxStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// The state of an outstanding receive command (scan or monitor).
///
/// The link layer stores this as an [`Option`]; `None` means nothing is pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingRxStatus {
    /// The receive command was accepted by the radio driver.
    Scheduled,
    /// The radio driver rejected (or preempted) the receive command.
    NoRadioResource,
    /// The receive command failed.
    Failed,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for PendingRxStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PendingRxStatus::Scheduled => defmt::write!(fmt, "Scheduled"),
            PendingRxStatus::NoRadioResource => defmt::write!(fmt, "NoRadioResource"),
            PendingRxStatus::Failed => defmt::write!(fmt, "Failed"),
        }
    }
}

impl Display for PendingRxStatus {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            PendingRxStatus::Scheduled => write!(f, "Scheduled"),
            PendingRxStatus::NoRadioResource => write!(f, "NoRadioResource"),
            PendingRxStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// How the start time of the next advertising chain is computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvMode {
    /// The first chain after advertising was started: `now + start delay`.
    Start,
    /// As soon as possible: `now + start delay`.
    Immediate,
    /// Anchored to the previous chain: `previous + interval + jitter`.
    Periodic,
    /// Re-anchored to the present: `now + interval + jitter`.
    PeriodicRelaxed,
    /// Keep the previously computed start time.
    Reschedule,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for AdvMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            AdvMode::Start => defmt::write!(fmt, "Start"),
            AdvMode::Immediate => defmt::write!(fmt, "Immediate"),
            AdvMode::Periodic => defmt::write!(fmt, "Periodic"),
            AdvMode::PeriodicRelaxed => defmt::write!(fmt, "PeriodicRelaxed"),
            AdvMode::Reschedule => defmt::write!(fmt, "Reschedule"),
        }
    }
}

impl Display for AdvMode {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            AdvMode::Start => write!(f, "Start"),
            AdvMode::Immediate => write!(f, "Immediate"),
            AdvMode::Periodic => write!(f, "Periodic"),
            AdvMode::PeriodicRelaxed => write!(f, "PeriodicRelaxed"),
            AdvMode::Reschedule => write!(f, "Reschedule"),
        }
    }
}

/// How a receive command (scan or monitor) is (re)issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxMode {
    /// First command after the role was entered.
    Start,
    /// Re-issue after a buffer overflow or once the radio is available again.
    Reschedule,
}

impl Display for RxMode {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            RxMode::Start => write!(f, "Start"),
            RxMode::Reschedule => write!(f, "Reschedule"),
        }
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for RxMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            RxMode::Start => defmt::write!(fmt, "Start"),
            RxMode::Reschedule => defmt::write!(fmt, "Reschedule"),
        }
    }
}

/// Advertising timing policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdvTiming {
    /// Every chain is anchored to the previous one. A missed slot is a failure.
    #[default]
    Critical,
    /// Chains are re-anchored to the present, tolerating one extra missed slot.
    Relaxed,
}

impl Display for AdvTiming {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            AdvTiming::Critical => write!(f, "time critical"),
            AdvTiming::Relaxed => write!(f, "time relaxed"),
        }
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for AdvTiming {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            AdvTiming::Critical => defmt::write!(fmt, "time critical"),
            AdvTiming::Relaxed => defmt::write!(fmt, "time relaxed"),
        }
    }
}

/// The status passed to application callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UllStatus {
    /// The operation completed normally.
    Success,
    /// The operation failed.
    Failure,
    /// The radio was not available for the operation.
    NoResources,
    /// A received packet did not fit in the receive queue.
    BufferNotAvailable,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for UllStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            UllStatus::Success => defmt::write!(fmt, "Success"),
            UllStatus::Failure => defmt::write!(fmt, "Failure"),
            UllStatus::NoResources => defmt::write!(fmt, "NoResources"),
            UllStatus::BufferNotAvailable => defmt::write!(fmt, "BufferNotAvailable"),
        }
    }
}

impl Display for UllStatus {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            UllStatus::Success => write!(f, "Success"),
            UllStatus::Failure => write!(f, "Failure"),
            UllStatus::NoResources => write!(f, "NoResources"),
            UllStatus::BufferNotAvailable => write!(f, "BufferNotAvailable"),
        }
    }
}

/// The events consumed by the link layer's dispatcher.
///
/// Raw radio results are normalized into these before the state machine sees them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    AdvTxSuccess,
    AdvTxFailed,
    AdvIntervalTimerExpired,
    AdvRadioAvailable,
    AdvTxStarted,
    /// The about-to-advertise timer fired.
    AdvAboutToTx,
    ScanRxSuccess,
    /// The scan command terminated normally (it is re-issued until stopped).
    ScanRxWindowComplete,
    ScanRxFailed,
    ScanRxBufFull,
    ScanRxRadioAvailable,
    ScanRxStarted,
    MonitorRxSuccess,
    MonitorRxFailed,
    MonitorRxBufFull,
    MonitorRxWindowComplete,
    MonitorRxRadioAvailable,
    MonitorRxStarted,
}

impl Event {
    const fn name(&self) -> &'static str {
        match self {
            Event::AdvTxSuccess => "AdvTxSuccess",
            Event::AdvTxFailed => "AdvTxFailed",
            Event::AdvIntervalTimerExpired => "AdvIntervalTimerExpired",
            Event::AdvRadioAvailable => "AdvRadioAvailable",
            Event::AdvTxStarted => "AdvTxStarted",
            Event::AdvAboutToTx => "AdvAboutToTx",
            Event::ScanRxSuccess => "ScanRxSuccess",
            Event::ScanRxWindowComplete => "ScanRxWindowComplete",
            Event::ScanRxFailed => "ScanRxFailed",
            Event::ScanRxBufFull => "ScanRxBufFull",
            Event::ScanRxRadioAvailable => "ScanRxRadioAvailable",
            Event::ScanRxStarted => "ScanRxStarted",
            Event::MonitorRxSuccess => "MonitorRxSuccess",
            Event::MonitorRxFailed => "MonitorRxFailed",
            Event::MonitorRxBufFull => "MonitorRxBufFull",
            Event::MonitorRxWindowComplete => "MonitorRxWindowComplete",
            Event::MonitorRxRadioAvailable => "MonitorRxRadioAvailable",
            Event::MonitorRxStarted => "MonitorRxStarted",
        }
    }
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for Event {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.name())
    }
}
