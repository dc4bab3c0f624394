//! Translation of raw radio results into link layer [`Event`]s.
//!
//! These functions are the only place where radio status codes are inspected.
//! The state machine only ever sees the [`Verdict`] they return.
use crate::rf::{status, CommandStatus, RfEvents};
use crate::{Event, PendingRxStatus, PendingTxStatus};

/// The normalized outcome of one radio callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Verdict {
    /// Events to post, in order.
    pub events: [Option<Event>; 2],
    /// The role must be forced to Standby.
    pub fatal: bool,
}

impl Verdict {
    const fn none() -> Self {
        Self {
            events: [None, None],
            fatal: false,
        }
    }

    const fn post(event: Event) -> Self {
        Self {
            events: [Some(event), None],
            fatal: false,
        }
    }

    const fn post_two(first: Event, second: Event) -> Self {
        Self {
            events: [Some(first), Some(second)],
            fatal: false,
        }
    }

    const fn fatal(event: Event) -> Self {
        Self {
            events: [Some(event), None],
            fatal: true,
        }
    }

    /// Iterate over the events to post.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.events.iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.events.iter().all(Option::is_none)
    }
}

/// Normalize the completion of an advertising chain.
///
/// `chain_status` is the aggregate status of the chain.
pub fn advertise_done(
    events: RfEvents,
    chain_status: CommandStatus,
    pending: PendingTxStatus,
) -> Verdict {
    let scheduled = pending == PendingTxStatus::Scheduled;
    if events.internal_error() {
        return Verdict::fatal(Event::AdvTxFailed);
    }
    if events.last_cmd_done() {
        if chain_status.is_ok() {
            return Verdict::post(Event::AdvTxSuccess);
        }
        if chain_status.is_aborted() {
            return if scheduled {
                Verdict::post(Event::AdvTxFailed)
            } else {
                Verdict::none()
            };
        }
        if chain_status.is_error() {
            return Verdict::fatal(Event::AdvTxFailed);
        }
        // the chain ended without transmitting (skipped, or nothing to send)
        return if scheduled {
            Verdict::post(Event::AdvTxFailed)
        } else {
            Verdict::none()
        };
    }
    if events.is_interrupted() && scheduled {
        return Verdict::post(Event::AdvTxFailed);
    }
    Verdict::none()
}

/// Receive roles share one normalization, parameterized by their events.
struct RxEvents {
    success: Event,
    window_complete: Event,
    buf_full: Event,
    failed: Event,
}

const SCAN: RxEvents = RxEvents {
    success: Event::ScanRxSuccess,
    window_complete: Event::ScanRxWindowComplete,
    buf_full: Event::ScanRxBufFull,
    failed: Event::ScanRxFailed,
};

const MONITOR: RxEvents = RxEvents {
    success: Event::MonitorRxSuccess,
    window_complete: Event::MonitorRxWindowComplete,
    buf_full: Event::MonitorRxBufFull,
    failed: Event::MonitorRxFailed,
};

/// Status codes that end a receive command normally.
const fn is_normal_rx_end(code: u16, past_start_ok: bool) -> bool {
    match code {
        status::DONE_OK
        | status::DONE_TIMEOUT
        | status::DONE_RXERR
        | status::DONE_STOPPED
        | status::DONE_ABORT
        | status::BLE_DONE_OK
        | status::BLE_DONE_RXTIMEOUT
        | status::BLE_DONE_NOSYNC
        | status::BLE_DONE_RXERR
        | status::BLE_DONE_ENDED
        | status::BLE_DONE_ABORT
        | status::BLE_DONE_STOPPED => true,
        status::ERROR_PAST_START => past_start_ok,
        _ => false,
    }
}

fn rx_done(
    kind: &RxEvents,
    events: RfEvents,
    cmd_status: CommandStatus,
    pending: Option<PendingRxStatus>,
    past_start_ok: bool,
) -> Verdict {
    let scheduled = pending == Some(PendingRxStatus::Scheduled);
    if events.internal_error() {
        return Verdict::fatal(kind.failed);
    }
    let entry = events.rx_entry_done() && scheduled;
    if events.last_cmd_done() {
        let end = if is_normal_rx_end(cmd_status.0, past_start_ok) {
            kind.window_complete
        } else if cmd_status.is_overflow() {
            kind.buf_full
        } else {
            return Verdict::fatal(kind.failed);
        };
        return if entry {
            Verdict::post_two(kind.success, end)
        } else {
            Verdict::post(end)
        };
    }
    if events.rx_buf_full() {
        return Verdict::post(kind.buf_full);
    }
    if events.is_interrupted() && scheduled {
        return Verdict::post(kind.failed);
    }
    if entry {
        return Verdict::post(kind.success);
    }
    Verdict::none()
}

/// Normalize a scan command callback.
pub fn scan_done(
    events: RfEvents,
    cmd_status: CommandStatus,
    pending: Option<PendingRxStatus>,
) -> Verdict {
    rx_done(&SCAN, events, cmd_status, pending, false)
}

/// Normalize a monitor command callback.
///
/// Unlike a scan, a monitor command that started late ends normally.
pub fn monitor_done(
    events: RfEvents,
    cmd_status: CommandStatus,
    pending: Option<PendingRxStatus>,
) -> Verdict {
    rx_done(&MONITOR, events, cmd_status, pending, true)
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{advertise_done, monitor_done, scan_done, Verdict};
    use crate::rf::{status, CommandStatus, RfEvents};
    use crate::{Event, PendingRxStatus, PendingTxStatus};

    const SCHEDULED_RX: Option<PendingRxStatus> = Some(PendingRxStatus::Scheduled);

    fn done() -> RfEvents {
        RfEvents::new().with_last_cmd_done(true)
    }

    fn only(verdict: Verdict) -> Option<Event> {
        assert!(verdict.events[1].is_none());
        verdict.events[0]
    }

    #[test]
    fn adv_success() {
        let v = advertise_done(
            done(),
            CommandStatus(status::BLE_DONE_OK),
            PendingTxStatus::Scheduled,
        );
        assert_eq!(only(v), Some(Event::AdvTxSuccess));
        assert!(!v.fatal);
    }

    #[test]
    fn adv_aborted_while_scheduled() {
        let v = advertise_done(
            RfEvents::new().with_cmd_aborted(true),
            CommandStatus(status::ACTIVE),
            PendingTxStatus::Scheduled,
        );
        assert_eq!(only(v), Some(Event::AdvTxFailed));
        assert!(!v.fatal);

        let v = advertise_done(
            done(),
            CommandStatus(status::BLE_DONE_ABORT),
            PendingTxStatus::Scheduled,
        );
        assert_eq!(only(v), Some(Event::AdvTxFailed));
    }

    #[test]
    fn adv_aborted_after_stop() {
        let v = advertise_done(
            RfEvents::new().with_cmd_cancelled(true),
            CommandStatus::IDLE,
            PendingTxStatus::Done,
        );
        assert!(v.is_empty());
    }

    #[test]
    fn adv_errors_are_fatal() {
        let v = advertise_done(
            RfEvents::new().with_internal_error(true),
            CommandStatus::IDLE,
            PendingTxStatus::Scheduled,
        );
        assert!(v.fatal);
        let v = advertise_done(
            done(),
            CommandStatus(status::BLE_ERROR_SYNTH_PROG),
            PendingTxStatus::Scheduled,
        );
        assert!(v.fatal);
        assert_eq!(only(v), Some(Event::AdvTxFailed));
    }

    #[test]
    fn adv_ended_without_transmitting() {
        for code in [status::IDLE, status::SKIPPED] {
            let v = advertise_done(done(), CommandStatus(code), PendingTxStatus::Scheduled);
            assert_eq!(only(v), Some(Event::AdvTxFailed));
            assert!(!v.fatal);
            let v = advertise_done(done(), CommandStatus(code), PendingTxStatus::Done);
            assert!(v.is_empty());
        }
    }

    #[test]
    fn scan_entry_done() {
        let events = RfEvents::new().with_rx_entry_done(true);
        let v = scan_done(events, CommandStatus(status::ACTIVE), SCHEDULED_RX);
        assert_eq!(only(v), Some(Event::ScanRxSuccess));
        // nothing is pending, so the packet is ignored
        assert!(scan_done(events, CommandStatus(status::ACTIVE), None).is_empty());
    }

    #[test]
    fn scan_normal_end() {
        for code in [
            status::BLE_DONE_OK,
            status::BLE_DONE_RXTIMEOUT,
            status::BLE_DONE_NOSYNC,
            status::BLE_DONE_RXERR,
            status::BLE_DONE_ENDED,
            status::BLE_DONE_ABORT,
            status::BLE_DONE_STOPPED,
        ] {
            let v = scan_done(done(), CommandStatus(code), SCHEDULED_RX);
            assert_eq!(only(v), Some(Event::ScanRxWindowComplete));
            assert!(!v.fatal);
        }
    }

    #[test]
    fn scan_overflow() {
        for code in [status::BLE_ERROR_RXBUF, status::BLE_ERROR_RXOVF] {
            let v = scan_done(done(), CommandStatus(code), SCHEDULED_RX);
            assert_eq!(only(v), Some(Event::ScanRxBufFull));
            assert!(!v.fatal);
        }
        let v = scan_done(
            RfEvents::new().with_rx_buf_full(true),
            CommandStatus(status::ACTIVE),
            SCHEDULED_RX,
        );
        assert_eq!(only(v), Some(Event::ScanRxBufFull));
    }

    #[test]
    fn scan_fatal() {
        let v = scan_done(
            done(),
            CommandStatus(status::BLE_ERROR_SYNTH_PROG),
            SCHEDULED_RX,
        );
        assert!(v.fatal);
        assert_eq!(only(v), Some(Event::ScanRxFailed));
        let v = scan_done(
            done(),
            CommandStatus(status::ERROR_PAST_START),
            SCHEDULED_RX,
        );
        assert!(v.fatal);
        let v = scan_done(
            RfEvents::new()
                .with_internal_error(true)
                .with_last_cmd_done(true),
            CommandStatus(status::BLE_DONE_OK),
            SCHEDULED_RX,
        );
        assert!(v.fatal);
    }

    #[test]
    fn scan_preempted() {
        let v = scan_done(
            RfEvents::new().with_cmd_preempted(true),
            CommandStatus(status::ACTIVE),
            SCHEDULED_RX,
        );
        assert_eq!(only(v), Some(Event::ScanRxFailed));
        assert!(!v.fatal);
    }

    #[test]
    fn entry_and_end_together() {
        let v = scan_done(
            done().with_rx_entry_done(true),
            CommandStatus(status::BLE_DONE_RXTIMEOUT),
            SCHEDULED_RX,
        );
        assert!(v
            .iter()
            .eq([Event::ScanRxSuccess, Event::ScanRxWindowComplete]));
    }

    #[test]
    fn monitor_past_start() {
        let v = monitor_done(
            done(),
            CommandStatus(status::ERROR_PAST_START),
            SCHEDULED_RX,
        );
        assert_eq!(only(v), Some(Event::MonitorRxWindowComplete));
        assert!(!v.fatal);
        let v = monitor_done(
            done(),
            CommandStatus(status::BLE_ERROR_PAR),
            SCHEDULED_RX,
        );
        assert!(v.fatal);
        assert_eq!(only(v), Some(Event::MonitorRxFailed));
    }
}
