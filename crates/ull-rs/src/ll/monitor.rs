use rand_core::RngCore;

use super::{LinkLayer, Role, RxQueue, SampleQueue, UllError, RX_PACKET_SIZE};
use crate::{
    config::MonitorSession,
    critical::IrqGuard,
    pdu::extract,
    prelude::{MonitorClient, UllMonitor},
    queue::EntryStatus,
    rf::{
        front_end::FrontEnd, ms_to_rat, CommandHandle, EndTrigger, MonitorParams, Operation,
        RadioCommand, RatTicks, RfDriver, RfEvents, StartTrigger,
    },
    Event, LinkLayerState, PendingRxStatus, RxMode, UllConfig, UllStatus,
};

/// The highest BLE RF channel index.
const MAX_CHANNEL: u8 = 39;

/// Passive monitor state owned by the [`LinkLayer`].
pub(super) struct Monitor<'a> {
    pub(super) client: Option<&'a dyn MonitorClient>,
    pub(super) cmd: RadioCommand,
    pub(super) handle: Option<CommandHandle>,
    pub(super) status: Option<PendingRxStatus>,
    pub(super) channel: u8,
    pub(super) session: MonitorSession,
    pub(super) start_time: RatTicks,
    pub(super) queue: RxQueue,
    pub(super) samples: SampleQueue,
    pub(super) buf: [u8; RX_PACKET_SIZE],
}

impl Monitor<'_> {
    pub(super) fn new(config: &UllConfig) -> Self {
        let session = config.monitor_session();
        Self {
            client: None,
            cmd: RadioCommand::new(Operation::Monitor(MonitorParams {
                channel: 0,
                access_address: session.access_address(),
                crc_init: session.crc_init(),
                df_auto_copy: false,
            })),
            handle: None,
            status: None,
            channel: 0,
            session,
            start_time: 0,
            queue: RxQueue::new(),
            samples: SampleQueue::new(),
            buf: [0; RX_PACKET_SIZE],
        }
    }

    /// The end trigger of a rescheduled window that started at `start_time`.
    fn remaining(&self, now: RatTicks) -> EndTrigger {
        if self.session.duration_ms() == 0 {
            return EndTrigger::Never;
        }
        let duration = ms_to_rat(self.session.duration_ms());
        let elapsed = now.wrapping_sub(self.start_time);
        if elapsed >= duration {
            EndTrigger::Now
        } else {
            EndTrigger::Relative(duration - elapsed)
        }
    }
}

impl<D, G, F> LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    /// Submit the passive receive command of the current session.
    pub(super) fn schedule_monitor(&mut self, mode: RxMode) -> Result<(), UllError<D::Error>> {
        let now = self.driver.now();
        let session = self.monitor.session;
        let mut cmd = RadioCommand::new(Operation::Monitor(MonitorParams {
            channel: self.monitor.channel,
            access_address: session.access_address(),
            crc_init: session.crc_init(),
            df_auto_copy: session.df_enabled(),
        }));
        match mode {
            RxMode::Start => {
                cmd.start = StartTrigger::Absolute {
                    time: now,
                    past_allowed: true,
                };
                cmd.end = match session.duration_ms() {
                    0 => EndTrigger::Never,
                    ms => EndTrigger::Relative(ms_to_rat(ms)),
                };
            }
            RxMode::Reschedule => {
                cmd.start = StartTrigger::Now;
                cmd.end = self.monitor.remaining(now);
            }
        }
        cmd.reset_status();

        let stale = {
            let _guard = IrqGuard::acquire();
            self.monitor.handle.take()
        };
        self.cancel(stale);

        trace!(
            "monitor {} session {} on channel {}",
            mode,
            session.session_id(),
            self.monitor.channel
        );
        let submitted = F::submit(
            &mut self.driver,
            &cmd,
            self.config.priority(),
            None,
            RfEvents::receive_mask(),
        );
        let _guard = IrqGuard::acquire();
        if mode == RxMode::Start {
            self.monitor.start_time = now;
        }
        self.monitor.cmd = cmd;
        match submitted {
            Ok(handle) => {
                self.monitor.handle = Some(handle);
                self.monitor.status = Some(PendingRxStatus::Scheduled);
                Ok(())
            }
            Err(e) => {
                warn!("monitor command refused by the radio");
                self.monitor.status = Some(PendingRxStatus::NoRadioResource);
                Err(UllError::Rf(e))
            }
        }
    }

    /// Hand the oldest received packet to the client.
    ///
    /// Returns `false` if there was nothing to drain.
    fn drain_monitor_entry(&mut self) -> bool {
        let extracted = match self.monitor.queue.peek_next() {
            Some(entry) if entry.status == EntryStatus::Finished => {
                Some(extract(entry.bytes(), &mut self.monitor.buf, true))
            }
            _ => None,
        };
        let Some(extracted) = extracted else {
            return false;
        };
        self.monitor.queue.advance();
        let session_id = self.monitor.session.session_id();
        match (extracted, self.monitor.client) {
            (Some(packet), Some(client)) => client.on_monitor_indication(
                UllStatus::Success,
                session_id,
                &self.monitor.buf[..packet.len],
                packet.cte,
            ),
            (None, _) => warn!("dropping malformed monitor entry"),
            _ => (),
        }
        true
    }

    /// Hand every finished direction finding sample buffer to the client.
    fn drain_samples(&mut self) {
        let session_id = self.monitor.session.session_id();
        while let Some(entry) = self.monitor.samples.peek_next() {
            if entry.status != EntryStatus::Finished {
                break;
            }
            if let Some(client) = self.monitor.client {
                client.on_monitor_samples(session_id, entry.bytes());
            }
            self.monitor.samples.advance();
        }
    }

    fn notify_monitor_complete(&self, status: UllStatus) {
        if let Some(client) = self.monitor.client {
            client.on_monitor_complete(status, self.monitor.session.session_id());
        }
    }

    pub(super) fn on_monitor_rx_success(&mut self) {
        if self.state() == LinkLayerState::Monitoring {
            self.drain_monitor_entry();
        }
    }

    pub(super) fn on_monitor_window_complete(&mut self) {
        if self.state() != LinkLayerState::Monitoring {
            return;
        }
        while self.drain_monitor_entry() {}
        if self.monitor.session.df_enabled() {
            self.drain_samples();
        }
        {
            let _guard = IrqGuard::acquire();
            self.monitor.status = None;
            self.transition(LinkLayerState::Standby);
        }
        self.notify_monitor_complete(UllStatus::Success);
    }

    pub(super) fn on_monitor_rx_failed(&mut self) {
        let status = {
            let _guard = IrqGuard::acquire();
            if self.state == LinkLayerState::Monitoring {
                self.monitor.status = Some(PendingRxStatus::NoRadioResource);
                UllStatus::NoResources
            } else if self.monitor.status == Some(PendingRxStatus::Failed) {
                // forced to Standby by a fatal radio error
                self.monitor.status = None;
                UllStatus::Failure
            } else {
                return;
            }
        };
        self.notify_monitor_complete(status);
    }

    pub(super) fn on_monitor_buf_full(&mut self) {
        if let Some(client) = self.monitor.client {
            client.on_monitor_indication(
                UllStatus::BufferNotAvailable,
                self.monitor.session.session_id(),
                &[],
                None,
            );
        }
        if self.state() != LinkLayerState::Monitoring {
            return;
        }
        let running = {
            let _guard = IrqGuard::acquire();
            self.monitor.handle.is_some()
        };
        if running {
            while self.drain_monitor_entry() {}
        } else if self.schedule_monitor(RxMode::Reschedule).is_err() {
            debug!("waiting for the radio to monitor again");
        }
    }

    pub(super) fn on_monitor_radio_available(&mut self) {
        {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Monitoring
                || self.monitor.status != Some(PendingRxStatus::NoRadioResource)
            {
                return;
            }
        }
        if self.schedule_monitor(RxMode::Reschedule).is_err() {
            debug!("radio still busy");
        }
    }

    pub(super) fn on_monitor_rx_started(&mut self) {
        if self.state() != LinkLayerState::Monitoring {
            return;
        }
        if self.schedule_monitor(RxMode::Start).is_err() {
            error!("could not start monitoring");
            {
                let _guard = IrqGuard::acquire();
                self.monitor.status = None;
                self.transition(LinkLayerState::Standby);
            }
            self.notify_monitor_complete(UllStatus::Failure);
        }
    }
}

impl<D, G, F> UllMonitor for LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    type MonitorErrorType = UllError<D::Error>;

    fn monitor_start(&mut self, channel: u8) -> Result<(), Self::MonitorErrorType> {
        if channel > MAX_CHANNEL {
            return Err(UllError::InvalidChannel);
        }
        self.enter(LinkLayerState::Monitoring)?;
        self.monitor.queue.setup();
        self.monitor.samples.setup();
        {
            let _guard = IrqGuard::acquire();
            self.monitor.channel = channel;
            self.monitor.status = None;
        }
        self.post(Event::MonitorRxStarted);
        Ok(())
    }

    fn monitor_stop(&mut self) -> Result<(), Self::MonitorErrorType> {
        let stale = {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Monitoring {
                return Ok(());
            }
            self.monitor.status = None;
            self.transition(LinkLayerState::Standby);
            self.purge_events(Role::Monitor);
            self.monitor.handle.take()
        };
        self.cancel(stale);
        self.notify_monitor_complete(UllStatus::Success);
        Ok(())
    }

    fn set_monitor_session(&mut self, session: MonitorSession) -> Result<(), Self::MonitorErrorType> {
        let _guard = IrqGuard::acquire();
        if self.state == LinkLayerState::Monitoring {
            return Err(UllError::InvalidState);
        }
        self.monitor.session = session;
        Ok(())
    }
}
