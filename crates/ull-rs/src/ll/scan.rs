use rand_core::RngCore;

use super::{LinkLayer, Role, RxQueue, UllError, RX_PACKET_SIZE};
use crate::{
    critical::IrqGuard,
    pdu::extract,
    prelude::{ScanClient, UllScan},
    queue::EntryStatus,
    rf::{
        front_end::FrontEnd, CommandHandle, EndTrigger, Operation, RadioCommand, RfDriver,
        RfEvents, ScanParams, StartTrigger, ADV_CHANNELS,
    },
    Event, LinkLayerState, PendingRxStatus, RxMode, UllConfig, UllStatus,
};

/// Scanner state owned by the [`LinkLayer`].
pub(super) struct Scanner<'a> {
    pub(super) client: Option<&'a dyn ScanClient>,
    pub(super) cmd: RadioCommand,
    pub(super) handle: Option<CommandHandle>,
    pub(super) status: Option<PendingRxStatus>,
    pub(super) channel: u8,
    pub(super) queue: RxQueue,
    pub(super) buf: [u8; RX_PACKET_SIZE],
}

impl Scanner<'_> {
    pub(super) fn new(config: &UllConfig) -> Self {
        let channel = config.scan_channel();
        Self {
            client: None,
            cmd: RadioCommand::new(Operation::Scan(ScanParams { channel })),
            handle: None,
            status: None,
            channel,
            queue: RxQueue::new(),
            buf: [0; RX_PACKET_SIZE],
        }
    }
}

impl<D, G, F> LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    /// Submit the scan command.
    ///
    /// The scan window has no end, so [`RxMode::Start`] and [`RxMode::Reschedule`]
    /// issue the same command.
    pub(super) fn schedule_scan(&mut self, mode: RxMode) -> Result<(), UllError<D::Error>> {
        let mut cmd = RadioCommand::new(Operation::Scan(ScanParams {
            channel: self.scan.channel,
        }));
        cmd.start = StartTrigger::Now;
        cmd.end = EndTrigger::Never;
        cmd.reset_status();

        let stale = {
            let _guard = IrqGuard::acquire();
            self.scan.handle.take()
        };
        self.cancel(stale);

        trace!("scan {} on channel {}", mode, self.scan.channel);
        let submitted = F::submit(
            &mut self.driver,
            &cmd,
            self.config.priority(),
            None,
            RfEvents::receive_mask(),
        );
        let _guard = IrqGuard::acquire();
        self.scan.cmd = cmd;
        match submitted {
            Ok(handle) => {
                self.scan.handle = Some(handle);
                self.scan.status = Some(PendingRxStatus::Scheduled);
                Ok(())
            }
            Err(e) => {
                warn!("scan command refused by the radio");
                self.scan.status = Some(PendingRxStatus::NoRadioResource);
                Err(UllError::Rf(e))
            }
        }
    }

    /// Hand the oldest received packet to the client.
    ///
    /// Returns `false` if there was nothing to drain.
    fn drain_scan_entry(&mut self) -> bool {
        let extracted = match self.scan.queue.peek_next() {
            Some(entry) if entry.status == EntryStatus::Finished => {
                Some(extract(entry.bytes(), &mut self.scan.buf, false))
            }
            _ => None,
        };
        let Some(extracted) = extracted else {
            return false;
        };
        self.scan.queue.advance();
        match (extracted, self.scan.client) {
            (Some(packet), Some(client)) => {
                client.on_scan_indication(UllStatus::Success, &self.scan.buf[..packet.len]);
            }
            (None, _) => warn!("dropping malformed scan entry"),
            _ => (),
        }
        true
    }

    fn notify_scan_complete(&self, status: UllStatus) {
        if let Some(client) = self.scan.client {
            client.on_scan_window_complete(status);
        }
    }

    pub(super) fn on_scan_rx_success(&mut self) {
        if self.state() == LinkLayerState::Scanning {
            self.drain_scan_entry();
        }
    }

    pub(super) fn on_scan_window_complete(&mut self) {
        if self.state() != LinkLayerState::Scanning {
            return;
        }
        while self.drain_scan_entry() {}
        if self.schedule_scan(RxMode::Reschedule).is_err() {
            debug!("waiting for the radio to scan again");
        }
    }

    pub(super) fn on_scan_rx_failed(&mut self) {
        let status = {
            let _guard = IrqGuard::acquire();
            if self.state == LinkLayerState::Scanning {
                self.scan.status = Some(PendingRxStatus::NoRadioResource);
                UllStatus::NoResources
            } else if self.scan.status == Some(PendingRxStatus::Failed) {
                // forced to Standby by a fatal radio error
                self.scan.status = None;
                UllStatus::Failure
            } else {
                return;
            }
        };
        self.notify_scan_complete(status);
    }

    pub(super) fn on_scan_buf_full(&mut self) {
        if let Some(client) = self.scan.client {
            client.on_scan_indication(UllStatus::BufferNotAvailable, &[]);
        }
        if self.state() != LinkLayerState::Scanning {
            return;
        }
        let running = {
            let _guard = IrqGuard::acquire();
            self.scan.handle.is_some()
        };
        if running {
            // make room for the command that is still receiving
            while self.drain_scan_entry() {}
        } else if self.schedule_scan(RxMode::Reschedule).is_err() {
            debug!("waiting for the radio to scan again");
        }
    }

    pub(super) fn on_scan_radio_available(&mut self) {
        {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Scanning
                || self.scan.status != Some(PendingRxStatus::NoRadioResource)
            {
                return;
            }
        }
        if self.schedule_scan(RxMode::Reschedule).is_err() {
            debug!("radio still busy");
        }
    }

    pub(super) fn on_scan_rx_started(&mut self) {
        if self.state() != LinkLayerState::Scanning {
            return;
        }
        if self.schedule_scan(RxMode::Start).is_err() {
            error!("could not start scanning");
            {
                let _guard = IrqGuard::acquire();
                self.scan.status = None;
                self.transition(LinkLayerState::Standby);
            }
            self.notify_scan_complete(UllStatus::Failure);
        }
    }
}

impl<D, G, F> UllScan for LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    type ScanErrorType = UllError<D::Error>;

    fn scan_start(&mut self, channel: Option<u8>) -> Result<(), Self::ScanErrorType> {
        let channel = channel.unwrap_or(self.config.scan_channel());
        if !ADV_CHANNELS.contains(&channel) {
            return Err(UllError::InvalidChannel);
        }
        self.enter(LinkLayerState::Scanning)?;
        self.scan.queue.setup();
        {
            let _guard = IrqGuard::acquire();
            self.scan.channel = channel;
            self.scan.status = None;
        }
        self.post(Event::ScanRxStarted);
        Ok(())
    }

    fn scan_stop(&mut self) -> Result<(), Self::ScanErrorType> {
        let stale = {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Scanning {
                return Ok(());
            }
            self.scan.status = None;
            self.transition(LinkLayerState::Standby);
            self.purge_events(Role::Scan);
            self.scan.handle.take()
        };
        self.cancel(stale);
        self.notify_scan_complete(UllStatus::Success);
        Ok(())
    }
}
