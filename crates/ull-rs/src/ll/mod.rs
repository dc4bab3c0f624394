use core::marker::PhantomData;

use heapless::Deque;
use rand_core::RngCore;

use crate::{
    critical::IrqGuard,
    normalize::{self, Verdict},
    pdu::{CTE_INFO_LEN, HEADER_LEN, LENGTH_FIELD_LEN, MAX_PAYLOAD_LEN, META_LEN, POSTFIX_LEN},
    prelude::{AdvertiseClient, MonitorClient, ScanClient, UllInit},
    queue::DataQueue,
    rf::{
        front_end::{FrontEnd, SingleFrontEnd},
        CommandHandle, CommandStatus, RfDriver, RfEvents,
    },
    Event, LinkLayerState, PendingRxStatus, PendingTxStatus, UllConfig,
};

mod advertise;
mod details;
mod monitor;
mod scan;

pub use advertise::ADV_CHANNEL_GAP_HALF_TICKS;
use advertise::Advertiser;
use monitor::Monitor;
use scan::Scanner;

/// The number of receive descriptors in each receive queue.
pub const RX_QUEUE_LEN: usize = 4;
/// The capacity of one receive descriptor: the largest PDU with a CTEInfo byte, plus the postfix.
pub const RX_ENTRY_SIZE: usize =
    LENGTH_FIELD_LEN + HEADER_LEN + CTE_INFO_LEN + MAX_PAYLOAD_LEN + POSTFIX_LEN;
/// The largest packet handed to a scan or monitor client.
pub const RX_PACKET_SIZE: usize = HEADER_LEN + CTE_INFO_LEN + MAX_PAYLOAD_LEN + META_LEN;
/// The number of descriptors in the direction finding sample queue.
pub const SAMPLE_QUEUE_LEN: usize = 2;
/// The capacity of one direction finding sample descriptor.
pub const SAMPLE_ENTRY_SIZE: usize = 512;
/// The capacity of the event mailbox.
pub const EVENT_QUEUE_LEN: usize = 8;

pub type RxQueue = DataQueue<RX_QUEUE_LEN, RX_ENTRY_SIZE>;
pub type SampleQueue = DataQueue<SAMPLE_QUEUE_LEN, SAMPLE_ENTRY_SIZE>;

/// An collection of error types to describe link layer failures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UllError<E> {
    /// Represents an error reported by the radio driver.
    Rf(E),
    /// The operation is not allowed in the current [`LinkLayerState`].
    InvalidState,
    /// [`UllInit::init()`] has not been called (or failed).
    NotInitialized,
    /// The advertising data is longer than [`ADV_DATA_MAX`](crate::rf::ADV_DATA_MAX).
    PayloadTooLong,
    /// The channel is not valid for the requested role.
    InvalidChannel,
}

/// The role a radio callback belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Advertise,
    Scan,
    Monitor,
}

impl Role {
    /// The role that handles `event`.
    const fn of(event: Event) -> Self {
        match event {
            Event::AdvTxSuccess
            | Event::AdvTxFailed
            | Event::AdvIntervalTimerExpired
            | Event::AdvRadioAvailable
            | Event::AdvTxStarted
            | Event::AdvAboutToTx => Role::Advertise,
            Event::ScanRxSuccess
            | Event::ScanRxWindowComplete
            | Event::ScanRxFailed
            | Event::ScanRxBufFull
            | Event::ScanRxRadioAvailable
            | Event::ScanRxStarted => Role::Scan,
            Event::MonitorRxSuccess
            | Event::MonitorRxFailed
            | Event::MonitorRxBufFull
            | Event::MonitorRxWindowComplete
            | Event::MonitorRxRadioAvailable
            | Event::MonitorRxStarted => Role::Monitor,
        }
    }
}

/// The micro link layer.
///
/// This struct implements the [`Ull*` traits](mod@crate::prelude) on top of a
/// radio driver `D`. Advertising jitter is drawn from `G`. The front end `F` decides
/// how commands reach the driver (see [`front_end`](mod@crate::rf::front_end)).
///
/// Inbound entry points ([`LinkLayer::radio_callback()`], [`LinkLayer::radio_available()`],
/// [`LinkLayer::system_tick()`] and [`LinkLayer::post()`]) only record events.
/// Radio commands are only issued by [`LinkLayer::process()`] (or [`LinkLayer::dispatch()`])
/// and the role start/stop methods.
pub struct LinkLayer<'a, D, G, F = SingleFrontEnd> {
    driver: D,
    rng: G,
    config: UllConfig,
    state: LinkLayerState,
    initialized: bool,
    events: Deque<Event, EVENT_QUEUE_LEN>,
    adv: Advertiser<'a>,
    scan: Scanner<'a>,
    monitor: Monitor<'a>,
    _front_end: PhantomData<F>,
}

impl<'a, D, G, F> LinkLayer<'a, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    /// Instantiate a link layer. Call [`UllInit::init()`] before starting any role.
    pub fn new(driver: D, rng: G, config: UllConfig) -> Self {
        Self {
            driver,
            rng,
            config,
            state: LinkLayerState::Standby,
            initialized: false,
            events: Deque::new(),
            adv: Advertiser::new(&config),
            scan: Scanner::new(&config),
            monitor: Monitor::new(&config),
            _front_end: PhantomData,
        }
    }

    pub fn register_advertise_client(&mut self, client: &'a dyn AdvertiseClient) {
        self.adv.client = Some(client);
    }

    pub fn register_scan_client(&mut self, client: &'a dyn ScanClient) {
        self.scan.client = Some(client);
    }

    pub fn register_monitor_client(&mut self, client: &'a dyn MonitorClient) {
        self.monitor.client = Some(client);
    }

    /// The active role.
    pub fn state(&self) -> LinkLayerState {
        let _guard = IrqGuard::acquire();
        self.state
    }

    /// The state of the outstanding advertising chain.
    pub fn tx_status(&self) -> PendingTxStatus {
        let _guard = IrqGuard::acquire();
        self.adv.status
    }

    /// The state of the outstanding scan command, if any.
    pub fn scan_status(&self) -> Option<PendingRxStatus> {
        let _guard = IrqGuard::acquire();
        self.scan.status
    }

    /// The state of the outstanding monitor command, if any.
    pub fn monitor_status(&self) -> Option<PendingRxStatus> {
        let _guard = IrqGuard::acquire();
        self.monitor.status
    }

    pub fn config(&self) -> &UllConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The queue the radio fills while scanning.
    pub fn scan_queue_mut(&mut self) -> &mut RxQueue {
        &mut self.scan.queue
    }

    /// The queue the radio fills while monitoring.
    pub fn monitor_queue_mut(&mut self) -> &mut RxQueue {
        &mut self.monitor.queue
    }

    /// The queue the radio fills with direction finding samples while monitoring.
    pub fn sample_queue_mut(&mut self) -> &mut SampleQueue {
        &mut self.monitor.samples
    }

    /// Number of posted events waiting to be dispatched.
    pub fn pending_events(&self) -> usize {
        let _guard = IrqGuard::acquire();
        self.events.len()
    }

    /// Post an event for the dispatcher. Never blocks.
    ///
    /// If the mailbox is full, the event is dropped.
    pub fn post(&mut self, event: Event) {
        let _guard = IrqGuard::acquire();
        if self.events.push_back(event).is_err() {
            warn!("event mailbox full, dropping {}", event);
        }
    }

    /// Dispatch every posted event. Returns the number of events dispatched.
    pub fn process(&mut self) -> usize {
        let mut count = 0;
        loop {
            let next = {
                let _guard = IrqGuard::acquire();
                self.events.pop_front()
            };
            match next {
                Some(event) => {
                    self.dispatch(event);
                    count += 1;
                }
                None => return count,
            }
        }
    }

    /// Run the state machine for one event.
    pub fn dispatch(&mut self, event: Event) {
        trace!("dispatch {} in {}", event, self.state);
        match event {
            Event::AdvTxSuccess => self.on_adv_tx_success(),
            Event::AdvTxFailed => self.on_adv_tx_failed(),
            Event::AdvIntervalTimerExpired => self.on_adv_interval_expired(),
            Event::AdvRadioAvailable => self.on_adv_radio_available(),
            Event::AdvTxStarted => self.on_adv_tx_started(),
            Event::AdvAboutToTx => self.on_adv_about_to_tx(),
            Event::ScanRxSuccess => self.on_scan_rx_success(),
            Event::ScanRxWindowComplete => self.on_scan_window_complete(),
            Event::ScanRxFailed => self.on_scan_rx_failed(),
            Event::ScanRxBufFull => self.on_scan_buf_full(),
            Event::ScanRxRadioAvailable => self.on_scan_radio_available(),
            Event::ScanRxStarted => self.on_scan_rx_started(),
            Event::MonitorRxSuccess => self.on_monitor_rx_success(),
            Event::MonitorRxFailed => self.on_monitor_rx_failed(),
            Event::MonitorRxBufFull => self.on_monitor_buf_full(),
            Event::MonitorRxWindowComplete => self.on_monitor_window_complete(),
            Event::MonitorRxRadioAvailable => self.on_monitor_radio_available(),
            Event::MonitorRxStarted => self.on_monitor_rx_started(),
        }
    }

    /// Report radio progress for a submitted command.
    ///
    /// `statuses` are the command statuses written by the radio (one per enabled
    /// channel for an advertising chain). Callbacks for a handle that is no longer
    /// outstanding (for example, after a stop) are ignored.
    pub fn radio_callback(
        &mut self,
        handle: CommandHandle,
        events: RfEvents,
        statuses: &[CommandStatus],
    ) {
        let verdict = {
            let _guard = IrqGuard::acquire();
            let role = if self.adv.handle == Some(handle) {
                Role::Advertise
            } else if self.scan.handle == Some(handle) {
                Role::Scan
            } else if self.monitor.handle == Some(handle) {
                Role::Monitor
            } else {
                trace!("ignoring callback for stale handle {}", handle.0);
                return;
            };
            let terminated = events.is_termination();
            let verdict = match role {
                Role::Advertise => {
                    self.adv.cmd.record_status(statuses);
                    if terminated {
                        self.adv.handle = None;
                    }
                    normalize::advertise_done(events, self.adv.cmd.status(), self.adv.status)
                }
                Role::Scan => {
                    self.scan.cmd.record_status(statuses);
                    if terminated {
                        self.scan.handle = None;
                    }
                    normalize::scan_done(events, self.scan.cmd.status(), self.scan.status)
                }
                Role::Monitor => {
                    self.monitor.cmd.record_status(statuses);
                    if terminated {
                        self.monitor.handle = None;
                    }
                    normalize::monitor_done(events, self.monitor.cmd.status(), self.monitor.status)
                }
            };
            if verdict.fatal {
                self.force_standby(role);
            }
            verdict
        };
        self.post_verdict(verdict);
    }

    /// Tell the link layer the radio is free again. Roles that were refused
    /// the radio retry from the dispatcher.
    pub fn radio_available(&mut self) {
        let (adv, scan, monitor) = {
            let _guard = IrqGuard::acquire();
            (
                self.adv.status == PendingTxStatus::NoRadioResource,
                self.scan.status == Some(PendingRxStatus::NoRadioResource),
                self.monitor.status == Some(PendingRxStatus::NoRadioResource),
            )
        };
        if adv {
            self.post(Event::AdvRadioAvailable);
        }
        if scan {
            self.post(Event::ScanRxRadioAvailable);
        }
        if monitor {
            self.post(Event::MonitorRxRadioAvailable);
        }
    }

    /// Advance the software timers by `elapsed` system ticks.
    pub fn system_tick(&mut self, elapsed: u32) {
        let (about_to_adv, interval) = {
            let _guard = IrqGuard::acquire();
            (
                self.adv.about_to_adv.tick(elapsed),
                self.adv.interval.tick(elapsed),
            )
        };
        if about_to_adv.is_some() {
            self.post(Event::AdvAboutToTx);
        }
        if interval.is_some() {
            self.post(Event::AdvIntervalTimerExpired);
        }
    }

    /// Drop every posted event that belongs to `role`, keeping the order of the rest.
    fn purge_events(&mut self, role: Role) {
        let _guard = IrqGuard::acquire();
        for _ in 0..self.events.len() {
            if let Some(event) = self.events.pop_front() {
                if Role::of(event) == role {
                    trace!("purging {}", event);
                } else {
                    // cannot fail, pop_front() just freed a slot
                    let _ = self.events.push_back(event);
                }
            }
        }
    }

    fn post_verdict(&mut self, verdict: Verdict) {
        for event in verdict.iter() {
            self.post(event);
        }
    }

    fn transition(&mut self, to: LinkLayerState) {
        let _guard = IrqGuard::acquire();
        if self.state != to {
            debug!("{} -> {}", self.state, to);
            self.state = to;
        }
    }

    /// Drop a role to Standby after a fatal radio error.
    fn force_standby(&mut self, role: Role) {
        let _guard = IrqGuard::acquire();
        error!("fatal radio error in {}", self.state);
        match role {
            Role::Advertise => {
                self.adv.status = PendingTxStatus::Failed;
                self.adv.about_to_adv.stop();
                self.adv.interval.stop();
                if self.state == LinkLayerState::Advertising {
                    self.transition(LinkLayerState::Standby);
                }
            }
            Role::Scan => {
                self.scan.status = Some(PendingRxStatus::Failed);
                if self.state == LinkLayerState::Scanning {
                    self.transition(LinkLayerState::Standby);
                }
            }
            Role::Monitor => {
                self.monitor.status = Some(PendingRxStatus::Failed);
                if self.state == LinkLayerState::Monitoring {
                    self.transition(LinkLayerState::Standby);
                }
            }
        }
    }

    /// Cancel an outstanding command, if any.
    fn cancel(&mut self, handle: Option<CommandHandle>) {
        if let Some(handle) = handle {
            debug!("cancelling command {}", handle.0);
            self.driver.cancel(handle, Default::default());
        }
    }

    fn check_initialized(&self) -> Result<(), UllError<D::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(UllError::NotInitialized)
        }
    }

    /// Enter `to` from Standby.
    fn enter(&mut self, to: LinkLayerState) -> Result<(), UllError<D::Error>> {
        self.check_initialized()?;
        let _guard = IrqGuard::acquire();
        if self.state != LinkLayerState::Standby {
            return Err(UllError::InvalidState);
        }
        self.transition(to);
        Ok(())
    }
}

impl<D, G, F> UllInit for LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    type InitErrorType = UllError<D::Error>;

    fn init(&mut self) -> Result<(), Self::InitErrorType> {
        if self.initialized {
            return Ok(());
        }
        self.driver.open().map_err(UllError::Rf)?;
        self.scan.queue.setup();
        self.monitor.queue.setup();
        self.monitor.samples.setup();
        let _guard = IrqGuard::acquire();
        self.state = LinkLayerState::Standby;
        self.initialized = true;
        debug!("link layer initialized");
        Ok(())
    }
}
