use rand_core::RngCore;

use super::{LinkLayer, Role, UllError};
use crate::{
    critical::IrqGuard,
    pdu::adv_airtime_rat,
    prelude::{AdvertiseClient, UllAdvertise},
    rf::{
        front_end::FrontEnd, ms_to_rat, rat_diff, AdvChain, AdvPacket, CommandHandle, EndTrigger,
        Operation, RadioCommand, RatTicks, RfDriver, RfEvents, StartTrigger, ADV_DATA_MAX,
    },
    timer::{rat_to_system_ticks, OneShotTimer, TimerTag},
    AdvMode, AdvTiming, LinkLayerState, PendingTxStatus, UllConfig, UllStatus,
};

/// The radio's ramp and settle time between two channels of a chain, in half radio ticks.
pub const ADV_CHANNEL_GAP_HALF_TICKS: u32 = 749;

/// Advertiser state owned by the [`LinkLayer`].
pub(super) struct Advertiser<'a> {
    pub(super) client: Option<&'a dyn AdvertiseClient>,
    pub(super) cmd: RadioCommand,
    pub(super) handle: Option<CommandHandle>,
    pub(super) start_time: RatTicks,
    pub(super) packet: AdvPacket,
    pub(super) status: PendingTxStatus,
    pub(super) about_to_adv: OneShotTimer,
    pub(super) interval: OneShotTimer,
}

impl Advertiser<'_> {
    pub(super) fn new(config: &UllConfig) -> Self {
        let packet = AdvPacket::new(config.adv_header(), config.adv_address());
        Self {
            client: None,
            cmd: RadioCommand::new(Operation::Advertise(AdvChain::new(
                config.adv_channel_map(),
                packet,
            ))),
            handle: None,
            start_time: 0,
            packet,
            status: PendingTxStatus::Done,
            about_to_adv: OneShotTimer::new(TimerTag::AboutToAdvertise),
            interval: OneShotTimer::new(TimerTag::AdvInterval),
        }
    }
}

/// The radio time at which the last transmission of `chain` (starting at `start`) ends.
pub(super) fn chain_end(start: RatTicks, chain: &AdvChain) -> RatTicks {
    let count = chain.channels().count() as u32;
    if count == 0 {
        return start;
    }
    let air = adv_airtime_rat(chain.packet.payload_len());
    let half_ticks =
        count * (2 * air + ADV_CHANNEL_GAP_HALF_TICKS) - ADV_CHANNEL_GAP_HALF_TICKS;
    start.wrapping_add(half_ticks / 2)
}

impl<D, G, F> LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    fn adv_jitter(&mut self) -> RatTicks {
        let max = ms_to_rat(self.config.jitter_max_ms());
        if max == 0 {
            return 0;
        }
        self.rng.next_u32() % max.saturating_add(1)
    }

    fn notify_adv_done(&self, status: UllStatus) {
        if let Some(client) = self.adv.client {
            client.on_advertise_done(status);
        }
    }

    /// Build and submit the next advertising chain.
    pub(super) fn schedule_advertise(&mut self, mode: AdvMode) -> Result<(), UllError<D::Error>> {
        let now = self.driver.now();
        let interval = ms_to_rat(self.config.adv_interval_ms());
        let start = match mode {
            AdvMode::Start | AdvMode::Immediate => {
                now.wrapping_add(ms_to_rat(self.config.start_delay_ms()))
            }
            AdvMode::Periodic => {
                let jitter = self.adv_jitter();
                self.adv.start_time.wrapping_add(interval).wrapping_add(jitter)
            }
            AdvMode::PeriodicRelaxed => {
                let jitter = self.adv_jitter();
                now.wrapping_add(interval).wrapping_add(jitter)
            }
            AdvMode::Reschedule => self.adv.start_time,
        };

        let chain = AdvChain::new(self.config.adv_channel_map(), self.adv.packet);
        let mut cmd = RadioCommand::new(Operation::Advertise(chain));
        cmd.start = StartTrigger::Absolute {
            time: start,
            past_allowed: false,
        };
        cmd.end = EndTrigger::Never;
        cmd.reset_status();

        let tick_us = self.config.system_tick_us();
        let end_time = if F::SCHEDULING {
            let interval_ticks = rat_to_system_ticks(interval, tick_us);
            let bias_ticks =
                rat_to_system_ticks(ms_to_rat(self.config.watchdog_bias_ms()), tick_us);
            let watchdog = match self.config.timing() {
                AdvTiming::Critical => interval_ticks.saturating_add(bias_ticks),
                AdvTiming::Relaxed => interval_ticks.saturating_mul(2).saturating_sub(bias_ticks),
            };
            let _guard = IrqGuard::acquire();
            self.adv.interval.start(watchdog);
            Some(chain_end(start, &chain))
        } else {
            None
        };

        let stale = {
            let _guard = IrqGuard::acquire();
            self.adv.handle.take()
        };
        self.cancel(stale);

        trace!("advertise {} at {}", mode, start);
        let submitted = F::submit(
            &mut self.driver,
            &cmd,
            self.config.priority(),
            end_time,
            RfEvents::advertise_mask(),
        );
        {
            let _guard = IrqGuard::acquire();
            self.adv.cmd = cmd;
            self.adv.start_time = start;
            match submitted {
                Ok(handle) => {
                    self.adv.handle = Some(handle);
                    self.adv.status = PendingTxStatus::Scheduled;
                }
                Err(e) => {
                    warn!("advertising chain refused by the radio");
                    self.adv.status = PendingTxStatus::NoRadioResource;
                    return Err(UllError::Rf(e));
                }
            }
        }

        let lead_ms = self.config.time_to_adv_ms();
        if mode != AdvMode::Start && lead_ms > 0 {
            let remaining = rat_diff(start, self.driver.now());
            let lead = ms_to_rat(lead_ms) as i32;
            if remaining > lead {
                let ticks = rat_to_system_ticks((remaining - lead) as u32, tick_us);
                let _guard = IrqGuard::acquire();
                self.adv.about_to_adv.start(ticks);
            }
        }
        Ok(())
    }

    /// Give up advertising after the radio refused the first chain.
    fn abandon_advertising(&mut self) {
        {
            let _guard = IrqGuard::acquire();
            self.adv.status = PendingTxStatus::Failed;
            self.adv.about_to_adv.stop();
            self.adv.interval.stop();
            self.transition(LinkLayerState::Standby);
        }
        self.notify_adv_done(UllStatus::Failure);
    }

    pub(super) fn on_adv_tx_success(&mut self) {
        {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Advertising {
                return;
            }
            self.adv.status = PendingTxStatus::Done;
            self.adv.interval.stop();
        }
        self.notify_adv_done(UllStatus::Success);
        let mode = match self.config.timing() {
            AdvTiming::Critical => AdvMode::Periodic,
            AdvTiming::Relaxed => AdvMode::PeriodicRelaxed,
        };
        if self.schedule_advertise(mode).is_err() {
            debug!("waiting for the radio to advertise again");
        }
    }

    pub(super) fn on_adv_tx_failed(&mut self) {
        let status = {
            let _guard = IrqGuard::acquire();
            if self.state == LinkLayerState::Advertising {
                self.adv.status = PendingTxStatus::NoRadioResource;
                UllStatus::NoResources
            } else if self.adv.status == PendingTxStatus::Failed {
                // forced to Standby by a fatal radio error
                UllStatus::Failure
            } else {
                return;
            }
        };
        self.notify_adv_done(status);
    }

    pub(super) fn on_adv_interval_expired(&mut self) {
        {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Advertising {
                return;
            }
            self.adv.status = PendingTxStatus::Failed;
        }
        warn!("advertising chain missed its interval");
        self.notify_adv_done(UllStatus::Failure);
        let mode = match self.config.timing() {
            AdvTiming::Critical => AdvMode::Periodic,
            AdvTiming::Relaxed => {
                let stale = {
                    let _guard = IrqGuard::acquire();
                    self.adv.handle.take()
                };
                self.cancel(stale);
                AdvMode::PeriodicRelaxed
            }
        };
        if self.schedule_advertise(mode).is_err() {
            debug!("waiting for the radio to advertise again");
        }
    }

    pub(super) fn on_adv_radio_available(&mut self) {
        {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Advertising
                || self.adv.status != PendingTxStatus::NoRadioResource
            {
                return;
            }
        }
        let lead = rat_diff(self.adv.start_time, self.driver.now());
        let mode = if lead > ms_to_rat(self.config.start_delay_ms()) as i32 {
            AdvMode::Reschedule
        } else if self.config.timing() == AdvTiming::Critical {
            self.notify_adv_done(UllStatus::Failure);
            AdvMode::Periodic
        } else {
            AdvMode::Immediate
        };
        if self.schedule_advertise(mode).is_err() {
            debug!("radio still busy");
        }
    }

    pub(super) fn on_adv_tx_started(&mut self) {
        if self.state() != LinkLayerState::Advertising {
            return;
        }
        if self.schedule_advertise(AdvMode::Start).is_err() {
            error!("could not start advertising");
            self.abandon_advertising();
        }
    }

    pub(super) fn on_adv_about_to_tx(&mut self) {
        if self.state() != LinkLayerState::Advertising {
            return;
        }
        if let Some(client) = self.adv.client {
            client.on_about_to_advertise();
        }
    }
}

impl<D, G, F> UllAdvertise for LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    type AdvertiseErrorType = UllError<D::Error>;

    fn adv_start(&mut self) -> Result<(), Self::AdvertiseErrorType> {
        if self.config.adv_channel_map() == 0 {
            return Err(UllError::InvalidChannel);
        }
        self.enter(LinkLayerState::Advertising)?;
        {
            let _guard = IrqGuard::acquire();
            self.adv.status = PendingTxStatus::Done;
        }
        self.post(crate::Event::AdvTxStarted);
        Ok(())
    }

    fn adv_stop(&mut self) -> Result<(), Self::AdvertiseErrorType> {
        let stale = {
            let _guard = IrqGuard::acquire();
            if self.state != LinkLayerState::Advertising {
                return Ok(());
            }
            self.adv.about_to_adv.stop();
            self.adv.interval.stop();
            self.adv.status = PendingTxStatus::Done;
            self.transition(LinkLayerState::Standby);
            self.purge_events(Role::Advertise);
            self.adv.handle.take()
        };
        self.cancel(stale);
        Ok(())
    }

    fn set_adv_data(&mut self, data: &[u8]) -> Result<(), Self::AdvertiseErrorType> {
        if data.len() > ADV_DATA_MAX {
            return Err(UllError::PayloadTooLong);
        }
        let _guard = IrqGuard::acquire();
        self.adv.packet.set_data(data);
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{chain_end, ADV_CHANNEL_GAP_HALF_TICKS};
    use crate::prelude::*;
    use crate::rf::{
        ms_to_rat, status, AdvChain, AdvPacket, CommandStatus, EndTrigger, Operation, RfEvents,
        StartTrigger,
    };
    use crate::test::{mk_ll, mk_scheduling_ll, AdvRecord, RecordingAdvertiser, Submission};
    use crate::{AdvTiming, Event, LinkLayerState, PendingTxStatus, UllConfig, UllError, UllStatus};
    use std::vec;

    const NOW: u32 = 1_000_000;

    fn start_time(cmd: &crate::rf::RadioCommand) -> u32 {
        match cmd.start {
            StartTrigger::Absolute { time, .. } => time,
            StartTrigger::Now => panic!("advertising chains start at an absolute time"),
        }
    }

    fn ok_done() -> (RfEvents, [CommandStatus; 3]) {
        (
            RfEvents::new().with_last_cmd_done(true),
            [CommandStatus(status::BLE_DONE_OK); 3],
        )
    }

    #[test]
    fn start_schedules_first_chain() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        assert_eq!(ll.state(), LinkLayerState::Advertising);
        assert_eq!(ll.pending_events(), 1);
        assert!(ll.driver().submitted.is_empty());

        assert_eq!(ll.process(), 1);
        let sub = &ll.driver().submitted[0];
        assert_eq!(start_time(&sub.cmd), NOW + ms_to_rat(1));
        assert_eq!(sub.cmd.end, EndTrigger::Never);
        assert!(matches!(sub.how, Submission::Post(_)));
        match sub.cmd.op {
            Operation::Advertise(chain) => {
                assert_eq!(chain.channels().count(), 3);
                assert!(chain.subs.iter().all(|s| s.status == CommandStatus::IDLE));
            }
            _ => panic!("expected an advertising chain"),
        }
        assert_eq!(ll.tx_status(), PendingTxStatus::Scheduled);
        assert!(client.records.borrow().is_empty());
    }

    #[test]
    fn success_schedules_periodic_within_jitter() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let first = start_time(&ll.driver().submitted[0].cmd);
        let interval = ms_to_rat(100);
        let mut previous = first;
        for round in 1..6 {
            let handle = ll.driver().last_handle();
            let (events, statuses) = ok_done();
            ll.radio_callback(handle, events, &statuses);
            assert_eq!(ll.process(), 1);
            let next = start_time(&ll.driver().submitted[round].cmd);
            assert!(next >= previous + interval);
            assert!(next <= previous + interval + ms_to_rat(10));
            previous = next;
        }
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::Success); 5]
        );
        assert_eq!(ll.tx_status(), PendingTxStatus::Scheduled);
    }

    #[test]
    fn aborted_chain_reports_no_resources() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        ll.radio_callback(
            handle,
            RfEvents::new().with_cmd_aborted(true),
            &[CommandStatus(status::BLE_DONE_ABORT)],
        );
        assert_eq!(ll.process(), 1);
        assert_eq!(ll.tx_status(), PendingTxStatus::NoRadioResource);
        assert_eq!(ll.state(), LinkLayerState::Advertising);
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::NoResources)]
        );
    }

    #[test]
    fn internal_error_forces_standby() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_scheduling_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        ll.radio_callback(handle, RfEvents::new().with_internal_error(true), &[]);
        assert_eq!(ll.state(), LinkLayerState::Standby);
        ll.process();
        assert_eq!(ll.tx_status(), PendingTxStatus::Failed);
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::Failure)]
        );
        // the watchdog was stopped with the role
        ll.system_tick(u32::MAX);
        assert_eq!(ll.pending_events(), 0);
    }

    #[test]
    fn refused_first_chain_returns_to_standby() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.driver_mut().reject = true;
        ll.process();
        assert_eq!(ll.state(), LinkLayerState::Standby);
        assert_eq!(ll.tx_status(), PendingTxStatus::Failed);
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::Failure)]
        );
    }

    #[test]
    fn radio_available_reschedules_same_slot() {
        let mut ll = mk_ll(UllConfig::default().with_start_delay_ms(1));
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        let (events, statuses) = ok_done();
        ll.radio_callback(handle, events, &statuses);
        ll.driver_mut().reject = true;
        ll.process();
        assert_eq!(ll.tx_status(), PendingTxStatus::NoRadioResource);
        let wanted = start_time(&ll.driver().attempts.last().unwrap().cmd);

        ll.driver_mut().reject = false;
        ll.radio_available();
        assert_eq!(ll.process(), 1);
        let got = ll.driver().submitted.last().unwrap();
        assert_eq!(start_time(&got.cmd), wanted);
        assert_eq!(ll.tx_status(), PendingTxStatus::Scheduled);
    }

    #[test]
    fn radio_available_after_slot_passed() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let first = start_time(&ll.driver().submitted[0].cmd);
        let handle = ll.driver().last_handle();
        ll.radio_callback(handle, RfEvents::new().with_cmd_preempted(true), &[]);
        ll.process();
        assert_eq!(ll.tx_status(), PendingTxStatus::NoRadioResource);

        // the slot has passed by the time the radio is free
        ll.driver_mut().now = first + ms_to_rat(5);
        ll.radio_available();
        ll.process();
        let next = start_time(&ll.driver().submitted.last().unwrap().cmd);
        assert!(next >= first + ms_to_rat(100));
        assert!(next <= first + ms_to_rat(110));
        assert_eq!(
            *client.records.borrow(),
            vec![
                AdvRecord::Done(UllStatus::NoResources),
                AdvRecord::Done(UllStatus::Failure)
            ]
        );
    }

    #[test]
    fn radio_available_relaxed_is_immediate() {
        let mut ll = mk_ll(UllConfig::default().with_timing(AdvTiming::Relaxed));
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        ll.radio_callback(handle, RfEvents::new().with_cmd_preempted(true), &[]);
        ll.process();
        let later = NOW + ms_to_rat(50);
        ll.driver_mut().now = later;
        ll.radio_available();
        ll.process();
        let next = start_time(&ll.driver().submitted.last().unwrap().cmd);
        assert_eq!(next, later + ms_to_rat(1));
    }

    #[test]
    fn critical_watchdog_ticks() {
        let mut ll = mk_scheduling_ll(UllConfig::default());
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        // 100 ms + 1 ms with a 10 us system tick
        ll.system_tick(10_099);
        assert_eq!(ll.pending_events(), 0);
        ll.system_tick(1);
        assert_eq!(ll.pending_events(), 1);
    }

    #[test]
    fn relaxed_watchdog_ticks() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_scheduling_ll(UllConfig::default().with_timing(AdvTiming::Relaxed));
        ll.register_advertise_client(&client);
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        // 2 x 100 ms - 1 ms with a 10 us system tick
        ll.system_tick(19_899);
        assert_eq!(ll.pending_events(), 0);
        ll.system_tick(1);
        assert_eq!(ll.pending_events(), 1);

        let stale = ll.driver().last_handle();
        ll.process();
        assert_eq!(ll.driver().cancelled.last().map(|c| c.0), Some(stale));
        assert_eq!(ll.driver().submitted.len(), 2);
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::Failure)]
        );
        assert_eq!(ll.tx_status(), PendingTxStatus::Scheduled);
    }

    #[test]
    fn scheduling_end_time() {
        let mut ll = mk_scheduling_ll(UllConfig::default().with_adv_channel_map(0b011));
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.set_adv_data(&[0x02, 0x01, 0x06]).unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let sub = &ll.driver().submitted[0];
        let start = start_time(&sub.cmd);
        let params = match sub.how {
            Submission::Schedule(params) => params,
            _ => panic!("expected a scheduled submission"),
        };
        // 9 byte payload: 19 bytes on air, 608 ticks each; 2 channels and one gap
        assert_eq!(params.end_time, Some(start + 608 + 608 + 374));
        match sub.cmd.op {
            Operation::Advertise(chain) => assert_eq!(chain.packet.data(), &[0x02, 0x01, 0x06]),
            _ => panic!("expected an advertising chain"),
        }
    }

    #[test]
    fn chain_end_gaps() {
        let packet = AdvPacket::new(Default::default(), [0; 6]);
        let one = AdvChain::new(0b001, packet);
        let air = crate::pdu::adv_airtime_rat(6);
        assert_eq!(chain_end(100, &one), 100 + air);
        let three = AdvChain::new(0b111, packet);
        assert_eq!(
            chain_end(100, &three),
            100 + (6 * air + 2 * ADV_CHANNEL_GAP_HALF_TICKS) / 2
        );
        assert_eq!(chain_end(100, &AdvChain::new(0, packet)), 100);
    }

    #[test]
    fn about_to_advertise() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default().with_time_to_adv_ms(5));
        ll.register_advertise_client(&client);
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        // never armed for the first chain
        ll.system_tick(u32::MAX);
        assert_eq!(ll.pending_events(), 0);

        let handle = ll.driver().last_handle();
        let (events, statuses) = ok_done();
        ll.radio_callback(handle, events, &statuses);
        ll.process();
        let next = start_time(&ll.driver().submitted[1].cmd);
        // (next - now - 5 ms) in 10 us ticks
        let ticks = (next - NOW - ms_to_rat(5)) / 40;
        ll.system_tick(ticks - 1);
        assert_eq!(ll.pending_events(), 0);
        ll.system_tick(1);
        assert_eq!(ll.process(), 1);
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::Success), AdvRecord::AboutToAdvertise]
        );
    }

    #[test]
    fn stop_cancels_and_ignores_late_callbacks() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_scheduling_ll(UllConfig::default().with_time_to_adv_ms(5));
        ll.register_advertise_client(&client);
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        let (events, statuses) = ok_done();
        ll.radio_callback(handle, events, &statuses);
        // the periodic chain arms the watchdog and the about-to-advertise timer
        assert_eq!(ll.process(), 1);
        let handle = ll.driver().last_handle();
        ll.adv_stop().unwrap();
        assert_eq!(ll.state(), LinkLayerState::Standby);
        assert_eq!(ll.tx_status(), PendingTxStatus::Done);
        assert_eq!(ll.driver().cancelled.len(), 1);
        assert_eq!(ll.driver().cancelled[0].0, handle);
        ll.radio_callback(handle, RfEvents::new().with_cmd_aborted(true), &[]);
        ll.system_tick(u32::MAX);
        assert_eq!(ll.pending_events(), 0);
        assert_eq!(ll.process(), 0);
        assert_eq!(
            *client.records.borrow(),
            vec![AdvRecord::Done(UllStatus::Success)]
        );
    }

    #[test]
    fn stop_drops_posted_advertising_events() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_scheduling_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        let (events, statuses) = ok_done();
        ll.radio_callback(handle, events, &statuses);
        ll.post(Event::AdvIntervalTimerExpired);
        ll.post(Event::ScanRxRadioAvailable);
        ll.adv_stop().unwrap();
        // only the other role's event is left
        assert_eq!(ll.pending_events(), 1);

        ll.adv_start().unwrap();
        assert_eq!(ll.process(), 2);
        let submitted = &ll.driver().submitted;
        assert_eq!(submitted.len(), 2);
        assert!(matches!(submitted[1].cmd.op, Operation::Advertise(_)));
        assert!(client.records.borrow().is_empty());
        assert_eq!(ll.tx_status(), PendingTxStatus::Scheduled);
    }

    #[test]
    fn empty_channel_map_refused() {
        let mut ll = mk_ll(UllConfig::default().with_adv_channel_map(0));
        ll.init().unwrap();
        assert_eq!(ll.adv_start(), Err(UllError::InvalidChannel));
        assert_eq!(ll.state(), LinkLayerState::Standby);
        assert_eq!(ll.pending_events(), 0);
    }

    #[test]
    fn chain_ended_without_transmitting_waits_for_radio() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.driver_mut().now = NOW;
        ll.init().unwrap();
        ll.adv_start().unwrap();
        ll.process();
        let handle = ll.driver().last_handle();
        ll.radio_callback(
            handle,
            RfEvents::new().with_last_cmd_done(true),
            &[CommandStatus(status::SKIPPED); 3],
        );
        assert_eq!(ll.process(), 1);
        assert_eq!(ll.state(), LinkLayerState::Advertising);
        assert_eq!(ll.tx_status(), PendingTxStatus::NoRadioResource);

        ll.radio_available();
        assert_eq!(ll.process(), 1);
        assert_eq!(ll.driver().submitted.len(), 2);
        assert_eq!(ll.tx_status(), PendingTxStatus::Scheduled);
        // the first slot is too close, so the chain moves to the next interval
        assert_eq!(
            *client.records.borrow(),
            vec![
                AdvRecord::Done(UllStatus::NoResources),
                AdvRecord::Done(UllStatus::Failure)
            ]
        );
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let client = RecordingAdvertiser::default();
        let mut ll = mk_ll(UllConfig::default());
        ll.register_advertise_client(&client);
        ll.init().unwrap();
        assert_eq!(ll.adv_stop(), Ok(()));
        ll.scan_start(Some(38)).unwrap();
        assert_eq!(ll.adv_stop(), Ok(()));
        assert_eq!(ll.state(), LinkLayerState::Scanning);
        assert!(ll.driver().cancelled.is_empty());
        assert!(client.records.borrow().is_empty());
    }

    #[test]
    fn adv_data_too_long() {
        let mut ll = mk_ll(UllConfig::default());
        assert_eq!(ll.set_adv_data(&[0; 32]), Err(UllError::PayloadTooLong));
        assert_eq!(ll.set_adv_data(&[0; 31]), Ok(()));
    }
}
