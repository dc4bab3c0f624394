//! Strategies for handing commands to the radio driver.
//!
//! A radio that is used only by this link layer takes commands as they come
//! ([`SingleFrontEnd`]). A radio shared with other protocol stacks needs to know
//! how long each command occupies the radio ([`SchedulingFrontEnd`]); the link
//! layer then also computes advertising chain end times and arms the advertising
//! interval watchdog.
use super::{CommandHandle, Priority, RadioCommand, RatTicks, RfDriver, RfEvents, ScheduleParams};

/// How the link layer submits commands to a [`RfDriver`].
pub trait FrontEnd {
    /// Does this front end submit commands with explicit timing?
    const SCHEDULING: bool;

    fn submit<D: RfDriver>(
        driver: &mut D,
        cmd: &RadioCommand,
        priority: Priority,
        end_time: Option<RatTicks>,
        events: RfEvents,
    ) -> Result<CommandHandle, D::Error>;
}

/// Submit every command with [`RfDriver::post()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFrontEnd;

impl FrontEnd for SingleFrontEnd {
    const SCHEDULING: bool = false;

    fn submit<D: RfDriver>(
        driver: &mut D,
        cmd: &RadioCommand,
        priority: Priority,
        _end_time: Option<RatTicks>,
        events: RfEvents,
    ) -> Result<CommandHandle, D::Error> {
        driver.post(cmd, priority, events)
    }
}

/// Submit every command with [`RfDriver::schedule()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulingFrontEnd;

impl FrontEnd for SchedulingFrontEnd {
    const SCHEDULING: bool = true;

    fn submit<D: RfDriver>(
        driver: &mut D,
        cmd: &RadioCommand,
        priority: Priority,
        end_time: Option<RatTicks>,
        events: RfEvents,
    ) -> Result<CommandHandle, D::Error> {
        let params = ScheduleParams {
            end_time,
            priority,
            allow_delay: false,
        };
        driver.schedule(cmd, &params, events)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{FrontEnd, SchedulingFrontEnd, SingleFrontEnd};
    use crate::rf::{Operation, Priority, RadioCommand, RfEvents, ScanParams};
    use crate::test::{FakeRf, Submission};

    fn cmd() -> RadioCommand {
        RadioCommand::new(Operation::Scan(ScanParams { channel: 38 }))
    }

    #[test]
    fn single_posts() {
        let mut rf = FakeRf::default();
        let handle =
            SingleFrontEnd::submit(&mut rf, &cmd(), Priority::High, Some(5), RfEvents::new());
        assert!(handle.is_ok());
        assert_eq!(rf.submitted.len(), 1);
        assert!(matches!(
            rf.submitted[0].how,
            Submission::Post(Priority::High)
        ));
    }

    #[test]
    fn scheduling_schedules() {
        let mut rf = FakeRf::default();
        let handle = SchedulingFrontEnd::submit(
            &mut rf,
            &cmd(),
            Priority::Normal,
            Some(1234),
            RfEvents::receive_mask(),
        );
        assert!(handle.is_ok());
        match rf.submitted[0].how {
            Submission::Schedule(params) => {
                assert_eq!(params.end_time, Some(1234));
                assert!(!params.allow_delay);
            }
            _ => panic!("expected a scheduled submission"),
        }
        assert_eq!(rf.submitted[0].events, RfEvents::receive_mask());
    }

    #[test]
    fn rejected() {
        let mut rf = FakeRf::default();
        rf.reject = true;
        assert!(SingleFrontEnd::submit(&mut rf, &cmd(), Priority::Normal, None, RfEvents::new())
            .is_err());
        assert!(rf.submitted.is_empty());
    }
}
