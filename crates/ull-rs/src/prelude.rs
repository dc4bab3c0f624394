//! This module defines the generic traits that may
//! need to be imported to drive the link layer.
//!
//! Since rustc only compiles objects that are used,
//! it is convenient to import these traits with the `*` syntax.
//!
//! ```
//! use ull::prelude::*;
//! ```

use crate::config::MonitorSession;
use crate::pdu::CteInfo;
use crate::UllStatus;

/// A trait to represent bringing up the link layer.
pub trait UllInit {
    type InitErrorType;

    /// Open the radio and prepare the receive queues.
    ///
    /// This must be called once before any role is started.
    /// Calling it again after a successful initialization does nothing.
    fn init(&mut self) -> Result<(), Self::InitErrorType>;
}

/// A trait to represent the advertising role.
pub trait UllAdvertise {
    type AdvertiseErrorType;

    /// Enter the Advertising state and begin periodic advertising.
    ///
    /// The first advertising event is scheduled from the dispatcher, so
    /// [`LinkLayer::process()`](crate::LinkLayer::process) must run afterwards.
    /// An empty advertising channel map is refused.
    fn adv_start(&mut self) -> Result<(), Self::AdvertiseErrorType>;

    /// Stop advertising and return to Standby.
    ///
    /// Any outstanding advertising chain is cancelled and both advertising timers are
    /// stopped. Does nothing when not advertising.
    fn adv_stop(&mut self) -> Result<(), Self::AdvertiseErrorType>;

    /// Replace the advertising data carried after the advertiser address.
    ///
    /// The new data is used from the next advertising event onward.
    /// Data longer than [`ADV_DATA_MAX`](crate::rf::ADV_DATA_MAX) is rejected.
    fn set_adv_data(&mut self, data: &[u8]) -> Result<(), Self::AdvertiseErrorType>;
}

/// A trait to represent the scanning role.
pub trait UllScan {
    type ScanErrorType;

    /// Enter the Scanning state and listen on an advertising channel.
    ///
    /// If `channel` is `None`, the channel in [`UllConfig`](crate::UllConfig) is used.
    /// Only the advertising channels (37, 38 and 39) are accepted.
    fn scan_start(&mut self, channel: Option<u8>) -> Result<(), Self::ScanErrorType>;

    /// Stop scanning and return to Standby.
    ///
    /// Does nothing when not scanning.
    fn scan_stop(&mut self) -> Result<(), Self::ScanErrorType>;
}

/// A trait to represent the passive monitor role.
pub trait UllMonitor {
    type MonitorErrorType;

    /// Enter the Monitoring state and follow the current [`MonitorSession`] on `channel`.
    ///
    /// `channel` is a BLE RF channel index in range [0, 39].
    fn monitor_start(&mut self, channel: u8) -> Result<(), Self::MonitorErrorType>;

    /// Stop monitoring and return to Standby.
    fn monitor_stop(&mut self) -> Result<(), Self::MonitorErrorType>;

    /// Set the parameters used by the next [`UllMonitor::monitor_start()`].
    ///
    /// The session cannot be changed while monitoring.
    fn set_monitor_session(&mut self, session: MonitorSession)
        -> Result<(), Self::MonitorErrorType>;
}

/// A trait to represent debug output of the link layer's state.
pub trait UllDetails {
    /// Print the current state and configuration.
    ///
    /// <div class="warning">
    ///
    /// Requires the `std` or `defmt` feature. With neither, this does nothing.
    ///
    /// </div>
    fn print_details(&self);
}

/// Notifications for the owner of the advertising role.
pub trait AdvertiseClient {
    /// The next advertising event is about to be transmitted.
    ///
    /// This is the last chance to call [`UllAdvertise::set_adv_data()`] for that event.
    fn on_about_to_advertise(&self);

    /// An advertising event completed with `status`.
    fn on_advertise_done(&self, status: UllStatus);
}

/// Notifications for the owner of the scanning role.
pub trait ScanClient {
    /// A packet was received.
    ///
    /// `packet` holds the PDU header, the payload and the 6 metadata bytes
    /// (RSSI, status and a little endian timestamp). With
    /// [`UllStatus::BufferNotAvailable`], `packet` is empty.
    fn on_scan_indication(&self, status: UllStatus, packet: &[u8]);

    /// A scan window ended.
    fn on_scan_window_complete(&self, status: UllStatus);
}

/// Notifications for the owner of the monitor role.
pub trait MonitorClient {
    /// A packet was received during session `session_id`.
    ///
    /// The layout of `packet` is the same as [`ScanClient::on_scan_indication()`],
    /// with the CTEInfo byte following the header when `cte` is `Some`.
    fn on_monitor_indication(
        &self,
        status: UllStatus,
        session_id: u8,
        packet: &[u8],
        cte: Option<CteInfo>,
    );

    /// The session `session_id` ended.
    fn on_monitor_complete(&self, status: UllStatus, session_id: u8);

    /// Raw direction finding samples were copied out by the radio.
    fn on_monitor_samples(&self, session_id: u8, samples: &[u8]) {
        let _ = (session_id, samples);
    }
}
