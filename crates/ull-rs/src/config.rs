use crate::pdu::{adv_pdu_type, AdvPduHeader, ADDRESS_LEN, ADV_ACCESS_ADDRESS, ADV_CRC_INIT};
use crate::rf::Priority;
use crate::AdvTiming;

/// Parameters of a passive monitor session.
///
/// This struct follows the same builder pattern as [`UllConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSession {
    session_id: u8,
    access_address: u32,
    crc_init: u32,
    duration_ms: u32,
    df_enabled: bool,
}

impl Default for MonitorSession {
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`MonitorSession::session_id()`] | `0` |
    /// | [`MonitorSession::access_address()`] | `0x8E89BED6` |
    /// | [`MonitorSession::crc_init()`] | `0x555555` |
    /// | [`MonitorSession::duration_ms()`] | `0` (monitor until stopped) |
    /// | [`MonitorSession::df_enabled()`] | `false` |
    fn default() -> Self {
        Self {
            session_id: 0,
            access_address: ADV_ACCESS_ADDRESS,
            crc_init: ADV_CRC_INIT,
            duration_ms: 0,
            df_enabled: false,
        }
    }
}

impl MonitorSession {
    /// An identifier passed back with every monitor callback.
    pub const fn session_id(&self) -> u8 {
        self.session_id
    }

    pub fn with_session_id(self, id: u8) -> Self {
        Self {
            session_id: id,
            ..self
        }
    }

    /// The access address of the connection to follow.
    pub const fn access_address(&self) -> u32 {
        self.access_address
    }

    pub fn with_access_address(self, address: u32) -> Self {
        Self {
            access_address: address,
            ..self
        }
    }

    /// The CRC initialization value of the connection to follow.
    ///
    /// Without the right value, the radio drops every packet as a CRC error.
    pub const fn crc_init(&self) -> u32 {
        self.crc_init
    }

    pub fn with_crc_init(self, crc_init: u32) -> Self {
        Self {
            crc_init: crc_init & 0xFF_FFFF,
            ..self
        }
    }

    /// How long one monitor window lasts. `0` means the window never ends on its own.
    pub const fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn with_duration_ms(self, duration: u32) -> Self {
        Self {
            duration_ms: duration,
            ..self
        }
    }

    /// Collect direction finding (IQ) samples of packets carrying a constant tone extension.
    pub const fn df_enabled(&self) -> bool {
        self.df_enabled
    }

    pub fn with_df_enabled(self, enable: bool) -> Self {
        Self {
            df_enabled: enable,
            ..self
        }
    }
}

/// An object to configure the link layer.
///
/// This struct follows a builder pattern. Since all fields are private, users should
/// start with the [`UllConfig::default`] constructor, then mutate the object accordingly.
/// ```
/// use ull::UllConfig;
/// let config = UllConfig::default().with_adv_interval_ms(250).with_adv_channel_map(0b101);
/// assert_eq!(config.adv_interval_ms(), 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UllConfig {
    adv_interval_ms: u32,
    adv_channel_map: u8,
    time_to_adv_ms: u32,
    timing: AdvTiming,
    jitter_max_ms: u32,
    watchdog_bias_ms: u32,
    start_delay_ms: u32,
    system_tick_us: u32,
    priority: Priority,
    adv_address: [u8; ADDRESS_LEN],
    adv_random_address: bool,
    adv_pdu_type: u8,
    scan_channel: u8,
    monitor: MonitorSession,
}

impl Default for UllConfig {
    /// Instantiate a [`UllConfig`] object with library defaults.
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`UllConfig::adv_interval_ms()`] | `100` |
    /// | [`UllConfig::adv_channel_map()`] | `0b111` (channels 37, 38 and 39) |
    /// | [`UllConfig::time_to_adv_ms()`] | `0` (no about-to-advertise notification) |
    /// | [`UllConfig::timing()`] | [`AdvTiming::Critical`] |
    /// | [`UllConfig::jitter_max_ms()`] | `10` |
    /// | [`UllConfig::watchdog_bias_ms()`] | `1` |
    /// | [`UllConfig::start_delay_ms()`] | `1` |
    /// | [`UllConfig::system_tick_us()`] | `10` |
    /// | [`UllConfig::priority()`] | [`Priority::Normal`] |
    /// | [`UllConfig::adv_address()`] | `[0xE7; 6]` (random static) |
    /// | [`UllConfig::adv_random_address()`] | `true` |
    /// | [`UllConfig::adv_pdu_type()`] | `ADV_NONCONN_IND` |
    /// | [`UllConfig::scan_channel()`] | `37` |
    /// | [`UllConfig::monitor_session()`] | [`MonitorSession::default()`] |
    fn default() -> Self {
        Self {
            adv_interval_ms: 100,
            adv_channel_map: 0b111,
            time_to_adv_ms: 0,
            timing: AdvTiming::Critical,
            jitter_max_ms: 10,
            watchdog_bias_ms: 1,
            start_delay_ms: 1,
            system_tick_us: 10,
            priority: Priority::Normal,
            adv_address: [0xE7; ADDRESS_LEN],
            adv_random_address: true,
            adv_pdu_type: adv_pdu_type::ADV_NONCONN_IND,
            scan_channel: 37,
            monitor: MonitorSession::default(),
        }
    }
}

impl UllConfig {
    /// Return the value set by [`UllConfig::with_adv_interval_ms()`].
    pub const fn adv_interval_ms(&self) -> u32 {
        self.adv_interval_ms
    }

    /// The time between the start of two advertising chains (before jitter).
    pub fn with_adv_interval_ms(self, interval: u32) -> Self {
        Self {
            adv_interval_ms: interval,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_adv_channel_map()`].
    pub const fn adv_channel_map(&self) -> u8 {
        self.adv_channel_map
    }

    /// The advertising channels to use.
    ///
    /// Bit 0 enables channel 37, bit 1 enables channel 38 and bit 2 enables channel 39.
    /// Other bits are ignored. An empty map is accepted here but
    /// [`UllAdvertise::adv_start()`](crate::prelude::UllAdvertise::adv_start) refuses it.
    pub fn with_adv_channel_map(self, map: u8) -> Self {
        Self {
            adv_channel_map: map & 0b111,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_time_to_adv_ms()`].
    pub const fn time_to_adv_ms(&self) -> u32 {
        self.time_to_adv_ms
    }

    /// How long before each advertising chain the application is notified via
    /// [`AdvertiseClient::on_about_to_advertise()`](fn@crate::prelude::AdvertiseClient::on_about_to_advertise).
    ///
    /// `0` disables the notification.
    pub fn with_time_to_adv_ms(self, lead: u32) -> Self {
        Self {
            time_to_adv_ms: lead,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_timing()`].
    pub const fn timing(&self) -> AdvTiming {
        self.timing
    }

    pub fn with_timing(self, timing: AdvTiming) -> Self {
        Self { timing, ..self }
    }

    /// Return the value set by [`UllConfig::with_jitter_max_ms()`].
    pub const fn jitter_max_ms(&self) -> u32 {
        self.jitter_max_ms
    }

    /// The upper bound of the random delay added to every periodic advertising chain.
    pub fn with_jitter_max_ms(self, jitter: u32) -> Self {
        Self {
            jitter_max_ms: jitter,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_watchdog_bias_ms()`].
    pub const fn watchdog_bias_ms(&self) -> u32 {
        self.watchdog_bias_ms
    }

    /// The correction applied to the advertising interval watchdog.
    ///
    /// The watchdog fires `interval + bias` after a chain is scheduled in
    /// [`AdvTiming::Critical`] mode, and `2 * interval - bias` in [`AdvTiming::Relaxed`] mode.
    pub fn with_watchdog_bias_ms(self, bias: u32) -> Self {
        Self {
            watchdog_bias_ms: bias,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_start_delay_ms()`].
    pub const fn start_delay_ms(&self) -> u32 {
        self.start_delay_ms
    }

    /// The delay between scheduling a first (or immediate) advertising chain and its start.
    pub fn with_start_delay_ms(self, delay: u32) -> Self {
        Self {
            start_delay_ms: delay,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_system_tick_us()`].
    pub const fn system_tick_us(&self) -> u32 {
        self.system_tick_us
    }

    /// The period of the system tick that drives
    /// [`LinkLayer::system_tick()`](fn@crate::ll::LinkLayer::system_tick).
    pub fn with_system_tick_us(self, period: u32) -> Self {
        Self {
            system_tick_us: period.max(1),
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_priority()`].
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// The priority of every radio command the link layer submits.
    pub fn with_priority(self, priority: Priority) -> Self {
        Self { priority, ..self }
    }

    /// Return the value set by [`UllConfig::with_adv_address()`].
    pub const fn adv_address(&self) -> [u8; ADDRESS_LEN] {
        self.adv_address
    }

    /// Return the value set by [`UllConfig::with_adv_address()`].
    pub const fn adv_random_address(&self) -> bool {
        self.adv_random_address
    }

    /// The advertiser address (least significant byte first).
    ///
    /// `random` marks the address as a random (rather than public) device address.
    pub fn with_adv_address(self, address: [u8; ADDRESS_LEN], random: bool) -> Self {
        Self {
            adv_address: address,
            adv_random_address: random,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_adv_pdu_type()`].
    pub const fn adv_pdu_type(&self) -> u8 {
        self.adv_pdu_type
    }

    /// The advertising PDU type. See [`adv_pdu_type`](mod@crate::pdu::adv_pdu_type).
    pub fn with_adv_pdu_type(self, pdu_type: u8) -> Self {
        Self {
            adv_pdu_type: pdu_type & 0xF,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_scan_channel()`].
    pub const fn scan_channel(&self) -> u8 {
        self.scan_channel
    }

    /// The channel used by [`UllScan::scan_start()`](fn@crate::prelude::UllScan::scan_start)
    /// when it is given `None`.
    pub fn with_scan_channel(self, channel: u8) -> Self {
        Self {
            scan_channel: channel,
            ..self
        }
    }

    /// Return the value set by [`UllConfig::with_monitor_session()`].
    pub const fn monitor_session(&self) -> MonitorSession {
        self.monitor
    }

    pub fn with_monitor_session(self, session: MonitorSession) -> Self {
        Self {
            monitor: session,
            ..self
        }
    }

    /// The first byte of the advertising PDU header described by this config.
    pub(crate) fn adv_header(&self) -> AdvPduHeader {
        AdvPduHeader::new()
            .with_pdu_type(self.adv_pdu_type)
            .with_tx_add(self.adv_random_address)
    }
}
