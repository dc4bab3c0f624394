#![doc = include_str!("../README.md")]
//!
//! ## Basic API
//!
//! - [`LinkLayer::new()`](fn@crate::LinkLayer::new)
//! - [`LinkLayer::init()`](struct.LinkLayer.html#method.init)
//! - [`LinkLayer::process()`](fn@crate::LinkLayer::process)
//! - [`LinkLayer::state()`](fn@crate::LinkLayer::state)
//! - [`LinkLayer::adv_start()`](struct.LinkLayer.html#method.adv_start)
//! - [`LinkLayer::adv_stop()`](struct.LinkLayer.html#method.adv_stop)
//! - [`LinkLayer::set_adv_data()`](struct.LinkLayer.html#method.set_adv_data)
//! - [`LinkLayer::scan_start()`](struct.LinkLayer.html#method.scan_start)
//! - [`LinkLayer::scan_stop()`](struct.LinkLayer.html#method.scan_stop)
//! - [`LinkLayer::monitor_start()`](struct.LinkLayer.html#method.monitor_start)
//! - [`LinkLayer::monitor_stop()`](struct.LinkLayer.html#method.monitor_stop)
//! - [`LinkLayer::set_monitor_session()`](struct.LinkLayer.html#method.set_monitor_session)
//!
//! ## Integration API
//!
//! These are called from the radio driver's callback context or a system tick.
//!
//! - [`LinkLayer::radio_callback()`](fn@crate::LinkLayer::radio_callback)
//! - [`LinkLayer::radio_available()`](fn@crate::LinkLayer::radio_available)
//! - [`LinkLayer::system_tick()`](fn@crate::LinkLayer::system_tick)
//! - [`LinkLayer::post()`](fn@crate::LinkLayer::post)
//! - [`LinkLayer::scan_queue_mut()`](fn@crate::LinkLayer::scan_queue_mut)
//! - [`LinkLayer::monitor_queue_mut()`](fn@crate::LinkLayer::monitor_queue_mut)
//! - [`LinkLayer::sample_queue_mut()`](fn@crate::LinkLayer::sample_queue_mut)
//!
//! ## Configuration API
//!
//! - [`UllConfig`]
//! - [`MonitorSession`]
//!
#![no_std]

#[macro_use]
mod fmt;

mod critical;
pub mod config;
pub mod ll;
pub mod normalize;
pub mod pdu;
pub mod prelude;
pub mod queue;
pub mod rf;
pub mod timer;
mod types;

pub use config::{MonitorSession, UllConfig};
pub use ll::{LinkLayer, UllError};
pub use types::{
    AdvMode, AdvTiming, Event, LinkLayerState, PendingRxStatus, PendingTxStatus, RxMode,
    UllStatus,
};
