use rand_core::RngCore;

use super::LinkLayer;
use crate::{prelude::UllDetails, rf::front_end::FrontEnd, rf::RfDriver};

#[cfg(feature = "std")]
extern crate std;

impl<D, G, F> UllDetails for LinkLayer<'_, D, G, F>
where
    D: RfDriver,
    G: RngCore,
    F: FrontEnd,
{
    #[cfg(feature = "defmt")]
    #[cfg(target_os = "none")]
    fn print_details(&self) {
        let config = self.config();
        defmt::println!("State_____________________{}", self.state());
        defmt::println!("Initialized_______________{=bool}", self.initialized);
        defmt::println!("Scheduling front end______{=bool}", F::SCHEDULING);
        defmt::println!("Pending events____________{=usize}", self.pending_events());
        defmt::println!("Advertising status________{}", self.tx_status());
        defmt::println!(
            "Advertising interval______{=u32} ms ({})",
            config.adv_interval_ms(),
            config.timing()
        );
        defmt::println!("Advertising channels______{=u8:#b}", config.adv_channel_map());
        defmt::println!("Advertising data__________{=[u8]:X}", self.adv.packet.data());
        defmt::println!("Scan status_______________{}", self.scan_status());
        defmt::println!("Scan channel______________{=u8}", self.scan.channel);
        defmt::println!("Monitor status____________{}", self.monitor_status());
        defmt::println!(
            "Monitor session___________{=u8} on channel {=u8}",
            self.monitor.session.session_id(),
            self.monitor.channel
        );
        defmt::println!(
            "Monitor access address____{=u32:#X}",
            self.monitor.session.access_address()
        );
    }

    #[cfg(not(all(feature = "defmt", target_os = "none")))]
    #[cfg(feature = "std")]
    fn print_details(&self) {
        let config = self.config();
        std::println!("State_____________________{}", self.state());
        std::println!("Initialized_______________{}", self.initialized);
        std::println!("Scheduling front end______{}", F::SCHEDULING);
        std::println!("Pending events____________{}", self.pending_events());
        std::println!("Advertising status________{}", self.tx_status());
        std::println!(
            "Advertising interval______{} ms ({})",
            config.adv_interval_ms(),
            config.timing()
        );
        std::println!("Advertising channels______{:#05b}", config.adv_channel_map());
        std::println!("Advertising data__________{:02X?}", self.adv.packet.data());
        match self.scan_status() {
            Some(status) => std::println!("Scan status_______________{status}"),
            None => std::println!("Scan status_______________Idle"),
        }
        std::println!("Scan channel______________{}", self.scan.channel);
        match self.monitor_status() {
            Some(status) => std::println!("Monitor status____________{status}"),
            None => std::println!("Monitor status____________Idle"),
        }
        std::println!(
            "Monitor session___________{} on channel {}",
            self.monitor.session.session_id(),
            self.monitor.channel
        );
        std::println!(
            "Monitor access address____{:#010X}",
            self.monitor.session.access_address()
        );
    }

    #[cfg(not(all(feature = "defmt", target_os = "none")))]
    #[cfg(not(feature = "std"))]
    fn print_details(&self) {}
}
