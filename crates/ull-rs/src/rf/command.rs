use super::{CommandStatus, EndTrigger, StartTrigger};
use crate::pdu::{AdvPduHeader, ADDRESS_LEN, HEADER_LEN};

/// The primary advertising channels, indexed by their bit in a channel map.
pub const ADV_CHANNELS: [u8; 3] = [37, 38, 39];

/// The largest advertising payload (AdvData) of a legacy advertising PDU.
pub const ADV_DATA_MAX: usize = 31;

/// The advertising PDU transmitted by every sub-command of an [`AdvChain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvPacket {
    pub header: AdvPduHeader,
    pub address: [u8; ADDRESS_LEN],
    data: [u8; ADV_DATA_MAX],
    data_len: u8,
}

impl AdvPacket {
    pub const fn new(header: AdvPduHeader, address: [u8; ADDRESS_LEN]) -> Self {
        Self {
            header,
            address,
            data: [0; ADV_DATA_MAX],
            data_len: 0,
        }
    }

    /// The advertising data (AdvData).
    pub fn data(&self) -> &[u8] {
        &self.data[..self.data_len as usize]
    }

    /// Replace the advertising data.
    ///
    /// Returns `false` (and changes nothing) if `data` is longer than [`ADV_DATA_MAX`].
    pub fn set_data(&mut self, data: &[u8]) -> bool {
        if data.len() > ADV_DATA_MAX {
            return false;
        }
        self.data[..data.len()].copy_from_slice(data);
        self.data_len = data.len() as u8;
        true
    }

    /// The length of the PDU payload (address plus data).
    pub const fn payload_len(&self) -> usize {
        ADDRESS_LEN + self.data_len as usize
    }

    /// Serialize the complete PDU (header, address, data) into `buf`.
    ///
    /// Returns the number of bytes written, or `0` if `buf` is too small.
    pub fn write_pdu(&self, buf: &mut [u8]) -> usize {
        let len = HEADER_LEN + self.payload_len();
        if buf.len() < len {
            return 0;
        }
        buf[0] = self.header.into_bits();
        buf[1] = self.payload_len() as u8;
        buf[HEADER_LEN..HEADER_LEN + ADDRESS_LEN].copy_from_slice(&self.address);
        buf[HEADER_LEN + ADDRESS_LEN..len].copy_from_slice(self.data());
        len
    }
}

/// One link in an advertising chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvSubCommand {
    /// `None` for a disabled channel. The radio skips these.
    pub channel: Option<u8>,
    pub status: CommandStatus,
}

/// Up to 3 advertising transmissions (one per primary advertising channel)
/// submitted as one command.
///
/// The chain always holds 3 sub-commands. Channels disabled in the channel map
/// are represented by no-op placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvChain {
    pub subs: [AdvSubCommand; 3],
    pub packet: AdvPacket,
}

impl AdvChain {
    /// Build a chain for the channels enabled in `channel_map` (bits 0, 1, 2 for
    /// channels 37, 38, 39).
    pub fn new(channel_map: u8, packet: AdvPacket) -> Self {
        let mut subs = [AdvSubCommand {
            channel: None,
            status: CommandStatus::IDLE,
        }; 3];
        for (bit, sub) in subs.iter_mut().enumerate() {
            if channel_map & (1 << bit) != 0 {
                sub.channel = Some(ADV_CHANNELS[bit]);
            }
        }
        Self { subs, packet }
    }

    /// The channels that will actually be used, in transmit order.
    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.subs.iter().filter_map(|s| s.channel)
    }

    /// The status of the chain as a whole.
    ///
    /// This is the status of the first enabled sub-command that did not finish OK,
    /// or the status of the last enabled sub-command if all of them did.
    pub fn aggregate_status(&self) -> CommandStatus {
        let mut last = CommandStatus::IDLE;
        for sub in self.subs.iter().filter(|s| s.channel.is_some()) {
            if !sub.status.is_ok() {
                return sub.status;
            }
            last = sub.status;
        }
        last
    }
}

/// Parameters of a scan (advertising channel receive) command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanParams {
    pub channel: u8,
}

/// Parameters of a passive monitor (data channel receive) command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitorParams {
    pub channel: u8,
    pub access_address: u32,
    pub crc_init: u32,
    /// Copy direction finding samples into the sample queue.
    pub df_auto_copy: bool,
}

/// What a [`RadioCommand`] does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Advertise(AdvChain),
    Scan(ScanParams),
    Monitor(MonitorParams),
}

/// A radio command, as handed to a [`RfDriver`](trait@super::RfDriver).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadioCommand {
    pub op: Operation,
    pub start: StartTrigger,
    pub end: EndTrigger,
    /// The status of a receive command. For an advertising chain, see
    /// [`RadioCommand::status()`].
    pub status: CommandStatus,
}

impl RadioCommand {
    pub const fn new(op: Operation) -> Self {
        Self {
            op,
            start: StartTrigger::Now,
            end: EndTrigger::Never,
            status: CommandStatus::IDLE,
        }
    }

    /// Reset every status field to [`CommandStatus::IDLE`].
    pub fn reset_status(&mut self) {
        self.status = CommandStatus::IDLE;
        if let Operation::Advertise(chain) = &mut self.op {
            for sub in chain.subs.iter_mut() {
                sub.status = CommandStatus::IDLE;
            }
        }
    }

    /// Record the statuses reported by the radio.
    ///
    /// For an advertising chain, `statuses` are assigned to the enabled sub-commands
    /// in transmit order. Otherwise only the first status is used.
    pub fn record_status(&mut self, statuses: &[CommandStatus]) {
        match &mut self.op {
            Operation::Advertise(chain) => {
                let enabled = chain.subs.iter_mut().filter(|s| s.channel.is_some());
                for (sub, status) in enabled.zip(statuses.iter()) {
                    sub.status = *status;
                }
                self.status = chain.aggregate_status();
            }
            _ => {
                if let Some(status) = statuses.first() {
                    self.status = *status;
                }
            }
        }
    }

    /// The status of this command as a whole.
    pub fn status(&self) -> CommandStatus {
        match &self.op {
            Operation::Advertise(chain) => chain.aggregate_status(),
            _ => self.status,
        }
    }
}
