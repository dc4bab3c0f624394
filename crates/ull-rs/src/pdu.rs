//! BLE link layer PDU helpers.
//!
//! A receive queue entry written by the radio has the following layout:
//!
//! | field | size |
//! |-------|------|
//! | length of everything that follows (little endian) | [`LENGTH_FIELD_LEN`] |
//! | PDU header (second byte is the payload length `L`) | [`HEADER_LEN`] |
//! | CTEInfo (data channel PDUs with the `CP` bit set only) | [`CTE_INFO_LEN`] |
//! | payload | `L` |
//! | CRC | [`CRC_LEN`] |
//! | RSSI | [`RSSI_LEN`] |
//! | status | [`STATUS_LEN`] |
//! | timestamp (little endian) | [`TIMESTAMP_LEN`] |
//!
//! [`extract()`] strips the length field and the CRC, which leaves what the
//! application is given: header, optional CTEInfo, payload and the rest of the postfix.
use bitfield_struct::bitfield;

use crate::rf::{us_to_rat, RatTicks};

pub const LENGTH_FIELD_LEN: usize = 2;
pub const HEADER_LEN: usize = 2;
pub const CTE_INFO_LEN: usize = 1;
pub const CRC_LEN: usize = 3;
pub const RSSI_LEN: usize = 1;
pub const STATUS_LEN: usize = 1;
pub const TIMESTAMP_LEN: usize = 4;
/// Everything the radio appends after the payload.
pub const POSTFIX_LEN: usize = CRC_LEN + RSSI_LEN + STATUS_LEN + TIMESTAMP_LEN;
/// The part of the postfix that is forwarded to the application.
pub const META_LEN: usize = POSTFIX_LEN - CRC_LEN;
/// Length of a device address.
pub const ADDRESS_LEN: usize = 6;
/// The largest payload the length byte of a PDU header can describe.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// The BLE air interface access address of advertising channel packets.
pub const ADV_ACCESS_ADDRESS: u32 = 0x8E89_BED6;
/// The CRC initialization value of advertising channel packets.
pub const ADV_CRC_INIT: u32 = 0x55_5555;

/// Advertising channel PDU types.
pub mod adv_pdu_type {
    pub const ADV_IND: u8 = 0x00;
    pub const ADV_DIRECT_IND: u8 = 0x01;
    pub const ADV_NONCONN_IND: u8 = 0x02;
    pub const SCAN_REQ: u8 = 0x03;
    pub const SCAN_RSP: u8 = 0x04;
    pub const CONNECT_IND: u8 = 0x05;
    pub const ADV_SCAN_IND: u8 = 0x06;
}

/// The first byte of an advertising channel PDU header.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct AdvPduHeader {
    /// See [`adv_pdu_type`].
    #[bits(4)]
    pub pdu_type: u8,

    #[bits(1)]
    _rfu: u8,

    pub ch_sel: bool,

    /// The advertiser address is a random address.
    pub tx_add: bool,

    /// The target address is a random address.
    pub rx_add: bool,
}

/// The first byte of a data channel PDU header.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct DataPduHeader {
    #[bits(2)]
    pub llid: u8,

    pub nesn: bool,

    pub sn: bool,

    /// More data.
    pub md: bool,

    /// A CTEInfo byte follows the header.
    pub cp: bool,

    #[bits(2)]
    _rfu: u8,
}

/// The CTEInfo field of a data channel PDU.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct CteInfo {
    /// Length of the constant tone extension in units of 8 µs.
    #[bits(5)]
    pub time: u8,

    #[bits(1)]
    _rfu: u8,

    /// 0 = AoA, 1 = AoD with 1 µs slots, 2 = AoD with 2 µs slots.
    #[bits(2)]
    pub cte_type: u8,
}

#[cfg(feature = "defmt")]
#[cfg(target_os = "none")]
impl defmt::Format for CteInfo {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "CteInfo time: {=u8}, type: {=u8}",
            self.time(),
            self.cte_type()
        )
    }
}

/// Metadata the radio appends to every received packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RxPostfix {
    /// Received signal strength (dBm).
    pub rssi: i8,
    /// Radio specific receive status flags.
    pub status: u8,
    /// Radio time at which the packet's sync word was received.
    pub timestamp: u32,
}

impl RxPostfix {
    /// Parse the bytes following the CRC. Returns `None` if `buf` is too short.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < META_LEN {
            return None;
        }
        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&buf[RSSI_LEN + STATUS_LEN..META_LEN]);
        Some(Self {
            rssi: buf[0] as i8,
            status: buf[RSSI_LEN],
            timestamp: u32::from_le_bytes(ts),
        })
    }
}

/// The result of [`extract()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extracted {
    /// Number of bytes written to the output buffer.
    pub len: usize,
    /// The CTEInfo field, if the packet carried one.
    pub cte: Option<CteInfo>,
    pub postfix: RxPostfix,
}

/// Copy a received packet out of a queue entry's data.
///
/// `entry` starts with the length field (see the [module docs](self)). If `with_cte`
/// is `true`, the header is interpreted as a data channel header and a CTEInfo
/// byte is expected when its `CP` bit is set.
///
/// Returns `None` if the entry is malformed or `out` is too small.
pub fn extract(entry: &[u8], out: &mut [u8], with_cte: bool) -> Option<Extracted> {
    let hdr_start = LENGTH_FIELD_LEN;
    if entry.len() < hdr_start + HEADER_LEN {
        return None;
    }
    let available = u16::from_le_bytes([entry[0], entry[1]]) as usize;
    if entry.len() < LENGTH_FIELD_LEN + available {
        return None;
    }
    let payload_len = entry[hdr_start + 1] as usize;
    let cte = if with_cte && DataPduHeader::from_bits(entry[hdr_start]).cp() {
        Some(CteInfo::from_bits(*entry.get(hdr_start + HEADER_LEN)?))
    } else {
        None
    };
    let cte_len = if cte.is_some() { CTE_INFO_LEN } else { 0 };
    let body_len = HEADER_LEN + cte_len + payload_len;
    if available < body_len + POSTFIX_LEN {
        return None;
    }
    let total = body_len + META_LEN;
    if out.len() < total {
        return None;
    }
    let body_end = hdr_start + body_len;
    out[..body_len].copy_from_slice(&entry[hdr_start..body_end]);
    let meta_start = body_end + CRC_LEN;
    let meta = &entry[meta_start..meta_start + META_LEN];
    out[body_len..total].copy_from_slice(meta);
    Some(Extracted {
        len: total,
        cte,
        postfix: RxPostfix::parse(meta)?,
    })
}

/// Time on air of a legacy advertising packet with a payload of `payload_len` bytes (1M PHY).
///
/// Covers preamble, access address, header, payload and CRC.
pub const fn adv_airtime_rat(payload_len: usize) -> RatTicks {
    let bytes = 1 + 4 + HEADER_LEN + payload_len + CRC_LEN;
    us_to_rat(bytes as u32 * 8)
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{
        adv_airtime_rat, adv_pdu_type, extract, AdvPduHeader, DataPduHeader, RxPostfix,
        CRC_LEN, HEADER_LEN, LENGTH_FIELD_LEN, MAX_PAYLOAD_LEN, META_LEN, POSTFIX_LEN,
    };
    use crate::ll::{RX_ENTRY_SIZE, RX_PACKET_SIZE};
    use crate::test::raw_entry;

    #[test]
    fn header_bits() {
        let hdr = AdvPduHeader::new()
            .with_pdu_type(adv_pdu_type::ADV_NONCONN_IND)
            .with_tx_add(true);
        assert_eq!(hdr.into_bits(), 0x42);
        let data = DataPduHeader::from_bits(0x22);
        assert_eq!(data.llid(), 2);
        assert!(data.cp());
    }

    #[test]
    fn extract_adv() {
        let payload = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
        let entry = raw_entry(0x02, None, &payload, -40, 0x0102_0304);
        let mut out = [0u8; 64];
        let got = extract(&entry, &mut out, false).unwrap();
        assert_eq!(got.len, payload.len() + HEADER_LEN + POSTFIX_LEN - CRC_LEN);
        assert_eq!(&out[..2], &[0x02, 9]);
        assert_eq!(&out[2..11], &payload);
        assert_eq!(out[11] as i8, -40);
        assert_eq!(got.postfix.timestamp, 0x0102_0304);
        assert!(got.cte.is_none());
    }

    #[test]
    fn extract_with_cte() {
        let entry = raw_entry(0x22, Some(0x54), &[0xAA, 0xBB], -70, 7);
        let mut out = [0u8; 32];
        let got = extract(&entry, &mut out, true).unwrap();
        assert_eq!(got.len, 2 + 1 + 2 + 6);
        let cte = got.cte.unwrap();
        assert_eq!(cte.time(), 0x14);
        assert_eq!(cte.cte_type(), 1);
        assert_eq!(out[2], 0x54);
        assert_eq!(&out[3..5], &[0xAA, 0xBB]);

        // advertising headers have no CP bit
        let got = extract(&entry, &mut out, false).unwrap();
        assert!(got.cte.is_none());
    }

    #[test]
    fn extract_malformed() {
        let mut out = [0u8; 64];
        assert!(extract(&[], &mut out, false).is_none());
        let mut entry = raw_entry(0x02, None, &[1, 2, 3], 0, 0);
        // claim a longer payload than the entry holds
        entry[LENGTH_FIELD_LEN + 1] = 20;
        assert!(extract(&entry, &mut out, false).is_none());
        let entry = raw_entry(0x02, None, &[1, 2, 3], 0, 0);
        let mut small = [0u8; 4];
        assert!(extract(&entry, &mut small, false).is_none());
    }

    #[test]
    fn extract_longest_payloads() {
        let mut out = [0u8; RX_PACKET_SIZE];
        // a full data length extension PDU
        let payload = [0x5Cu8; 251];
        let entry = raw_entry(0x02, None, &payload, -55, 9);
        let got = extract(&entry, &mut out, true).unwrap();
        assert_eq!(got.len, HEADER_LEN + 251 + META_LEN);
        assert_eq!(out[1], 251);
        assert_eq!(&out[2..253], &payload);
        assert_eq!(got.postfix.rssi, -55);
        assert_eq!(got.postfix.timestamp, 9);

        // the largest entry a receive descriptor holds
        let payload = [0xA5u8; MAX_PAYLOAD_LEN];
        let entry = raw_entry(0x22, Some(0x54), &payload, -60, 11);
        assert_eq!(entry.len(), RX_ENTRY_SIZE);
        let got = extract(&entry, &mut out, true).unwrap();
        assert_eq!(got.len, RX_PACKET_SIZE);
        assert!(got.cte.is_some());
        assert_eq!(&out[3..3 + MAX_PAYLOAD_LEN], &payload);
        assert_eq!(got.postfix.timestamp, 11);
    }

    #[test]
    fn postfix() {
        assert!(RxPostfix::parse(&[0; 5]).is_none());
        let p = RxPostfix::parse(&[0xF6, 1, 4, 3, 2, 1]).unwrap();
        assert_eq!(p.rssi, -10);
        assert_eq!(p.status, 1);
        assert_eq!(p.timestamp, 0x0102_0304);
    }

    #[test]
    fn airtime() {
        // 6 byte address and 31 bytes of data: 47 bytes on air
        assert_eq!(adv_airtime_rat(37), 47 * 8 * 4);
    }
}
