//! Radiotap header dissection and synthesis
//!
//! Captured frames carry a variable-length radiotap header in front of the
//! 802.11 frame. A present-flags bitmap drives which optional fields follow,
//! so every offset past the fixed part is computed while walking the bitmap.
//! Outgoing frames get a canonical header synthesized from the parameters
//! most recently observed on the air.

use bytes::{BufMut, BytesMut};

use crate::mac::HardwareAddress;
use crate::{ACKNOWLEDGEMENT_TYPE, SNAP_LLC_PREFIX, WLAN_FC_TYPE_DATA};

/// Radiotap present flags
pub mod present_flags {
    pub const TSFT: u32 = 1 << 0;
    pub const FLAGS: u32 = 1 << 1;
    pub const RATE: u32 = 1 << 2;
    pub const CHANNEL: u32 = 1 << 3;
    pub const TX_FLAGS: u32 = 1 << 15;
    pub const MCS: u32 = 1 << 19;
    pub const EXT: u32 = 1 << 31;
}

/// Byte offset of the declared header length.
pub const LENGTH_OFFSET: usize = 2;
/// Byte offset of the first present-flags word.
pub const PRESENT_OFFSET: usize = 4;
/// Byte offset of the first optional field.
pub const DATA_OFFSET: usize = 8;
/// Sanity bound on the declared header length; corrupt captures sometimes
/// carry absurd values here.
pub const MAX_LENGTH: u16 = 64;

/// Flags bit announcing an FCS trailer at the end of the frame.
pub const FCS_AVAILABLE_FLAG: u8 = 0x10;
/// TX flags for outgoing frames: no-ack.
pub const TX_FLAGS_NO_ACK: u16 = 0x0008;

/// Default data rate code for synthesized headers, 11 Mb/s. Handheld
/// consoles do not go faster in ad-hoc mode.
pub const DEFAULT_DATA_RATE: u8 = 0x16;
/// Default channel frequency, channel 1.
pub const DEFAULT_FREQUENCY: u16 = 2412;
/// Default channel flags: 2.4 GHz, CCK.
pub const DEFAULT_CHANNEL_FLAGS: u16 = 0xa000;

/// Parameters extracted from a radiotap header.
///
/// The MCS fields are never filled by the reader; they only participate in
/// header synthesis when a caller provides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalHeaderParams {
    /// Declared header length.
    pub length: u16,
    /// First present-flags word.
    pub present: u32,
    /// Flags field, including the FCS-present bit.
    pub flags: u8,
    /// Data rate code in 500 kb/s units.
    pub data_rate: u8,
    /// Channel frequency in MHz.
    pub frequency: u16,
    /// Channel flags.
    pub channel_flags: u16,
    /// MCS known field.
    pub mcs_known: u8,
    /// MCS flags field.
    pub mcs_flags: u8,
    /// MCS index.
    pub mcs_index: u8,
}

impl Default for PhysicalHeaderParams {
    fn default() -> Self {
        Self {
            length: 0,
            present: 0,
            flags: 0,
            data_rate: 0,
            frequency: DEFAULT_FREQUENCY,
            channel_flags: 0,
            mcs_known: 0,
            mcs_flags: 0,
            mcs_index: 0,
        }
    }
}

impl PhysicalHeaderParams {
    /// Check whether the frame carries an FCS trailer.
    pub fn has_fcs(&self) -> bool {
        (self.flags & FCS_AVAILABLE_FLAG) != 0
    }

    /// Length of the FCS trailer announced by the flags field.
    pub fn fcs_length(&self) -> usize {
        if self.has_fcs() {
            4
        } else {
            0
        }
    }
}

fn read_u8(frame: &[u8], offset: usize) -> Option<u8> {
    frame.get(offset).copied()
}

fn read_u16_le(frame: &[u8], offset: usize) -> Option<u16> {
    let bytes = frame.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32_le(frame: &[u8], offset: usize) -> Option<u32> {
    let bytes = frame.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reads radiotap headers and keeps the parameters of the last valid one.
#[derive(Debug, Default, Clone)]
pub struct RadiotapReader {
    params: PhysicalHeaderParams,
}

impl RadiotapReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dissect the radiotap header at the start of a frame.
    ///
    /// When the declared length fails the sanity bound, or the frame cannot
    /// contain the declared header, the call is a no-op and the previously
    /// filled parameters stay valid. Fields the walk does not reach keep
    /// their defaults; unknown present fields are intentionally not parsed.
    pub fn fill_parameters(&mut self, frame: &[u8]) {
        let Some(length) = read_u16_le(frame, LENGTH_OFFSET) else {
            return;
        };

        if length > MAX_LENGTH || frame.len() < length as usize {
            return;
        }

        let Some(present) = read_u32_le(frame, PRESENT_OFFSET) else {
            return;
        };

        self.params = PhysicalHeaderParams {
            length,
            present,
            ..Default::default()
        };

        let mut offset = DATA_OFFSET;

        // Skip extension bitmap words (vendor extensions) to find the start
        // of the optional fields.
        let mut word = present;
        while (word & present_flags::EXT) != 0 {
            match read_u32_le(frame, offset) {
                Some(next) => word = next,
                None => return,
            }
            offset += 4;
        }

        if (present & present_flags::TSFT) != 0 {
            // Time sync, don't care, skip over it.
            offset += 8;
        }

        if (present & present_flags::FLAGS) != 0 {
            match read_u8(frame, offset) {
                Some(flags) => self.params.flags = flags,
                None => return,
            }
            offset += 1;
        }

        if (present & present_flags::RATE) != 0 {
            match read_u8(frame, offset) {
                Some(rate) => self.params.data_rate = rate,
                None => return,
            }
            offset += 1;
        }

        if (present & present_flags::CHANNEL) != 0 {
            let Some(frequency) = read_u16_le(frame, offset) else {
                return;
            };
            let Some(channel_flags) = read_u16_le(frame, offset + 2) else {
                return;
            };
            self.params.frequency = frequency;
            self.params.channel_flags = channel_flags;
        }
    }

    /// Snapshot of the current parameters.
    pub fn export_parameters(&self) -> PhysicalHeaderParams {
        self.params
    }

    pub fn length(&self) -> u16 {
        self.params.length
    }

    pub fn present(&self) -> u32 {
        self.params.present
    }

    pub fn flags(&self) -> u8 {
        self.params.flags
    }

    pub fn data_rate(&self) -> u8 {
        self.params.data_rate
    }

    pub fn frequency(&self) -> u16 {
        self.params.frequency
    }

    pub fn channel_flags(&self) -> u16 {
        self.params.channel_flags
    }

    pub fn has_fcs(&self) -> bool {
        self.params.has_fcs()
    }
}

/// Synthesize a radiotap header for an outgoing frame.
///
/// Carries flags (FCS bit cleared, injected frames get no trailer), the data
/// rate, channel and TX flags. When MCS info is known the rate field is
/// replaced by the MCS fields; the rate slot stays as padding.
pub fn build_radiotap_header(params: &PhysicalHeaderParams) -> Vec<u8> {
    let mcs = params.mcs_known != 0;

    let mut present =
        present_flags::FLAGS | present_flags::RATE | present_flags::CHANNEL | present_flags::TX_FLAGS;
    let mut length = 16u16;

    if mcs {
        present &= !present_flags::RATE;
        present |= present_flags::MCS;
        // 3 MCS bytes plus a trailing pad to keep the header word-aligned.
        length += 4;
    }

    let mut buf = BytesMut::with_capacity(length as usize);
    buf.put_u8(0); // version
    buf.put_u8(0); // pad
    buf.put_u16_le(length);
    buf.put_u32_le(present);

    buf.put_u8(params.flags & !FCS_AVAILABLE_FLAG);

    // Rate slot doubles as padding when MCS replaces it.
    if mcs {
        buf.put_u8(0);
    } else {
        buf.put_u8(params.data_rate);
    }

    buf.put_u16_le(params.frequency);
    buf.put_u16_le(params.channel_flags);
    buf.put_u16_le(TX_FLAGS_NO_ACK);

    if mcs {
        buf.put_u8(params.mcs_known);
        buf.put_u8(params.mcs_flags);
        buf.put_u8(params.mcs_index);
        buf.put_u8(0);
    }

    buf.to_vec()
}

/// Build a 24-byte 802.11 data-frame header for ad-hoc traffic.
///
/// Address layout: addr1 destination, addr2 source, addr3 BSSID.
pub fn build_ieee80211_header(
    destination: HardwareAddress,
    source: HardwareAddress,
    bssid: HardwareAddress,
) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(24);
    buf.put_u16_le(WLAN_FC_TYPE_DATA);
    buf.put_u16_le(0xffff); // duration, arbitrarily high
    buf.put_slice(&destination.to_bytes());
    buf.put_slice(&source.to_bytes());
    buf.put_slice(&bssid.to_bytes());
    buf.put_u16_le(0); // sequence control
    buf.to_vec()
}

/// Build the SNAP LLC encapsulation carrying an ethertype.
pub fn build_llc_header(ether_type: [u8; 2]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_slice(&SNAP_LLC_PREFIX);
    buf.put_slice(&ether_type);
    buf.to_vec()
}

/// Construct an acknowledgement control frame addressed to a transmitter,
/// prefixed with a synthesized radiotap header.
pub fn construct_acknowledgement_frame(
    receiver: HardwareAddress,
    params: &PhysicalHeaderParams,
) -> Vec<u8> {
    let mut frame = build_radiotap_header(params);

    let mut header = BytesMut::with_capacity(10);
    header.put_u16_le(ACKNOWLEDGEMENT_TYPE);
    header.put_u16_le(0xffff); // duration, arbitrarily high
    header.put_slice(&receiver.to_bytes());

    frame.extend_from_slice(&header);
    frame
}
