//! Bidirectional 802.11 <-> 802.3 frame conversion
//!
//! Offsets into a wireless frame are always expressed relative to the
//! declared physical-header length, never a hardcoded constant, because that
//! length varies per capture. Malformed input yields `None`, never a panic.

use crate::mac::HardwareAddress;
use crate::radiotap::{
    self, PhysicalHeaderParams, RadiotapReader, DEFAULT_CHANNEL_FLAGS, DEFAULT_DATA_RATE,
    DEFAULT_FREQUENCY, LENGTH_OFFSET, MAX_LENGTH,
};

/// Field offsets in an 802.11 data frame, relative to the link header start.
pub mod ieee80211 {
    /// Frame-control field.
    pub const FRAME_CONTROL_OFFSET: usize = 0;
    /// Address 1, the receiver.
    pub const DESTINATION_OFFSET: usize = 4;
    /// Address 2, the transmitter.
    pub const SOURCE_OFFSET: usize = 10;
    /// Address 3, the BSSID.
    pub const BSSID_OFFSET: usize = 16;
    /// Ethertype inside the SNAP LLC encapsulation.
    pub const TYPE_OFFSET: usize = 30;
    /// Start of the payload.
    pub const DATA_OFFSET: usize = 32;
    /// Extra bytes the QoS control field adds in front of the LLC header.
    pub const QOS_EXTRA: usize = 2;

    /// First link byte of a plain data frame (frame control, low byte).
    pub const DATA_FRAME_BYTE: u8 = 0x08;
    /// First link byte of a QoS data frame.
    pub const QOS_DATA_FRAME_BYTE: u8 = 0x88;
    /// First link byte of a beacon frame.
    pub const BEACON_FRAME_BYTE: u8 = 0x80;
}

/// Field offsets in an 802.3 frame.
pub mod ieee8023 {
    pub const DESTINATION_OFFSET: usize = 0;
    pub const SOURCE_OFFSET: usize = 6;
    pub const TYPE_OFFSET: usize = 12;
    pub const DATA_OFFSET: usize = 14;
    pub const HEADER_LENGTH: usize = 14;
}

/// Converts frames between the wireless and Ethernet-style encodings.
///
/// Stateless apart from the radio parameters used when synthesizing
/// physical headers; the link-header offset is recomputed per call from the
/// frame's own declared physical-header length.
#[derive(Debug, Clone)]
pub struct PacketConverter {
    data_rate: u8,
    frequency: u16,
    channel_flags: u16,
    has_physical_header: bool,
}

impl Default for PacketConverter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PacketConverter {
    /// Create a converter. `has_physical_header` declares whether incoming
    /// wireless frames start with a radiotap header.
    pub fn new(has_physical_header: bool) -> Self {
        Self {
            data_rate: DEFAULT_DATA_RATE,
            frequency: DEFAULT_FREQUENCY,
            channel_flags: DEFAULT_CHANNEL_FLAGS,
            has_physical_header,
        }
    }

    /// Set the data rate code used when synthesizing headers.
    pub fn set_data_rate(&mut self, data_rate: u8) {
        self.data_rate = data_rate;
    }

    /// Set the channel frequency used when synthesizing headers.
    pub fn set_frequency(&mut self, frequency: u16) {
        self.frequency = frequency;
    }

    /// Set the channel flags used when synthesizing headers.
    pub fn set_channel_flags(&mut self, channel_flags: u16) {
        self.channel_flags = channel_flags;
    }

    fn synthesis_params(&self) -> PhysicalHeaderParams {
        PhysicalHeaderParams {
            data_rate: self.data_rate,
            frequency: self.frequency,
            channel_flags: self.channel_flags,
            ..Default::default()
        }
    }

    /// Offset of the link header inside a wireless frame.
    ///
    /// Reads the frame's declared physical-header length, bounded by the
    /// same sanity checks the header reader applies.
    fn link_offset(&self, frame: &[u8]) -> Option<usize> {
        if !self.has_physical_header {
            return Some(0);
        }

        let bytes = frame.get(LENGTH_OFFSET..LENGTH_OFFSET + 2)?;
        let length = u16::from_le_bytes([bytes[0], bytes[1]]);

        if length > MAX_LENGTH || frame.len() < length as usize {
            return None;
        }

        Some(length as usize)
    }

    fn first_link_byte(&self, frame: &[u8]) -> Option<u8> {
        let offset = self.link_offset(frame)?;
        frame.get(offset + ieee80211::FRAME_CONTROL_OFFSET).copied()
    }

    /// Check whether a wireless frame is a plain data frame.
    pub fn is_data_frame(&self, frame: &[u8]) -> bool {
        self.first_link_byte(frame) == Some(ieee80211::DATA_FRAME_BYTE)
    }

    /// Check whether a wireless frame is a QoS data frame.
    pub fn is_qos_data_frame(&self, frame: &[u8]) -> bool {
        self.first_link_byte(frame) == Some(ieee80211::QOS_DATA_FRAME_BYTE)
    }

    /// Check whether a wireless frame is a beacon.
    pub fn is_beacon_frame(&self, frame: &[u8]) -> bool {
        self.first_link_byte(frame) == Some(ieee80211::BEACON_FRAME_BYTE)
    }

    /// Check whether a wireless frame belongs to the given BSSID.
    pub fn is_for_bssid(&self, frame: &[u8], bssid: HardwareAddress) -> bool {
        let Some(offset) = self.link_offset(frame) else {
            return false;
        };
        HardwareAddress::read(frame, offset + ieee80211::BSSID_OFFSET) == Some(bssid)
    }

    /// Convert a wireless data frame to 802.3 format.
    ///
    /// Strips the physical and link headers, reorders destination, source
    /// and ethertype, honors the QoS control field and drops the FCS
    /// trailer when the physical header announces one.
    pub fn convert_to_8023(&self, frame: &[u8]) -> Option<Vec<u8>> {
        let offset = self.link_offset(frame)?;

        let qos_extra = if self.is_qos_data_frame(frame) {
            ieee80211::QOS_EXTRA
        } else {
            0
        };

        let fcs_length = if self.has_physical_header {
            let mut reader = RadiotapReader::new();
            reader.fill_parameters(frame);
            reader.export_parameters().fcs_length()
        } else {
            0
        };

        let destination = HardwareAddress::read(frame, offset + ieee80211::DESTINATION_OFFSET)?;
        let source = HardwareAddress::read(frame, offset + ieee80211::SOURCE_OFFSET)?;
        let ether_type = frame.get(
            offset + ieee80211::TYPE_OFFSET + qos_extra..offset + ieee80211::TYPE_OFFSET + qos_extra + 2,
        )?;
        let payload_start = offset + ieee80211::DATA_OFFSET + qos_extra;
        let payload = frame.get(payload_start..frame.len().checked_sub(fcs_length)?)?;

        let mut converted =
            Vec::with_capacity(ieee8023::HEADER_LENGTH + payload.len());
        converted.extend_from_slice(&destination.to_bytes());
        converted.extend_from_slice(&source.to_bytes());
        converted.extend_from_slice(ether_type);
        converted.extend_from_slice(payload);
        Some(converted)
    }

    /// Convert an 802.3 frame to wireless format for injection.
    ///
    /// Synthesizes the physical header when requested, then a 24-byte data
    /// frame header carrying the given BSSID, the SNAP LLC encapsulation
    /// with the original ethertype, and the payload.
    pub fn convert_to_80211(
        &self,
        frame: &[u8],
        bssid: HardwareAddress,
        prepend_physical_header: bool,
    ) -> Option<Vec<u8>> {
        let destination = HardwareAddress::read(frame, ieee8023::DESTINATION_OFFSET)?;
        let source = HardwareAddress::read(frame, ieee8023::SOURCE_OFFSET)?;
        let ether_type = frame.get(ieee8023::TYPE_OFFSET..ieee8023::TYPE_OFFSET + 2)?;
        let payload = frame.get(ieee8023::DATA_OFFSET..)?;

        let mut converted = if prepend_physical_header {
            radiotap::build_radiotap_header(&self.synthesis_params())
        } else {
            Vec::new()
        };

        converted.extend_from_slice(&radiotap::build_ieee80211_header(
            destination,
            source,
            bssid,
        ));
        converted.extend_from_slice(&radiotap::build_llc_header([ether_type[0], ether_type[1]]));
        converted.extend_from_slice(payload);
        Some(converted)
    }

    /// Construct an acknowledgement frame for a transmitter, carrying the
    /// currently configured rate and channel in its physical header.
    pub fn construct_acknowledgement_frame(&self, receiver: HardwareAddress) -> Vec<u8> {
        radiotap::construct_acknowledgement_frame(receiver, &self.synthesis_params())
    }
}
