//! Vendor plugin frame handler
//!
//! The plugin framing mirrors 802.3 but carries the true peer address
//! appended at the end of the frame instead of in the header: frames from
//! the device hold a placeholder destination in the header slot and the
//! real destination in the trailing 6 bytes, except for broadcasts, which
//! carry no trailer at all.

use crate::convert::ieee8023;
use crate::filter::AddressFilter;
use crate::handler::{ConvertContext, FrameHandler};
use crate::mac::{HardwareAddress, ADDRESS_LENGTH};

/// Handler for the vendor plugin framing variant.
#[derive(Default)]
pub struct PluginHandler {
    filter: AddressFilter,
    last_frame: Vec<u8>,
    source: HardwareAddress,
    destination: HardwareAddress,
    ether_type: [u8; 2],
    is_broadcast: bool,
}

impl PluginHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_broadcast(&self) -> bool {
        self.is_broadcast
    }

    /// Ethertype of the last frame, in wire byte order.
    pub fn ether_type(&self) -> [u8; 2] {
        self.ether_type
    }

    /// Convert a device frame to plain 802.3: write the recovered
    /// destination back into the header slot and strip the trailer.
    /// Broadcast frames have no trailer and pass through unchanged.
    pub fn convert_packet_out(&self) -> Option<Vec<u8>> {
        if self.last_frame.len() < ieee8023::HEADER_LENGTH {
            return None;
        }

        let mut converted = self.last_frame.clone();
        if !self.is_broadcast {
            if converted.len() < ieee8023::HEADER_LENGTH + ADDRESS_LENGTH {
                return None;
            }
            converted[ieee8023::DESTINATION_OFFSET..ieee8023::DESTINATION_OFFSET + ADDRESS_LENGTH]
                .copy_from_slice(&self.destination.to_bytes());
            converted.truncate(converted.len() - ADDRESS_LENGTH);
        }
        Some(converted)
    }

    /// Convert a plain 802.3 frame to the device framing: the real source
    /// moves to the tail and `local_address` takes its header slot, so the
    /// device believes the frame originated locally.
    pub fn convert_packet_in(frame: &[u8], local_address: HardwareAddress) -> Option<Vec<u8>> {
        let source = HardwareAddress::read(frame, ieee8023::SOURCE_OFFSET)?;

        let mut converted = frame.to_vec();
        converted[ieee8023::SOURCE_OFFSET..ieee8023::SOURCE_OFFSET + ADDRESS_LENGTH]
            .copy_from_slice(&local_address.to_bytes());
        converted.extend_from_slice(&source.to_bytes());
        Some(converted)
    }
}

impl FrameHandler for PluginHandler {
    fn update(&mut self, frame: &[u8]) {
        self.last_frame = frame.to_vec();
        self.source = HardwareAddress::default();
        self.destination = HardwareAddress::default();
        self.ether_type = [0; 2];
        self.is_broadcast = false;

        let Some(header_destination) = HardwareAddress::read(frame, ieee8023::DESTINATION_OFFSET)
        else {
            return;
        };
        let Some(source) = HardwareAddress::read(frame, ieee8023::SOURCE_OFFSET) else {
            return;
        };
        self.source = source;

        if header_destination.is_broadcast() {
            // Broadcast frames carry no trailing address.
            self.destination = HardwareAddress::BROADCAST;
            self.is_broadcast = true;
        } else if frame.len() >= ieee8023::HEADER_LENGTH + ADDRESS_LENGTH {
            // The true destination sits in the final 6 bytes; the header
            // slot holds an intermediary placeholder.
            if let Some(destination) =
                HardwareAddress::read(frame, frame.len() - ADDRESS_LENGTH)
            {
                self.destination = destination;
            }
        }

        if let Some(ether_type) = frame.get(ieee8023::TYPE_OFFSET..ieee8023::TYPE_OFFSET + 2) {
            self.ether_type = [ether_type[0], ether_type[1]];
        }
    }

    fn source_address(&self) -> HardwareAddress {
        self.source
    }

    fn destination_address(&self) -> HardwareAddress {
        self.destination
    }

    fn filter(&self) -> &AddressFilter {
        &self.filter
    }

    fn filter_mut(&mut self) -> &mut AddressFilter {
        &mut self.filter
    }

    fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    fn convert_out(&self, _context: &ConvertContext) -> Option<Vec<u8>> {
        self.convert_packet_out()
    }
}
