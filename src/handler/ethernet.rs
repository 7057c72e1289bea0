//! Ethernet-style (802.3) frame handler
//!
//! The simplest variant: fixed 14-byte header, no physical layer. Outgoing
//! conversion rebuilds a wireless frame around the payload so it can be
//! injected on a monitor-mode adapter.

use crate::convert::{ieee8023, PacketConverter};
use crate::filter::AddressFilter;
use crate::handler::{ConvertContext, FrameHandler};
use crate::mac::HardwareAddress;
use crate::radiotap::PhysicalHeaderParams;

/// Handler for 802.3 style frames.
#[derive(Default)]
pub struct EthernetHandler {
    filter: AddressFilter,
    last_frame: Vec<u8>,
    source: HardwareAddress,
    destination: HardwareAddress,
    ether_type: [u8; 2],
    is_broadcast: bool,
}

impl EthernetHandler {
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

    /// Rebuild the last frame as a wireless frame for the given network.
    pub fn convert_packet_out(
        &self,
        bssid: HardwareAddress,
        params: &PhysicalHeaderParams,
    ) -> Option<Vec<u8>> {
        let mut converter = PacketConverter::new(true);
        converter.set_data_rate(params.data_rate);
        converter.set_frequency(params.frequency);
        converter.set_channel_flags(params.channel_flags);
        converter.convert_to_80211(&self.last_frame, bssid, true)
    }
}

impl FrameHandler for EthernetHandler {
    fn update(&mut self, frame: &[u8]) {
        self.last_frame = frame.to_vec();
        self.source = HardwareAddress::default();
        self.destination = HardwareAddress::default();
        self.ether_type = [0; 2];
        self.is_broadcast = false;

        let Some(destination) = HardwareAddress::read(frame, ieee8023::DESTINATION_OFFSET) else {
            return;
        };
        let Some(source) = HardwareAddress::read(frame, ieee8023::SOURCE_OFFSET) else {
            return;
        };

        self.destination = destination;
        self.source = source;
        self.is_broadcast = destination.is_broadcast();

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

    fn convert_out(&self, context: &ConvertContext) -> Option<Vec<u8>> {
        self.convert_packet_out(context.bssid, &context.physical_params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SNAP_LLC_PREFIX;

    fn frame(destination: HardwareAddress, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.extend_from_slice(&destination.to_bytes());
        frame.extend_from_slice(&HardwareAddress::parse("00:1f:32:4a:5b:6c").unwrap().to_bytes());
        frame.extend_from_slice(&[0x88, 0xc8]);
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn test_update_extracts_fields() {
        let destination = HardwareAddress::parse("00:18:f8:29:3f:b0").unwrap();
        let mut handler = EthernetHandler::new();
        handler.update(&frame(destination, &[0x01, 0x02]));

        assert_eq!(handler.destination_address(), destination);
        assert_eq!(
            handler.source_address(),
            HardwareAddress::parse("00:1f:32:4a:5b:6c").unwrap()
        );
        assert_eq!(handler.ether_type(), [0x88, 0xc8]);
        assert!(!handler.is_broadcast());

        handler.update(&frame(HardwareAddress::BROADCAST, &[]));
        assert!(handler.is_broadcast());
    }

    #[test]
    fn test_truncated_frame_yields_defaults() {
        let mut handler = EthernetHandler::new();
        handler.update(&[0x00; 8]);
        assert_eq!(handler.source_address(), HardwareAddress::default());
        assert!(!handler.is_broadcast());
    }

    #[test]
    fn test_convert_packet_out_round_trips() {
        let destination = HardwareAddress::parse("00:18:f8:29:3f:b0").unwrap();
        let bssid = HardwareAddress::parse("02:18:f8:29:3f:b0").unwrap();
        let original = frame(destination, &[0xde, 0xad, 0xbe, 0xef]);

        let mut handler = EthernetHandler::new();
        handler.update(&original);

        let params = PhysicalHeaderParams {
            data_rate: 0x16,
            frequency: 2437,
            channel_flags: 0xa000,
            ..Default::default()
        };
        let wireless = handler.convert_packet_out(bssid, &params).unwrap();

        let converter = PacketConverter::new(true);
        assert!(converter.is_data_frame(&wireless));
        assert!(converter.is_for_bssid(&wireless, bssid));
        assert_eq!(converter.convert_to_8023(&wireless).unwrap(), original);

        // SNAP LLC prefix carried verbatim behind the 24-byte link header.
        let link = 16;
        assert_eq!(&wireless[link + 24..link + 30], &SNAP_LLC_PREFIX);
    }
}
