//! Wireless (monitor-mode) frame handler
//!
//! Classifies raw 802.11 captures, follows one ad-hoc network by locking
//! onto the BSSID of a beacon whose name matches an active filter, and
//! decides per data frame whether it should be relayed and acknowledged.

use crate::beacon::BeaconReader;
use crate::convert::{ieee80211, PacketConverter};
use crate::filter::AddressFilter;
use crate::handler::{
    ControlSubtype, ConvertContext, DataSubtype, FrameHandler, FrameKind, ManagementSubtype,
};
use crate::mac::HardwareAddress;
use crate::radiotap::{PhysicalHeaderParams, RadiotapReader};

/// Retry bit in the second frame-control byte; a set bit marks a
/// retransmission the relay must not duplicate.
const RETRY_FLAG: u8 = 0x08;

/// Handler for raw wireless link-layer frames.
pub struct MonitorHandler {
    filter: AddressFilter,
    radiotap: RadiotapReader,
    beacon: BeaconReader,
    converter: PacketConverter,

    ssid_filters: Vec<String>,
    locked_bssid: HardwareAddress,
    locked_network_name: String,

    last_frame: Vec<u8>,
    kind: FrameKind,
    source: HardwareAddress,
    destination: HardwareAddress,
    is_dropped: bool,
    is_ackable: bool,
    should_relay: bool,
    is_broadcast: bool,

    // Last known good radio parameters, kept separately for the
    // acknowledgement path and the data path.
    control_params: PhysicalHeaderParams,
    data_params: PhysicalHeaderParams,
}

impl Default for MonitorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorHandler {
    pub fn new() -> Self {
        Self {
            filter: AddressFilter::new(),
            radiotap: RadiotapReader::new(),
            beacon: BeaconReader::new(),
            converter: PacketConverter::new(true),
            ssid_filters: Vec::new(),
            locked_bssid: HardwareAddress::default(),
            locked_network_name: String::new(),
            last_frame: Vec::new(),
            kind: FrameKind::Unknown,
            source: HardwareAddress::default(),
            destination: HardwareAddress::default(),
            is_dropped: false,
            is_ackable: false,
            should_relay: false,
            is_broadcast: false,
            control_params: PhysicalHeaderParams::default(),
            data_params: PhysicalHeaderParams::default(),
        }
    }

    /// Set the network-name filters. An empty list admits every name; a
    /// non-empty list admits names containing any of the filter strings.
    pub fn set_ssid_filters(&mut self, filters: Vec<String>) {
        self.ssid_filters = filters;
    }

    fn is_ssid_allowed(&self, ssid: &str) -> bool {
        if self.ssid_filters.is_empty() {
            return true;
        }
        self.ssid_filters.iter().any(|f| ssid.contains(f.as_str()))
    }

    fn handle_control(&mut self, frame_control: u8, link_offset: usize) {
        let Some(destination) =
            HardwareAddress::read(&self.last_frame, link_offset + ieee80211::DESTINATION_OFFSET)
        else {
            return;
        };
        self.destination = destination;

        // Control frames are only interesting when they target an address
        // we deny-listed ourselves, the handshake aimed at this instance.
        if !self.filter.is_denied(destination) {
            return;
        }

        if ControlSubtype::from(frame_control >> 4) == ControlSubtype::Ack {
            self.control_params = self.radiotap.export_parameters();
            self.is_dropped = false;
            log::trace!("Acknowledgement observed for {}", destination);
        }
    }

    fn handle_data(&mut self, frame_control: u8, link_offset: usize) {
        let Some(source) =
            HardwareAddress::read(&self.last_frame, link_offset + ieee80211::SOURCE_OFFSET)
        else {
            return;
        };
        self.source = source;

        if !self.filter.is_permitted(source) {
            return;
        }

        let bssid = HardwareAddress::read(&self.last_frame, link_offset + ieee80211::BSSID_OFFSET);
        if bssid != Some(self.locked_bssid) {
            return;
        }

        let Some(destination) =
            HardwareAddress::read(&self.last_frame, link_offset + ieee80211::DESTINATION_OFFSET)
        else {
            return;
        };
        self.destination = destination;
        self.is_broadcast = destination.is_broadcast();
        self.is_ackable = !self.is_broadcast;

        // Retransmissions are dropped outright: no relay, no parameter
        // snapshot, so duplicates never reach the bridge.
        let retry = self
            .last_frame
            .get(link_offset + 1)
            .map(|byte| byte & RETRY_FLAG != 0)
            .unwrap_or(true);
        if retry {
            self.is_ackable = false;
            return;
        }

        match DataSubtype::from(frame_control >> 4) {
            DataSubtype::Data | DataSubtype::QosData => {
                self.data_params = self.radiotap.export_parameters();
                self.should_relay = true;
                self.is_dropped = false;
            }
            DataSubtype::Null | DataSubtype::QosNull | DataSubtype::Unknown => {}
        }
    }

    fn handle_management(&mut self, frame_control: u8, link_offset: usize) {
        let Some(source) =
            HardwareAddress::read(&self.last_frame, link_offset + ieee80211::SOURCE_OFFSET)
        else {
            return;
        };
        self.source = source;

        if !self.filter.is_permitted(source) {
            return;
        }

        if ManagementSubtype::from(frame_control >> 4) != ManagementSubtype::Beacon {
            return;
        }

        let params = self.radiotap.export_parameters();
        self.beacon.update(&self.last_frame, &params);

        if !self.is_ssid_allowed(self.beacon.ssid()) {
            return;
        }

        let Some(bssid) =
            HardwareAddress::read(&self.last_frame, link_offset + ieee80211::BSSID_OFFSET)
        else {
            return;
        };

        // Lock only when the BSSID actually changes, beacons repeat every
        // ~100ms and relocking each time would churn downstream state.
        if bssid != self.locked_bssid {
            self.locked_bssid = bssid;
            self.locked_network_name = self.beacon.ssid().to_owned();
            self.is_dropped = false;
            log::info!(
                "Locked onto network \"{}\" ({})",
                self.locked_network_name,
                self.locked_bssid
            );
        }
    }

    /// Convert the last relayable frame to 802.3 format.
    pub fn convert_packet(&self) -> Option<Vec<u8>> {
        if !self.should_relay {
            return None;
        }
        self.converter.convert_to_8023(&self.last_frame)
    }

    /// Construct an acknowledgement for the last frame's transmitter using
    /// the most recently observed acknowledgement radio parameters.
    pub fn construct_acknowledgement(&self) -> Vec<u8> {
        crate::radiotap::construct_acknowledgement_frame(self.source, &self.control_params)
    }

    /// Forget the locked network.
    pub fn reset(&mut self) {
        self.locked_bssid = HardwareAddress::default();
        self.locked_network_name.clear();
        self.beacon.reset();
    }

    pub fn frame_kind(&self) -> FrameKind {
        self.kind
    }

    pub fn is_dropped(&self) -> bool {
        self.is_dropped
    }

    pub fn is_ackable(&self) -> bool {
        self.is_ackable
    }

    pub fn should_relay(&self) -> bool {
        self.should_relay
    }

    pub fn is_broadcast(&self) -> bool {
        self.is_broadcast
    }

    pub fn locked_bssid(&self) -> HardwareAddress {
        self.locked_bssid
    }

    pub fn locked_network_name(&self) -> &str {
        &self.locked_network_name
    }

    /// Radio parameters snapshotted from the last acknowledgement.
    pub fn control_parameters(&self) -> PhysicalHeaderParams {
        self.control_params
    }

    /// Radio parameters snapshotted from the last relayable data frame.
    pub fn data_parameters(&self) -> PhysicalHeaderParams {
        self.data_params
    }
}

impl FrameHandler for MonitorHandler {
    fn update(&mut self, frame: &[u8]) {
        self.last_frame = frame.to_vec();
        self.kind = FrameKind::Unknown;
        self.source = HardwareAddress::default();
        self.destination = HardwareAddress::default();
        // Dropped until an explicit keep path says otherwise.
        self.is_dropped = true;
        self.is_ackable = false;
        self.should_relay = false;
        self.is_broadcast = false;

        self.radiotap.fill_parameters(frame);
        let link_offset = self.radiotap.length() as usize;

        let Some(&frame_control) = frame.get(link_offset) else {
            return;
        };

        self.kind = FrameKind::from(frame_control);
        match self.kind {
            FrameKind::Control => self.handle_control(frame_control, link_offset),
            FrameKind::Data => self.handle_data(frame_control, link_offset),
            FrameKind::Management => self.handle_management(frame_control, link_offset),
            FrameKind::Unknown => {}
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
        self.convert_packet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SNAP_LLC_PREFIX;

    const PSP: &str = "00:1f:32:4a:5b:6c";
    const PEER: &str = "00:18:f8:29:3f:b0";
    const BSSID: &str = "02:18:f8:29:3f:b0";

    fn address(text: &str) -> HardwareAddress {
        HardwareAddress::parse(text).unwrap()
    }

    // 16-byte radiotap header: flags 0x00, rate 0x16, channel 2412.
    fn radiotap_header() -> Vec<u8> {
        vec![
            0x00, 0x00, 0x10, 0x00, 0x0e, 0x80, 0x00, 0x00, //
            0x00, 0x16, 0x6c, 0x09, 0x00, 0xa0, 0x08, 0x00,
        ]
    }

    fn data_frame(
        destination: HardwareAddress,
        source: HardwareAddress,
        bssid: HardwareAddress,
        retry: bool,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut frame = radiotap_header();
        frame.extend_from_slice(&[0x08, if retry { RETRY_FLAG } else { 0x00 }]);
        frame.extend_from_slice(&[0xff, 0xff]); // duration
        frame.extend_from_slice(&destination.to_bytes());
        frame.extend_from_slice(&source.to_bytes());
        frame.extend_from_slice(&bssid.to_bytes());
        frame.extend_from_slice(&[0x00, 0x00]); // sequence control
        frame.extend_from_slice(&SNAP_LLC_PREFIX);
        frame.extend_from_slice(&[0x88, 0xc8]);
        frame.extend_from_slice(payload);
        frame
    }

    fn beacon_frame(ssid: &str, bssid: HardwareAddress) -> Vec<u8> {
        let mut frame = radiotap_header();
        frame.extend_from_slice(&[0x80, 0x00, 0x00, 0x00]);
        frame.extend_from_slice(&HardwareAddress::BROADCAST.to_bytes());
        frame.extend_from_slice(&address(PEER).to_bytes());
        frame.extend_from_slice(&bssid.to_bytes());
        frame.extend_from_slice(&[0x00, 0x00]); // sequence control
        frame.extend_from_slice(&[0x00; 12]); // fixed parameters
        frame.push(0x00); // SSID tag
        frame.push(ssid.len() as u8);
        frame.extend_from_slice(ssid.as_bytes());
        frame.extend_from_slice(&[0x06, 0x02, 0x00, 0x00]); // IBSS
        frame
    }

    fn locked_handler() -> MonitorHandler {
        let mut handler = MonitorHandler::new();
        handler.set_ssid_filters(vec!["PSP_".to_owned()]);
        handler.update(&beacon_frame("PSP_AULES00123_L_TEST", address(BSSID)));
        assert_eq!(handler.locked_bssid(), address(BSSID));
        handler
    }

    #[test]
    fn test_beacon_locks_network_once() {
        let mut handler = MonitorHandler::new();
        handler.set_ssid_filters(vec!["PSP_".to_owned()]);

        let beacon = beacon_frame("PSP_AULES00123_L_TEST", address(BSSID));
        handler.update(&beacon);
        assert_eq!(handler.locked_bssid(), address(BSSID));
        assert_eq!(handler.locked_network_name(), "PSP_AULES00123_L_TEST");
        assert!(!handler.is_dropped());

        // A second identical beacon changes nothing and is dropped.
        handler.update(&beacon);
        assert_eq!(handler.locked_bssid(), address(BSSID));
        assert!(handler.is_dropped());

        // A different BSSID relocks.
        handler.update(&beacon_frame("PSP_AULES00123_L_TEST", address(PEER)));
        assert_eq!(handler.locked_bssid(), address(PEER));
    }

    #[test]
    fn test_name_filter_gates_locking() {
        let mut handler = MonitorHandler::new();
        handler.set_ssid_filters(vec!["PSP_".to_owned()]);

        handler.update(&beacon_frame("SomeHomeNetwork", address(BSSID)));
        assert_eq!(handler.locked_bssid(), HardwareAddress::default());
        assert!(handler.is_dropped());

        // An empty filter list admits everything.
        handler.set_ssid_filters(Vec::new());
        handler.update(&beacon_frame("SomeHomeNetwork", address(BSSID)));
        assert_eq!(handler.locked_bssid(), address(BSSID));
    }

    #[test]
    fn test_data_frame_is_relayed() {
        let mut handler = locked_handler();

        let frame = data_frame(
            address(PEER),
            address(PSP),
            address(BSSID),
            false,
            &[0x01, 0x02, 0x03],
        );
        handler.update(&frame);

        assert_eq!(handler.frame_kind(), FrameKind::Data);
        assert!(!handler.is_dropped());
        assert!(handler.should_relay());
        assert!(handler.is_ackable());
        assert!(!handler.is_broadcast());
        assert_eq!(handler.source_address(), address(PSP));
        assert_eq!(handler.destination_address(), address(PEER));
        assert_eq!(handler.data_parameters().data_rate, 0x16);

        let converted = handler.convert_packet().unwrap();
        assert_eq!(&converted[0..6], &address(PEER).to_bytes());
        assert_eq!(&converted[6..12], &address(PSP).to_bytes());
        assert_eq!(&converted[12..14], &[0x88, 0xc8]);
        assert_eq!(&converted[14..], &[0x01, 0x02, 0x03]);

        // The acknowledgement goes back to the transmitter.
        let ack = handler.construct_acknowledgement();
        assert_eq!(ack[16], 0xd4);
        assert_eq!(&ack[20..26], &address(PSP).to_bytes());
    }

    #[test]
    fn test_retry_frame_is_dropped_without_snapshot() {
        let mut handler = locked_handler();
        let params_before = handler.data_parameters();

        let frame = data_frame(address(PEER), address(PSP), address(BSSID), true, &[0x01]);
        handler.update(&frame);

        assert!(handler.is_dropped());
        assert!(!handler.should_relay());
        assert!(!handler.is_ackable());
        assert_eq!(handler.data_parameters(), params_before);
        assert!(handler.convert_packet().is_none());
    }

    #[test]
    fn test_broadcast_data_frame_is_not_ackable() {
        let mut handler = locked_handler();

        let frame = data_frame(
            HardwareAddress::BROADCAST,
            address(PSP),
            address(BSSID),
            false,
            &[0x01],
        );
        handler.update(&frame);

        assert!(handler.is_broadcast());
        assert!(!handler.is_ackable());
        assert!(handler.should_relay());
    }

    #[test]
    fn test_foreign_bssid_is_dropped() {
        let mut handler = locked_handler();

        let frame = data_frame(address(PEER), address(PSP), address(PEER), false, &[0x01]);
        handler.update(&frame);

        assert!(handler.is_dropped());
        assert!(!handler.should_relay());
    }

    #[test]
    fn test_denied_source_is_dropped() {
        let mut handler = locked_handler();
        handler.filter_mut().deny(address(PSP));

        let frame = data_frame(address(PEER), address(PSP), address(BSSID), false, &[0x01]);
        handler.update(&frame);

        assert!(handler.is_dropped());
        assert!(!handler.should_relay());
    }

    #[test]
    fn test_acknowledgement_path() {
        let mut handler = locked_handler();
        handler.filter_mut().deny(address(PEER));

        // ACK control frame addressed to the denied peer.
        let mut ack = radiotap_header();
        ack[8] = 0x00;
        ack.extend_from_slice(&[0xd4, 0x00, 0xff, 0xff]);
        ack.extend_from_slice(&address(PEER).to_bytes());
        handler.update(&ack);

        assert_eq!(handler.frame_kind(), FrameKind::Control);
        assert!(!handler.is_dropped());
        assert_eq!(handler.control_parameters().data_rate, 0x16);
    }

    #[test]
    fn test_non_ack_control_frame_is_dropped() {
        let mut handler = locked_handler();
        handler.filter_mut().deny(address(PEER));
        let params_before = handler.control_parameters();

        // BlockAck control frame addressed to the denied peer: observed but
        // never kept, and never parameter-snapshotted.
        let mut block_ack = radiotap_header();
        block_ack.extend_from_slice(&[0x94, 0x00, 0xff, 0xff]);
        block_ack.extend_from_slice(&address(PEER).to_bytes());
        handler.update(&block_ack);

        assert_eq!(handler.frame_kind(), FrameKind::Control);
        assert!(handler.is_dropped());
        assert_eq!(handler.control_parameters(), params_before);
    }

    #[test]
    fn test_permitted_non_beacon_management_is_dropped() {
        let mut handler = locked_handler();

        // Probe response from a permitted source.
        let mut probe = radiotap_header();
        probe.extend_from_slice(&[0x50, 0x00, 0x00, 0x00]);
        probe.extend_from_slice(&address(PEER).to_bytes());
        probe.extend_from_slice(&address(PSP).to_bytes());
        probe.extend_from_slice(&address(BSSID).to_bytes());
        probe.extend_from_slice(&[0x00, 0x00]);
        handler.update(&probe);

        assert_eq!(handler.frame_kind(), FrameKind::Management);
        assert!(handler.is_dropped());
    }

    #[test]
    fn test_control_frame_for_unknown_destination_is_dropped() {
        let mut handler = locked_handler();

        let mut ack = radiotap_header();
        ack.extend_from_slice(&[0xd4, 0x00, 0xff, 0xff]);
        ack.extend_from_slice(&address(PEER).to_bytes());
        handler.update(&ack);

        assert!(handler.is_dropped());
    }

    #[test]
    fn test_truncated_frame_is_dropped() {
        let mut handler = locked_handler();
        handler.update(&radiotap_header()[..4]);
        assert!(handler.is_dropped());
        assert_eq!(handler.frame_kind(), FrameKind::Unknown);
    }

    #[test]
    fn test_reset_forgets_lock() {
        let mut handler = locked_handler();
        handler.reset();
        assert_eq!(handler.locked_bssid(), HardwareAddress::default());
        assert_eq!(handler.locked_network_name(), "");
    }
}
