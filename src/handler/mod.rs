//! Per-transport frame handlers
//!
//! A handler classifies frames from one capture or relay device and carries
//! the per-frame state (addresses, flags, parameter snapshots) the bridge
//! needs. Three variants exist: `monitor` for raw wireless captures,
//! `ethernet` for 802.3 style frames and `plugin` for the vendor plugin
//! framing. All three expose the same [`FrameHandler`] capability so the
//! connection layer never cares which transport it is driving.

pub mod ethernet;
pub mod monitor;
pub mod plugin;

use serde::{Deserialize, Serialize};

use crate::filter::AddressFilter;
use crate::mac::HardwareAddress;
use crate::radiotap::PhysicalHeaderParams;

pub use ethernet::EthernetHandler;
pub use monitor::MonitorHandler;
pub use plugin::PluginHandler;

/// Main frame type, from bits 2-3 of the frame-control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    Management,
    Control,
    Data,
    Unknown,
}

impl From<u8> for FrameKind {
    /// Classify from the raw frame-control byte.
    fn from(frame_control: u8) -> Self {
        match (frame_control >> 2) & 0x03 {
            0 => FrameKind::Management,
            1 => FrameKind::Control,
            2 => FrameKind::Data,
            _ => FrameKind::Unknown,
        }
    }
}

/// Control frame subtype, from the high nibble of the frame-control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSubtype {
    BlockAckRequest,
    BlockAck,
    Ack,
    Unknown,
}

impl From<u8> for ControlSubtype {
    fn from(subtype: u8) -> Self {
        match subtype {
            8 => ControlSubtype::BlockAckRequest,
            9 => ControlSubtype::BlockAck,
            13 => ControlSubtype::Ack,
            _ => ControlSubtype::Unknown,
        }
    }
}

/// Data frame subtype, from the high nibble of the frame-control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSubtype {
    Data,
    Null,
    QosData,
    QosNull,
    Unknown,
}

impl From<u8> for DataSubtype {
    fn from(subtype: u8) -> Self {
        match subtype {
            0 => DataSubtype::Data,
            4 => DataSubtype::Null,
            8 => DataSubtype::QosData,
            12 => DataSubtype::QosNull,
            _ => DataSubtype::Unknown,
        }
    }
}

/// Management frame subtype, from the high nibble of the frame-control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagementSubtype {
    AssociationRequest,
    AssociationResponse,
    ReassociationRequest,
    ReassociationResponse,
    ProbeRequest,
    ProbeResponse,
    Beacon,
    Disassociation,
    Authentication,
    Deauthentication,
    Action,
    ActionNoAck,
    Unknown,
}

impl From<u8> for ManagementSubtype {
    fn from(subtype: u8) -> Self {
        match subtype {
            0 => ManagementSubtype::AssociationRequest,
            1 => ManagementSubtype::AssociationResponse,
            2 => ManagementSubtype::ReassociationRequest,
            3 => ManagementSubtype::ReassociationResponse,
            4 => ManagementSubtype::ProbeRequest,
            5 => ManagementSubtype::ProbeResponse,
            8 => ManagementSubtype::Beacon,
            10 => ManagementSubtype::Disassociation,
            11 => ManagementSubtype::Authentication,
            12 => ManagementSubtype::Deauthentication,
            13 => ManagementSubtype::Action,
            14 => ManagementSubtype::ActionNoAck,
            _ => ManagementSubtype::Unknown,
        }
    }
}

/// Context a handler needs when converting a frame for another transport.
#[derive(Debug, Clone, Copy)]
pub struct ConvertContext {
    /// BSSID to write into synthesized link headers.
    pub bssid: HardwareAddress,
    /// Physical-layer parameters for synthesized headers.
    pub physical_params: PhysicalHeaderParams,
    /// Address of the adapter the handler is driving.
    pub local_address: HardwareAddress,
}

/// Capability shared by all handler variants.
///
/// The connection layer talks to a `dyn FrameHandler` selected by the
/// transport type; only classification details differ per variant.
pub trait FrameHandler: Send {
    /// Process one captured frame.
    fn update(&mut self, frame: &[u8]);

    /// Source address of the last frame.
    fn source_address(&self) -> HardwareAddress;

    /// Destination address of the last frame.
    fn destination_address(&self) -> HardwareAddress;

    /// The handler's address filter.
    fn filter(&self) -> &AddressFilter;

    /// Mutable access to the handler's address filter.
    fn filter_mut(&mut self) -> &mut AddressFilter;

    /// Raw bytes of the last frame.
    fn last_frame(&self) -> &[u8];

    /// Convert the last frame for the opposite transport.
    ///
    /// Returns `None` when the frame should not leave the handler.
    fn convert_out(&self, context: &ConvertContext) -> Option<Vec<u8>>;
}
