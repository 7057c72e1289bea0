//! # kai-bridge
//!
//! Bridges wireless ad-hoc traffic from handheld game consoles to the
//! XLink Kai network service. Frames captured from a monitor-mode or
//! promiscuous adapter are classified, converted between wire formats and
//! relayed over a small text-prefixed UDP protocol.
//!
//! ## Architecture
//!
//! The implementation is organized into several modules:
//! - `mac`: canonical 48-bit hardware address handling
//! - `filter`: allow/deny-list policy over hardware addresses
//! - `radiotap`: physical-layer (radiotap) header dissection and synthesis
//! - `beacon`: beacon management-frame parameter extraction
//! - `handler`: per-transport frame handlers (monitor, ethernet, plugin)
//! - `convert`: stateless 802.11 <-> 802.3 format conversion
//! - `bridge`: the XLink Kai connection state machine

pub mod beacon;
pub mod bridge;
pub mod convert;
pub mod filter;
pub mod handler;
pub mod mac;
pub mod radiotap;

// Re-export commonly used types
pub use crate::{
    beacon::BeaconReader,
    bridge::{BridgeConfig, BridgeConnection, FrameSink},
    convert::PacketConverter,
    filter::AddressFilter,
    handler::{ethernet::EthernetHandler, monitor::MonitorHandler, plugin::PluginHandler},
    handler::{ConvertContext, FrameHandler, FrameKind},
    mac::HardwareAddress,
    radiotap::{PhysicalHeaderParams, RadiotapReader},
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not connected to the bridging service")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, BridgeError>;

// Constants
pub const MAX_FRAME_SIZE: usize = 4096;
pub const SNAP_LLC_PREFIX: [u8; 6] = [0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00];
pub const WLAN_FC_TYPE_DATA: u16 = 0x0008;
pub const ACKNOWLEDGEMENT_TYPE: u16 = 0x00d4;

// Utility functions
pub fn init_logging() {
    env_logger::init();
}
