//! Hardware (MAC) address handling
//!
//! Addresses read from frames arrive in wire byte order; this module keeps
//! them in a single canonical 64-bit representation so that comparisons and
//! filter lookups never have to care about endianness again.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a hardware address on the wire.
pub const ADDRESS_LENGTH: usize = 6;

/// Mask for the 48 significant bits of a hardware address.
const ADDRESS_MASK: u64 = (1u64 << 48) - 1;

/// A 48-bit hardware address in canonical (big-endian-normalized) form.
///
/// `aa:bb:cc:dd:ee:ff` is stored as `0x0000_aabb_ccdd_eeff`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HardwareAddress(u64);

impl HardwareAddress {
    /// The all-ones broadcast address.
    pub const BROADCAST: HardwareAddress = HardwareAddress(ADDRESS_MASK);

    /// Create an address from a raw value, masking to 48 bits.
    pub fn new(raw: u64) -> Self {
        Self(raw & ADDRESS_MASK)
    }

    /// Create an address from wire-order bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        let mut raw = 0u64;
        for byte in bytes {
            raw = (raw << 8) | u64::from(byte);
        }
        Self(raw)
    }

    /// Read an address from a frame at the given offset.
    ///
    /// Returns `None` when the frame is too short to contain one.
    pub fn read(frame: &[u8], offset: usize) -> Option<Self> {
        let bytes = frame.get(offset..offset + ADDRESS_LENGTH)?;
        let mut array = [0u8; ADDRESS_LENGTH];
        array.copy_from_slice(bytes);
        Some(Self::from_bytes(array))
    }

    /// Get the address in wire byte order.
    pub fn to_bytes(self) -> [u8; ADDRESS_LENGTH] {
        let be = self.0.to_be_bytes();
        let mut array = [0u8; ADDRESS_LENGTH];
        array.copy_from_slice(&be[2..8]);
        array
    }

    /// Get the canonical raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Check whether this is the broadcast address.
    pub fn is_broadcast(self) -> bool {
        self.0 == ADDRESS_MASK
    }

    /// Parse an address in `aa:bb:cc:dd:ee:ff` format.
    pub fn parse(text: &str) -> Option<Self> {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        let mut count = 0;

        for part in text.split(':') {
            if count >= ADDRESS_LENGTH {
                return None;
            }
            bytes[count] = u8::from_str_radix(part, 16).ok()?;
            count += 1;
        }

        if count == ADDRESS_LENGTH {
            Some(Self::from_bytes(bytes))
        } else {
            None
        }
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    }
}

impl From<u64> for HardwareAddress {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}
