//! Beacon parameter extraction
//!
//! Beacons advertise the network name, supported rates and channel as a
//! tagged-length-value chain behind the fixed management-frame fields. The
//! reader tolerates malformed beacons by leaving fields at their defaults;
//! a zero frequency or empty name means "unavailable", never an error.

use crate::radiotap::PhysicalHeaderParams;

/// Offset of the first tagged parameter relative to the start of the link
/// header: 24 bytes of management header plus 12 bytes of fixed parameters
/// (timestamp, beacon interval, capabilities).
pub const FIRST_TAG_OFFSET: usize = 36;

/// Tag numbers of the parameters the reader understands.
pub mod tags {
    pub const SSID: u8 = 0;
    pub const SUPPORTED_RATES: u8 = 1;
    pub const DS_PARAMETER_SET: u8 = 3;
    pub const IBSS: u8 = 6;
    pub const EXTENDED_RATES: u8 = 50;
}

/// Convert a 2.4 GHz channel number to a frequency in MHz.
pub fn channel_to_frequency(channel: u8) -> Option<u16> {
    if (1..=13).contains(&channel) {
        Some(2412 + (u16::from(channel) - 1) * 5)
    } else {
        None
    }
}

/// Reads network parameters out of beacon frames.
#[derive(Debug, Default, Clone)]
pub struct BeaconReader {
    ssid: String,
    max_rate: u8,
    frequency: u16,
    is_adhoc: bool,
}

impl BeaconReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the tagged parameters of a beacon frame.
    ///
    /// The network-name tag sits at a fixed offset behind the physical and
    /// link headers; the remaining tags are chained behind it. Unknown tags
    /// are skipped by their declared length, advancing at least one byte so
    /// a zero-length tag cannot stall the scan.
    pub fn update(&mut self, frame: &[u8], params: &PhysicalHeaderParams) {
        self.max_rate = 0;
        self.frequency = 0;
        self.is_adhoc = false;
        self.ssid.clear();

        let tag_start = params.length as usize + FIRST_TAG_OFFSET;
        let end = frame.len().saturating_sub(params.fcs_length());

        // First parameter is always the network name.
        let Some(&ssid_length) = frame.get(tag_start + 1) else {
            return;
        };
        let Some(ssid_bytes) = frame.get(tag_start + 2..tag_start + 2 + ssid_length as usize)
        else {
            return;
        };
        self.ssid = String::from_utf8_lossy(ssid_bytes).into_owned();

        let mut index = tag_start + 2 + ssid_length as usize;

        while index < end {
            let tag = frame[index];
            let Some(&length) = frame.get(index + 1) else {
                break;
            };

            match tag {
                tags::SUPPORTED_RATES | tags::EXTENDED_RATES => {
                    self.update_max_rate(frame, index + 2, length);
                }
                tags::DS_PARAMETER_SET => {
                    if let Some(&channel) = frame.get(index + 2) {
                        self.frequency = channel_to_frequency(channel).unwrap_or(0);
                    }
                }
                tags::IBSS => {
                    self.is_adhoc = true;
                }
                _ => {
                    // Skip past unsupported parameters.
                }
            }

            // Advance past type, length and value; never less than one byte.
            index += (2 + length as usize).max(1);
        }
    }

    /// Track the highest rate seen across both rate-tag kinds. The rate
    /// list is sorted, so the last entry is the maximum.
    fn update_max_rate(&mut self, frame: &[u8], value_start: usize, length: u8) {
        if length == 0 {
            return;
        }

        if let Some(&rate) = frame.get(value_start + length as usize - 1) {
            if rate > self.max_rate {
                self.max_rate = rate;
            }
        }
    }

    /// Clear all extracted parameters.
    pub fn reset(&mut self) {
        self.ssid.clear();
        self.max_rate = 0;
        self.frequency = 0;
        self.is_adhoc = false;
    }

    /// Network name, empty when unavailable.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Highest advertised rate, zero when unavailable.
    pub fn max_rate(&self) -> u8 {
        self.max_rate
    }

    /// Channel frequency in MHz, zero when unavailable.
    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    /// Whether the beacon advertised an ad-hoc (IBSS) network.
    pub fn is_adhoc(&self) -> bool {
        self.is_adhoc
    }
}
