//! Allow/deny-list policy over hardware addresses
//!
//! Gates which frames participate in bridging. When the allow-list is
//! non-empty only listed addresses pass; otherwise any address not on the
//! deny-list passes. Lists preserve insertion order and never expire.

use crate::mac::HardwareAddress;

/// Address filter carrying a deny-list and an allow-list.
#[derive(Debug, Default, Clone)]
pub struct AddressFilter {
    denied: Vec<HardwareAddress>,
    allowed: Vec<HardwareAddress>,
}

impl AddressFilter {
    /// Create an empty filter (everything permitted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address to the deny-list. Idempotent.
    pub fn deny(&mut self, address: HardwareAddress) {
        if !self.is_denied(address) {
            log::trace!("Added: {} to deny-list", address);
            self.denied.push(address);
        }
    }

    /// Add an address to the allow-list. The allow-list takes prevalence
    /// over the deny-list. Duplicates are permitted.
    pub fn allow(&mut self, address: HardwareAddress) {
        log::trace!("Added: {} to allow-list", address);
        self.allowed.push(address);
    }

    /// Check whether an address is on the deny-list.
    pub fn is_denied(&self, address: HardwareAddress) -> bool {
        self.denied.contains(&address)
    }

    /// Check whether an address passes the filter.
    pub fn is_permitted(&self, address: HardwareAddress) -> bool {
        if self.allowed.is_empty() {
            !self.is_denied(address)
        } else {
            self.allowed.contains(&address)
        }
    }

    /// Clear the deny-list.
    pub fn clear_denied(&mut self) {
        self.denied.clear();
    }

    /// Clear the allow-list.
    pub fn clear_allowed(&mut self) {
        self.allowed.clear();
    }

    /// Replace the deny-list.
    pub fn set_denied(&mut self, denied: Vec<HardwareAddress>) {
        self.denied = denied;
    }

    /// Replace the allow-list.
    pub fn set_allowed(&mut self, allowed: Vec<HardwareAddress>) {
        self.allowed = allowed;
    }
}
