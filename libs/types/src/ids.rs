//! Unique identifier types for scheduler entities
//!
//! Both identifiers are small monotonic integers: provider ids come from the
//! durable provider collection, client ids are minted by the connection
//! registry at connect time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a provider (the owner of bookable time slots).
///
/// Matches the record id assigned by the provider collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(u64);

impl ProviderId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProviderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identity token of a live client connection.
///
/// Minted by the connection registry from a process-wide monotonic counter.
/// Lock ownership is decided by comparing these tokens by value, never by
/// comparing connection handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
