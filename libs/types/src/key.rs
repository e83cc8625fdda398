//! Composite resource key for provider time slots
//!
//! A slot is identified by `"<provider_id>|<slot_timestamp>"`. The key is the
//! unit of advisory locking and of booking conflict checks, so it must be
//! derived identically on every path — always through [`SlotKey::from_parts`],
//! never by ad-hoc string formatting.

use crate::ids::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a bookable time slot: provider id plus slot timestamp, joined with
/// a literal pipe separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    /// Build the key from its components, normalizing both to string form.
    pub fn from_parts(provider: ProviderId, slot: &str) -> Self {
        Self(format!("{}|{}", provider, slot))
    }

    /// Get the serialized key string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key belongs to the given provider.
    ///
    /// Used for administrative bulk release when a provider is removed.
    pub fn belongs_to(&self, provider: ProviderId) -> bool {
        self.0.starts_with(&format!("{}|", provider))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
