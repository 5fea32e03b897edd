//! Registrants and registration snapshots.

use serde::{Deserialize, Serialize};
use shared_types::MessageTypeId;
use std::fmt;

use super::Priority;

/// External owner of one or more registrations (typically a plugin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Registrant(String);

impl Registrant {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Registrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of a router's registration table, as handed to a transfer target.
///
/// `requested_ids` is the caller's original request, not the filtered
/// whitelist, so a target backend recomputes against its own capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInfo {
    pub registrant: Registrant,
    pub priority: Priority,
    pub requested_ids: Vec<MessageTypeId>,
}
