//! Whitelist computation.
//!
//! A whitelist is the requested id set intersected with what the transport
//! supports in one direction, minus [`MessageTypeId::UNKNOWN`]. Unsupported
//! ids are dropped without error.

use serde::{Deserialize, Serialize};
use shared_types::{Direction, MessageTypeId};
use std::collections::BTreeSet;

/// Dispatch tier. Listeners run at `Normal`; monitors run last at `Monitor`
/// and can never cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Normal,
    Monitor,
}

impl Priority {
    /// Whether observers at this tier may mutate or cancel.
    pub fn can_mutate(self) -> bool {
        matches!(self, Priority::Normal)
    }
}

/// Effective, capability-filtered set of ids for one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    priority: Priority,
    ids: BTreeSet<MessageTypeId>,
}

impl Whitelist {
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn contains(&self, id: MessageTypeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<MessageTypeId> {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Compute the whitelist of `requested` ids for one direction.
///
/// `supports` answers whether the transport currently handles an id in a
/// direction. The result is recomputed only on re-registration.
pub fn compute_whitelist<F>(
    priority: Priority,
    requested: &[MessageTypeId],
    direction: Direction,
    supports: F,
) -> Whitelist
where
    F: Fn(Direction, MessageTypeId) -> bool,
{
    let ids = requested
        .iter()
        .copied()
        .filter(|id| !id.is_unknown())
        .filter(|id| supports(direction, *id))
        .collect();
    Whitelist { priority, ids }
}

/// Inbound and outbound whitelists of one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistPair {
    inbound: Whitelist,
    outbound: Whitelist,
}

impl WhitelistPair {
    pub fn compute<F>(priority: Priority, requested: &[MessageTypeId], supports: F) -> Self
    where
        F: Fn(Direction, MessageTypeId) -> bool,
    {
        Self {
            inbound: compute_whitelist(priority, requested, Direction::Inbound, &supports),
            outbound: compute_whitelist(priority, requested, Direction::Outbound, &supports),
        }
    }

    pub fn for_direction(&self, direction: Direction) -> &Whitelist {
        match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        }
    }

    pub fn priority(&self) -> Priority {
        self.inbound.priority
    }
}
