//! Tallies of what a derivation run changed.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::event_type::EventType;

/// Events created and updated for one event type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivationTally {
    pub created: usize,
    pub updated: usize,
}

/// Per-type tallies for a derivation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivationReport {
    pub tallies: BTreeMap<EventType, DerivationTally>,
}

impl DerivationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self, event_type: EventType) {
        self.tallies.entry(event_type).or_default().created += 1;
    }

    pub fn record_updated(&mut self, event_type: EventType) {
        self.tallies.entry(event_type).or_default().updated += 1;
    }

    /// The tally for `event_type`; zero if nothing happened to it.
    pub fn tally(&self, event_type: EventType) -> DerivationTally {
        self.tallies.get(&event_type).copied().unwrap_or_default()
    }

    pub fn total_created(&self) -> usize {
        self.tallies.values().map(|tally| tally.created).sum()
    }

    pub fn total_updated(&self) -> usize {
        self.tallies.values().map(|tally| tally.updated).sum()
    }

    /// Whether the run changed nothing.
    pub fn is_empty(&self) -> bool {
        self.total_created() == 0 && self.total_updated() == 0
    }

    /// Fold another report (e.g. from a different shard of people) into this one.
    pub fn merge(&mut self, other: &DerivationReport) {
        for (event_type, tally) in &other.tallies {
            let entry = self.tallies.entry(*event_type).or_default();
            entry.created += tally.created;
            entry.updated += tally.updated;
        }
    }

    /// Multi-line, human-readable summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Derived event dates: {} created, {} updated",
            self.total_created(),
            self.total_updated()
        )];
        for (event_type, tally) in &self.tallies {
            lines.push(format!(
                "  {event_type}: {} created, {} updated",
                tally.created, tally.updated
            ));
        }
        lines.join("\n")
    }
}

impl fmt::Display for DerivationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
