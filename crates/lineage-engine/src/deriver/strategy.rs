//! Directional derivation strategies.
//!
//! [`BeforeStrategy`] fills a candidate's end from the earliest related event
//! that must come after it. [`AfterStrategy`] fills its start from the latest
//! related event that must come before it. The engine picks one explicitly per
//! direction.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::ancestry::EventId;
use crate::date::{Date, DateRange, Datey};
use crate::event_type::{EffectiveConstraints, EventType};

/// One usable date taken from a reference event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDate {
    pub event: EventId,
    pub date: Date,
}

pub trait DerivationStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether `range` still lacks the bound this strategy fills.
    fn lacks_bound(&self, range: &DateRange) -> bool;

    /// Types whose events bound a candidate of `event_type` in this direction.
    fn reference_types<'c>(
        &self,
        constraints: &'c EffectiveConstraints,
        event_type: EventType,
    ) -> &'c BTreeSet<EventType>;

    /// Dates of a reference event that may bound a candidate.
    fn extract_usable_dates(&self, date: &Datey) -> Vec<Date>;

    /// Whether `reference` lies strictly on this strategy's side of the
    /// candidate's current date.
    fn compare(&self, candidate: Option<&Datey>, reference: &Date) -> bool;

    /// Order references so the best one comes first. Must be stable.
    fn sort(&self, references: &mut [ReferenceDate]);

    /// Install `date` as the bound this strategy fills.
    fn apply(&self, range: &mut DateRange, date: Date);
}

/// Whether a date can take part in ordering: it has a year and expands to a
/// valid calendar range.
fn usable(date: &Date) -> bool {
    date.comparable() && date.to_range().is_ok()
}

fn ascending(a: &Date, b: &Date) -> Ordering {
    if a.lt(b) == Some(true) {
        Ordering::Less
    } else if b.lt(a) == Some(true) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// A candidate date that cannot be ordered does not constrain anything.
fn comparable_candidate(candidate: Option<&Datey>) -> Option<&Datey> {
    candidate.filter(|date| date.comparable())
}

// ── Before ──────────────────────────────────────────────────────────────────

/// Fills the end bound: the candidate comes before its references.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeforeStrategy;

impl DerivationStrategy for BeforeStrategy {
    fn name(&self) -> &'static str {
        "before"
    }

    fn lacks_bound(&self, range: &DateRange) -> bool {
        range.end.is_none()
    }

    fn reference_types<'c>(
        &self,
        constraints: &'c EffectiveConstraints,
        event_type: EventType,
    ) -> &'c BTreeSet<EventType> {
        constraints.before(event_type)
    }

    fn extract_usable_dates(&self, date: &Datey) -> Vec<Date> {
        let dates = match date {
            Datey::Date(date) => vec![*date],
            Datey::Range(range) => {
                let start = range.start.filter(|_| !range.start_is_boundary);
                start.into_iter().chain(range.end).collect()
            }
        };
        dates.into_iter().filter(usable).collect()
    }

    fn compare(&self, candidate: Option<&Datey>, reference: &Date) -> bool {
        match comparable_candidate(candidate) {
            None => true,
            Some(candidate) => candidate.lt(&Datey::Date(*reference)) == Some(true),
        }
    }

    fn sort(&self, references: &mut [ReferenceDate]) {
        references.sort_by(|a, b| ascending(&a.date, &b.date));
    }

    fn apply(&self, range: &mut DateRange, date: Date) {
        range.end = Some(date);
        range.end_is_boundary = true;
    }
}

// ── After ───────────────────────────────────────────────────────────────────

/// Fills the start bound: the candidate comes after its references.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfterStrategy;

impl DerivationStrategy for AfterStrategy {
    fn name(&self) -> &'static str {
        "after"
    }

    fn lacks_bound(&self, range: &DateRange) -> bool {
        range.start.is_none()
    }

    fn reference_types<'c>(
        &self,
        constraints: &'c EffectiveConstraints,
        event_type: EventType,
    ) -> &'c BTreeSet<EventType> {
        constraints.after(event_type)
    }

    fn extract_usable_dates(&self, date: &Datey) -> Vec<Date> {
        let dates = match date {
            Datey::Date(date) => vec![*date],
            Datey::Range(range) => {
                let end = range.end.filter(|_| !range.end_is_boundary);
                range.start.into_iter().chain(end).collect()
            }
        };
        dates.into_iter().filter(usable).collect()
    }

    fn compare(&self, candidate: Option<&Datey>, reference: &Date) -> bool {
        match comparable_candidate(candidate) {
            None => true,
            Some(candidate) => Datey::Date(*reference).lt(candidate) == Some(true),
        }
    }

    fn sort(&self, references: &mut [ReferenceDate]) {
        references.sort_by(|a, b| ascending(&b.date, &a.date));
    }

    fn apply(&self, range: &mut DateRange, date: Date) {
        range.start = Some(date);
        range.start_is_boundary = true;
    }
}
