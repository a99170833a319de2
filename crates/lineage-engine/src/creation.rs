//! Deciding whether a missing event may be synthesized.

use std::convert::Infallible;

use crate::ancestry::PersonRef;
use crate::date::{Date, Datey};
use crate::event_type::EventType;

/// Predicate consulted before the deriver creates an event of a creatable
/// type for a person who has none.
///
/// Errors are handed back to the caller of the deriver unchanged.
pub trait CreationPolicy {
    type Error;

    fn may_create(
        &self,
        event_type: EventType,
        person: PersonRef<'_>,
        lifetime_threshold: u32,
    ) -> Result<bool, Self::Error>;
}

/// Presumes a person has died once any of their events lies more than
/// `lifetime_threshold` years in the past.
///
/// # Examples
///
/// ```
/// use lineage_engine::{Ancestry, Date, Event, EventType, LifetimeExpiry, Role};
///
/// let mut ancestry = Ancestry::new();
/// let person = ancestry.add_person("P0");
/// let birth = Event::new("E0", EventType::Birth).with_date(Date::new(1850, 3, 1));
/// let birth = ancestry.add_event(birth);
/// ancestry.add_presence(&person, Role::Subject, &birth).unwrap();
///
/// let policy = LifetimeExpiry::as_of(Date::new(2026, 1, 1));
/// assert!(policy.has_expired(ancestry.person_ref(&person).unwrap(), 125));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LifetimeExpiry {
    today: Date,
}

impl LifetimeExpiry {
    /// Measure against today's date.
    pub fn new() -> Self {
        Self::as_of(Date::today())
    }

    /// Measure against a fixed date.
    pub fn as_of(today: Date) -> Self {
        Self { today }
    }

    pub fn has_expired(&self, person: PersonRef<'_>, lifetime_threshold: u32) -> bool {
        let cutoff = self.today.years_before(lifetime_threshold);
        person
            .events()
            .filter_map(|event| event.date.as_ref().and_then(reference_date))
            .any(|date| date.lt(&cutoff).unwrap_or(false))
    }
}

impl Default for LifetimeExpiry {
    fn default() -> Self {
        Self::new()
    }
}

/// The date an event is measured by: the date itself, or a range's end,
/// falling back to its start.
fn reference_date(datey: &Datey) -> Option<Date> {
    let date = match datey {
        Datey::Date(date) => Some(*date),
        Datey::Range(range) => range
            .end
            .filter(Date::comparable)
            .or(range.start),
    };
    date.filter(Date::comparable)
}

impl CreationPolicy for LifetimeExpiry {
    type Error = Infallible;

    fn may_create(
        &self,
        _event_type: EventType,
        person: PersonRef<'_>,
        lifetime_threshold: u32,
    ) -> Result<bool, Self::Error> {
        Ok(self.has_expired(person, lifetime_threshold))
    }
}

/// A policy backed by a closure. See [`policy_fn`].
#[derive(Debug, Clone, Copy)]
pub struct PolicyFn<F>(F);

/// Wrap a closure as a [`CreationPolicy`].
///
/// ```
/// use lineage_engine::policy_fn;
///
/// let never = policy_fn(|_, _, _| Ok::<bool, String>(false));
/// # let _ = never;
/// ```
pub fn policy_fn<F, E>(f: F) -> PolicyFn<F>
where
    F: Fn(EventType, PersonRef<'_>, u32) -> Result<bool, E>,
{
    PolicyFn(f)
}

impl<F, E> CreationPolicy for PolicyFn<F>
where
    F: Fn(EventType, PersonRef<'_>, u32) -> Result<bool, E>,
{
    type Error = E;

    fn may_create(
        &self,
        event_type: EventType,
        person: PersonRef<'_>,
        lifetime_threshold: u32,
    ) -> Result<bool, Self::Error> {
        (self.0)(event_type, person, lifetime_threshold)
    }
}
