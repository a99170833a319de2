//! Event date derivation.
//!
//! The [`Deriver`] walks every person and every derivable event type in a run.
//! For each type it picks the person's events whose date is missing, or is a
//! range missing a bound the type's constraints could fill, and bounds them by
//! the dates of related events:
//!
//! - an event that must come *before* others gets their earliest date as its
//!   end ([`BeforeStrategy`]);
//! - an event that must come *after* others gets their latest date as its
//!   start ([`AfterStrategy`]).
//!
//! Derived bounds are flagged as boundaries and the reference event's
//! citations are copied onto the derived event. When a person has no event of
//! a creatable type at all, the [`CreationPolicy`] decides whether to create
//! one.
//!
//! Running the deriver twice changes nothing the second time: an event whose
//! bound was filled is no longer a candidate for that direction.

mod report;
mod strategy;

pub use report::{DerivationReport, DerivationTally};
pub use strategy::{AfterStrategy, BeforeStrategy, DerivationStrategy, ReferenceDate};

use std::collections::BTreeSet;
use std::convert::Infallible;

use crate::ancestry::{Ancestry, Event, EventId, PersonId, Role};
use crate::config::DeriverConfig;
use crate::creation::{CreationPolicy, LifetimeExpiry};
use crate::date::{DateRange, Datey};
use crate::error::Result;
use crate::event_type::{EffectiveConstraints, EventType, EventTypeRegistry};

/// Whether a candidate existed before the run or was created by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handling {
    Create,
    Update,
}

/// Derives event dates for a fixed run set of event types.
///
/// # Examples
///
/// ```
/// use lineage_engine::{
///     Ancestry, Date, DateRange, Deriver, Event, EventType, EventTypeMeta,
///     EventTypeRegistry, Role,
/// };
///
/// let registry = EventTypeRegistry::new().with_meta(
///     EventType::Marriage,
///     EventTypeMeta::new().before([EventType::Divorce]).derivable(),
/// );
///
/// let mut ancestry = Ancestry::new();
/// let person = ancestry.add_person("P0");
/// let marriage = ancestry.add_event(
///     Event::new("E0", EventType::Marriage).with_date(DateRange::since(Date::new(1990, 6, 1))),
/// );
/// let divorce = ancestry.add_event(
///     Event::new("E1", EventType::Divorce).with_date(Date::new(1995, 1, 1)),
/// );
/// ancestry.add_presence(&person, Role::Subject, &marriage).unwrap();
/// ancestry.add_presence(&person, Role::Subject, &divorce).unwrap();
///
/// let deriver = Deriver::new(&registry, [EventType::Marriage], 125);
/// let report = deriver.derive_with_lifetime(&mut ancestry);
///
/// assert_eq!(report.tally(EventType::Marriage).updated, 1);
/// let range = ancestry.event(&marriage).unwrap().date.unwrap();
/// assert_eq!(range.as_range().unwrap().end, Some(Date::new(1995, 1, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct Deriver<'r> {
    registry: &'r EventTypeRegistry,
    derivable_types: BTreeSet<EventType>,
    constraints: EffectiveConstraints,
    lifetime_threshold: u32,
}

impl<'r> Deriver<'r> {
    /// A deriver for `derivable_types`, with constraints closed over exactly
    /// that set.
    ///
    /// Types `registry` does not mark derivable are left out of the run.
    pub fn new(
        registry: &'r EventTypeRegistry,
        derivable_types: impl IntoIterator<Item = EventType>,
        lifetime_threshold: u32,
    ) -> Self {
        let (derivable_types, rejected): (BTreeSet<EventType>, BTreeSet<EventType>) =
            derivable_types
                .into_iter()
                .partition(|&event_type| registry.is_derivable(event_type));
        for event_type in rejected {
            tracing::warn!("Event type {} is not derivable, skipping it", event_type);
        }
        let constraints = EffectiveConstraints::compute(registry, &derivable_types);
        Self {
            registry,
            derivable_types,
            constraints,
            lifetime_threshold,
        }
    }

    /// A deriver for every type `registry` marks derivable.
    pub fn for_registry(registry: &'r EventTypeRegistry, lifetime_threshold: u32) -> Self {
        Self::new(registry, registry.derivable_types(), lifetime_threshold)
    }

    /// A deriver configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::InvalidConfig`](crate::LineageError::InvalidConfig)
    /// if the config names a type `registry` does not mark derivable.
    pub fn from_config(registry: &'r EventTypeRegistry, config: &DeriverConfig) -> Result<Self> {
        let types = config.resolve_types(registry)?;
        Ok(Self::new(registry, types, config.lifetime_threshold))
    }

    pub fn derivable_types(&self) -> &BTreeSet<EventType> {
        &self.derivable_types
    }

    pub fn constraints(&self) -> &EffectiveConstraints {
        &self.constraints
    }

    pub fn lifetime_threshold(&self) -> u32 {
        self.lifetime_threshold
    }

    /// Derive dates for everyone in `ancestry`.
    ///
    /// # Errors
    ///
    /// Only errors raised by `policy` are returned, unchanged. Missing or
    /// ambiguous dates are never an error.
    pub fn derive<P: CreationPolicy>(
        &self,
        ancestry: &mut Ancestry,
        policy: &P,
    ) -> std::result::Result<DerivationReport, P::Error> {
        let mut report = DerivationReport::new();
        let people = ancestry.person_ids();
        for person in &people {
            report.merge(&self.derive_person(ancestry, person, policy)?);
        }
        tracing::info!(
            "Derived event dates for {} people: {} created, {} updated",
            people.len(),
            report.total_created(),
            report.total_updated()
        );
        Ok(report)
    }

    /// [`derive`](Self::derive) with a [`LifetimeExpiry`] measured from today.
    pub fn derive_with_lifetime(&self, ancestry: &mut Ancestry) -> DerivationReport {
        let result: std::result::Result<_, Infallible> =
            self.derive(ancestry, &LifetimeExpiry::new());
        match result {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Derive dates for a single person.
    pub fn derive_person<P: CreationPolicy>(
        &self,
        ancestry: &mut Ancestry,
        person: &PersonId,
        policy: &P,
    ) -> std::result::Result<DerivationReport, P::Error> {
        let mut report = DerivationReport::new();
        for &event_type in &self.derivable_types {
            self.derive_type(ancestry, person, event_type, policy, &mut report)?;
        }
        Ok(report)
    }

    fn strategies(&self, event_type: EventType) -> Vec<&'static dyn DerivationStrategy> {
        let mut strategies: Vec<&'static dyn DerivationStrategy> = Vec::new();
        if !self.constraints.before(event_type).is_empty() {
            strategies.push(&BeforeStrategy);
        }
        if !self.constraints.after(event_type).is_empty() {
            strategies.push(&AfterStrategy);
        }
        strategies
    }

    fn derive_type<P: CreationPolicy>(
        &self,
        ancestry: &mut Ancestry,
        person: &PersonId,
        event_type: EventType,
        policy: &P,
        report: &mut DerivationReport,
    ) -> std::result::Result<(), P::Error> {
        let strategies = self.strategies(event_type);
        if strategies.is_empty() {
            tracing::trace!("No ordering constraints for {}, skipping", event_type);
            return Ok(());
        }

        let mut candidates: Vec<(EventId, Handling)> =
            self.candidates(ancestry, person, event_type, &strategies)
                .into_iter()
                .map(|id| (id, Handling::Update))
                .collect();

        if candidates.is_empty() {
            match self.create(ancestry, person, event_type, policy)? {
                Some(id) => {
                    report.record_created(event_type);
                    candidates.push((id, Handling::Create));
                }
                None => return Ok(()),
            }
        }

        for (candidate, handling) in candidates {
            let mut touched = false;
            for strategy in &strategies {
                touched |= self.derive_event(ancestry, person, event_type, &candidate, *strategy);
            }
            if touched && handling == Handling::Update {
                report.record_updated(event_type);
            }
        }
        Ok(())
    }

    /// The person's events of `event_type` that still lack a bound one of
    /// `strategies` fills.
    fn candidates(
        &self,
        ancestry: &Ancestry,
        person: &PersonId,
        event_type: EventType,
        strategies: &[&'static dyn DerivationStrategy],
    ) -> Vec<EventId> {
        let Some(person) = ancestry.person_ref(person) else {
            return Vec::new();
        };
        person
            .presences()
            .filter(|(presence, event)| {
                presence.role == Role::Subject && event.event_type == event_type
            })
            .filter(|(_, event)| match &event.date {
                None => true,
                Some(Datey::Range(range)) => {
                    strategies.iter().any(|strategy| strategy.lacks_bound(range))
                }
                Some(Datey::Date(_)) => false,
            })
            .map(|(_, event)| event.id.clone())
            .collect()
    }

    /// Create an event of `event_type` for a person who has none, if the
    /// type is creatable and the policy agrees.
    fn create<P: CreationPolicy>(
        &self,
        ancestry: &mut Ancestry,
        person: &PersonId,
        event_type: EventType,
        policy: &P,
    ) -> std::result::Result<Option<EventId>, P::Error> {
        let Some(person_ref) = ancestry.person_ref(person) else {
            return Ok(None);
        };
        if person_ref
            .events()
            .any(|event| event.event_type == event_type)
        {
            return Ok(None);
        }
        if !self.registry.is_creatable(event_type)
            || !policy.may_create(event_type, person_ref, self.lifetime_threshold)?
        {
            return Ok(None);
        }

        let id = ancestry.next_event_id(event_type);
        match ancestry.add_subject_event(person, Event::new(id, event_type)) {
            Ok(id) => {
                tracing::debug!("Created {} event {} for {}", event_type, id, person);
                Ok(Some(id))
            }
            Err(err) => {
                tracing::warn!("Could not create {} event for {}: {}", event_type, person, err);
                Ok(None)
            }
        }
    }

    /// Fill one bound of `candidate` in the direction of `strategy`.
    /// Returns whether the event changed.
    fn derive_event(
        &self,
        ancestry: &mut Ancestry,
        person: &PersonId,
        event_type: EventType,
        candidate: &EventId,
        strategy: &dyn DerivationStrategy,
    ) -> bool {
        let Some(current) = ancestry.event(candidate).map(|event| event.date) else {
            return false;
        };
        match &current {
            None => {}
            Some(Datey::Range(range)) if strategy.lacks_bound(range) => {}
            Some(_) => return false,
        }

        let reference_types = strategy.reference_types(&self.constraints, event_type);
        let Some(person_ref) = ancestry.person_ref(person) else {
            return false;
        };
        let mut references: Vec<ReferenceDate> = person_ref
            .presences()
            .filter(|(presence, event)| {
                presence.role == Role::Subject
                    && event.id != *candidate
                    && reference_types.contains(&event.event_type)
            })
            .filter_map(|(_, event)| event.date.as_ref().map(|date| (event, date)))
            .flat_map(|(event, date)| {
                strategy
                    .extract_usable_dates(date)
                    .into_iter()
                    .map(move |date| ReferenceDate {
                        event: event.id.clone(),
                        date,
                    })
            })
            .filter(|reference| strategy.compare(current.as_ref(), &reference.date))
            .collect();
        strategy.sort(&mut references);

        let Some(chosen) = references.into_iter().next() else {
            return false;
        };
        let citations = ancestry
            .event(&chosen.event)
            .map(|event| event.citations.clone())
            .unwrap_or_default();

        let Some(event) = ancestry.event_mut(candidate) else {
            return false;
        };
        if !matches!(event.date, Some(Datey::Range(_))) {
            event.date = Some(Datey::Range(DateRange::default()));
        }
        let Some(Datey::Range(range)) = &mut event.date else {
            return false;
        };
        strategy.apply(range, chosen.date);
        event.citations.extend(citations);

        tracing::debug!(
            "Derived {} {} date {} for {} from {}",
            strategy.name(),
            event_type,
            event.date.map_or_else(String::new, |date| date.to_string()),
            candidate,
            chosen.event
        );
        true
    }
}
