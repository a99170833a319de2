//! People, events and the presences linking them.
//!
//! [`Ancestry`] is a small in-memory store. Entities reference each other by
//! id: a [`Presence`] names a person, an event and the person's [`Role`] in
//! it, and a [`Person`] keeps the ids of its presences in the order they were
//! added. That order is the enumeration order derivation relies on for
//! tie-breaking.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::Datey;
use crate::error::{LineageError, Result};
use crate::event_type::EventType;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for people.
    PersonId
);
string_id!(
    /// Unique identifier for events.
    EventId
);
string_id!(
    /// Reference to a citation backing an event.
    CitationRef
);

/// Position of a presence within the ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PresenceId(pub usize);

/// The part a person played in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Subject,
    Witness,
    Beneficiary,
    Attendee,
    Speaker,
    Celebrant,
    Organizer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    #[serde(default)]
    pub date: Option<Datey>,
    #[serde(default)]
    pub citations: BTreeSet<CitationRef>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Event {
    pub fn new(id: impl Into<EventId>, event_type: EventType) -> Self {
        Self {
            id: id.into(),
            event_type,
            date: None,
            citations: BTreeSet::new(),
            description: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<Datey>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_citation(mut self, citation: impl Into<CitationRef>) -> Self {
        self.citations.insert(citation.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub id: PresenceId,
    pub person: PersonId,
    pub role: Role,
    pub event: EventId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    /// Presence ids in the order they were added.
    pub presences: Vec<PresenceId>,
}

// ── Ancestry ────────────────────────────────────────────────────────────────

/// In-memory store of people, events and presences.
///
/// # Examples
///
/// ```
/// use lineage_engine::{Ancestry, Date, Event, EventType, Role};
///
/// let mut ancestry = Ancestry::new();
/// let person = ancestry.add_person("P0");
/// let birth = Event::new("E0", EventType::Birth).with_date(Date::new(1970, 1, 1));
/// let birth = ancestry.add_event(birth);
/// ancestry.add_presence(&person, Role::Subject, &birth).unwrap();
///
/// let view = ancestry.person_ref(&person).unwrap();
/// assert_eq!(view.events().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ancestry {
    people: Vec<Person>,
    person_index: HashMap<PersonId, usize>,
    events: HashMap<EventId, Event>,
    presences: Vec<Presence>,
    generated_events: usize,
}

impl Ancestry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person, or return the id of the existing person with that id.
    pub fn add_person(&mut self, id: impl Into<PersonId>) -> PersonId {
        let id = id.into();
        if !self.person_index.contains_key(&id) {
            self.person_index.insert(id.clone(), self.people.len());
            self.people.push(Person {
                id: id.clone(),
                presences: Vec::new(),
            });
        }
        id
    }

    /// Add an event, replacing any event with the same id.
    pub fn add_event(&mut self, event: Event) -> EventId {
        let id = event.id.clone();
        self.events.insert(id.clone(), event);
        id
    }

    /// Link a person to an event.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::UnknownEntity`] if either the person or the
    /// event is not in the ancestry.
    pub fn add_presence(
        &mut self,
        person: &PersonId,
        role: Role,
        event: &EventId,
    ) -> Result<PresenceId> {
        let index = *self
            .person_index
            .get(person)
            .ok_or_else(|| LineageError::UnknownEntity(format!("person {person}")))?;
        if !self.events.contains_key(event) {
            return Err(LineageError::UnknownEntity(format!("event {event}")));
        }

        let id = PresenceId(self.presences.len());
        self.presences.push(Presence {
            id,
            person: person.clone(),
            role,
            event: event.clone(),
        });
        self.people[index].presences.push(id);
        Ok(id)
    }

    /// Add an event with `person` as its subject.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::UnknownEntity`] if the person is not in the
    /// ancestry. Nothing is added in that case.
    pub fn add_subject_event(&mut self, person: &PersonId, event: Event) -> Result<EventId> {
        if !self.person_index.contains_key(person) {
            return Err(LineageError::UnknownEntity(format!("person {person}")));
        }
        let id = self.add_event(event);
        self.add_presence(person, Role::Subject, &id)?;
        Ok(id)
    }

    /// A fresh id for an event synthesized by the engine.
    pub fn next_event_id(&mut self, event_type: EventType) -> EventId {
        loop {
            self.generated_events += 1;
            let id = EventId(format!("derived-{event_type}-{}", self.generated_events));
            if !self.events.contains_key(&id) {
                return id;
            }
        }
    }

    /// People in the order they were added.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn person_ids(&self) -> Vec<PersonId> {
        self.people.iter().map(|person| person.id.clone()).collect()
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.person_index.get(id).map(|&index| &self.people[index])
    }

    pub fn person_ref(&self, id: &PersonId) -> Option<PersonRef<'_>> {
        self.person(id).map(|person| PersonRef {
            ancestry: self,
            person,
        })
    }

    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn event_mut(&mut self, id: &EventId) -> Option<&mut Event> {
        self.events.get_mut(id)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn presence(&self, id: PresenceId) -> Option<&Presence> {
        self.presences.get(id.0)
    }

    /// A person's presences in enumeration order.
    pub fn presences_of<'a>(
        &'a self,
        person: &PersonId,
    ) -> impl Iterator<Item = &'a Presence> + 'a {
        self.person(person)
            .into_iter()
            .flat_map(|person| person.presences.iter())
            .filter_map(move |&id| self.presence(id))
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn presence_count(&self) -> usize {
        self.presences.len()
    }
}

// ── PersonRef ───────────────────────────────────────────────────────────────

/// Read-only view of a person together with the ancestry that holds their
/// events.
#[derive(Debug, Clone, Copy)]
pub struct PersonRef<'a> {
    ancestry: &'a Ancestry,
    person: &'a Person,
}

impl<'a> PersonRef<'a> {
    pub fn id(&self) -> &'a PersonId {
        &self.person.id
    }

    pub fn person(&self) -> &'a Person {
        self.person
    }

    /// Presences with their events, in enumeration order.
    pub fn presences(&self) -> impl Iterator<Item = (&'a Presence, &'a Event)> + 'a {
        let (ancestry, person) = (self.ancestry, self.person);
        ancestry.presences_of(&person.id).filter_map(move |presence| {
            ancestry
                .event(&presence.event)
                .map(|event| (presence, event))
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &'a Event> + 'a {
        self.presences().map(|(_, event)| event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Date;

    #[test]
    fn test_add_person_is_idempotent() {
        let mut ancestry = Ancestry::new();
        ancestry.add_person("P0");
        ancestry.add_person("P0");
        ancestry.add_person("P1");
        assert_eq!(ancestry.person_count(), 2);
        assert_eq!(ancestry.person_ids(), vec![PersonId::from("P0"), PersonId::from("P1")]);
    }

    #[test]
    fn test_presences_keep_enumeration_order() {
        let mut ancestry = Ancestry::new();
        let person = ancestry.add_person("P0");
        for (id, event_type) in [
            ("E0", EventType::Birth),
            ("E1", EventType::Residence),
            ("E2", EventType::Death),
        ] {
            let event = ancestry.add_event(Event::new(id, event_type));
            ancestry.add_presence(&person, Role::Subject, &event).unwrap();
        }

        let ids: Vec<&str> = ancestry
            .person_ref(&person)
            .unwrap()
            .events()
            .map(|event| event.id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["E0", "E1", "E2"]);
    }

    #[test]
    fn test_add_presence_requires_known_entities() {
        let mut ancestry = Ancestry::new();
        let person = ancestry.add_person("P0");
        let err = ancestry
            .add_presence(&person, Role::Subject, &EventId::from("missing"))
            .unwrap_err();
        assert!(err.to_string().contains("event missing"), "got: {err}");

        let event = ancestry.add_event(Event::new("E0", EventType::Birth));
        let err = ancestry
            .add_presence(&PersonId::from("nobody"), Role::Subject, &event)
            .unwrap_err();
        assert!(err.to_string().contains("person nobody"), "got: {err}");
    }

    #[test]
    fn test_add_subject_event() {
        let mut ancestry = Ancestry::new();
        let person = ancestry.add_person("P0");
        let id = ancestry
            .add_subject_event(&person, Event::new("E0", EventType::Death))
            .unwrap();
        let presence = ancestry.presences_of(&person).next().unwrap();
        assert_eq!(presence.event, id);
        assert_eq!(presence.role, Role::Subject);
    }

    #[test]
    fn test_add_subject_event_for_unknown_person_adds_nothing() {
        let mut ancestry = Ancestry::new();
        let err = ancestry
            .add_subject_event(&PersonId::from("nobody"), Event::new("E0", EventType::Death))
            .unwrap_err();
        assert!(err.to_string().contains("person nobody"), "got: {err}");
        assert_eq!(ancestry.event_count(), 0);
        assert_eq!(ancestry.presence_count(), 0);
    }

    #[test]
    fn test_next_event_id_skips_taken_ids() {
        let mut ancestry = Ancestry::new();
        ancestry.add_event(Event::new("derived-death-1", EventType::Death));
        let id = ancestry.next_event_id(EventType::Death);
        assert_eq!(id, EventId::from("derived-death-2"));
    }

    #[test]
    fn test_event_builder() {
        let event = Event::new("E0", EventType::Marriage)
            .with_date(Date::year(1990))
            .with_citation("C0")
            .with_description("Wedding in Leiden");
        assert_eq!(event.date, Some(Datey::Date(Date::year(1990))));
        assert!(event.citations.contains(&CitationRef::from("C0")));
        assert_eq!(event.description.as_deref(), Some("Wedding in Leiden"));
    }
}
