//! Event types and their temporal ordering metadata.
//!
//! Every [`EventType`] carries static metadata: which types it comes before,
//! which it comes after, whether its date may be derived from related events,
//! and whether it may be created outright when evidence warrants. The metadata
//! lives in an [`EventTypeRegistry`]; [`EventTypeRegistry::builtin`] is the
//! process-wide default, and callers may build their own for a run.
//!
//! Declarations are one-sided: Divorce says it comes after Marriage, Marriage
//! says nothing about Divorce. [`EffectiveConstraints`] folds the declarations
//! of every type in a run into both directions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::LineageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Birth,
    Baptism,
    Adoption,
    Confirmation,
    Engagement,
    MarriageAnnouncement,
    Marriage,
    DivorceAnnouncement,
    Divorce,
    Residence,
    Immigration,
    Emigration,
    Occupation,
    Retirement,
    Correspondence,
    Conference,
    Missing,
    Death,
    Funeral,
    Cremation,
    Burial,
    Will,
    Unknown,
}

/// Types that happen between birth and death.
const DURING_LIFE: [EventType; 16] = [
    EventType::Baptism,
    EventType::Adoption,
    EventType::Confirmation,
    EventType::Engagement,
    EventType::MarriageAnnouncement,
    EventType::Marriage,
    EventType::DivorceAnnouncement,
    EventType::Divorce,
    EventType::Residence,
    EventType::Immigration,
    EventType::Emigration,
    EventType::Occupation,
    EventType::Retirement,
    EventType::Correspondence,
    EventType::Conference,
    EventType::Missing,
];

/// Types that happen after death.
const POST_DEATH: [EventType; 4] = [
    EventType::Funeral,
    EventType::Cremation,
    EventType::Burial,
    EventType::Will,
];

impl EventType {
    pub const ALL: [EventType; 23] = [
        EventType::Birth,
        EventType::Baptism,
        EventType::Adoption,
        EventType::Confirmation,
        EventType::Engagement,
        EventType::MarriageAnnouncement,
        EventType::Marriage,
        EventType::DivorceAnnouncement,
        EventType::Divorce,
        EventType::Residence,
        EventType::Immigration,
        EventType::Emigration,
        EventType::Occupation,
        EventType::Retirement,
        EventType::Correspondence,
        EventType::Conference,
        EventType::Missing,
        EventType::Death,
        EventType::Funeral,
        EventType::Cremation,
        EventType::Burial,
        EventType::Will,
        EventType::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventType::Birth => "birth",
            EventType::Baptism => "baptism",
            EventType::Adoption => "adoption",
            EventType::Confirmation => "confirmation",
            EventType::Engagement => "engagement",
            EventType::MarriageAnnouncement => "marriage-announcement",
            EventType::Marriage => "marriage",
            EventType::DivorceAnnouncement => "divorce-announcement",
            EventType::Divorce => "divorce",
            EventType::Residence => "residence",
            EventType::Immigration => "immigration",
            EventType::Emigration => "emigration",
            EventType::Occupation => "occupation",
            EventType::Retirement => "retirement",
            EventType::Correspondence => "correspondence",
            EventType::Conference => "conference",
            EventType::Missing => "missing",
            EventType::Death => "death",
            EventType::Funeral => "funeral",
            EventType::Cremation => "cremation",
            EventType::Burial => "burial",
            EventType::Will => "will",
            EventType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventType {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace(['_', ' '], "-");
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.name() == needle)
            .ok_or_else(|| LineageError::UnknownEventType(s.to_string()))
    }
}

// ── Metadata ────────────────────────────────────────────────────────────────

/// Static ordering metadata for one event type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeMeta {
    /// Types this type is known to precede.
    #[serde(default)]
    pub comes_before: BTreeSet<EventType>,
    /// Types this type is known to follow.
    #[serde(default)]
    pub comes_after: BTreeSet<EventType>,
    /// Whether dates of this type may be inferred from related events.
    #[serde(default)]
    pub derivable: bool,
    /// Whether events of this type may be synthesized when missing.
    /// Only meaningful together with `derivable`.
    #[serde(default)]
    pub creatable: bool,
}

impl EventTypeMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.comes_before.extend(types);
        self
    }

    pub fn after(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.comes_after.extend(types);
        self
    }

    pub fn derivable(mut self) -> Self {
        self.derivable = true;
        self
    }

    pub fn creatable(mut self) -> Self {
        self.derivable = true;
        self.creatable = true;
        self
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Event type → metadata lookup.
///
/// Types without an entry have no ordering constraints and are neither
/// derivable nor creatable.
#[derive(Debug, Clone, Default)]
pub struct EventTypeRegistry {
    entries: BTreeMap<EventType, EventTypeMeta>,
}

impl EventTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in metadata, initialized once per process.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_engine::{EventType, EventTypeRegistry};
    ///
    /// let registry = EventTypeRegistry::builtin();
    /// assert!(registry.is_creatable(EventType::Death));
    /// assert!(!registry.is_derivable(EventType::Marriage));
    /// ```
    pub fn builtin() -> &'static EventTypeRegistry {
        static BUILTIN: OnceLock<EventTypeRegistry> = OnceLock::new();
        BUILTIN.get_or_init(builtin_registry)
    }

    /// Replace (or add) the metadata for `event_type`.
    pub fn with_meta(mut self, event_type: EventType, meta: EventTypeMeta) -> Self {
        self.insert(event_type, meta);
        self
    }

    pub fn insert(&mut self, event_type: EventType, meta: EventTypeMeta) {
        self.entries.insert(event_type, meta);
    }

    pub fn meta(&self, event_type: EventType) -> Option<&EventTypeMeta> {
        self.entries.get(&event_type)
    }

    pub fn is_derivable(&self, event_type: EventType) -> bool {
        self.meta(event_type).is_some_and(|meta| meta.derivable)
    }

    pub fn is_creatable(&self, event_type: EventType) -> bool {
        self.meta(event_type)
            .is_some_and(|meta| meta.derivable && meta.creatable)
    }

    /// All types marked derivable, in tag order.
    pub fn derivable_types(&self) -> BTreeSet<EventType> {
        self.entries
            .iter()
            .filter(|(_, meta)| meta.derivable)
            .map(|(event_type, _)| *event_type)
            .collect()
    }

    fn comes_before(&self, event_type: EventType) -> &BTreeSet<EventType> {
        self.meta(event_type).map_or(&EMPTY, |meta| &meta.comes_before)
    }

    fn comes_after(&self, event_type: EventType) -> &BTreeSet<EventType> {
        self.meta(event_type).map_or(&EMPTY, |meta| &meta.comes_after)
    }
}

static EMPTY: BTreeSet<EventType> = BTreeSet::new();

fn builtin_registry() -> EventTypeRegistry {
    let mut registry = EventTypeRegistry::new()
        .with_meta(EventType::Birth, EventTypeMeta::new().before(DURING_LIFE).derivable())
        .with_meta(
            EventType::Death,
            EventTypeMeta::new()
                .after(DURING_LIFE)
                .before(POST_DEATH)
                .creatable(),
        );

    for event_type in DURING_LIFE {
        let meta = EventTypeMeta::new()
            .after([EventType::Birth])
            .before([EventType::Death]);
        let meta = match event_type {
            EventType::Engagement | EventType::MarriageAnnouncement => {
                meta.before([EventType::Marriage])
            }
            EventType::DivorceAnnouncement => meta
                .after([EventType::Marriage])
                .before([EventType::Divorce]),
            EventType::Divorce => meta.after([EventType::Marriage]),
            _ => meta,
        };
        registry.insert(event_type, meta);
    }

    for event_type in POST_DEATH {
        let meta = EventTypeMeta::new().after([EventType::Death]);
        let meta = match event_type {
            EventType::Will => meta,
            _ => meta.derivable(),
        };
        registry.insert(event_type, meta);
    }

    registry
}

// ── Effective constraints ───────────────────────────────────────────────────

/// Per-run union closure of the ordering declarations.
///
/// For each type `T` in the run set:
///
/// - `before(T) = T.comes_before ∪ { U in run : T ∈ U.comes_after }`
/// - `after(T)  = T.comes_after  ∪ { U in run : T ∈ U.comes_before }`
///
/// The result depends on the whole run set: adding or removing a type can
/// change the constraints of every other type in it.
#[derive(Debug, Clone, Default)]
pub struct EffectiveConstraints {
    before: BTreeMap<EventType, BTreeSet<EventType>>,
    after: BTreeMap<EventType, BTreeSet<EventType>>,
}

impl EffectiveConstraints {
    pub fn compute(registry: &EventTypeRegistry, run: &BTreeSet<EventType>) -> Self {
        let mut constraints = Self::default();
        for &event_type in run {
            let mut before = registry.comes_before(event_type).clone();
            let mut after = registry.comes_after(event_type).clone();
            for &other in run {
                if registry.comes_after(other).contains(&event_type) {
                    before.insert(other);
                }
                if registry.comes_before(other).contains(&event_type) {
                    after.insert(other);
                }
            }
            constraints.before.insert(event_type, before);
            constraints.after.insert(event_type, after);
        }
        constraints
    }

    /// Types an event of `event_type` must precede.
    pub fn before(&self, event_type: EventType) -> &BTreeSet<EventType> {
        self.before.get(&event_type).unwrap_or(&EMPTY)
    }

    /// Types an event of `event_type` must follow.
    pub fn after(&self, event_type: EventType) -> &BTreeSet<EventType> {
        self.after.get(&event_type).unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(types: &[EventType]) -> BTreeSet<EventType> {
        types.iter().copied().collect()
    }

    #[test]
    fn test_builtin_derivable_and_creatable_types() {
        let registry = EventTypeRegistry::builtin();
        assert_eq!(
            registry.derivable_types(),
            run(&[
                EventType::Birth,
                EventType::Death,
                EventType::Funeral,
                EventType::Cremation,
                EventType::Burial,
            ])
        );
        assert!(registry.is_creatable(EventType::Death));
        assert!(!registry.is_creatable(EventType::Birth));
        assert!(!registry.is_derivable(EventType::Will));
        assert!(!registry.is_derivable(EventType::Unknown));
    }

    #[test]
    fn test_builtin_death_follows_during_life_but_not_birth() {
        let meta = EventTypeRegistry::builtin().meta(EventType::Death).unwrap();
        assert!(meta.comes_after.contains(&EventType::Residence));
        assert!(meta.comes_after.contains(&EventType::Marriage));
        assert!(!meta.comes_after.contains(&EventType::Birth));
        assert!(meta.comes_before.contains(&EventType::Burial));
    }

    #[test]
    fn test_own_declarations_are_kept() {
        let registry = EventTypeRegistry::builtin();
        let constraints = EffectiveConstraints::compute(registry, &run(&[EventType::Death]));
        let during_life: BTreeSet<EventType> = DURING_LIFE.into_iter().collect();
        let post_death: BTreeSet<EventType> = POST_DEATH.into_iter().collect();
        assert_eq!(constraints.after(EventType::Death), &during_life);
        assert_eq!(constraints.before(EventType::Death), &post_death);
    }

    #[test]
    fn test_declarations_of_other_run_types_are_folded_in() {
        let registry = EventTypeRegistry::new()
            .with_meta(EventType::Marriage, EventTypeMeta::new().derivable())
            .with_meta(
                EventType::Divorce,
                EventTypeMeta::new().after([EventType::Marriage]).derivable(),
            );

        let both = EffectiveConstraints::compute(
            &registry,
            &run(&[EventType::Marriage, EventType::Divorce]),
        );
        assert_eq!(both.before(EventType::Marriage), &run(&[EventType::Divorce]));
        assert_eq!(both.after(EventType::Divorce), &run(&[EventType::Marriage]));

        // Without Divorce in the run, Marriage learns nothing from it.
        let alone = EffectiveConstraints::compute(&registry, &run(&[EventType::Marriage]));
        assert!(alone.before(EventType::Marriage).is_empty());
    }

    #[test]
    fn test_types_outside_the_run_have_no_constraints() {
        let constraints =
            EffectiveConstraints::compute(EventTypeRegistry::builtin(), &run(&[EventType::Death]));
        assert!(constraints.before(EventType::Birth).is_empty());
        assert!(constraints.after(EventType::Birth).is_empty());
    }

    #[test]
    fn test_parse_and_display_names() {
        assert_eq!(
            "marriage-announcement".parse::<EventType>().unwrap(),
            EventType::MarriageAnnouncement
        );
        assert_eq!(
            "Divorce_Announcement".parse::<EventType>().unwrap(),
            EventType::DivorceAnnouncement
        );
        assert_eq!(EventType::Death.to_string(), "death");
        let err = "coronation".parse::<EventType>().unwrap_err();
        assert!(err.to_string().contains("Unknown event type"), "got: {err}");
    }

    #[test]
    fn test_names_match_serde() {
        for event_type in EventType::ALL {
            let json = serde_json::to_value(event_type).unwrap();
            assert_eq!(json, serde_json::Value::String(event_type.name().to_string()));
        }
    }
}
