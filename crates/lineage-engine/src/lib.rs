//! # lineage-engine
//!
//! Date derivation for genealogical records.
//!
//! Genealogical sources rarely date every event. The lineage engine fills in
//! what the rest of a person's record implies: a marriage with no end date is
//! bounded by the divorce that followed it, a burial by the death before it.
//! Dates may be partial (`1970`, `1970-02`, `?-02-03`) and comparisons between
//! them are three-valued, so nothing is inferred from dates that cannot be
//! ordered.
//!
//! ## Modules
//!
//! - [`date`]: partial dates, date ranges and their ordering and containment rules
//! - [`event_type`]: the event type catalogue and its ordering constraints
//! - [`ancestry`]: people, events and the presences linking them
//! - [`creation`]: policies deciding whether a missing event may be created
//! - [`deriver`]: the derivation engine and its per-run report
//! - [`config`]: TOML configuration for derivation runs
//! - [`error`]: Error types

pub mod ancestry;
pub mod config;
pub mod creation;
pub mod date;
pub mod deriver;
pub mod error;
pub mod event_type;

pub use ancestry::{
    Ancestry, CitationRef, Event, EventId, Person, PersonId, PersonRef, Presence, PresenceId,
    Role,
};
pub use config::DeriverConfig;
pub use creation::{policy_fn, CreationPolicy, LifetimeExpiry, PolicyFn};
pub use date::{Date, DateRange, Datey};
pub use deriver::{
    AfterStrategy, BeforeStrategy, DerivationReport, DerivationStrategy, DerivationTally,
    Deriver, ReferenceDate,
};
pub use error::{LineageError, Result};
pub use event_type::{EffectiveConstraints, EventType, EventTypeMeta, EventTypeRegistry};
