//! # pickup-engine
//!
//! Deterministic pickup-slot planning for food-parcel distribution.
//!
//! The engine answers two questions the surrounding administration tool
//! cannot get wrong: which create/update/delete operations turn a
//! household's persisted pickup slots into the set it now wants, and
//! whether a given date and time is a legal pickup at a location under its
//! opening-hour schedules. Both are pure functions over in-memory data;
//! loading slots and schedules, and applying the resulting plan in one
//! transaction, belongs to the caller.
//!
//! All calendar reasoning happens in one fixed IANA civil timezone so that
//! results never depend on where the process runs — in particular, slots
//! just after local midnight must land on the correct day.
//!
//! ## Modules
//!
//! - [`civil`] — Instant → civil-day key derivation in a fixed timezone
//! - [`reconcile`] — Desired windows vs. persisted slots → create/update/delete plan
//! - [`availability`] — Opening-hours evaluation and pickup-time grids
//! - [`config`] — Process-wide timezone and slot-duration configuration
//! - [`error`] — Error types

pub mod availability;
pub mod civil;
pub mod config;
pub mod error;
pub mod reconcile;

pub use availability::{
    available_time_range, generate_time_slots_between, is_date_available, is_time_available,
    period_for, slot_within_hours, Availability, DayHours, SchedulePeriod, TimeRange, TimeSlots,
    UnavailableReason,
};
pub use civil::{civil_date, day_key, format_local_time, parse_local_time, parse_timezone};
pub use config::EngineConfig;
pub use error::EngineError;
pub use reconcile::{
    reconcile, DesiredWindow, ExistingSlot, NewSlot, ReconciliationPlan, SlotUpdate,
};
