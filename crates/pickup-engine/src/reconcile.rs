//! Pickup-slot reconciliation.
//!
//! Given the slots already persisted for a household and the list of
//! pickup windows the household now wants at one location, compute the
//! minimal set of create/update/delete instructions. Matching is by civil
//! day of the earliest pickup instant: a window on the same civil day as
//! an existing slot at the same location reschedules that slot in place
//! (keeping its id and any recorded pickup history), while a change of day
//! or location is cancel-and-rebook.
//!
//! The reconciler is a pure function; applying its plan atomically, and
//! serializing concurrent runs for the same household and location, is the
//! persistence layer's job. Creates are retry-safe under a natural-key
//! uniqueness constraint on (household, location, earliest, latest).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::civil::day_key;
use crate::error::{EngineError, Result};

/// Projection of a persisted slot, as loaded by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingSlot {
    pub id: Uuid,
    pub pickup_location_id: Uuid,
    pub pickup_date_time_earliest: DateTime<Utc>,
    pub pickup_date_time_latest: DateTime<Utc>,
}

/// A pickup window the household wants; carries no identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DesiredWindow {
    pub pickup_date_time_earliest: DateTime<Utc>,
    pub pickup_date_time_latest: DateTime<Utc>,
}

impl DesiredWindow {
    /// Validating constructor for caller boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWindow`] when `earliest > latest`.
    pub fn new(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Result<Self> {
        if earliest > latest {
            return Err(EngineError::InvalidWindow(format!(
                "earliest {earliest} is after latest {latest}"
            )));
        }
        Ok(Self {
            pickup_date_time_earliest: earliest,
            pickup_date_time_latest: latest,
        })
    }
}

/// A fully-formed slot record to insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlot {
    pub id: Uuid,
    pub household_id: Uuid,
    pub pickup_location_id: Uuid,
    pub pickup_date_time_earliest: DateTime<Utc>,
    pub pickup_date_time_latest: DateTime<Utc>,
    pub is_picked_up: bool,
}

/// New time bounds for an existing slot; everything else is untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotUpdate {
    pub id: Uuid,
    pub pickup_date_time_earliest: DateTime<Utc>,
    pub pickup_date_time_latest: DateTime<Utc>,
}

/// Three-way instruction set for the persistence layer.
///
/// The lists are disjoint: an existing slot id appears in at most one of
/// `to_update`/`to_delete` and never twice. `to_create`/`to_update` follow
/// desired-window order, `to_delete` follows existing-slot order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub to_create: Vec<NewSlot>,
    pub to_update: Vec<SlotUpdate>,
    pub to_delete: Vec<Uuid>,
}

impl ReconciliationPlan {
    /// True when the persisted state already matches the desired windows.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Reconcile a household's desired pickup windows against its persisted
/// slots, producing the plan to bring storage in line with the wishes.
///
/// Matching rule: an existing slot at `location_id` whose earliest instant
/// falls on the same civil day (in `tz`) as a desired window is that
/// window's slot. Identical bounds are a no-op; changed bounds become an
/// identity-preserving update. Everything unmatched on either side becomes
/// a create or a delete. Slots at other locations can never match and are
/// always deleted — a location change is a materially different
/// appointment, so it is handled as cancel-and-rebook even when the day
/// coincides.
///
/// Duplicate same-day desired windows are not merged: the first one in
/// order wins the existing slot, every later one becomes an extra create.
/// Callers that consider duplicates invalid must reject them upstream.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use chrono_tz::Tz;
/// use pickup_engine::reconcile::{reconcile, DesiredWindow, ExistingSlot};
/// use uuid::Uuid;
///
/// let tz: Tz = "Europe/Stockholm".parse().unwrap();
/// let (household, location) = (Uuid::new_v4(), Uuid::new_v4());
/// let slot = ExistingSlot {
///     id: Uuid::new_v4(),
///     pickup_location_id: location,
///     pickup_date_time_earliest: "2025-10-15T10:00:00+02:00".parse::<DateTime<chrono::Utc>>().unwrap(),
///     pickup_date_time_latest: "2025-10-15T12:00:00+02:00".parse().unwrap(),
/// };
///
/// // Same day, later window: reschedule in place.
/// let window = DesiredWindow {
///     pickup_date_time_earliest: "2025-10-15T14:00:00+02:00".parse().unwrap(),
///     pickup_date_time_latest: "2025-10-15T16:00:00+02:00".parse().unwrap(),
/// };
/// let plan = reconcile(&[slot.clone()], &[window], household, location, tz);
/// assert_eq!(plan.to_update.len(), 1);
/// assert_eq!(plan.to_update[0].id, slot.id);
/// assert!(plan.to_create.is_empty() && plan.to_delete.is_empty());
/// ```
pub fn reconcile(
    existing: &[ExistingSlot],
    desired: &[DesiredWindow],
    household_id: Uuid,
    location_id: Uuid,
    tz: Tz,
) -> ReconciliationPlan {
    // Same-location slots keyed by the civil day of their earliest instant.
    // At most one active slot per day is a persistence invariant; should a
    // stale snapshot carry two anyway, the first in order is the candidate
    // and the other falls through to deletion.
    let mut by_day: HashMap<String, &ExistingSlot> = HashMap::new();
    for slot in existing {
        if slot.pickup_location_id == location_id {
            by_day
                .entry(day_key(slot.pickup_date_time_earliest, tz))
                .or_insert(slot);
        }
    }

    let mut consumed: HashSet<Uuid> = HashSet::new();
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();

    for window in desired {
        let key = day_key(window.pickup_date_time_earliest, tz);
        match by_day.get(key.as_str()) {
            Some(slot) if !consumed.contains(&slot.id) => {
                consumed.insert(slot.id);
                let unchanged = slot.pickup_date_time_earliest == window.pickup_date_time_earliest
                    && slot.pickup_date_time_latest == window.pickup_date_time_latest;
                if !unchanged {
                    to_update.push(SlotUpdate {
                        id: slot.id,
                        pickup_date_time_earliest: window.pickup_date_time_earliest,
                        pickup_date_time_latest: window.pickup_date_time_latest,
                    });
                }
            }
            // No slot on this day, or a second window hit an already
            // consumed slot: either way the window books a fresh slot.
            _ => to_create.push(NewSlot {
                id: Uuid::new_v4(),
                household_id,
                pickup_location_id: location_id,
                pickup_date_time_earliest: window.pickup_date_time_earliest,
                pickup_date_time_latest: window.pickup_date_time_latest,
                is_picked_up: false,
            }),
        }
    }

    let to_delete = existing
        .iter()
        .filter(|slot| !consumed.contains(&slot.id))
        .map(|slot| slot.id)
        .collect();

    ReconciliationPlan {
        to_create,
        to_update,
        to_delete,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
