//! Process-wide engine configuration.
//!
//! The civil timezone is configuration, not a per-call argument source:
//! the caller reads it once at startup and threads it into the day-key and
//! availability functions. Nothing in the engine consults the host's
//! ambient timezone.

use std::env;
use std::fmt;

use chrono_tz::Tz;

use crate::civil::parse_timezone;
use crate::error::{EngineError, Result};

/// IANA name of the organization's operating timezone.
pub const DEFAULT_CIVIL_TIMEZONE: &str = "Europe/Stockholm";

/// Default spacing of the selectable pickup-time grid, in minutes.
pub const DEFAULT_SLOT_DURATION_MINUTES: u32 = 15;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub civil_timezone: Tz,
    pub slot_duration_minutes: u32,
}

impl EngineConfig {
    /// Read configuration from the environment.
    ///
    /// `CIVIL_TIMEZONE` (IANA name) and `SLOT_DURATION_MINUTES` are
    /// consulted; unset variables fall back to the defaults above.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTimezone`] for an unknown timezone
    /// name and [`EngineError::InvalidConfig`] for an unparsable duration.
    pub fn from_env() -> Result<Self> {
        let tz_name =
            env::var("CIVIL_TIMEZONE").unwrap_or_else(|_| DEFAULT_CIVIL_TIMEZONE.to_string());

        Ok(Self {
            civil_timezone: parse_timezone(&tz_name)?,
            slot_duration_minutes: parse_or_default(
                "SLOT_DURATION_MINUTES",
                DEFAULT_SLOT_DURATION_MINUTES,
            )?,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            civil_timezone: DEFAULT_CIVIL_TIMEZONE
                .parse()
                .unwrap_or(chrono_tz::Tz::UTC),
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| EngineError::InvalidConfig(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
