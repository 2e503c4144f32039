//! Sources of "now" for callers that poll the engine.
//!
//! The engine itself never reads the clock; every computation takes the
//! instant as a parameter. All clocks report local wall-clock time because the
//! spacing bands are defined on the local day.

use std::time::Duration as StdDuration;

use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// How often roles should be re-arbitrated.
pub const STATE_REFRESH_INTERVAL: StdDuration = StdDuration::from_secs(30);

/// How often countdowns should be refreshed from the last arbitration.
pub const COUNTDOWN_INTERVAL: StdDuration = StdDuration::from_secs(1);

/// Something that can tell the local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Wall-clock time in a named IANA zone, independent of the host setting.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// # Errors
    /// Returns `EngineError::InvalidTimezone` if `name` is not an IANA identifier.
    pub fn parse(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| EngineError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(tz))
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
