//! Wall-clock access and plant age accounting.
//!
//! Plant age is measured in "age units": 100 units per real day since the
//! planting date. It keeps accruing in real time whether or not the plant is
//! allowed to grow.

use std::sync::{Arc, Mutex, PoisonError};

use time::{Date, Duration, OffsetDateTime};

/// Age units accrued per real day.
pub const UNITS_PER_DAY: f64 = 100.0;
pub const MS_PER_DAY: f64 = 86_400_000.0;

pub trait Clock: Send {
    fn now(&self) -> OffsetDateTime;
}

/// Reads the operating system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> ManualClock {
        ManualClock {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set(&self, to: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Midnight UTC of the planting date.
pub fn planting_epoch(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

/// Age in units of a plant potted at `epoch`, observed at `now`.
pub fn age_units_since(epoch: OffsetDateTime, now: OffsetDateTime) -> f64 {
    let elapsed_ms = (now - epoch).as_seconds_f64() * 1000.0;
    elapsed_ms / MS_PER_DAY * UNITS_PER_DAY
}

#[derive(Clone, Copy, Debug)]
pub struct PlantAge {
    units: f64,
    last_update: OffsetDateTime,
}

impl PlantAge {
    /// Age computed from scratch against the planting epoch.
    pub fn from_epoch(epoch: OffsetDateTime, now: OffsetDateTime) -> PlantAge {
        PlantAge {
            units: age_units_since(epoch, now),
            last_update: now,
        }
    }

    /// Adds the real time elapsed since the previous update.
    pub fn advance(&mut self, now: OffsetDateTime) {
        let elapsed_ms = (now - self.last_update).as_seconds_f64() * 1000.0;
        self.units += elapsed_ms / MS_PER_DAY * UNITS_PER_DAY;
        self.last_update = now;
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    pub fn days(&self) -> f64 {
        self.units / UNITS_PER_DAY
    }
}
