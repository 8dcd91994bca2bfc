//! Sensor channels and the permissive line parser that feeds them.
//!
//! Sensor frames arrive as text (`"512,300,72"`, `"512;300"`, `"512 300 72"`).
//! Bad fields leave their channel untouched; bad lines are dropped. Nothing
//! here can stop the simulation.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use time::OffsetDateTime;
use tracing::{debug, trace};

use crate::smoothing::smooth;

/// Latest smoothed value of every channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    pub soil_moisture: f64,
    pub oxygen: f64,
    pub heart_rate: f64,
}

#[derive(Clone, Debug)]
pub struct SensorState {
    reading: SensorReading,
    soil_history: VecDeque<f64>,
    oxygen_history: VecDeque<f64>,
    heart_history: VecDeque<f64>,
    window: usize,
    connected: bool,
    last_data_at: Option<OffsetDateTime>,
}

impl SensorState {
    pub fn new(initial: SensorReading, window: usize) -> SensorState {
        SensorState {
            reading: initial,
            soil_history: VecDeque::with_capacity(window + 1),
            oxygen_history: VecDeque::with_capacity(window + 1),
            heart_history: VecDeque::with_capacity(window + 1),
            window,
            connected: false,
            last_data_at: None,
        }
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn last_data_at(&self) -> Option<OffsetDateTime> {
        self.last_data_at
    }

    /// Feeds one raw sensor line. Fields are soil moisture, oxygen and heart
    /// rate in that order; anything past the third is ignored.
    pub fn ingest(&mut self, raw: &str, now: OffsetDateTime) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }
        trace!(line, "raw sensor line");

        let mut updated = false;
        for (channel, token) in tokenize(line).take(3).enumerate() {
            let Some(value) = parse_leading_float(token) else {
                continue;
            };
            let (history, slot) = match channel {
                0 => (&mut self.soil_history, &mut self.reading.soil_moisture),
                1 => (&mut self.oxygen_history, &mut self.reading.oxygen),
                _ => (&mut self.heart_history, &mut self.reading.heart_rate),
            };
            *slot = smooth(history, value, self.window);
            updated = true;
        }

        if updated {
            self.connected = true;
            self.last_data_at = Some(now);
            debug!(
                soil = self.reading.soil_moisture,
                oxygen = self.reading.oxygen,
                heart_rate = self.reading.heart_rate,
                "sensors updated"
            );
        }
    }

    /// Overrides the smoothed soil moisture without touching its history.
    pub fn set_soil_moisture(&mut self, value: f64) {
        self.reading.soil_moisture = value;
    }

    /// Adds `amount` of soil moisture, never exceeding `cap`.
    pub fn water(&mut self, amount: f64, cap: f64) -> f64 {
        self.reading.soil_moisture = (self.reading.soil_moisture + amount).min(cap);
        self.reading.soil_moisture
    }
}

/// Splits on commas if any are present, else semicolons, else whitespace runs.
fn tokenize(line: &str) -> Box<dyn Iterator<Item = &str> + '_> {
    if line.contains(',') {
        Box::new(line.split(','))
    } else if line.contains(';') {
        Box::new(line.split(';'))
    } else {
        Box::new(line.split_whitespace())
    }
}

/// Parses the longest numeric prefix of `token`, so `"512abc"` reads as 512.
/// Returns `None` when no prefix parses or the longest one overflows to a
/// non-finite value.
pub fn parse_leading_float(token: &str) -> Option<f64> {
    let token = token.trim_start();
    let mut end = 0;
    for (i, c) in token.char_indices() {
        if c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E') {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    let candidate = &token[..end];
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Shared handle to the sensor channels.
///
/// Transport threads ingest through a clone while the frame loop reads; the
/// lock only ever guards the short per-channel updates.
#[derive(Clone, Debug)]
pub struct SensorHandle {
    state: Arc<RwLock<SensorState>>,
}

impl SensorHandle {
    pub fn new(state: SensorState) -> SensorHandle {
        SensorHandle {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn ingest(&self, raw: &str, now: OffsetDateTime) {
        self.write(|s| s.ingest(raw, now))
    }

    pub fn reading(&self) -> SensorReading {
        self.read(SensorState::reading)
    }

    pub fn connected(&self) -> bool {
        self.read(SensorState::connected)
    }

    pub fn last_data_at(&self) -> Option<OffsetDateTime> {
        self.read(SensorState::last_data_at)
    }

    pub fn set_soil_moisture(&self, value: f64) {
        self.write(|s| s.set_soil_moisture(value))
    }

    pub fn water(&self, amount: f64, cap: f64) -> f64 {
        self.write(|s| s.water(amount, cap))
    }

    fn read<T>(&self, f: impl FnOnce(&SensorState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut SensorState) -> T) -> T {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-01-01 12:00 UTC);

    fn fresh() -> SensorState {
        SensorState::new(
            SensorReading {
                soil_moisture: 600.0,
                oxygen: 350.0,
                heart_rate: 0.0,
            },
            10,
        )
    }

    #[test]
    fn blank_lines_change_nothing() {
        let mut s = fresh();
        s.ingest("", NOW);
        s.ingest("   ", NOW);
        s.ingest("\t\n", NOW);
        assert_eq!(s.reading(), fresh().reading());
        assert!(!s.connected());
        assert_eq!(s.last_data_at(), None);
    }

    #[test]
    fn comma_line_updates_all_channels() {
        let mut s = fresh();
        s.ingest("500,300,70", NOW);
        assert_eq!(
            s.reading(),
            SensorReading {
                soil_moisture: 500.0,
                oxygen: 300.0,
                heart_rate: 70.0
            }
        );
        assert!(s.connected());
        assert_eq!(s.last_data_at(), Some(NOW));
    }

    #[test]
    fn bad_field_keeps_previous_value() {
        let mut s = fresh();
        s.ingest("abc,300", NOW);
        assert_eq!(s.reading().soil_moisture, 600.0);
        assert_eq!(s.reading().oxygen, 300.0);
        assert_eq!(s.reading().heart_rate, 0.0);
        assert!(s.connected());
    }

    #[test]
    fn semicolons_and_whitespace() {
        let mut s = fresh();
        s.ingest("410;290", NOW);
        assert_eq!(s.reading().soil_moisture, 410.0);
        assert_eq!(s.reading().oxygen, 290.0);

        let mut s = fresh();
        s.ingest("  420   280\t65  ", NOW);
        assert_eq!(s.reading().soil_moisture, 420.0);
        assert_eq!(s.reading().oxygen, 280.0);
        assert_eq!(s.reading().heart_rate, 65.0);
    }

    #[test]
    fn comma_takes_priority_over_semicolon() {
        let mut s = fresh();
        s.ingest("1;2,300", NOW);
        // first token is "1;2" which reads as 1
        assert_eq!(s.reading().soil_moisture, 1.0);
        assert_eq!(s.reading().oxygen, 300.0);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut s = fresh();
        s.ingest("500,300,70,999,1", NOW);
        assert_eq!(s.reading().heart_rate, 70.0);
    }

    #[test]
    fn all_bad_fields_do_not_connect() {
        let mut s = fresh();
        s.ingest("x,y,z", NOW);
        assert_eq!(s.reading(), fresh().reading());
        assert!(!s.connected());
    }

    #[test]
    fn readings_are_smoothed() {
        let mut s = fresh();
        s.ingest("400", NOW);
        s.ingest("600", NOW);
        assert_eq!(s.reading().soil_moisture, 500.0);
    }

    #[test]
    fn leading_float_parser() {
        assert_eq!(parse_leading_float("512"), Some(512.0));
        assert_eq!(parse_leading_float(" 12.5kPa"), Some(12.5));
        assert_eq!(parse_leading_float("-3e2x"), Some(-300.0));
        assert_eq!(parse_leading_float("7e"), Some(7.0));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("NaN"), None);
        assert_eq!(parse_leading_float("inf"), None);
        assert_eq!(parse_leading_float("-"), None);
    }

    #[test]
    fn overflowing_numbers_are_rejected() {
        assert_eq!(parse_leading_float("1e400"), None);
        assert_eq!(parse_leading_float("-1e999x"), None);

        let mut s = fresh();
        s.ingest("1e400,320", NOW);
        assert_eq!(s.reading().soil_moisture, fresh().reading().soil_moisture);
        assert_eq!(s.reading().oxygen, 320.0);
    }

    #[test]
    fn watering_is_capped() {
        let mut s = fresh();
        assert_eq!(s.water(100.0, 800.0), 700.0);
        assert_eq!(s.water(100.0, 800.0), 800.0);
        assert_eq!(s.water(100.0, 800.0), 800.0);
    }

    #[test]
    fn handle_is_shared_across_threads() {
        let handle = SensorHandle::new(fresh());
        let feeder = handle.clone();
        std::thread::spawn(move || feeder.ingest("450,310,60", NOW))
            .join()
            .unwrap();
        assert_eq!(handle.reading().soil_moisture, 450.0);
        assert!(handle.connected());
    }
}
