//! Simulation clock.
//!
//! Maps a tick number to a day, an hour, and a [`TimeOfDay`] label. In
//! simulated mode the hour advances by a fixed step per tick from the
//! configured start hour. In wall mode the hour is the host's local hour
//! and days are counted from the date the clock was created.
//!
//! Derivations use checked arithmetic; a tick count large enough to
//! overflow the hour counter saturates instead of wrapping.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use hamlet_types::TimeOfDay;
use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;

/// Hours in a simulated day.
const HOURS_PER_DAY: u64 = 24;

/// Where the clock's hour comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Fixed hours per tick from a start hour.
    #[default]
    Simulated,
    /// The host's local wall-clock hour.
    Wall,
}

/// Time derived for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockReading {
    /// Day number, starting at 1.
    pub day: u64,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Coarse label for the hour.
    pub time_of_day: TimeOfDay,
}

impl ClockReading {
    fn at(day: u64, hour: u8) -> Self {
        Self {
            day,
            hour,
            time_of_day: TimeOfDay::from_hour(hour),
        }
    }
}

/// Tick-to-time mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    mode: ClockMode,
    start_hour: u8,
    hours_per_tick: u8,
    start_date: NaiveDate,
}

impl SimClock {
    /// Build a clock from configuration. Wall mode counts days from today.
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            mode: config.mode,
            start_hour: config.start_hour,
            hours_per_tick: config.hours_per_tick,
            start_date: Local::now().date_naive(),
        }
    }

    /// The configured mode.
    pub const fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Time for the given tick.
    pub fn reading(&self, tick: u64) -> ClockReading {
        match self.mode {
            ClockMode::Simulated => self.simulated(tick),
            ClockMode::Wall => self.wall(Local::now().naive_local()),
        }
    }

    /// Simulated time for a tick, independent of mode.
    pub fn simulated(&self, tick: u64) -> ClockReading {
        let total = tick
            .saturating_mul(u64::from(self.hours_per_tick))
            .saturating_add(u64::from(self.start_hour));
        let hour = total
            .checked_rem(HOURS_PER_DAY)
            .and_then(|h| u8::try_from(h).ok())
            .unwrap_or(0);
        let day = total
            .checked_div(HOURS_PER_DAY)
            .unwrap_or(0)
            .saturating_add(1);
        ClockReading::at(day, hour)
    }

    /// Wall-clock time at `now`, with days counted from the clock's start
    /// date.
    pub fn wall(&self, now: NaiveDateTime) -> ClockReading {
        let elapsed = now.date().signed_duration_since(self.start_date).num_days();
        let day = u64::try_from(elapsed.max(0))
            .unwrap_or(0)
            .saturating_add(1);
        let hour = u8::try_from(now.hour()).unwrap_or(0);
        ClockReading::at(day, hour)
    }
}
