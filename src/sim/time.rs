//! Day/night cycle
//!
//! `t` is the fraction of the day since midnight, in [0, 1). Daylight follows
//! a half-cosine arc over the sunrise..sunset window and is zero outside it.

use std::f32::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::settings::SimConfig;

/// Minutes in a day
pub const MINUTES_PER_DAY: f32 = 1440.0;

/// Lighting signals derived from the time of day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    pub t: f32,
    /// 0 at night, 1 at solar noon
    pub day_light: f32,
    /// `1 - day_light`
    pub darkness: f32,
    /// Golden hour tint strength (0..1)
    pub warm_tint: f32,
}

/// A wall-clock reading for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub hours: u32,
    pub minutes: u32,
}

impl ClockReading {
    pub fn is_pm(&self) -> bool {
        self.hours >= 12
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} {}",
            self.hours,
            self.minutes,
            if self.is_pm() { "PM" } else { "AM" }
        )
    }
}

/// Continuous time-of-day model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeModel {
    t: f32,
    pub day_length_secs: f32,
    pub sunrise: f32,
    pub sunset: f32,
    pub warm_band: f32,
}

impl TimeModel {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            t: wrap01(config.initial_time),
            day_length_secs: config.day_length_secs,
            sunrise: config.sunrise,
            sunset: config.sunset,
            warm_band: config.warm_band,
        }
    }

    /// Current day fraction
    pub fn time(&self) -> f32 {
        self.t
    }

    /// Set the day fraction directly (restore path)
    pub fn set_time(&mut self, t: f32) {
        self.t = if t.is_finite() { wrap01(t) } else { 0.0 };
    }

    /// Advance by real elapsed seconds
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.t = wrap01(self.t + dt / self.day_length_secs);
    }

    /// Jump forward by game minutes, independent of normal advancement
    pub fn skip_minutes(&mut self, minutes: f32) {
        if !minutes.is_finite() || minutes <= 0.0 {
            return;
        }
        self.t = wrap01(self.t + minutes / MINUTES_PER_DAY);
    }

    /// Seconds of simulated day elapsed since midnight
    pub fn seconds_since_midnight(&self) -> f32 {
        self.t * self.day_length_secs
    }

    /// Daylight for the current time
    pub fn day_light(&self) -> f32 {
        let span = self.sunset - self.sunrise;
        if span <= 0.0 || self.t <= self.sunrise || self.t >= self.sunset {
            return 0.0;
        }
        let u = (self.t - self.sunrise) / span;
        clamp01((PI * u).sin())
    }

    pub fn cycle(&self) -> Cycle {
        let day_light = self.day_light();
        let darkness = 1.0 - day_light;

        let closeness = |edge: f32| clamp01(1.0 - circular_distance(self.t, edge) / self.warm_band);
        let warm = closeness(self.sunrise).max(closeness(self.sunset));
        let warm_tint = clamp01(warm * (0.65 + 0.35 * day_light));

        Cycle {
            t: self.t,
            day_light,
            darkness,
            warm_tint,
        }
    }

    pub fn clock(&self) -> ClockReading {
        // Epsilon keeps exact minute skips from flooring one minute short
        let total_minutes = (self.t * MINUTES_PER_DAY + 1e-3) as u32;
        ClockReading {
            hours: (total_minutes / 60) % 24,
            minutes: total_minutes % 60,
        }
    }
}

/// Wrap into [0, 1)
fn wrap01(t: f32) -> f32 {
    let w = t.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if w >= 1.0 { 0.0 } else { w }
}

/// Shortest distance between two day fractions on the circular day
fn circular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs();
    d.min(1.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model(initial: f32) -> TimeModel {
        TimeModel::new(&SimConfig {
            initial_time: initial,
            day_length_secs: 120.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_full_day_wraps_to_start() {
        let mut time = model(0.0);
        for _ in 0..(120 * 64) {
            time.advance(1.0 / 64.0);
        }
        let t = time.time();
        assert!(t < 1e-3 || t > 1.0 - 1e-3, "t = {t}");
    }

    #[test]
    fn test_skip_full_day_is_identity() {
        let mut time = model(0.375);
        time.skip_minutes(1440.0);
        assert!((time.time() - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_skip_ten_minutes() {
        let mut time = model(0.0);
        time.skip_minutes(10.0);
        assert_eq!(time.clock(), ClockReading { hours: 0, minutes: 10 });
    }

    #[test]
    fn test_skip_only_moves_forward() {
        let mut time = model(0.5);
        time.skip_minutes(-30.0);
        time.skip_minutes(0.0);
        time.skip_minutes(f32::NAN);
        assert_eq!(time.time(), 0.5);
    }

    #[test]
    fn test_daylight_window() {
        let mut time = model(0.0);
        assert_eq!(time.cycle().day_light, 0.0);
        assert_eq!(time.cycle().darkness, 1.0);

        time.set_time(0.5);
        assert!((time.cycle().day_light - 1.0).abs() < 1e-6);

        time.set_time(0.2);
        assert_eq!(time.cycle().day_light, 0.0);

        time.set_time(0.375);
        let half = time.cycle().day_light;
        assert!(half > 0.0 && half < 1.0);
    }

    #[test]
    fn test_warm_tint_peaks_at_sunrise_and_sunset() {
        let mut time = model(0.25);
        let sunrise = time.cycle().warm_tint;
        time.set_time(0.75);
        let sunset = time.cycle().warm_tint;
        time.set_time(0.5);
        let noon = time.cycle().warm_tint;
        time.set_time(0.0);
        let midnight = time.cycle().warm_tint;

        assert!(sunrise > 0.6);
        assert!(sunset > 0.6);
        assert_eq!(noon, 0.0);
        assert_eq!(midnight, 0.0);
    }

    #[test]
    fn test_ignores_bad_dt() {
        let mut time = model(0.3);
        time.advance(f32::NAN);
        time.advance(-1.0);
        assert_eq!(time.time(), 0.3);
    }

    #[test]
    fn test_clock_display() {
        let time = model(13.5 / 24.0);
        assert_eq!(time.clock().to_string(), "13:30 PM");
    }

    proptest! {
        #[test]
        fn prop_time_stays_in_unit_interval(start in 0.0f32..1.0, steps in proptest::collection::vec(0.0f32..5.0, 0..50)) {
            let mut time = model(start);
            for dt in steps {
                time.advance(dt);
                prop_assert!((0.0..1.0).contains(&time.time()));
                let cycle = time.cycle();
                prop_assert!((cycle.day_light + cycle.darkness - 1.0).abs() < 1e-6);
                prop_assert!((0.0..=1.0).contains(&cycle.warm_tint));
            }
        }
    }
}
