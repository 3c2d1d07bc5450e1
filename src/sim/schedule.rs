//! Waypoint schedules and the segments derived from them
//!
//! A `Schedule` is authored content: waypoints with waits in 60 Hz ticks and a
//! speed in px/s. Binding turns it into `Segment`s whose durations and waits
//! are in seconds. Segments are never edited directly; they are rebuilt from
//! the schedule on every bind.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::NPC_SPEED;
use crate::error::{Result, SimError};
use crate::{ticks_to_secs, upgrade_speed};

/// Durations below this are treated as zero-length segments
pub const MIN_SEGMENT_SECS: f32 = 1e-6;

/// One point of a patrol path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
    /// Wait after arriving here, in 60 Hz ticks
    #[serde(default, rename = "wait")]
    pub wait_ticks: u32,
}

impl Waypoint {
    pub fn new(x: f32, y: f32, wait_ticks: u32) -> Self {
        Self { x, y, wait_ticks }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// An authored patrol path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub waypoints: Vec<Waypoint>,
    /// Pixels per second
    pub speed: f32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Waypoints are offsets from the entity's spawn until translated
    #[serde(default)]
    pub relative: bool,
}

impl Schedule {
    pub fn new(waypoints: Vec<Waypoint>, speed: f32, looping: bool) -> Self {
        Self {
            waypoints,
            speed,
            looping,
            relative: false,
        }
    }

    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }

    /// Translate relative waypoints by `origin`. Clears the flag, so calling
    /// this again is a no-op.
    pub fn make_absolute(&mut self, origin: Vec2) {
        if !self.relative {
            return;
        }
        for wp in &mut self.waypoints {
            wp.x += origin.x;
            wp.y += origin.y;
        }
        self.relative = false;
    }

    /// Speed in px/s, upgrading legacy px/frame values
    pub fn speed_px_per_sec(&self) -> f32 {
        upgrade_speed(self.speed, NPC_SPEED)
    }

    /// Build the traversal segments for an absolute schedule
    pub fn segments(&self) -> Result<Vec<Segment>> {
        let pts = &self.waypoints;
        if pts.len() < 2 {
            return Err(SimError::ScheduleTooShort { count: pts.len() });
        }
        let speed = self.speed_px_per_sec();

        let mut segs: Vec<Segment> = pts
            .windows(2)
            .map(|w| Segment::between(&w[0], &w[1], speed))
            .collect();
        if self.looping {
            segs.push(Segment::between(&pts[pts.len() - 1], &pts[0], speed));
        }
        Ok(segs)
    }

    /// Wait before the first segment starts, in seconds
    pub fn initial_wait(&self) -> f32 {
        self.waypoints.first().map_or(0.0, |wp| ticks_to_secs(wp.wait_ticks))
    }
}

/// Derived motion unit between two consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    /// Traversal time in seconds
    pub duration: f32,
    /// Wait at `end`, in seconds
    pub wait_after: f32,
}

impl Segment {
    fn between(a: &Waypoint, b: &Waypoint, speed: f32) -> Self {
        let (start, end) = (a.pos(), b.pos());
        Self {
            start,
            end,
            duration: start.distance(end) / speed.max(MIN_SEGMENT_SECS),
            wait_after: ticks_to_secs(b.wait_ticks),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.duration <= MIN_SEGMENT_SECS
    }

    /// Position after `elapsed` seconds, clamped to the segment
    pub fn position_at(&self, elapsed: f32) -> Vec2 {
        if self.is_degenerate() {
            return self.end;
        }
        let t = (elapsed / self.duration).clamp(0.0, 1.0);
        self.start + (self.end - self.start) * t
    }
}
