//! Non-player entities and their motion state machine
//!
//! A scheduled NPC alternates between `Waiting` at a waypoint and `Moving`
//! along the current segment. Time left over after a transition carries into
//! the next state within the same update, so arrival times do not depend on
//! how the frames happen to be sliced. An NPC without a schedule wanders.
//!
//! Pausing (someone is talking to the NPC) freezes every schedule timer. Only
//! the idle bob keeps animating.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::schedule::{MIN_SEGMENT_SECS, Schedule, Segment};
use crate::consts::{NPC_INTERACTION_RANGE, NPC_PAUSE_SECS, NPC_SIZE, NPC_SPEED};
use crate::error::Result;

/// Wander speed as a fraction of nominal speed
const WANDER_SPEED_FACTOR: f32 = 0.25;
/// Idle bob, radians per second
const BOB_RATE: f32 = 3.0;

/// Observable motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    Waiting,
    Moving,
    Paused,
    Wandering,
}

/// Internal motion state; timers are in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Waiting { wait_left: f32 },
    Moving { elapsed: f32 },
    Wandering { heading: Vec2, left: f32 },
}

impl Motion {
    fn wander() -> Self {
        Motion::Wandering {
            heading: Vec2::ZERO,
            left: 0.0,
        }
    }
}

/// Body outline used for drawing and pointer picking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcShape {
    #[default]
    Square,
    Circle,
    Triangle,
}

/// Result of the player addressing an NPC
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Whether the NPC stopped to talk
    pub engaged: bool,
    pub text: String,
    /// How long the speech bubble stays up
    pub duration_secs: f32,
}

#[derive(Debug, Clone)]
pub struct Npc {
    pub id: u32,
    pub name: String,
    pub pos: Vec2,
    /// Where the NPC was created; origin for relative schedules
    pub spawn: Vec2,
    pub size: f32,
    pub shape: NpcShape,
    /// Nominal speed in px/s (taken from the schedule when bound)
    pub speed: f32,
    pub dialogue: Vec<String>,
    dialogue_index: usize,
    schedule: Option<Schedule>,
    segments: Vec<Segment>,
    seg_index: usize,
    /// Open path walked to its end
    finished: bool,
    motion: Motion,
    pause_left: f32,
    bob_phase: f32,
    /// Time of this NPC's last update, seconds
    clock: f64,
}

impl Npc {
    pub fn new(id: u32, name: impl Into<String>, pos: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            pos,
            spawn: pos,
            size: NPC_SIZE,
            shape: NpcShape::Square,
            speed: NPC_SPEED,
            dialogue: Vec::new(),
            dialogue_index: 0,
            schedule: None,
            segments: Vec::new(),
            seg_index: 0,
            finished: false,
            motion: Motion::wander(),
            pause_left: 0.0,
            bob_phase: 0.0,
            clock: 0.0,
        }
    }

    pub fn with_dialogue(mut self, lines: &[&str]) -> Self {
        self.dialogue = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_shape(mut self, shape: NpcShape) -> Self {
        self.shape = shape;
        self
    }

    /// Bind a schedule. Relative waypoints are translated by the spawn point
    /// once; the stored schedule is absolute from then on.
    ///
    /// A schedule with fewer than two waypoints is rejected and the NPC falls
    /// back to wandering.
    pub fn bind(&mut self, mut schedule: Schedule) -> Result<()> {
        schedule.make_absolute(self.spawn);

        let segments = match schedule.segments() {
            Ok(segments) => segments,
            Err(e) => {
                log::warn!("NPC {} ({}): {e}; wandering instead", self.id, self.name);
                self.unbind();
                return Err(e);
            }
        };

        self.speed = schedule.speed_px_per_sec();
        self.pos = segments[0].start;
        self.motion = Motion::Waiting {
            wait_left: schedule.initial_wait(),
        };
        self.segments = segments;
        self.seg_index = 0;
        self.finished = false;
        self.pause_left = 0.0;
        self.schedule = Some(schedule);
        Ok(())
    }

    /// Rebuild segments from the stored schedule and restart it
    pub fn rebind(&mut self) -> Result<()> {
        match self.schedule.clone() {
            Some(schedule) => self.bind(schedule),
            None => Ok(()),
        }
    }

    /// Drop the schedule and wander
    pub fn unbind(&mut self) {
        self.schedule = None;
        self.segments.clear();
        self.seg_index = 0;
        self.finished = false;
        self.motion = Motion::wander();
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_index(&self) -> usize {
        self.seg_index
    }

    pub fn state(&self) -> ScheduleState {
        if self.pause_left > 0.0 {
            return ScheduleState::Paused;
        }
        match self.motion {
            Motion::Waiting { .. } => ScheduleState::Waiting,
            Motion::Moving { .. } => ScheduleState::Moving,
            Motion::Wandering { .. } => ScheduleState::Wandering,
        }
    }

    /// Seconds left to wait at the current waypoint
    pub fn wait_left(&self) -> f32 {
        match self.motion {
            Motion::Waiting { wait_left } => wait_left,
            _ => 0.0,
        }
    }

    /// Seconds spent on the current segment
    pub fn elapsed(&self) -> f32 {
        match self.motion {
            Motion::Moving { elapsed } => elapsed,
            _ => 0.0,
        }
    }

    pub fn pause_left(&self) -> f32 {
        self.pause_left
    }

    pub fn pause(&mut self, secs: f32) {
        if secs.is_finite() && secs > 0.0 {
            self.pause_left = self.pause_left.max(secs);
        }
    }

    /// Vertical bob offset for drawing
    pub fn bob_offset(&self) -> f32 {
        self.bob_phase.sin() * 1.5
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size * 0.5))
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        match self.shape {
            NpcShape::Circle => p.distance_squared(self.pos) <= (self.size * 0.5).powi(2),
            NpcShape::Square | NpcShape::Triangle => self.hitbox().contains_point(p),
        }
    }

    /// Reset the NPC's clock without advancing (spawn, restore)
    pub fn sync_clock(&mut self, now: f64) {
        self.clock = now;
    }

    /// Advance to `now` using this NPC's own elapsed time
    pub fn update(&mut self, now: f64, rng: &mut Pcg32, bounds: Vec2) {
        let dt = (now - self.clock).max(0.0) as f32;
        self.clock = now;
        self.advance(dt, rng, bounds);
    }

    /// Advance by `dt` seconds. Wanderers are kept inside `bounds`.
    pub fn advance(&mut self, dt: f32, rng: &mut Pcg32, bounds: Vec2) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.bob_phase = (self.bob_phase + dt * BOB_RATE) % TAU;

        let mut budget = dt;
        if self.pause_left > 0.0 {
            if self.pause_left >= budget {
                self.pause_left -= budget;
                return;
            }
            budget -= self.pause_left;
            self.pause_left = 0.0;
        }

        if self.segments.is_empty() {
            self.wander(budget, rng, bounds);
        } else {
            self.advance_schedule(budget);
        }
    }

    fn advance_schedule(&mut self, mut budget: f32) {
        // Whole laps end where they started
        if let Some(period) = self.loop_period() {
            if budget >= period {
                budget %= period;
            }
        }
        // Less than a lap costs at most two transitions per segment
        let max_steps = self.segments.len() * 4 + 8;

        for _ in 0..max_steps {
            match self.motion {
                Motion::Waiting { wait_left } => {
                    if wait_left > budget {
                        self.motion = Motion::Waiting {
                            wait_left: wait_left - budget,
                        };
                        return;
                    }
                    budget -= wait_left;
                    if self.finished {
                        self.motion = Motion::Waiting { wait_left: 0.0 };
                        return;
                    }
                    self.motion = Motion::Moving { elapsed: 0.0 };
                }
                Motion::Moving { elapsed } => {
                    let seg = self.segments[self.seg_index];
                    if seg.is_degenerate() {
                        self.arrive(&seg);
                        continue;
                    }
                    let elapsed = elapsed + budget;
                    if elapsed >= seg.duration {
                        budget = elapsed - seg.duration;
                        self.arrive(&seg);
                    } else {
                        self.pos = seg.position_at(elapsed);
                        self.motion = Motion::Moving { elapsed };
                        return;
                    }
                }
                Motion::Wandering { .. } => {
                    self.motion = Motion::Waiting { wait_left: 0.0 };
                }
            }
        }
    }

    /// Land exactly on the segment end and queue its wait
    fn arrive(&mut self, seg: &Segment) {
        self.pos = seg.end;
        self.motion = Motion::Waiting {
            wait_left: seg.wait_after,
        };

        let looping = self.schedule.as_ref().is_some_and(|s| s.looping);
        if looping {
            self.seg_index = (self.seg_index + 1) % self.segments.len();
        } else if self.seg_index + 1 < self.segments.len() {
            self.seg_index += 1;
        } else {
            self.finished = true;
        }
    }

    fn wander(&mut self, dt: f32, rng: &mut Pcg32, bounds: Vec2) {
        let (mut heading, mut left) = match self.motion {
            Motion::Wandering { heading, left } => (heading, left),
            _ => (Vec2::ZERO, 0.0),
        };

        left -= dt;
        if left <= 0.0 {
            left = 0.75 + rng.random::<f32>() * 1.5;
            let angle = rng.random::<f32>() * TAU;
            heading = Vec2::new(angle.cos(), angle.sin());
        }

        let half = Vec2::splat(self.size * 0.5);
        let step = heading * self.speed * WANDER_SPEED_FACTOR * dt;
        self.pos = (self.pos + step).clamp(half, (bounds - half).max(half));
        self.motion = Motion::Wandering { heading, left };
    }

    /// Length of one full lap of a looping schedule, seconds
    pub fn loop_period(&self) -> Option<f32> {
        let looping = self.schedule.as_ref().is_some_and(|s| s.looping);
        if !looping {
            return None;
        }
        let period: f32 = self.segments.iter().map(|s| s.duration + s.wait_after).sum();
        (period > MIN_SEGMENT_SECS).then_some(period)
    }

    /// Advance the schedule by `secs` in one step, skipping whole laps.
    /// Pauses are ignored and wanderers are left alone.
    pub fn fast_forward(&mut self, secs: f32) {
        if self.segments.is_empty() || !secs.is_finite() || secs <= 0.0 {
            return;
        }
        self.advance_schedule(secs);
    }

    /// The player addresses this NPC from `player_pos`
    pub fn interact(&mut self, player_pos: Vec2) -> Interaction {
        if self.pos.distance(player_pos) > NPC_INTERACTION_RANGE {
            return Interaction {
                engaged: false,
                text: format!("{} is too far away.", self.name),
                duration_secs: 1.0,
            };
        }

        self.pause(NPC_PAUSE_SECS);

        if self.dialogue.is_empty() {
            return Interaction {
                engaged: true,
                text: format!("Hi, I’m {}!", self.name),
                duration_secs: 2.0,
            };
        }
        let text = self.dialogue[self.dialogue_index % self.dialogue.len()].clone();
        self.dialogue_index += 1;
        Interaction {
            engaged: true,
            text,
            duration_secs: 3.0,
        }
    }
}
