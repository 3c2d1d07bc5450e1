//! Viewport camera
//!
//! Maps world space to screen space under zoom and follows a target with
//! exponential easing. The camera position is kept inside
//! `[0, world_size - view_size]` at all times, including right after a zoom.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::SimConfig;

/// Camera state exposed to collaborators for coordinate conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub cam_x: f32,
    pub cam_y: f32,
    pub zoom: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left of the visible world rectangle
    pub pos: Vec2,
    zoom: f32,
    zoom_min: f32,
    zoom_max: f32,
    zoom_step: f32,
    /// Easing factor per 60 Hz frame
    ease: f32,
    /// Render surface size in pixels
    viewport: Vec2,
    world_size: Vec2,
}

impl Camera {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            zoom: config.zoom.clamp(config.zoom_min, config.zoom_max),
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            zoom_step: config.zoom_step,
            ease: config.cam_ease,
            viewport: Vec2::new(config.view_width, config.view_height),
            world_size: Vec2::new(config.world_width, config.world_height),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            cam_x: self.pos.x,
            cam_y: self.pos.y,
            zoom: self.zoom,
        }
    }

    /// Visible world width/height for a zoom level, in whole pixels
    pub fn compute_view_size(&self, zoom: f32) -> Vec2 {
        (self.viewport / zoom).round().max(Vec2::ONE)
    }

    pub fn view_size(&self) -> Vec2 {
        self.compute_view_size(self.zoom)
    }

    /// Screen pixels per world pixel
    pub fn scale(&self) -> f32 {
        self.viewport.x / self.view_size().x
    }

    /// Largest allowed camera position
    pub fn max_pos(&self) -> Vec2 {
        (self.world_size - self.view_size()).max(Vec2::ZERO)
    }

    fn clamp_pos(&self, pos: Vec2) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.max_pos())
    }

    /// Camera position that centers `target`, clamped to the world
    pub fn desired_for(&self, target: Vec2) -> Vec2 {
        self.clamp_pos(target - self.view_size() * 0.5)
    }

    /// Ease toward the clamped desired position for `target`
    pub fn follow(&mut self, target: Vec2, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let desired = self.desired_for(target);
        let alpha = 1.0 - (1.0 - self.ease).powf(dt * crate::consts::TICKS_PER_SECOND);
        // Both endpoints are in range, so the blend is too; the clamp absorbs rounding
        self.pos = self.clamp_pos(self.pos.lerp(desired, alpha.clamp(0.0, 1.0)));
    }

    /// Jump straight to the desired position for `target`
    pub fn snap_to(&mut self, target: Vec2) {
        self.pos = self.desired_for(target);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(self.zoom_min, self.zoom_max);
        self.pos = self.clamp_pos(self.pos);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * (1.0 + self.zoom_step));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / (1.0 + self.zoom_step));
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.pos) * self.scale()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.pos + screen / self.scale()
    }

    /// Change the world size (new ground image) and re-clamp
    pub fn set_world_size(&mut self, world_size: Vec2) {
        self.world_size = world_size.max(Vec2::ZERO);
        self.pos = self.clamp_pos(self.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> Camera {
        Camera::new(&SimConfig {
            world_width: 1168.0,
            world_height: 880.0,
            view_width: 960.0,
            view_height: 540.0,
            zoom: 2.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_view_size_is_inverse_of_zoom() {
        let cam = camera();
        assert_eq!(cam.compute_view_size(2.0), Vec2::new(480.0, 270.0));
        assert_eq!(cam.compute_view_size(4.0), Vec2::new(240.0, 135.0));
    }

    #[test]
    fn test_follow_converges_without_teleport() {
        let mut cam = camera();
        let target = Vec2::new(600.0, 400.0);
        let desired = cam.desired_for(target);

        cam.follow(target, 1.0 / 60.0);
        let first = cam.pos;
        assert!(first.distance(desired) > 1.0, "should ease, not jump");
        assert!(first.distance(desired) < desired.length());

        for _ in 0..600 {
            cam.follow(target, 1.0 / 60.0);
        }
        assert!(cam.pos.distance(desired) < 0.01);
    }

    #[test]
    fn test_follow_clamps_at_world_edges() {
        let mut cam = camera();
        cam.snap_to(Vec2::new(-500.0, -500.0));
        assert_eq!(cam.pos, Vec2::ZERO);

        cam.snap_to(Vec2::new(5000.0, 5000.0));
        assert_eq!(cam.pos, cam.max_pos());
        assert_eq!(cam.max_pos(), Vec2::new(1168.0 - 480.0, 880.0 - 270.0));
    }

    #[test]
    fn test_small_world_pins_camera_to_origin() {
        let mut cam = camera();
        cam.set_world_size(Vec2::new(100.0, 100.0));
        cam.follow(Vec2::new(50.0, 50.0), 1.0);
        assert_eq!(cam.pos, Vec2::ZERO);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.zoom_in();
        }
        assert_eq!(cam.zoom(), cam.zoom_max);
        for _ in 0..100 {
            cam.zoom_out();
        }
        assert_eq!(cam.zoom(), cam.zoom_min);
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let mut cam = camera();
        cam.snap_to(Vec2::new(500.0, 300.0));
        let world = Vec2::new(512.0, 333.0);
        let back = cam.screen_to_world(cam.world_to_screen(world));
        assert!(back.distance(world) < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_camera_stays_in_range(
            ops in proptest::collection::vec((0u8..3, -2000.0f32..3000.0, -2000.0f32..3000.0), 1..80)
        ) {
            let mut cam = camera();
            for (op, x, y) in ops {
                match op {
                    0 => cam.follow(Vec2::new(x, y), 1.0 / 30.0),
                    1 => cam.zoom_out(),
                    _ => cam.zoom_in(),
                }
                let max = cam.max_pos();
                prop_assert!(cam.pos.x >= 0.0 && cam.pos.y >= 0.0);
                prop_assert!(cam.pos.x <= max.x && cam.pos.y <= max.y);
            }
        }
    }
}
