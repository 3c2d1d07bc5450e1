//! Day/night compositing
//!
//! The lighting stack is applied over the world in a fixed order: ambient
//! darkening, warm tint, starfield, additive point lights, vignette. Each
//! pass carries everything a backend needs to draw it; light and star data
//! is `Pod` so it can be uploaded as-is.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::colors;
use crate::sim::camera::Camera;
use crate::sim::time::Cycle;
use crate::{clamp01, lerp};

/// How a pass combines with what is already on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Multiply,
    Screen,
    Over,
    Additive,
}

/// A point light, ready for instanced drawing (screen space)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub intensity: f32,
    pub color: [f32; 4],
}

/// One star quad (screen space)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct StarInstance {
    pub pos: [f32; 2],
    pub size: f32,
    pub alpha: f32,
}

/// A light source in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub pos: Vec2,
    /// World pixels
    pub radius: f32,
    pub intensity: f32,
    pub color: [f32; 4],
}

impl PointLight {
    /// Lantern glow around the player, stronger at night
    pub fn player_glow(pos: Vec2, darkness: f32) -> Self {
        Self {
            pos,
            radius: 60.0 + 50.0 * darkness,
            intensity: 0.65 * darkness,
            color: colors::PLAYER_GLOW,
        }
    }

    /// Light from a placed block with the given light level
    pub fn block(center: Vec2, level: f32) -> Self {
        Self {
            pos: center,
            radius: 80.0 * level,
            intensity: level,
            color: colors::FIRE_GLOW,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.intensity > 0.0 && self.radius > 0.0
    }

    pub fn to_instance(&self, camera: &Camera) -> LightInstance {
        LightInstance {
            center: camera.world_to_screen(self.pos).to_array(),
            radius: self.radius * camera.scale(),
            intensity: self.intensity,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    pos: Vec2,
    size: f32,
    alpha: f32,
    twinkle_rate: f32,
    phase: f32,
}

/// Seeded star positions, regenerated whenever the viewport size changes
#[derive(Debug, Clone)]
pub struct Starfield {
    seed: u64,
    count: usize,
    size: Vec2,
    stars: Vec<Star>,
}

impl Starfield {
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            seed,
            count,
            size: Vec2::ZERO,
            stars: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Regenerate for a new viewport size; a no-op if the size is unchanged
    pub fn ensure_size(&mut self, viewport: Vec2) {
        if viewport == self.size && self.stars.len() == self.count {
            return;
        }
        let mut rng = Pcg32::seed_from_u64(self.seed);
        self.stars = (0..self.count)
            .map(|_| Star {
                pos: Vec2::new(rng.random::<f32>() * viewport.x, rng.random::<f32>() * viewport.y),
                size: 0.6 + rng.random::<f32>() * 1.4,
                alpha: 0.5 + rng.random::<f32>() * 0.5,
                twinkle_rate: 0.5 + rng.random::<f32>() * 1.5,
                phase: rng.random::<f32>() * TAU,
            })
            .collect();
        self.size = viewport;
        log::debug!("Regenerated {} stars for {}x{}", self.count, viewport.x, viewport.y);
    }

    /// Star quads at `time_secs`, faded by `fade`
    pub fn instances(&self, time_secs: f32, fade: f32) -> Vec<StarInstance> {
        self.stars
            .iter()
            .map(|s| {
                let twinkle = 0.6 + 0.4 * (time_secs * s.twinkle_rate + s.phase).sin();
                StarInstance {
                    pos: s.pos.to_array(),
                    size: s.size,
                    alpha: fade * s.alpha * (0.4 + 0.6 * twinkle),
                }
            })
            .collect()
    }
}

/// One full-screen lighting pass
#[derive(Debug, Clone, PartialEq)]
pub enum CompositePass {
    /// Vertical gradient darkening the scene
    Ambient { top: [f32; 4], bottom: [f32; 4] },
    /// Golden hour gradient
    WarmTint { top: [f32; 4], bottom: [f32; 4] },
    Stars { stars: Vec<StarInstance> },
    Lights { lights: Vec<LightInstance> },
    /// Radial edge darkening between the two radii
    Vignette {
        center: [f32; 2],
        inner_radius: f32,
        outer_radius: f32,
        alpha: f32,
    },
}

impl CompositePass {
    pub fn blend(&self) -> Blend {
        match self {
            CompositePass::Ambient { .. } | CompositePass::Vignette { .. } => Blend::Multiply,
            CompositePass::WarmTint { .. } => Blend::Screen,
            CompositePass::Stars { .. } => Blend::Over,
            CompositePass::Lights { .. } => Blend::Additive,
        }
    }

    /// Position in the compositing order
    pub fn rank(&self) -> u8 {
        match self {
            CompositePass::Ambient { .. } => 0,
            CompositePass::WarmTint { .. } => 1,
            CompositePass::Stars { .. } => 2,
            CompositePass::Lights { .. } => 3,
            CompositePass::Vignette { .. } => 4,
        }
    }
}

fn with_alpha(rgb: [f32; 4], alpha: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], clamp01(alpha)]
}

/// Lighting passes for the current cycle, in compositing order.
///
/// Passes with nothing to contribute are left out: the warm tint outside
/// golden hour, stars while it is light, lights when none are visible.
pub fn composite_plan(
    cycle: &Cycle,
    camera: &Camera,
    lights: &[PointLight],
    starfield: &Starfield,
    time_secs: f32,
) -> Vec<CompositePass> {
    let d = cycle.darkness;
    let viewport = camera.viewport();
    let mut passes = Vec::with_capacity(5);

    passes.push(CompositePass::Ambient {
        top: with_alpha(colors::NIGHT_TOP, lerp(0.10, 0.45, d)),
        bottom: with_alpha(colors::NIGHT_BOTTOM, lerp(0.15, 0.60, d)),
    });

    if cycle.warm_tint > 0.01 {
        let light = clamp01(1.0 - d);
        passes.push(CompositePass::WarmTint {
            top: with_alpha(colors::WARM_TOP, 0.35 * cycle.warm_tint * light),
            bottom: with_alpha(colors::WARM_BOTTOM, 0.15 * cycle.warm_tint * light),
        });
    }

    if d > 0.25 {
        let fade = clamp01((d - 0.25) / 0.75) * 0.9;
        passes.push(CompositePass::Stars {
            stars: starfield.instances(time_secs, fade),
        });
    }

    let instances: Vec<LightInstance> = lights
        .iter()
        .filter(|l| l.is_visible())
        .map(|l| l.to_instance(camera))
        .collect();
    if !instances.is_empty() {
        passes.push(CompositePass::Lights { lights: instances });
    }

    passes.push(CompositePass::Vignette {
        center: (viewport * 0.5).to_array(),
        inner_radius: viewport.min_element() / 2.2,
        outer_radius: viewport.max_element(),
        alpha: lerp(0.10, 0.45, d),
    });

    passes
}
