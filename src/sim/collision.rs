//! Axis-aligned collision queries
//!
//! Static geometry (tree trunks, placed blocks) blocks a move outright; there
//! is no sliding along walls. Entities (NPCs) instead push the mover out along
//! the axis of least penetration so an idle NPC can never trap the player.
//! Edges that merely touch do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box stored as min corner + size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Box of `half` extents around `center`
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            size: half * 2.0,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict interior overlap; shared edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    /// Point test, edges inclusive (pointer picking)
    pub fn contains_point(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            size: self.size,
        }
    }
}

/// Static blocking geometry for one world
#[derive(Debug, Clone, Default)]
pub struct CollisionField {
    boxes: Vec<Aabb>,
}

impl CollisionField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_boxes(boxes: impl IntoIterator<Item = Aabb>) -> Self {
        Self {
            boxes: boxes.into_iter().collect(),
        }
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn insert(&mut self, aabb: Aabb) {
        self.boxes.push(aabb);
    }

    pub fn extend(&mut self, boxes: impl IntoIterator<Item = Aabb>) {
        self.boxes.extend(boxes);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// True if a box of `size` centered on `candidate` overlaps any static box
    pub fn query(&self, candidate: Vec2, size: f32) -> bool {
        let probe = Aabb::from_center(candidate, Vec2::splat(size * 0.5));
        self.boxes.iter().any(|b| probe.overlaps(b))
    }
}

/// Push a mover of `size` at `candidate` out of every overlapping entity box.
///
/// Each overlap is resolved along its axis of least penetration, leaving the
/// mover exactly edge-to-edge with the entity.
pub fn resolve_entity_overlap(candidate: Vec2, size: f32, entities: &[Aabb]) -> Vec2 {
    let half = Vec2::splat(size * 0.5);
    let mut pos = candidate;

    for entity in entities {
        let mover = Aabb::from_center(pos, half);
        if !mover.overlaps(entity) {
            continue;
        }
        pos = separate(pos, half, &mover, entity);
    }

    pos
}

/// Place the mover edge-to-edge with `obstacle` on the shallower axis
fn separate(pos: Vec2, half: Vec2, mover: &Aabb, obstacle: &Aabb) -> Vec2 {
    let delta = mover.center() - obstacle.center();
    let overlap = (mover.size + obstacle.size) * 0.5 - delta.abs();
    let max = obstacle.max();

    // Dead-center hits push toward +x / +y
    if overlap.x < overlap.y {
        let x = if delta.x < 0.0 { obstacle.min.x - half.x } else { max.x + half.x };
        Vec2::new(x, pos.y)
    } else {
        let y = if delta.y < 0.0 { obstacle.min.y - half.y } else { max.y + half.y };
        Vec2::new(pos.x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field() -> CollisionField {
        CollisionField::from_boxes([Aabb::new(100.0, 100.0, 16.0, 16.0)])
    }

    #[test]
    fn test_query_interior_overlap_blocks() {
        // 8px box centered at (98, 108) spans x 94..102, overlapping 100..116
        assert!(field().query(Vec2::new(98.0, 108.0), 8.0));
    }

    #[test]
    fn test_query_edge_touch_is_free() {
        // Right edge at exactly x = 100
        assert!(!field().query(Vec2::new(96.0, 108.0), 8.0));
        // Bottom edge at exactly y = 100
        assert!(!field().query(Vec2::new(108.0, 96.0), 8.0));
        // Corner touch
        assert!(!field().query(Vec2::new(120.0, 120.0), 8.0));
    }

    #[test]
    fn test_query_disjoint_is_free() {
        assert!(!field().query(Vec2::new(10.0, 10.0), 8.0));
        assert!(!CollisionField::new().query(Vec2::new(108.0, 108.0), 8.0));
    }

    #[test]
    fn test_resolve_pushes_out_on_shallow_axis() {
        let npc = Aabb::new(100.0, 100.0, 16.0, 16.0);
        // Mover overlaps npc by 2px on the left side
        let resolved = resolve_entity_overlap(Vec2::new(98.0, 108.0), 8.0, &[npc]);
        assert_eq!(resolved, Vec2::new(96.0, 108.0));
        let mover = Aabb::from_center(resolved, Vec2::splat(4.0));
        assert!(!mover.overlaps(&npc));
    }

    #[test]
    fn test_resolve_leaves_free_position_alone() {
        let npc = Aabb::new(100.0, 100.0, 16.0, 16.0);
        let pos = Vec2::new(50.0, 50.0);
        assert_eq!(resolve_entity_overlap(pos, 8.0, &[npc]), pos);
    }

    #[test]
    fn test_contains_point_inclusive() {
        let b = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains_point(Vec2::new(10.0, 10.0)));
        assert!(!b.contains_point(Vec2::new(10.1, 5.0)));
    }

    proptest! {
        #[test]
        fn prop_overlap_matches_interval_test(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0, aw in 0.5f32..30.0, ah in 0.5f32..30.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0, bw in 0.5f32..30.0, bh in 0.5f32..30.0,
        ) {
            let a = Aabb::new(ax, ay, aw, ah);
            let b = Aabb::new(bx, by, bw, bh);
            let x = ax < bx + bw && bx < ax + aw;
            let y = ay < by + bh && by < ay + ah;
            prop_assert_eq!(a.overlaps(&b), x && y);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_resolved_mover_is_clear(
            px in 80.0f32..136.0, py in 80.0f32..136.0,
        ) {
            let npc = Aabb::new(100.0, 100.0, 16.0, 16.0);
            let resolved = resolve_entity_overlap(Vec2::new(px, py), 8.0, &[npc]);
            let mover = Aabb::from_center(resolved, Vec2::splat(4.0));
            prop_assert!(!mover.overlaps(&npc));
        }
    }
}
