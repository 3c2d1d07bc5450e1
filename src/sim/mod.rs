//! Frame-driven simulation
//!
//! All gameplay logic lives here. Given the same seed and the same sequence
//! of inputs and frame deltas, two worlds evolve identically:
//! - Seeded RNG only
//! - Stable iteration order (NPCs by spawn order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod npc;
pub mod placeable;
pub mod placement;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod time;

pub use camera::{Camera, CameraState};
pub use collision::{Aabb, CollisionField, resolve_entity_overlap};
pub use npc::{Interaction, Npc, NpcShape, ScheduleState};
pub use placeable::{Placeable, PlaceableKind};
pub use placement::{PlacementParams, place_trees};
pub use schedule::{Schedule, Segment, Waypoint};
pub use state::{DroppedItem, MenuState, Notification, Player, WorldState};
pub use tick::{SKIP_MINUTES, TickInput, tick};
pub use time::{ClockReading, Cycle, TimeModel};
