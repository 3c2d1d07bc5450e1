//! Platform abstraction layer
//!
//! Turns raw key and pointer events into per-tick simulation input. Event
//! delivery itself (window, DOM, terminal) belongs to the host.

pub mod input;

pub use input::{InputState, PointerButton};
