//! Asset readiness tracking
//!
//! Loads happen outside the core and are fire-and-forget. The loader reports
//! back through `mark_ready`; until then every use of the asset is a silent
//! no-op.

use std::collections::HashMap;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetStatus {
    Loading,
    /// Loaded, with its pixel size
    Ready(Vec2),
    Failed,
}

/// Readiness flags for every requested asset, keyed by path
#[derive(Debug, Default)]
pub struct AssetStore {
    entries: HashMap<String, AssetStatus>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a load; repeated requests are ignored
    pub fn request(&mut self, path: &str) {
        self.entries
            .entry(path.to_string())
            .or_insert(AssetStatus::Loading);
    }

    pub fn mark_ready(&mut self, path: &str, size: Vec2) {
        log::debug!("Asset ready: {path} ({}x{})", size.x, size.y);
        self.entries.insert(path.to_string(), AssetStatus::Ready(size));
    }

    pub fn mark_failed(&mut self, path: &str) {
        log::warn!("Asset failed to load: {path}");
        self.entries.insert(path.to_string(), AssetStatus::Failed);
    }

    pub fn status(&self, path: &str) -> Option<AssetStatus> {
        self.entries.get(path).copied()
    }

    pub fn is_ready(&self, path: &str) -> bool {
        matches!(self.status(path), Some(AssetStatus::Ready(_)))
    }

    /// Pixel size of a ready asset
    pub fn size(&self, path: &str) -> Option<Vec2> {
        match self.status(path) {
            Some(AssetStatus::Ready(size)) => Some(size),
            _ => None,
        }
    }

    /// Paths still waiting on the loader
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, s)| matches!(s, AssetStatus::Loading))
            .map(|(p, _)| p.as_str())
    }
}
