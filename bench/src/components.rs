//! Common component types used across benchmarks.
//!
//! Sized like typical game components, each wired to the store a game would likely pick
//! for its access pattern.

use strata::{
    Component,
    store::{CacheStore, MapStore, SetStore, Spatial, SpatialIndexStore},
};

/// Slots in the [`Velocity`] front cache.
pub const VELOCITY_CACHE_SLOTS: usize = 256;

// =============================================================================
// Movement Components
// =============================================================================

/// 2D position component (8 bytes), indexed on a spatial grid.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
#[component(storage = SpatialIndexStore<MapStore<Self>>)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Spatial for Position {
    #[inline]
    fn location(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// 2D velocity component (8 bytes), written every frame so kept behind a cache.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
#[component(storage = CacheStore<MapStore<Self>, VELOCITY_CACHE_SLOTS>)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

// =============================================================================
// Game Entity Components
// =============================================================================

/// Health component for damageable entities.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Team/faction identifier.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Team {
    pub id: u32,
}

/// Remaining lifetime for short-lived entities.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Lifetime {
    pub remaining: f32,
}

/// An enemy marker.
#[derive(Component, Clone, Copy, Debug, Default)]
#[component(storage = SetStore<Self>)]
pub struct Enemy;

/// A projectile marker.
#[derive(Component, Clone, Copy, Debug, Default)]
#[component(storage = SetStore<Self>)]
pub struct Projectile;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn document_component_sizes() {
        assert_eq!(size_of::<Position>(), 8);
        assert_eq!(size_of::<Velocity>(), 8);
        assert_eq!(size_of::<Health>(), 8);
        assert_eq!(size_of::<Team>(), 4);
        assert_eq!(size_of::<Lifetime>(), 4);

        // Markers (ZST)
        assert_eq!(size_of::<Enemy>(), 0);
        assert_eq!(size_of::<Projectile>(), 0);
    }
}
