use glam::Vec3;

/// Blocking-geometry queries used by sensors and the manager.
///
/// Implementations wrap whatever the host uses for collision (a physics
/// engine, a BVH, a grid). The core treats every call as a pure function.
pub trait SightOracle: Send + Sync {
    /// Casts a segment from `from` to `to` against blocking geometry.
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> LineOfSight;

    /// Returns true when an axis-aligned box overlaps blocking geometry.
    fn overlap_box(&self, center: Vec3, half_extents: Vec3) -> bool;

    fn is_clear(&self, from: Vec3, to: Vec3) -> bool {
        !self.line_of_sight(from, to).blocked
    }
}

/// Outcome of a linecast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineOfSight {
    pub blocked: bool,
    /// Distance to the nearest hit, or the full segment length when clear.
    pub hit_distance: f32,
}

impl LineOfSight {
    pub fn clear(length: f32) -> Self {
        Self {
            blocked: false,
            hit_distance: length,
        }
    }

    pub fn blocked_at(distance: f32) -> Self {
        Self {
            blocked: true,
            hit_distance: distance,
        }
    }
}
