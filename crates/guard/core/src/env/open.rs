use glam::Vec3;

use super::{LineOfSight, NavigationOracle, PathQuery, SightOracle};

/// An empty, flat world: nothing blocks sight and every point is reachable in
/// a straight line.
///
/// Useful for headless runs and as the baseline in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenField;

impl SightOracle for OpenField {
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> LineOfSight {
        LineOfSight::clear(from.distance(to))
    }

    fn overlap_box(&self, _center: Vec3, _half_extents: Vec3) -> bool {
        false
    }
}

impl NavigationOracle for OpenField {
    fn is_navigable(&self, _point: Vec3) -> bool {
        true
    }

    fn path(&self, from: Vec3, to: Vec3) -> PathQuery {
        PathQuery::complete(from.distance(to), to)
    }
}
