use glam::Vec3;

/// Read-only navigation-mesh queries.
///
/// Movement itself is requested through [`crate::AgentCommand`]s; this oracle
/// only answers reachability questions for cover selection and wandering.
pub trait NavigationOracle: Send + Sync {
    /// Returns true when `point` lies on (or snaps onto) walkable surface.
    fn is_navigable(&self, point: Vec3) -> bool;

    /// Computes a path between two points.
    fn path(&self, from: Vec3, to: Vec3) -> PathQuery;
}

/// Completeness of a computed path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStatus {
    Complete,
    /// The path stops short of the requested target.
    Partial,
    Invalid,
}

/// Result of [`NavigationOracle::path`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathQuery {
    pub status: PathStatus,
    /// Walking length of the path.
    pub length: f32,
    /// Where the path actually ends.
    pub end: Vec3,
}

impl PathQuery {
    pub fn complete(length: f32, end: Vec3) -> Self {
        Self {
            status: PathStatus::Complete,
            length,
            end,
        }
    }

    pub fn partial(length: f32, end: Vec3) -> Self {
        Self {
            status: PathStatus::Partial,
            length,
            end,
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: PathStatus::Invalid,
            length: f32::INFINITY,
            end: Vec3::ZERO,
        }
    }
}
