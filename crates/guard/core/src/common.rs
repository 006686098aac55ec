use std::fmt;

use glam::{Vec2, Vec3};

/// Unique identifier for an agent registered with a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a zone inside the zone registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone:{}", self.0)
    }
}

/// Handle of a static cover slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CoverId(pub u32);

impl fmt::Display for CoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cover:{}", self.0)
    }
}

/// Handle of a patrol path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PathId(pub u32);

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path:{}", self.0)
    }
}

/// Handle of an attention or fear marker placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MarkerId(pub u32);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker:{}", self.0)
    }
}

/// Simulation time bookkeeping, advanced once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clock {
    /// Seconds since the simulation started.
    pub time: f32,
    /// Number of completed ticks.
    pub frame: u64,
    /// Length of the tick currently being processed.
    pub dt: f32,
}

impl Clock {
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt;
        self.time += dt;
        self.frame += 1;
    }
}

/// A countdown expressed in seconds, decremented each tick.
///
/// Waiting in the simulation is never thread suspension: every delay is one of
/// these, ticked by the owning state.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Countdown {
    remaining: f32,
    duration: f32,
}

impl Countdown {
    /// Remaining time at or below this counts as finished, absorbing float drift
    /// from summing many small `dt` values.
    pub const EPSILON: f32 = 1e-4;

    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            remaining: duration,
            duration,
        }
    }

    /// A countdown of the given length that has already run out.
    pub fn expired(duration: f32) -> Self {
        Self {
            remaining: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Decrements by `dt` and reports whether the countdown has finished.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.is_finished()
    }

    /// Counts back up by `dt`, capped at the full duration.
    pub fn recover(&mut self, dt: f32) {
        self.remaining = (self.remaining + dt).min(self.duration);
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    pub fn restart(&mut self, duration: f32) {
        *self = Self::new(duration);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= Self::EPSILON
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Remaining fraction in `[0, 1]`; zero-length countdowns report 0.
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Projects a world point onto the ground plane (x, z).
#[inline]
pub fn planar(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

/// Horizontal distance between two world points, ignoring height.
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}
