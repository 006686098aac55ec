//! Per-agent perception: vision polling and sound reception.
//!
//! Sensors hold only the little memory perception needs between polls (was
//! the player visible last time, how loud was the last reported noise). The
//! results they produce are ephemeral and recomputed every tick.
mod hearing;
mod vision;

use glam::Vec3;

pub use hearing::SoundStimulus;
pub use vision::{SensorBand, VisionPoint, VisionProbe, VisionResult};

/// What the sensors need to know about the player this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerView {
    /// Feet position.
    pub position: Vec3,
    pub height: f32,
    /// Crouched inside foliage or similar concealment.
    pub hiding: bool,
}

impl PlayerView {
    pub const DEFAULT_HEIGHT: f32 = 1.8;

    pub fn standing(position: Vec3) -> Self {
        Self {
            position,
            height: Self::DEFAULT_HEIGHT,
            hiding: false,
        }
    }

    pub fn hidden(mut self, hiding: bool) -> Self {
        self.hiding = hiding;
        self
    }

    /// World-space location of one of the tested body points.
    pub fn point(&self, point: VisionPoint) -> Vec3 {
        let offset = match point {
            VisionPoint::Feet => 0.1,
            VisionPoint::Center => self.height * 0.5,
            VisionPoint::Head => self.height * 0.9,
        };
        self.position + Vec3::Y * offset
    }

    pub fn head(&self) -> Vec3 {
        self.point(VisionPoint::Head)
    }
}

impl Default for PlayerView {
    fn default() -> Self {
        Self::standing(Vec3::ZERO)
    }
}

/// Perception memory carried by each agent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensors {
    /// Player was visible on the previous poll; widens the cones.
    was_visible: bool,
    /// Attenuated level of the last reported noise.
    noise_level: f32,
    /// Simulation time of the last reported noise.
    last_noise_at: Option<f32>,
}

impl Sensors {
    pub fn was_visible(&self) -> bool {
        self.was_visible
    }

    /// Forgets the previous sighting, e.g. while asleep.
    pub fn blind(&mut self) {
        self.was_visible = false;
    }
}
