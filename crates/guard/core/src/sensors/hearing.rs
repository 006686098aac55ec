use glam::Vec3;

use super::Sensors;
use crate::common::planar_distance;
use crate::config::AiConfig;

/// A sound emitted somewhere in the world.
///
/// Built by an emitter, dispatched synchronously to every listener in range,
/// then dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundStimulus {
    pub position: Vec3,
    /// Bypasses distance falloff; always heard by listeners whose cylinder contains it.
    pub loud: bool,
    /// Nominal radius of the sound.
    pub distance: f32,
    /// Priority weight applied to the attenuated level.
    pub multiplier: f32,
}

impl SoundStimulus {
    pub fn new(position: Vec3, distance: f32) -> Self {
        Self {
            position,
            loud: false,
            distance,
            multiplier: 1.0,
        }
    }

    pub fn loud(position: Vec3) -> Self {
        Self {
            position,
            loud: true,
            distance: 0.0,
            multiplier: 1.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }
}

impl Sensors {
    /// Evaluates a sound at `listener` (feet position).
    ///
    /// Returns true when the active state should react. Continuous sounds are
    /// debounced: within the debounce window only a louder noise reports again.
    pub fn hear(
        &mut self,
        config: &AiConfig,
        listener: Vec3,
        alerted: bool,
        stimulus: &SoundStimulus,
        now: f32,
    ) -> bool {
        let base = listener.y + config.hearing_base_offset;
        if stimulus.position.y < base || stimulus.position.y > base + config.hearing_height {
            return false;
        }

        if stimulus.loud {
            self.noise_level = stimulus.multiplier.max(1.0);
            self.last_noise_at = Some(now);
            return true;
        }

        let radius = config.effective_hearing_radius(alerted) + stimulus.distance;
        if radius <= 0.0 {
            return false;
        }
        let level =
            (1.0 - planar_distance(listener, stimulus.position) / radius) * stimulus.multiplier;
        if level < config.noise_threshold {
            return false;
        }

        let window_elapsed = self
            .last_noise_at
            .is_none_or(|at| now - at > config.noise_debounce);
        if level > self.noise_level || window_elapsed {
            tracing::trace!(level, "noise heard");
            self.noise_level = level;
            self.last_noise_at = Some(now);
            true
        } else {
            false
        }
    }
}
