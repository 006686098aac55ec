//! Vision cone, override rectangle and marker scanning.

use glam::Vec3;

use super::{PlayerView, Sensors};
use crate::agent::StateKind;
use crate::common::{AgentId, MarkerId};
use crate::config::AiConfig;
use crate::env::SightOracle;
use crate::markers::{MarkerKind, Markers};

/// Confidence tier of a sighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SensorBand {
    /// Close, narrow cone or the override rectangle.
    Inner,
    /// Wide peripheral cone.
    #[default]
    Outer,
}

/// Which body point of the player produced the sighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum VisionPoint {
    #[default]
    Center,
    Feet,
    Head,
}

impl VisionPoint {
    /// Points are tested in this order; the first visible one wins.
    pub const SCAN_ORDER: [VisionPoint; 3] = [Self::Center, Self::Feet, Self::Head];
}

/// Output of one sensor poll. Recomputed every tick, never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisionResult {
    pub player_visible: bool,
    pub band: SensorBand,
    pub point: VisionPoint,
    /// Distance from the eye to the sighted point (`INFINITY` when unseen).
    pub distance: f32,
    /// First visible attention marker.
    pub attention_point: Option<MarkerId>,
    /// First visible fear marker.
    pub fear_point: Option<MarkerId>,
}

impl Default for VisionResult {
    fn default() -> Self {
        Self {
            player_visible: false,
            band: SensorBand::Outer,
            point: VisionPoint::Center,
            distance: f32::INFINITY,
            attention_point: None,
            fear_point: None,
        }
    }
}

impl VisionResult {
    pub fn sees_player_in(&self, band: SensorBand) -> bool {
        self.player_visible && self.band == band
    }
}

/// Where an agent looks from, and in which state it is looking.
#[derive(Clone, Copy, Debug)]
pub struct VisionProbe {
    pub observer: AgentId,
    pub eye: Vec3,
    pub forward: Vec3,
    pub state: StateKind,
}

/// Orthonormal view basis with a horizontal forward axis.
struct ViewFrame {
    forward: Vec3,
    right: Vec3,
}

impl ViewFrame {
    fn new(forward: Vec3) -> Self {
        let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        let forward = if flat == Vec3::ZERO { Vec3::Z } else { flat };
        Self {
            forward,
            right: forward.cross(Vec3::Y),
        }
    }

    /// Expresses a world-space offset as (right, up, forward).
    fn local(&self, offset: Vec3) -> Vec3 {
        Vec3::new(offset.dot(self.right), offset.y, offset.dot(self.forward))
    }
}

fn in_override_rect(config: &AiConfig, state: StateKind, local: Vec3) -> bool {
    let scale = if state == StateKind::Idle {
        1.0
    } else {
        config.override_rect_alert_scale
    };
    let rect = config.override_rect;
    local.z >= 0.0
        && local.z <= rect.length * scale
        && local.x.abs() <= rect.width * 0.5 * scale
        && local.y.abs() <= rect.height * 0.5 * scale
}

fn cone_band(config: &AiConfig, local: Vec3, widened: bool) -> Option<SensorBand> {
    let bonus = if widened {
        config.visible_angle_bonus
    } else {
        0.0
    };
    let inner_half = (config.inner_cone_angle * 0.5 + bonus).to_radians();
    let outer_half = (config.outer_cone_angle * 0.5 + bonus).to_radians();

    let horizontal = local.x.abs().atan2(local.z);
    let ground = (local.x * local.x + local.z * local.z).sqrt();
    let vertical = local.y.abs().atan2(ground) * config.vertical_angle_multiplier;

    if horizontal <= inner_half && vertical <= inner_half {
        Some(SensorBand::Inner)
    } else if horizontal <= outer_half && vertical <= outer_half {
        Some(SensorBand::Outer)
    } else {
        None
    }
}

/// Geometric classification of a single point, without occlusion.
fn classify(
    config: &AiConfig,
    probe: &VisionProbe,
    frame: &ViewFrame,
    target: Vec3,
    widened: bool,
) -> Option<(SensorBand, f32)> {
    let offset = target - probe.eye;
    let distance = offset.length();
    if distance > config.vision_distance {
        return None;
    }

    let local = frame.local(offset);
    if in_override_rect(config, probe.state, local) {
        return Some((SensorBand::Inner, distance));
    }
    cone_band(config, local, widened).map(|band| (band, distance))
}

fn hiding_reveal_distance(config: &AiConfig, state: StateKind) -> f32 {
    match state {
        StateKind::Aggression | StateKind::Cover => config.hiding_reveal_distance_alert,
        StateKind::Idle | StateKind::Attention | StateKind::Sleep | StateKind::Climb => {
            config.hiding_reveal_distance_calm
        }
    }
}

impl Sensors {
    /// Evaluates what the agent sees this tick.
    pub fn poll(
        &mut self,
        probe: &VisionProbe,
        config: &AiConfig,
        player: &PlayerView,
        markers: &Markers,
        sight: &dyn SightOracle,
    ) -> VisionResult {
        let frame = ViewFrame::new(probe.forward);
        let mut result = VisionResult::default();

        for point in VisionPoint::SCAN_ORDER {
            let target = player.point(point);
            let Some((band, distance)) = classify(config, probe, &frame, target, self.was_visible)
            else {
                continue;
            };
            if !sight.is_clear(probe.eye, target) {
                continue;
            }
            result.player_visible = true;
            result.band = band;
            result.point = point;
            result.distance = distance;
            break;
        }

        if result.player_visible
            && player.hiding
            && result.distance > hiding_reveal_distance(config, probe.state)
        {
            tracing::trace!(agent = %probe.observer, "player hidden in cover foliage");
            result = VisionResult::default();
        }

        for marker in markers.iter() {
            if !marker.is_observable_by(probe.observer) {
                continue;
            }
            let slot = match marker.kind {
                MarkerKind::Attention => &mut result.attention_point,
                MarkerKind::Fear => &mut result.fear_point,
            };
            if slot.is_some() {
                continue;
            }
            if classify(config, probe, &frame, marker.position, false).is_some()
                && sight.is_clear(probe.eye, marker.position)
            {
                *slot = Some(marker.id);
            }
        }

        self.was_visible = result.player_visible;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{LineOfSight, OpenField};

    struct Wall;

    impl SightOracle for Wall {
        fn line_of_sight(&self, _from: Vec3, _to: Vec3) -> LineOfSight {
            LineOfSight::blocked_at(1.0)
        }

        fn overlap_box(&self, _center: Vec3, _half_extents: Vec3) -> bool {
            true
        }
    }

    /// Blocks only segments ending below the given height.
    struct LowWall(f32);

    impl SightOracle for LowWall {
        fn line_of_sight(&self, from: Vec3, to: Vec3) -> LineOfSight {
            if to.y < self.0 {
                LineOfSight::blocked_at(from.distance(to) * 0.5)
            } else {
                LineOfSight::clear(from.distance(to))
            }
        }

        fn overlap_box(&self, _center: Vec3, _half_extents: Vec3) -> bool {
            false
        }
    }

    fn probe(state: StateKind) -> VisionProbe {
        VisionProbe {
            observer: AgentId(1),
            eye: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::Z,
            state,
        }
    }

    fn poll(player: PlayerView, state: StateKind, sight: &dyn SightOracle) -> VisionResult {
        let mut sensors = Sensors::default();
        sensors.poll(
            &probe(state),
            &AiConfig::default(),
            &player,
            &Markers::new(),
            sight,
        )
    }

    #[test]
    fn player_straight_ahead_is_inner() {
        let result = poll(
            PlayerView::standing(Vec3::new(0.0, 0.0, 10.0)),
            StateKind::Idle,
            &OpenField,
        );
        assert!(result.player_visible);
        assert_eq!(result.band, SensorBand::Inner);
        assert_eq!(result.point, VisionPoint::Center);
    }

    #[test]
    fn player_beyond_vision_distance_is_never_visible() {
        let config = AiConfig::default();
        for angle in [0.0_f32, 10.0, 45.0, 90.0] {
            let (sin, cos) = angle.to_radians().sin_cos();
            let distance = config.vision_distance + 0.5;
            let player = PlayerView::standing(Vec3::new(sin * distance, 0.0, cos * distance));
            let result = poll(player, StateKind::Aggression, &OpenField);
            assert!(!result.player_visible, "visible at {angle} degrees");
        }
    }

    #[test]
    fn peripheral_player_is_outer() {
        // 50 degrees off-axis: outside the 30 degree inner half-angle, inside the 60 degree outer.
        let (sin, cos) = 50.0_f32.to_radians().sin_cos();
        let result = poll(
            PlayerView::standing(Vec3::new(sin * 10.0, 0.0, cos * 10.0)),
            StateKind::Idle,
            &OpenField,
        );
        assert!(result.player_visible);
        assert_eq!(result.band, SensorBand::Outer);
    }

    #[test]
    fn player_behind_is_not_visible() {
        let result = poll(
            PlayerView::standing(Vec3::new(0.0, 0.0, -6.0)),
            StateKind::Idle,
            &OpenField,
        );
        assert!(!result.player_visible);
    }

    #[test]
    fn occluded_player_is_not_visible() {
        let result = poll(
            PlayerView::standing(Vec3::new(0.0, 0.0, 10.0)),
            StateKind::Idle,
            &Wall,
        );
        assert!(!result.player_visible);
    }

    #[test]
    fn head_is_tested_when_center_and_feet_are_blocked() {
        let player = PlayerView::standing(Vec3::new(0.0, 0.0, 10.0));
        let head_height = player.point(VisionPoint::Head).y;
        let result = poll(player, StateKind::Idle, &LowWall(head_height - 0.01));
        assert!(result.player_visible);
        assert_eq!(result.point, VisionPoint::Head);
    }

    #[test]
    fn hiding_player_is_only_seen_up_close() {
        let far = PlayerView::standing(Vec3::new(0.0, 0.0, 4.0)).hidden(true);
        assert!(!poll(far, StateKind::Idle, &OpenField).player_visible);
        // Aggression reveals hidden players from further away.
        assert!(poll(far, StateKind::Aggression, &OpenField).player_visible);

        let near = PlayerView::standing(Vec3::new(0.0, 0.0, 1.0)).hidden(true);
        assert!(poll(near, StateKind::Idle, &OpenField).player_visible);
    }

    #[test]
    fn cone_widens_once_player_was_visible() {
        // Just outside the outer half-angle of 60 degrees.
        let (sin, cos) = 62.0_f32.to_radians().sin_cos();
        let player = PlayerView::standing(Vec3::new(sin * 10.0, 0.0, cos * 10.0));
        let config = AiConfig::default();
        let mut sensors = Sensors::default();
        let markers = Markers::new();

        let first = sensors.poll(&probe(StateKind::Idle), &config, &player, &markers, &OpenField);
        assert!(!first.player_visible);

        sensors.was_visible = true;
        let widened = sensors.poll(&probe(StateKind::Idle), &config, &player, &markers, &OpenField);
        assert!(widened.player_visible);
        assert_eq!(widened.band, SensorBand::Outer);
    }

    #[test]
    fn markers_owned_by_observer_are_ignored() {
        let mut markers = Markers::new();
        markers.add(MarkerKind::Attention, Vec3::new(0.0, 0.5, 5.0), Some(AgentId(1)));
        let fear = markers.add(MarkerKind::Fear, Vec3::new(1.0, 0.5, 6.0), None);
        let attention = markers.add(MarkerKind::Attention, Vec3::new(-1.0, 0.5, 7.0), None);

        let mut sensors = Sensors::default();
        let result = sensors.poll(
            &probe(StateKind::Idle),
            &AiConfig::default(),
            &PlayerView::standing(Vec3::new(0.0, 0.0, -50.0)),
            &markers,
            &OpenField,
        );
        assert!(!result.player_visible);
        assert_eq!(result.attention_point, Some(attention));
        assert_eq!(result.fear_point, Some(fear));
    }
}
