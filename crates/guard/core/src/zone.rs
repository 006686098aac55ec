//! Zones: spatial partitions owning an agent roster and a shared alarm.
//!
//! A zone validates movement targets so converging agents keep their spacing
//! and carries a decaying alarm that reports area-level aggression. Zones may
//! overlap; an agent's assigned zone is its single authoritative owner.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use crate::common::{AgentId, ZoneId, planar};

/// Escalation a zone can force onto its roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Escalation {
    Attention,
    Aggression,
}

/// Prism bounds: a ground-plane polygon extruded between two heights.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneBounds {
    /// Polygon on the (x, z) plane.
    pub outline: Vec<Vec2>,
    pub floor: f32,
    pub ceiling: f32,
}

impl ZoneBounds {
    pub fn new(outline: Vec<Vec2>, floor: f32, ceiling: f32) -> Self {
        Self {
            outline,
            floor,
            ceiling,
        }
    }

    /// Axis-aligned rectangle between two ground corners.
    pub fn rect(min: Vec2, max: Vec2, floor: f32, ceiling: f32) -> Self {
        Self::new(
            vec![
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
            ],
            floor,
            ceiling,
        )
    }

    /// Ray-parity inside test.
    pub fn contains(&self, point: Vec3) -> bool {
        if point.y < self.floor || point.y > self.ceiling || self.outline.len() < 3 {
            return false;
        }
        let p = planar(point);
        let mut inside = false;
        let mut j = self.outline.len() - 1;
        for i in 0..self.outline.len() {
            let a = self.outline[i];
            let b = self.outline[j];
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[derive(Clone, Debug)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub bounds: ZoneBounds,
    /// Attention raised here also reaches overlapping zones.
    pub crossing_attention: bool,
    roster: Vec<AgentId>,
    /// Alarm level in `[0, 1]`; positive means area aggression.
    alarm: f32,
    /// Last movement target registered by each agent.
    moves: BTreeMap<AgentId, Vec3>,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>, bounds: ZoneBounds) -> Self {
        Self {
            id,
            name: name.into(),
            bounds,
            crossing_attention: false,
            roster: Vec::new(),
            alarm: 0.0,
            moves: BTreeMap::new(),
        }
    }

    pub fn roster(&self) -> &[AgentId] {
        &self.roster
    }

    pub fn add_ai(&mut self, agent: AgentId) {
        if !self.roster.contains(&agent) {
            self.roster.push(agent);
        }
        self.moves.remove(&agent);
    }

    pub fn remove_ai(&mut self, agent: AgentId) {
        self.roster.retain(|member| *member != agent);
        self.moves.remove(&agent);
    }

    pub fn add_move(&mut self, agent: AgentId, point: Vec3) {
        self.moves.insert(agent, point);
    }

    pub fn clear_move(&mut self, agent: AgentId) {
        self.moves.remove(&agent);
    }

    pub fn claimed_move(&self, agent: AgentId) -> Option<Vec3> {
        self.moves.get(&agent).copied()
    }

    /// Rejects `point` when another agent's registered target is closer than `min_dist`.
    pub fn validate_move(&self, agent: AgentId, point: Vec3, min_dist: f32) -> bool {
        self.moves
            .iter()
            .filter(|(owner, _)| **owner != agent)
            .all(|(_, claimed)| claimed.distance(point) >= min_dist)
    }

    pub fn raise_alarm(&mut self) {
        self.alarm = 1.0;
    }

    /// Linear decay to zero over `cooldown` seconds.
    pub fn decay(&mut self, dt: f32, cooldown: f32) {
        if cooldown <= 0.0 {
            self.alarm = 0.0;
        } else {
            self.alarm = (self.alarm - dt / cooldown).max(0.0);
        }
    }

    pub fn alarm(&self) -> f32 {
        self.alarm
    }

    pub fn set_alarm(&mut self, alarm: f32) {
        self.alarm = alarm.clamp(0.0, 1.0);
    }

    pub fn is_aggression(&self) -> bool {
        self.alarm > 0.0
    }

    pub(crate) fn reset_runtime(&mut self) {
        self.roster.clear();
        self.moves.clear();
        self.alarm = 0.0;
    }
}

/// Half-distance propagation rule: a roster member at `distance` from the
/// origin is reached when `distance / 2 <= hearing_radius`.
pub fn within_propagation_range(distance: f32, hearing_radius: f32) -> bool {
    distance / 2.0 <= hearing_radius
}

#[derive(Clone, Debug, Default)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, bounds: ZoneBounds) -> ZoneId {
        let id = ZoneId(self.zones.len() as u32);
        self.zones.push(Zone::new(id, name, bounds));
        id
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.get_mut(id.0 as usize)
    }

    pub fn contains_id(&self, id: ZoneId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Every zone whose bounds contain `point`, in id order.
    pub fn containing(&self, point: Vec3) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones
            .iter()
            .filter(move |zone| zone.bounds.contains(point))
            .map(|zone| zone.id)
    }

    pub fn decay_all(&mut self, dt: f32, cooldown: f32) {
        for zone in &mut self.zones {
            zone.decay(dt, cooldown);
        }
    }

    pub fn any_aggression(&self) -> bool {
        self.zones.iter().any(Zone::is_aggression)
    }

    /// Highest alarm level across all zones.
    pub fn max_alarm(&self) -> f32 {
        self.zones.iter().map(Zone::alarm).fold(0.0, f32::max)
    }
}
